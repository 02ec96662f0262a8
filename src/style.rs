//! Cascading style values and effective visual sets
//!
//! Every color-family attribute is resolved through the same fallback
//! chain: the node's own explicit setting, the level default at the
//! node's depth, the value its parent designated for it, and finally the
//! series-wide default. The `"none"` sentinel from option documents is a
//! real state here, not a magic string: it terminates the chain like an
//! explicit setting, but suppresses the attribute when colors are
//! actually computed.

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

use crate::color::Rgba;
use crate::config::ItemStyle;

/// One cascading attribute slot.
///
/// `Unset` falls through to the next source, `Suppressed` (spelled
/// `"none"` in option documents) stops the cascade and disables the
/// attribute, `Value` stops the cascade with a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StyleValue<T> {
    #[default]
    Unset,
    Suppressed,
    Value(T),
}

impl<T> StyleValue<T> {
    /// Whether this slot terminates the cascade (`Suppressed` counts).
    pub fn is_present(&self) -> bool {
        !matches!(self, StyleValue::Unset)
    }

    /// The concrete value, if any. `Suppressed` yields `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            StyleValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for StyleValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(StyleValue::Unset);
        }
        if raw.as_str() == Some("none") {
            return Ok(StyleValue::Suppressed);
        }
        T::deserialize(raw).map(StyleValue::Value).map_err(DeError::custom)
    }
}

/// The effective `{color, colorAlpha, colorSaturation}` set for one node.
///
/// Doubles as the designated set a parent hands to each child: same
/// shape, third priority in the child's own cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualSet {
    pub color: StyleValue<Rgba>,
    pub color_alpha: StyleValue<f64>,
    pub color_saturation: StyleValue<f64>,
}

fn pick<T: Clone>(
    own: &StyleValue<T>,
    level: Option<&StyleValue<T>>,
    designated: &StyleValue<T>,
    series: &StyleValue<T>,
) -> StyleValue<T> {
    // Priority: this node > this level > parent-designated > series
    if own.is_present() {
        return own.clone();
    }
    if let Some(level) = level {
        if level.is_present() {
            return level.clone();
        }
    }
    if designated.is_present() {
        return designated.clone();
    }
    series.clone()
}

/// Resolve a node's effective visual set from the four cascade sources.
///
/// Each attribute resolves independently; partial color definitions from
/// different sources are never merged.
pub fn resolve_visuals(
    own: &ItemStyle,
    level: Option<&ItemStyle>,
    designated: &VisualSet,
    series: &ItemStyle,
) -> VisualSet {
    VisualSet {
        color: pick(
            &own.color,
            level.map(|l| &l.color),
            &designated.color,
            &series.color,
        ),
        color_alpha: pick(
            &own.color_alpha,
            level.map(|l| &l.color_alpha),
            &designated.color_alpha,
            &series.color_alpha,
        ),
        color_saturation: pick(
            &own.color_saturation,
            level.map(|l| &l.color_saturation),
            &designated.color_saturation,
            &series.color_saturation,
        ),
    }
}

/// Compute the final paint color for an effective visual set.
///
/// Absent or suppressed base color means no recoloring at all. Otherwise
/// the saturation replacement runs before the alpha replacement.
pub fn calculate_color(visuals: &VisualSet) -> Option<Rgba> {
    let mut color = *visuals.color.value()?;
    if let Some(&saturation) = visuals.color_saturation.value() {
        color = color.with_saturation(saturation);
    }
    if let Some(&alpha) = visuals.color_alpha.value() {
        color = color.with_alpha(alpha);
    }
    Some(color)
}

/// Border color derived from the node's own resolved color.
pub fn calculate_border_color(border_saturation: f64, node_color: Option<Rgba>) -> Option<Rgba> {
    node_color.map(|c| c.with_saturation(border_saturation))
}

//! Value-to-visual mappings built per parent node
//!
//! A mapping converts a child's domain value (or its ordinal / id-derived
//! index) into one visual attribute value, either by linear interpolation
//! across a multi-stop range or by cyclic lookup in a categorical range.
//! Mappings are built fresh for each qualifying parent and never shared
//! across nodes; the propagation source is an explicit field on the
//! mapping rather than out-of-band state.

use crate::color::{interpolate_stops, Rgba};
use crate::config::MappingBy;
use crate::style::{StyleValue, VisualSet};

/// Which attribute a mapping produces values for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualAttr {
    Color,
    ColorAlpha,
    ColorSaturation,
}

/// The configured output range of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValues {
    Colors(Vec<Rgba>),
    Numbers(Vec<f64>),
}

impl RangeValues {
    pub fn len(&self) -> usize {
        match self {
            RangeValues::Colors(v) => v.len(),
            RangeValues::Numbers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How domain inputs are converted to range positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMethod {
    /// Interpolate across the range stops, domain min → first stop.
    Linear,
    /// Integer lookup into the range; `wrap` makes position `k` and
    /// `k + len` identical.
    Category { wrap: bool },
}

/// One mapped output value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappedValue {
    Color(Rgba),
    Number(f64),
}

/// A value-to-visual mapping for one parent's children.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMapping {
    pub attribute: VisualAttr,
    pub domain: [f64; 2],
    pub range: RangeValues,
    pub method: MappingMethod,
    /// Propagation source the mapping was built with. Only meaningful
    /// for color mappings; alpha/saturation always map by value.
    pub mapping_by: MappingBy,
}

impl VisualMapping {
    /// Build a mapping, selecting the method from attribute and source.
    ///
    /// Colors mapped by `index` or `id` use cyclic categorical lookup;
    /// everything else interpolates linearly across the range.
    pub fn new(
        attribute: VisualAttr,
        domain: [f64; 2],
        range: RangeValues,
        mapping_by: MappingBy,
    ) -> Self {
        let method = if attribute == VisualAttr::Color
            && matches!(mapping_by, MappingBy::Index | MappingBy::Id)
        {
            MappingMethod::Category { wrap: true }
        } else {
            MappingMethod::Linear
        };
        VisualMapping {
            attribute,
            domain,
            range,
            method,
            mapping_by,
        }
    }

    /// Map one input (domain value or categorical position) to a visual.
    pub fn map_value(&self, input: f64) -> MappedValue {
        match self.method {
            MappingMethod::Category { wrap } => {
                // Empty ranges get the same fallbacks the interpolators
                // use; qualifying callers reject them before mapping.
                if self.range.is_empty() {
                    return match &self.range {
                        RangeValues::Colors(_) => MappedValue::Color(interpolate_stops(&[], 0.0)),
                        RangeValues::Numbers(_) => MappedValue::Number(0.0),
                    };
                }
                let n = self.range.len();
                let idx = input.max(0.0) as usize;
                let idx = if wrap { idx % n } else { idx.min(n - 1) };
                match &self.range {
                    RangeValues::Colors(colors) => MappedValue::Color(colors[idx]),
                    RangeValues::Numbers(numbers) => MappedValue::Number(numbers[idx]),
                }
            }
            MappingMethod::Linear => {
                let t = self.normalize(input);
                match &self.range {
                    RangeValues::Colors(colors) => MappedValue::Color(interpolate_stops(colors, t)),
                    RangeValues::Numbers(numbers) => {
                        MappedValue::Number(interpolate_numbers(numbers, t))
                    }
                }
            }
        }
    }

    /// Write the mapped value into a designated set for one child.
    pub fn apply(&self, designated: &mut VisualSet, input: f64) {
        match (self.attribute, self.map_value(input)) {
            (VisualAttr::Color, MappedValue::Color(c)) => {
                designated.color = StyleValue::Value(c);
            }
            (VisualAttr::ColorAlpha, MappedValue::Number(n)) => {
                designated.color_alpha = StyleValue::Value(n);
            }
            (VisualAttr::ColorSaturation, MappedValue::Number(n)) => {
                designated.color_saturation = StyleValue::Value(n);
            }
            // Range type and attribute are paired at construction time.
            _ => {}
        }
    }

    /// Normalize a domain value to [0, 1]; a degenerate domain maps
    /// everything to the midpoint.
    fn normalize(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        if d1 == d0 {
            return 0.5;
        }
        ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
    }
}

/// Interpolate a numeric value from a stop list at position t ∈ [0, 1].
fn interpolate_numbers(stops: &[f64], t: f64) -> f64 {
    if stops.is_empty() {
        return 0.0;
    }
    let t = t.clamp(0.0, 1.0);
    let n = stops.len();
    if n == 1 {
        return stops[0];
    }

    let pos = t * (n - 1) as f64;
    let idx_low = pos.floor() as usize;
    let idx_high = (idx_low + 1).min(n - 1);
    let frac = pos - idx_low as f64;

    stops[idx_low] * (1.0 - frac) + stops[idx_high] * frac
}

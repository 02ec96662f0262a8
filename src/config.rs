//! Typed styling options for nodes, levels and the series
//!
//! Option documents are JSON (the surrounding chart options), parsed once
//! per encoding pass. Node items, `levels` entries and the series itself
//! all share the same option shape; inherited keys resolve through the
//! node → level → series chain provided here.
//!
//! Malformed range values degrade to "not configured" instead of failing
//! the whole document: a mapping that cannot be built is simply omitted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::color::Rgba;
use crate::error::Result;
use crate::style::StyleValue;

/// What a color mapping feeds on for each child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingBy {
    /// The child's value along `visualDimension` (linear mapping).
    #[default]
    Value,
    /// The child's ordinal position among its siblings (cyclic).
    Index,
    /// A stable ordinal derived from the child's id (cyclic).
    Id,
}

/// Scalar item-style keys, one cascade slot each.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemStyle {
    pub color: StyleValue<Rgba>,
    pub color_alpha: StyleValue<f64>,
    pub color_saturation: StyleValue<f64>,
    pub border_color: StyleValue<Rgba>,
    pub border_color_saturation: Option<f64>,
}

/// The option shape shared by node items, `levels` entries and the series.
///
/// The range keys are kept separate from the scalar `itemStyle.color`
/// family on purpose: a range on a level must not be mistaken for a
/// scalar color on a childless sibling at the same level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOptions {
    pub item_style: ItemStyle,

    #[serde(deserialize_with = "lenient_range")]
    pub color_range: Option<Vec<Rgba>>,
    #[serde(deserialize_with = "lenient_range")]
    pub color_alpha_range: Option<Vec<f64>>,
    #[serde(deserialize_with = "lenient_range")]
    pub color_saturation_range: Option<Vec<f64>>,

    /// One-directional domain widening: only lowers the natural minimum.
    pub visual_min: Option<f64>,
    /// One-directional domain widening: only raises the natural maximum.
    pub visual_max: Option<f64>,

    pub color_mapping_by: Option<MappingBy>,
    /// Which component of an array-valued item feeds the mapping.
    pub visual_dimension: Option<usize>,
}

/// Series options: the series-wide defaults plus per-depth level entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesOptions {
    #[serde(flatten)]
    pub defaults: StyleOptions,
    pub levels: Vec<StyleOptions>,
}

impl SeriesOptions {
    /// Parse series options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Level defaults for a given true depth, if configured.
    pub fn level(&self, depth: usize) -> Option<&StyleOptions> {
        self.levels.get(depth)
    }

    /// Resolve an `Option`-valued key through node → level → series.
    pub fn lookup<'a, T: ?Sized>(
        &'a self,
        own: &'a StyleOptions,
        depth: usize,
        get: impl Fn(&'a StyleOptions) -> Option<&'a T>,
    ) -> Option<&'a T> {
        get(own)
            .or_else(|| self.level(depth).and_then(&get))
            .or_else(|| get(&self.defaults))
    }

    /// Resolve a cascade-slot key through node → level → series.
    ///
    /// `Suppressed` terminates the chain the same way a concrete value
    /// does.
    pub fn lookup_style<'a, T>(
        &'a self,
        own: &'a StyleOptions,
        depth: usize,
        get: impl Fn(&'a StyleOptions) -> &'a StyleValue<T>,
    ) -> &'a StyleValue<T> {
        let v = get(own);
        if v.is_present() {
            return v;
        }
        if let Some(level) = self.level(depth) {
            let v = get(level);
            if v.is_present() {
                return v;
            }
        }
        get(&self.defaults)
    }
}

/// Deserialize a range array, tolerating malformed input.
///
/// Non-array values and arrays with unparsable entries become `None`
/// (mapping disabled) rather than a document-level error.
fn lenient_range<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<Vec<T>>(raw) {
        Ok(values) => Ok(Some(values)),
        Err(e) => {
            eprintln!("WARN: Ignoring malformed range value: {}", e);
            Ok(None)
        }
    }
}

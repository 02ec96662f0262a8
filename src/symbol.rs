//! Symbol-family visuals for flat (non-hierarchical) series
//!
//! Each series resolves a symbol type, size and keep-aspect flag; any of
//! the three may be a literal or a per-item callback. Series-wide
//! defaults are always written because legend rendering needs them even
//! for series filtered out of the plot, and the legend glyph is never
//! taken from a callback result so it stays identical across items.

use std::fmt;
use std::sync::Arc;

/// The parameter bundle handed to symbol callbacks, one per item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemParams {
    pub data_index: usize,
    pub value: f64,
    pub series_name: String,
}

/// A symbol-family option: a fixed value, or a callback evaluated once
/// per visible item with the item's raw value and parameter bundle.
pub enum SymbolProp<T> {
    Literal(T),
    Callback(Arc<dyn Fn(f64, &ItemParams) -> T + Send + Sync>),
}

impl<T> SymbolProp<T> {
    /// Wrap a closure as a callback prop.
    pub fn callback(f: impl Fn(f64, &ItemParams) -> T + Send + Sync + 'static) -> Self {
        SymbolProp::Callback(Arc::new(f))
    }

    pub fn literal(&self) -> Option<&T> {
        match self {
            SymbolProp::Literal(v) => Some(v),
            SymbolProp::Callback(_) => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, SymbolProp::Callback(_))
    }
}

impl<T: Clone> Clone for SymbolProp<T> {
    fn clone(&self) -> Self {
        match self {
            SymbolProp::Literal(v) => SymbolProp::Literal(v.clone()),
            SymbolProp::Callback(f) => SymbolProp::Callback(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SymbolProp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolProp::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            SymbolProp::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Series-level symbol configuration.
#[derive(Debug, Clone, Default)]
pub struct SymbolOptions {
    pub symbol: Option<SymbolProp<String>>,
    pub symbol_size: Option<SymbolProp<f64>>,
    pub symbol_keep_aspect: Option<SymbolProp<bool>>,
}

/// Explicit per-item overrides; always the highest priority, applied
/// independently per attribute.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemOverride {
    pub symbol: Option<String>,
    pub symbol_size: Option<f64>,
    pub symbol_keep_aspect: Option<bool>,
}

/// Per-item visual output; `None` falls back to the series visuals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemVisuals {
    pub symbol: Option<String>,
    pub symbol_size: Option<f64>,
    pub symbol_keep_aspect: Option<bool>,
}

/// One row of a flat series.
#[derive(Debug, Clone, Default)]
pub struct FlatItem {
    pub value: f64,
    pub overrides: ItemOverride,
    pub visuals: ItemVisuals,
}

impl FlatItem {
    pub fn new(value: f64) -> Self {
        FlatItem {
            value,
            ..Default::default()
        }
    }
}

/// Series-wide visual output, written even for filtered series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesVisuals {
    /// The legend glyph; stable regardless of per-item variation.
    pub legend_symbol: String,
    pub symbol: String,
    pub symbol_size: Option<f64>,
    pub symbol_keep_aspect: Option<bool>,
}

/// A flat item collection plus its symbol configuration.
#[derive(Debug, Clone, Default)]
pub struct FlatSeries {
    pub name: String,
    pub options: SymbolOptions,
    /// Whether the series is currently filtered out of rendering.
    pub filtered: bool,
    pub items: Vec<FlatItem>,
    pub visuals: SeriesVisuals,
}

impl FlatSeries {
    pub fn new(name: impl Into<String>, options: SymbolOptions, items: Vec<FlatItem>) -> Self {
        FlatSeries {
            name: name.into(),
            options,
            filtered: false,
            items,
            visuals: SeriesVisuals::default(),
        }
    }
}

/// Assigns symbol visuals to one series per encoding pass.
///
/// `default_symbol` stands in when the series symbol is unset or
/// callback-valued; `legend_symbol` is an optional explicit legend
/// override (some series kinds draw a dedicated legend glyph).
#[derive(Debug, Clone)]
pub struct SymbolEncoder {
    default_symbol: String,
    legend_symbol: Option<String>,
}

impl SymbolEncoder {
    pub fn new(default_symbol: impl Into<String>) -> Self {
        SymbolEncoder {
            default_symbol: default_symbol.into(),
            legend_symbol: None,
        }
    }

    pub fn with_legend_symbol(mut self, legend_symbol: impl Into<String>) -> Self {
        self.legend_symbol = Some(legend_symbol.into());
        self
    }

    /// Encode one series: series-wide defaults first, then per-item
    /// callbacks and overrides for visible series.
    pub fn encode(&self, series: &mut FlatSeries) {
        let symbol = series.options.symbol.clone();
        let symbol_size = series.options.symbol_size.clone();
        let keep_aspect = series.options.symbol_keep_aspect.clone();

        let series_symbol = symbol
            .as_ref()
            .and_then(|p| p.literal())
            .cloned()
            .unwrap_or_else(|| self.default_symbol.clone());

        series.visuals = SeriesVisuals {
            // Never derived from a callback result.
            legend_symbol: self
                .legend_symbol
                .clone()
                .unwrap_or_else(|| series_symbol.clone()),
            symbol: series_symbol,
            symbol_size: symbol_size.as_ref().and_then(|p| p.literal()).copied(),
            symbol_keep_aspect: keep_aspect.as_ref().and_then(|p| p.literal()).copied(),
        };

        // Filtered series keep their legend defaults but get no per-item
        // encoding.
        if series.filtered {
            return;
        }

        let has_callback = symbol.as_ref().is_some_and(SymbolProp::is_callback)
            || symbol_size.as_ref().is_some_and(SymbolProp::is_callback)
            || keep_aspect.as_ref().is_some_and(SymbolProp::is_callback);

        let series_name = series.name.clone();
        for (data_index, item) in series.items.iter_mut().enumerate() {
            if has_callback {
                let params = ItemParams {
                    data_index,
                    value: item.value,
                    series_name: series_name.clone(),
                };
                if let Some(SymbolProp::Callback(f)) = &symbol {
                    item.visuals.symbol = Some(f(item.value, &params));
                }
                if let Some(SymbolProp::Callback(f)) = &symbol_size {
                    item.visuals.symbol_size = Some(f(item.value, &params));
                }
                if let Some(SymbolProp::Callback(f)) = &keep_aspect {
                    item.visuals.symbol_keep_aspect = Some(f(item.value, &params));
                }
            }

            // Explicit item options win over callback results.
            if let Some(symbol) = &item.overrides.symbol {
                item.visuals.symbol = Some(symbol.clone());
            }
            if let Some(size) = item.overrides.symbol_size {
                item.visuals.symbol_size = Some(size);
            }
            if let Some(keep) = item.overrides.symbol_keep_aspect {
                item.visuals.symbol_keep_aspect = Some(keep);
            }
        }
    }
}

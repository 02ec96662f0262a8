//! Treemap visual-attribute encoding
//!
//! Computes the visual attributes a renderer applies to chart elements:
//! fill and border colors for hierarchy nodes through a multi-level
//! style cascade plus per-parent value-to-visual mappings, and
//! symbol-family visuals for flat series. Layout, painting and data
//! storage are collaborators; this crate only reads structure and
//! options and writes the per-element `visuals` slots.

pub mod color;
pub mod config;
pub mod error;
pub mod mapping;
pub mod style;
pub mod symbol;
pub mod tree;
pub mod visual;

pub use color::Rgba;
pub use config::{ItemStyle, MappingBy, SeriesOptions, StyleOptions};
pub use error::{Result, VisualError};
pub use mapping::{MappedValue, MappingMethod, RangeValues, VisualAttr, VisualMapping};
pub use style::{StyleValue, VisualSet};
pub use symbol::{
    FlatItem, FlatSeries, ItemOverride, ItemParams, SymbolEncoder, SymbolOptions, SymbolProp,
};
pub use tree::{IdIndexMap, NodeLayout, NodeVisuals, TreemapTree, TreeNode};
pub use visual::reset_visuals;

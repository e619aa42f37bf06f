//! chiptile-collections: Chip objects and series bookkeeping (sans-IO).
//!
//! Builds the per-tile chip layer on top of `chiptile-geometry`:
//! devices -> per-tile chips -> stamped features -> summary tables.
//!
//! Feature detection itself (button/chamber finding) is an external
//! collaborator behind the [`Stamper`] trait; this crate never touches
//! pixels. File loading and raster handling live in `chiptile-io`.

pub mod chip;
pub mod quant;
pub mod series;
pub mod standard;
pub mod summary;

pub use chip::{
    Attrs, Chip, ChipError, Device, Feature, FeatureKind, FeatureMetrics, FeatureSelection,
    Pinout, Stamper,
};
pub use quant::ChipQuant;
pub use series::{ChipSeries, SeriesKey};
pub use standard::{CONCENTRATION_INDEXER, StandardSeries};
pub use summary::{SummaryRecord, SummaryTable};

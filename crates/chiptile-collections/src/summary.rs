//! Flat summary records aggregated from chip features.
//!
//! Every feature a chip holds flattens into one [`SummaryRecord`] row;
//! series collect their chips' rows into a [`SummaryTable`] tagged with
//! the series indexer column. Export serializers consume the table
//! without knowing anything about chips.

use serde::{Deserialize, Serialize};

use crate::chip::{Chip, FeatureKind};

/// One summary row: a single feature on a single chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Imaging setup identifier.
    pub setup: String,
    /// Device name.
    pub device: String,
    /// Tile column in the device grid.
    pub tile_column: u32,
    /// Tile row in the device grid.
    pub tile_row: u32,
    /// Imaging channel.
    pub channel: String,
    /// Exposure time in milliseconds.
    pub exposure_ms: u32,
    /// Feature class.
    pub kind: FeatureKind,
    /// Feature cell column within the tile.
    pub feature_column: u32,
    /// Feature cell row within the tile.
    pub feature_row: u32,
    /// Pinout identifier, if the cell is annotated.
    pub id: Option<String>,
    /// Feature center x in rotated-raster pixels.
    pub center_x: f64,
    /// Feature center y in rotated-raster pixels.
    pub center_y: f64,
    /// Mean intensity, if quantified.
    pub mean: Option<f64>,
    /// Median intensity, if quantified.
    pub median: Option<f64>,
    /// Sampled pixel count, if quantified.
    pub area_px: Option<u32>,
    /// Position of the owning chip along its series, if any.
    pub series_index: Option<f64>,
}

/// A collection of summary rows, optionally tagged with the name of the
/// series indexer that fills `series_index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    /// Column name for `series_index` (e.g. `"time_s"`,
    /// `"concentration_uM"`); `None` for single-chip summaries.
    pub indexer: Option<String>,
    /// The rows.
    pub records: Vec<SummaryRecord>,
}

impl SummaryTable {
    /// An untagged table from bare records.
    #[must_use]
    pub const fn new(records: Vec<SummaryRecord>) -> Self {
        Self {
            indexer: None,
            records,
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Chip {
    /// Flatten this chip's features into summary rows.
    ///
    /// Unquantified features still contribute a row; their metric columns
    /// are empty.
    #[must_use]
    pub fn summarize(&self) -> Vec<SummaryRecord> {
        self.features()
            .iter()
            .map(|feature| SummaryRecord {
                setup: self.setup.clone(),
                device: self.device.clone(),
                tile_column: self.tile_index.0,
                tile_row: self.tile_index.1,
                channel: self.channel.clone(),
                exposure_ms: self.exposure_ms,
                kind: feature.kind,
                feature_column: feature.index.0,
                feature_row: feature.index.1,
                id: feature.id.clone(),
                center_x: feature.center.x,
                center_y: feature.center.y,
                mean: feature.metrics.map(|m| m.mean),
                median: feature.metrics.map(|m| m.median),
                area_px: feature.metrics.map(|m| m.area_px),
                series_index: None,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chip::tests::{FixedStamper, test_chip, test_device};
    use crate::chip::FeatureSelection;

    #[test]
    fn unprocessed_chip_summarizes_to_nothing() {
        let device = test_device();
        let chip = test_chip(&device);
        assert!(chip.summarize().is_empty());
    }

    #[test]
    fn summary_rows_carry_chip_identity_and_metrics() {
        let device = test_device();
        let mut chip = test_chip(&device);
        chip.find_features(&FixedStamper { mean: 77.5 }, FeatureSelection::Chamber)
            .unwrap();

        let rows = chip.summarize();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.setup, "s1");
        assert_eq!(row.device, "d1");
        assert_eq!(row.channel, "egfp");
        assert_eq!(row.exposure_ms, 500);
        assert_eq!(row.kind, FeatureKind::Chamber);
        assert_eq!(row.id.as_deref(), Some("MBP-WT"));
        assert_eq!(row.mean, Some(77.5));
        assert_eq!(row.series_index, None);
    }

    #[test]
    fn summary_table_serde_round_trip() {
        let device = test_device();
        let mut chip = test_chip(&device);
        chip.find_features(&FixedStamper { mean: 10.0 }, FeatureSelection::All)
            .unwrap();
        let table = SummaryTable::new(chip.summarize());

        let json = serde_json::to_string(&table).unwrap();
        let deserialized: SummaryTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, deserialized);
    }
}

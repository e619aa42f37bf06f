//! Chip series: an ordered collection of chips along one experimental axis.
//!
//! A series indexes chips by a numeric key (a timepoint, a frame number,
//! a concentration) and aggregates their per-feature summaries into one
//! table with the series position as an extra column.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chip::{Chip, ChipError, FeatureSelection, Stamper};
use crate::summary::SummaryTable;

/// Numeric series key with a total order.
///
/// Series indexes are integers when filenames carry integers and floats
/// when they do not (concentrations, fractional timepoints), so the key
/// is an `f64` ordered by `total_cmp`. Keys are expected to be finite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesKey(pub f64);

impl PartialEq for SeriesKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == std::cmp::Ordering::Equal
    }
}

impl Eq for SeriesKey {}

impl PartialOrd for SeriesKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeriesKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for SeriesKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<u32> for SeriesKey {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl fmt::Display for SeriesKey {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Integral keys print without a trailing ".0" so filenames and
        // column values match the original imaging indexes.
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// An ordered collection of chips keyed along one experimental axis.
///
/// Not serde-serializable as a whole: chips are keyed by a numeric map
/// key, and summaries, not series, are the export surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipSeries {
    /// Terse user description (e.g. `"kinetics"`, `"cMU"`).
    pub description: String,
    /// Name of the series axis, used as the summary column header
    /// (e.g. `"time_s"`, `"concentration_uM"`).
    pub indexer: String,
    chips: BTreeMap<SeriesKey, Chip>,
}

impl ChipSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new(description: impl Into<String>, indexer: impl Into<String>) -> Self {
        let series = Self {
            description: description.into(),
            indexer: indexer.into(),
            chips: BTreeMap::new(),
        };
        tracing::debug!(
            description = %series.description,
            indexer = %series.indexer,
            "chip series created",
        );
        series
    }

    /// Add (or replace) the chip at `key`.
    pub fn add_chip(&mut self, key: impl Into<SeriesKey>, chip: Chip) {
        let key = key.into();
        tracing::debug!(series = %self.description, key = %key, chip = %chip, "chip added");
        self.chips.insert(key, chip);
    }

    /// The chip at `key`, if present.
    #[must_use]
    pub fn chip(&self, key: impl Into<SeriesKey>) -> Option<&Chip> {
        self.chips.get(&key.into())
    }

    /// All chips in key order.
    pub fn chips(&self) -> impl Iterator<Item = (SeriesKey, &Chip)> {
        self.chips.iter().map(|(k, c)| (*k, c))
    }

    /// Number of chips in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Returns `true` if the series holds no chips.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Largest key in the series, if any.
    #[must_use]
    pub fn max_key(&self) -> Option<SeriesKey> {
        self.chips.keys().next_back().copied()
    }

    pub(crate) fn remove(&mut self, key: SeriesKey) -> Option<Chip> {
        self.chips.remove(&key)
    }

    pub(crate) fn chips_mut(&mut self) -> impl Iterator<Item = (SeriesKey, &mut Chip)> {
        self.chips.iter_mut().map(|(k, c)| (*k, c))
    }

    /// Map feature positions from `reference` onto every chip in the
    /// series and re-sample each chip's own metrics.
    ///
    /// # Errors
    ///
    /// Returns [`ChipError::NotProcessed`] if the reference has no
    /// features, or propagates the first [`ChipError::StamperFailure`].
    pub fn map_from(
        &mut self,
        reference: &Chip,
        stamper: &dyn Stamper,
        selection: FeatureSelection,
    ) -> Result<(), ChipError> {
        for (key, chip) in self.chips.iter_mut() {
            chip.map_from(reference, stamper, selection)?;
            tracing::debug!(series = %self.description, key = %key, "chip stamped and mapped");
        }
        Ok(())
    }

    /// Aggregate all chips' summary rows, tagged with this series' indexer
    /// and each chip's key, in key order.
    #[must_use]
    pub fn summarize(&self) -> SummaryTable {
        let records = self
            .chips
            .iter()
            .flat_map(|(key, chip)| {
                chip.summarize().into_iter().map(|mut record| {
                    record.series_index = Some(key.0);
                    record
                })
            })
            .collect();
        SummaryTable {
            indexer: Some(self.indexer.clone()),
            records,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chip::tests::{FixedStamper, test_chip, test_device};

    #[test]
    fn series_keys_iterate_sorted() {
        let device = test_device();
        let mut series = ChipSeries::new("kinetics", "time_s");
        for key in [30.0, 0.0, 120.0, 60.0] {
            series.add_chip(key, test_chip(&device));
        }
        let keys: Vec<f64> = series.chips().map(|(k, _)| k.0).collect();
        assert_eq!(keys, vec![0.0, 30.0, 60.0, 120.0]);
        assert_eq!(series.max_key(), Some(SeriesKey(120.0)));
    }

    #[test]
    fn series_key_display_trims_integral_values() {
        assert_eq!(SeriesKey(4.0).to_string(), "4");
        assert_eq!(SeriesKey(2.5).to_string(), "2.5");
    }

    #[test]
    fn summarize_tags_rows_with_the_series_index() {
        let device = test_device();
        let stamper = FixedStamper { mean: 42.0 };
        let mut series = ChipSeries::new("kinetics", "time_s");
        for key in [0.0, 30.0] {
            let mut chip = test_chip(&device);
            chip.find_features(&stamper, FeatureSelection::Chamber).unwrap();
            series.add_chip(key, chip);
        }

        let table = series.summarize();
        assert_eq!(table.indexer.as_deref(), Some("time_s"));
        assert_eq!(table.len(), 2);
        let indexes: Vec<Option<f64>> =
            table.records.iter().map(|r| r.series_index).collect();
        assert_eq!(indexes, vec![Some(0.0), Some(30.0)]);
    }

    #[test]
    fn map_from_reaches_every_chip() {
        let device = test_device();
        let mut reference = test_chip(&device);
        reference
            .find_features(&FixedStamper { mean: 200.0 }, FeatureSelection::Chamber)
            .unwrap();

        let mut series = ChipSeries::new("kinetics", "time_s");
        for key in [0.0, 30.0, 60.0] {
            series.add_chip(key, test_chip(&device));
        }
        series
            .map_from(&reference, &FixedStamper { mean: 7.0 }, FeatureSelection::Chamber)
            .unwrap();

        for (_, chip) in series.chips() {
            assert!(chip.is_processed());
            let metrics = chip.features()[0].metrics.unwrap();
            assert!((metrics.mean - 7.0).abs() < f64::EPSILON);
        }
    }
}

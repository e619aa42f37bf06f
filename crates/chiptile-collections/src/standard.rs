//! Standard (calibration) series: concentration-keyed chips mapped from
//! the high standard.
//!
//! The chip at the highest concentration (the "high standard") has the
//! strongest signal and is the most reliable place to find features from
//! scratch. Every other chip in the series then inherits the high
//! standard's feature positions and re-samples its own intensities.

use crate::chip::{Chip, ChipError, FeatureSelection, Stamper};
use crate::series::{ChipSeries, SeriesKey};
use crate::summary::SummaryTable;

/// Series indexer column used by standard series.
pub const CONCENTRATION_INDEXER: &str = "concentration_uM";

/// A calibration series keyed by concentration.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardSeries {
    series: ChipSeries,
}

impl StandardSeries {
    /// Create an empty standard series.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            series: ChipSeries::new(description, CONCENTRATION_INDEXER),
        }
    }

    /// Terse user description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.series.description
    }

    /// Add (or replace) the chip at `concentration`.
    pub fn add_chip(&mut self, concentration: f64, chip: Chip) {
        self.series.add_chip(concentration, chip);
    }

    /// The underlying key-ordered series.
    #[must_use]
    pub const fn series(&self) -> &ChipSeries {
        &self.series
    }

    /// Key of the high standard (the maximal concentration), if any chips
    /// are present.
    #[must_use]
    pub fn high_standard_key(&self) -> Option<SeriesKey> {
        self.series.max_key()
    }

    /// The high-standard chip, if any chips are present.
    #[must_use]
    pub fn high_standard(&self) -> Option<&Chip> {
        self.high_standard_key().and_then(|key| self.series.chip(key.0))
    }

    /// Find features on the high standard, then map its positions onto
    /// every other chip in the series.
    ///
    /// # Errors
    ///
    /// Returns [`ChipError::EmptySeries`] if no chips were added, or
    /// propagates stamping failures.
    pub fn process(
        &mut self,
        stamper: &dyn Stamper,
        selection: FeatureSelection,
    ) -> Result<(), ChipError> {
        let hs_key = self.high_standard_key().ok_or_else(|| ChipError::EmptySeries {
            description: self.series.description.clone(),
        })?;

        // Take the high standard out so the rest of the series can be
        // mapped against it without aliasing.
        let mut high_standard =
            self.series
                .remove(hs_key)
                .ok_or_else(|| ChipError::EmptySeries {
                    description: self.series.description.clone(),
                })?;
        high_standard.find_features(stamper, selection)?;
        tracing::debug!(
            series = %self.series.description,
            key = %hs_key,
            "high standard processed",
        );

        let description = self.series.description.clone();
        let result = (|| {
            for (key, chip) in self.series.chips_mut() {
                chip.map_from(&high_standard, stamper, selection)?;
                tracing::debug!(series = %description, key = %key, "standard chip mapped");
            }
            Ok(())
        })();
        self.series.add_chip(hs_key.0, high_standard);
        result
    }

    /// Aggregate the series summary (see [`ChipSeries::summarize`]).
    #[must_use]
    pub fn summarize(&self) -> SummaryTable {
        self.series.summarize()
    }

    /// [`Self::process`] followed by [`Self::summarize`].
    ///
    /// # Errors
    ///
    /// Propagates any [`ChipError`] from processing.
    pub fn process_summarize(
        &mut self,
        stamper: &dyn Stamper,
        selection: FeatureSelection,
    ) -> Result<SummaryTable, ChipError> {
        self.process(stamper, selection)?;
        Ok(self.summarize())
    }
}

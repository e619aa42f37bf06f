//! Single-chip quantification wrapper.
//!
//! A `ChipQuant` tracks one chip through the stamp → find/map →
//! summarize flow, refusing to summarize before the chip has been
//! processed.

use crate::chip::{Chip, ChipError, FeatureSelection, Stamper};
use crate::summary::SummaryTable;

/// One chip queued for quantification.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipQuant {
    /// Terse user description.
    pub description: String,
    chip: Chip,
    processed: bool,
}

impl ChipQuant {
    /// Wrap a chip for quantification.
    #[must_use]
    pub fn new(description: impl Into<String>, chip: Chip) -> Self {
        let quant = Self {
            description: description.into(),
            chip,
            processed: false,
        };
        tracing::debug!(description = %quant.description, chip = %quant.chip, "chip quant created");
        quant
    }

    /// The wrapped chip.
    #[must_use]
    pub const fn chip(&self) -> &Chip {
        &self.chip
    }

    /// Whether [`Self::process`] has completed.
    #[must_use]
    pub const fn is_processed(&self) -> bool {
        self.processed
    }

    /// Stamp the chip: find features from scratch, or, when a reference
    /// chip is given, map the reference's feature positions instead.
    ///
    /// # Errors
    ///
    /// Propagates [`ChipError::StamperFailure`], or
    /// [`ChipError::NotProcessed`] for an unprocessed reference.
    pub fn process(
        &mut self,
        stamper: &dyn Stamper,
        selection: FeatureSelection,
        reference: Option<&Chip>,
    ) -> Result<(), ChipError> {
        match reference {
            Some(reference) => self.chip.map_from(reference, stamper, selection)?,
            None => self.chip.find_features(stamper, selection)?,
        }
        self.processed = true;
        tracing::debug!(description = %self.description, chip = %self.chip, "features processed");
        Ok(())
    }

    /// Summarize the processed chip.
    ///
    /// # Errors
    ///
    /// Returns [`ChipError::NotProcessed`] if [`Self::process`] has not
    /// run yet.
    pub fn summarize(&self) -> Result<SummaryTable, ChipError> {
        if !self.processed {
            return Err(ChipError::NotProcessed {
                chip: self.chip.to_string(),
            });
        }
        Ok(SummaryTable::new(self.chip.summarize()))
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
        reference: Option<&Chip>,
    ) -> Result<SummaryTable, ChipError> {
        self.process(stamper, selection, reference)?;
        self.summarize()
    }
}

//! Chip, device, and feature model plus the stamping collaborator seam.
//!
//! A [`Chip`] is the logical object for one sub-array tile of a device:
//! it owns its tile corner set, imaging metadata, and whatever features a
//! [`Stamper`] has located in it. The actual button/chamber detection is
//! deliberately outside this crate; implementations plug in through the
//! [`Stamper`] trait and receive the tile corners this crate guarantees.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use chiptile_geometry::{CornerSet, Point};

/// Arbitrary string metadata attached to devices and chips.
pub type Attrs = BTreeMap<String, String>;

/// Maps within-tile grid cells to the library member printed there.
///
/// Serialized through a `Vec` of entries because JSON cannot key maps by
/// grid-cell tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PinoutEntries", into = "PinoutEntries")]
pub struct Pinout {
    entries: BTreeMap<(u32, u32), String>,
}

/// Serde-compatible proxy for [`Pinout`].
#[derive(Serialize, Deserialize)]
struct PinoutEntries(Vec<((u32, u32), String)>);

impl From<PinoutEntries> for Pinout {
    fn from(proxy: PinoutEntries) -> Self {
        Self {
            entries: proxy.0.into_iter().collect(),
        }
    }
}

impl From<Pinout> for PinoutEntries {
    fn from(pinout: Pinout) -> Self {
        Self(pinout.entries.into_iter().collect())
    }
}

impl Pinout {
    /// An empty pinout (no cell annotations).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build a pinout from `(column, row) -> identifier` entries.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ((u32, u32), String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Annotate one cell.
    pub fn insert(&mut self, column: u32, row: u32, id: impl Into<String>) {
        self.entries.insert((column, row), id.into());
    }

    /// The identifier printed at `(column, row)`, if annotated.
    #[must_use]
    pub fn id_at(&self, column: u32, row: u32) -> Option<&str> {
        self.entries.get(&(column, row)).map(String::as_str)
    }

    /// Number of annotated cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no cells are annotated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A physical device: its identity, unrotated corner set, and pinout.
///
/// This is the corner accessor the geometry engine consumes: given a
/// device, its observed (possibly tilted) corners come from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Imaging setup identifier (e.g. `"s1"`).
    pub setup: String,
    /// Device name (e.g. `"d4.2"`).
    pub name: String,
    /// Device corners in the unrotated source raster.
    pub corners: CornerSet,
    /// Within-tile cell annotations.
    pub pinout: Pinout,
    /// Arbitrary device metadata.
    pub attrs: Attrs,
}

impl Device {
    /// Create a device.
    #[must_use]
    pub fn new(
        setup: impl Into<String>,
        name: impl Into<String>,
        corners: CornerSet,
        pinout: Pinout,
    ) -> Self {
        let device = Self {
            setup: setup.into(),
            name: name.into(),
            corners,
            pinout,
            attrs: Attrs::new(),
        };
        tracing::debug!(setup = %device.setup, name = %device.name, "device created");
        device
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.setup, self.name)
    }
}

/// The two feature classes a stamper can locate in a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Printed protein button.
    Button,
    /// Assay chamber.
    Chamber,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button => f.write_str("button"),
            Self::Chamber => f.write_str("chamber"),
        }
    }
}

/// Which feature classes an operation should work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSelection {
    /// Buttons only.
    Button,
    /// Chambers only.
    Chamber,
    /// Both classes.
    All,
}

impl FeatureSelection {
    /// The concrete kinds this selection covers.
    #[must_use]
    pub const fn kinds(self) -> &'static [FeatureKind] {
        match self {
            Self::Button => &[FeatureKind::Button],
            Self::Chamber => &[FeatureKind::Chamber],
            Self::All => &[FeatureKind::Button, FeatureKind::Chamber],
        }
    }

    /// Whether this selection covers `kind`.
    #[must_use]
    pub fn covers(self, kind: FeatureKind) -> bool {
        self.kinds().contains(&kind)
    }
}

/// Pixel statistics sampled for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureMetrics {
    /// Mean intensity over the sampled region.
    pub mean: f64,
    /// Median intensity over the sampled region.
    pub median: f64,
    /// Number of pixels sampled.
    pub area_px: u32,
}

/// One located feature within a chip's tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature class.
    pub kind: FeatureKind,
    /// Cell index within the tile's chamber grid.
    pub index: (u32, u32),
    /// Library identifier from the pinout, if annotated.
    pub id: Option<String>,
    /// Feature center in rotated-raster coordinates.
    pub center: Point,
    /// Sampled statistics; `None` until quantified.
    pub metrics: Option<FeatureMetrics>,
}

/// Errors from chip processing and series bookkeeping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChipError {
    /// An operation needed features but the chip has none yet.
    #[error("chip {chip} has no features: find them or map from a reference first")]
    NotProcessed {
        /// The chip's display identity.
        chip: String,
    },

    /// A series operation needed at least one chip.
    #[error("series {description:?} holds no chips")]
    EmptySeries {
        /// The series description.
        description: String,
    },

    /// The external stamping collaborator failed.
    #[error("stamping failed on chip {chip}: {message}")]
    StamperFailure {
        /// The chip's display identity.
        chip: String,
        /// Collaborator-provided detail.
        message: String,
    },
}

/// External per-tile feature extraction.
///
/// Implementations own the pixel data (this crate never sees it) and are
/// handed chips whose tile corners bound the region to search. `find`
/// locates and quantifies features from scratch; `quantify` fills in
/// metrics for features whose positions were mapped from a reference chip.
pub trait Stamper {
    /// Locate features of `kind` within the chip's tile region.
    ///
    /// # Errors
    ///
    /// Returns [`ChipError::StamperFailure`] when the collaborator cannot
    /// process the tile.
    fn find(&self, chip: &Chip, kind: FeatureKind) -> Result<Vec<Feature>, ChipError>;

    /// Sample metrics for already-positioned features.
    ///
    /// # Errors
    ///
    /// Returns [`ChipError::StamperFailure`] when the collaborator cannot
    /// process the tile.
    fn quantify(&self, chip: &Chip, features: &mut [Feature]) -> Result<(), ChipError>;
}

/// One logical chip: a single sub-array tile plus imaging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    /// Imaging setup identifier, from the owning device.
    pub setup: String,
    /// Device name, from the owning device.
    pub device: String,
    /// Source raster this chip was imaged from.
    pub source: PathBuf,
    /// `(column, row)` position of this tile in the device grid.
    pub tile_index: (u32, u32),
    /// Tile corners in the rotated raster frame.
    pub corners: CornerSet,
    /// Within-tile cell annotations, from the owning device.
    pub pinout: Pinout,
    /// Imaging channel (e.g. `"egfp"`).
    pub channel: String,
    /// Exposure time in milliseconds.
    pub exposure_ms: u32,
    /// Arbitrary chip metadata.
    pub attrs: Attrs,
    features: Vec<Feature>,
}

impl Chip {
    /// Construct the chip for one grid cell of `device`.
    ///
    /// `corners` must be the tile corner set resolved for `tile_index`;
    /// the geometry engine's grid output is the intended source.
    #[must_use]
    pub fn new(
        device: &Device,
        source: PathBuf,
        tile_index: (u32, u32),
        corners: CornerSet,
        channel: impl Into<String>,
        exposure_ms: u32,
    ) -> Self {
        let chip = Self {
            setup: device.setup.clone(),
            device: device.name.clone(),
            source,
            tile_index,
            corners,
            pinout: device.pinout.clone(),
            channel: channel.into(),
            exposure_ms,
            attrs: Attrs::new(),
            features: Vec::new(),
        };
        tracing::debug!(
            chip = %chip,
            column = tile_index.0,
            row = tile_index.1,
            "chip created",
        );
        chip
    }

    /// Features located on this chip so far.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Whether any features have been found or mapped yet.
    #[must_use]
    pub const fn is_processed(&self) -> bool {
        !self.features.is_empty()
    }

    /// Run the stamper's finder for every kind in `selection` and keep
    /// the results, replacing any previously held features.
    ///
    /// # Errors
    ///
    /// Propagates [`ChipError::StamperFailure`] from the collaborator.
    pub fn find_features(
        &mut self,
        stamper: &dyn Stamper,
        selection: FeatureSelection,
    ) -> Result<(), ChipError> {
        let mut found = Vec::new();
        for &kind in selection.kinds() {
            found.extend(stamper.find(self, kind)?);
        }
        tracing::debug!(chip = %self, count = found.len(), "features found");
        self.features = found;
        Ok(())
    }

    /// Map feature positions from `reference` onto this chip and sample
    /// this chip's own metrics at those positions.
    ///
    /// The reference's feature metrics are discarded: positions carry
    /// over, intensities are re-measured here.
    ///
    /// # Errors
    ///
    /// Returns [`ChipError::NotProcessed`] if the reference has no
    /// features, or propagates [`ChipError::StamperFailure`].
    pub fn map_from(
        &mut self,
        reference: &Self,
        stamper: &dyn Stamper,
        selection: FeatureSelection,
    ) -> Result<(), ChipError> {
        if !reference.is_processed() {
            return Err(ChipError::NotProcessed {
                chip: reference.to_string(),
            });
        }

        let mut mapped: Vec<Feature> = reference
            .features
            .iter()
            .filter(|f| selection.covers(f.kind))
            .map(|f| Feature {
                metrics: None,
                ..f.clone()
            })
            .collect();
        stamper.quantify(self, &mut mapped)?;
        tracing::debug!(chip = %self, reference = %reference, count = mapped.len(), "features mapped");
        self.features = mapped;
        Ok(())
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}[{},{}]",
            self.setup, self.device, self.tile_index.0, self.tile_index.1,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A stamper that reports one chamber per pinout entry, centered on
    /// the tile, with fixed intensities.
    pub(crate) struct FixedStamper {
        pub mean: f64,
    }

    impl Stamper for FixedStamper {
        fn find(&self, chip: &Chip, kind: FeatureKind) -> Result<Vec<Feature>, ChipError> {
            let center = Point::new(
                (chip.corners.upper_left.x + chip.corners.lower_right.x) / 2.0,
                (chip.corners.upper_left.y + chip.corners.lower_right.y) / 2.0,
            );
            Ok(vec![Feature {
                kind,
                index: (0, 0),
                id: chip.pinout.id_at(0, 0).map(str::to_owned),
                center,
                metrics: Some(FeatureMetrics {
                    mean: self.mean,
                    median: self.mean,
                    area_px: 9,
                }),
            }])
        }

        fn quantify(&self, _chip: &Chip, features: &mut [Feature]) -> Result<(), ChipError> {
            for feature in features {
                feature.metrics = Some(FeatureMetrics {
                    mean: self.mean,
                    median: self.mean,
                    area_px: 9,
                });
            }
            Ok(())
        }
    }

    pub(crate) fn test_device() -> Device {
        let corners = CornerSet::new(
            Point::new(0.0, 0.0),
            Point::new(1000.0, 0.0),
            Point::new(0.0, 600.0),
            Point::new(1000.0, 600.0),
        );
        let mut pinout = Pinout::new();
        pinout.insert(0, 0, "MBP-WT");
        Device::new("s1", "d1", corners, pinout)
    }

    pub(crate) fn test_chip(device: &Device) -> Chip {
        Chip::new(
            device,
            PathBuf::from("imgs/StitchedImg_500_egfp_4.tif"),
            (0, 0),
            device.corners,
            "egfp",
            500,
        )
    }

    #[test]
    fn chip_inherits_device_identity() {
        let device = test_device();
        let chip = test_chip(&device);
        assert_eq!(chip.setup, "s1");
        assert_eq!(chip.device, "d1");
        assert_eq!(chip.to_string(), "s1/d1[0,0]");
        assert!(!chip.is_processed());
    }

    #[test]
    fn find_features_populates_the_chip() {
        let device = test_device();
        let mut chip = test_chip(&device);
        chip.find_features(&FixedStamper { mean: 120.0 }, FeatureSelection::Chamber)
            .unwrap();
        assert_eq!(chip.features().len(), 1);
        assert_eq!(chip.features()[0].kind, FeatureKind::Chamber);
        assert_eq!(chip.features()[0].id.as_deref(), Some("MBP-WT"));
        assert!(chip.is_processed());
    }

    #[test]
    fn find_all_covers_both_kinds() {
        let device = test_device();
        let mut chip = test_chip(&device);
        chip.find_features(&FixedStamper { mean: 50.0 }, FeatureSelection::All)
            .unwrap();
        let kinds: Vec<FeatureKind> = chip.features().iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FeatureKind::Button, FeatureKind::Chamber]);
    }

    #[test]
    fn map_from_carries_positions_and_resamples_metrics() {
        let device = test_device();
        let mut reference = test_chip(&device);
        reference
            .find_features(&FixedStamper { mean: 200.0 }, FeatureSelection::Chamber)
            .unwrap();

        let mut target = test_chip(&device);
        target
            .map_from(&reference, &FixedStamper { mean: 35.0 }, FeatureSelection::Chamber)
            .unwrap();

        assert_eq!(target.features().len(), 1);
        assert_eq!(target.features()[0].center, reference.features()[0].center);
        let metrics = target.features()[0].metrics.unwrap();
        assert!((metrics.mean - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn map_from_unprocessed_reference_fails() {
        let device = test_device();
        let reference = test_chip(&device);
        let mut target = test_chip(&device);
        let err = target
            .map_from(&reference, &FixedStamper { mean: 1.0 }, FeatureSelection::All)
            .unwrap_err();
        assert!(matches!(err, ChipError::NotProcessed { .. }));
    }

    #[test]
    fn selection_covers() {
        assert!(FeatureSelection::All.covers(FeatureKind::Button));
        assert!(FeatureSelection::Chamber.covers(FeatureKind::Chamber));
        assert!(!FeatureSelection::Chamber.covers(FeatureKind::Button));
    }

    #[test]
    fn pinout_lookup() {
        let pinout = Pinout::from_entries([((2, 3), "HIS3".to_owned())]);
        assert_eq!(pinout.id_at(2, 3), Some("HIS3"));
        assert_eq!(pinout.id_at(0, 0), None);
        assert_eq!(pinout.len(), 1);
    }

    #[test]
    fn chip_serde_round_trip() {
        let device = test_device();
        let mut chip = test_chip(&device);
        chip.find_features(&FixedStamper { mean: 5.0 }, FeatureSelection::Chamber)
            .unwrap();

        let json = serde_json::to_string(&chip).unwrap();
        let deserialized: Chip = serde_json::from_str(&json).unwrap();
        assert_eq!(chip, deserialized);
    }
}

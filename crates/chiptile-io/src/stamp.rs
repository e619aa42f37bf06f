//! Built-in intensity stamper.
//!
//! A minimal [`Stamper`] that samples raw pixel statistics: `find`
//! reports one feature spanning the whole tile region, `quantify`
//! samples a fixed window around each mapped feature center. The
//! production button/chamber finder is a separate collaborator; this one
//! exists so pipelines, tests, and the CLI have a working end-to-end
//! flow without it.

use chiptile_collections::{Chip, ChipError, Feature, FeatureKind, FeatureMetrics, Stamper};
use chiptile_geometry::{CornerSet, Point};

use crate::raster::Raster;

/// Half-width of the square sampling window used by `quantify`, in
/// pixels.
pub const SAMPLE_RADIUS: u32 = 12;

/// Samples tile pixel statistics from a rotated raster.
pub struct IntensityStamper<'a> {
    raster: &'a Raster,
}

impl<'a> IntensityStamper<'a> {
    /// Stamper reading from `raster` (the rotated frame chips refer to).
    #[must_use]
    pub const fn new(raster: &'a Raster) -> Self {
        Self { raster }
    }

    /// Clamped pixel statistics over `[x0, x1) x [y0, y1)`.
    fn region_metrics(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> Option<FeatureMetrics> {
        let width = i64::from(self.raster.width());
        let height = i64::from(self.raster.height());
        let x0 = x0.clamp(0, width);
        let x1 = x1.clamp(0, width);
        let y0 = y0.clamp(0, height);
        let y1 = y1.clamp(0, height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut values: Vec<u16> = Vec::with_capacity(((x1 - x0) * (y1 - y0)) as usize);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        for y in y0..y1 {
            for x in x0..x1 {
                values.push(self.raster.get_pixel(x as u32, y as u32).0[0]);
            }
        }
        values.sort_unstable();

        let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum as f64 / values.len() as f64;
        let median = f64::from(values[values.len() / 2]);
        #[allow(clippy::cast_possible_truncation)]
        let area_px = values.len() as u32;
        Some(FeatureMetrics {
            mean,
            median,
            area_px,
        })
    }
}

/// Axis-aligned bounds of a tile corner set.
pub(crate) fn tile_bounds(corners: &CornerSet) -> (i64, i64, i64, i64) {
    let xs = [
        corners.upper_left.x,
        corners.upper_right.x,
        corners.lower_left.x,
        corners.lower_right.x,
    ];
    let ys = [
        corners.upper_left.y,
        corners.upper_right.y,
        corners.lower_left.y,
        corners.lower_right.y,
    ];
    #[allow(clippy::cast_possible_truncation)]
    (
        xs.iter().copied().fold(f64::INFINITY, f64::min) as i64,
        ys.iter().copied().fold(f64::INFINITY, f64::min) as i64,
        xs.iter().copied().fold(f64::NEG_INFINITY, f64::max) as i64,
        ys.iter().copied().fold(f64::NEG_INFINITY, f64::max) as i64,
    )
}

impl Stamper for IntensityStamper<'_> {
    fn find(&self, chip: &Chip, kind: FeatureKind) -> Result<Vec<Feature>, ChipError> {
        let (x0, y0, x1, y1) = tile_bounds(&chip.corners);
        let metrics = self
            .region_metrics(x0, y0, x1, y1)
            .ok_or_else(|| ChipError::StamperFailure {
                chip: chip.to_string(),
                message: format!("tile region [{x0},{y0})-[{x1},{y1}) is outside the raster"),
            })?;

        #[allow(clippy::cast_precision_loss)]
        let center = Point::new((x0 + x1) as f64 / 2.0, (y0 + y1) as f64 / 2.0);
        Ok(vec![Feature {
            kind,
            index: (0, 0),
            id: chip.pinout.id_at(0, 0).map(str::to_owned),
            center,
            metrics: Some(metrics),
        }])
    }

    fn quantify(&self, chip: &Chip, features: &mut [Feature]) -> Result<(), ChipError> {
        let radius = i64::from(SAMPLE_RADIUS);
        for feature in features {
            #[allow(clippy::cast_possible_truncation)]
            let (cx, cy) = (feature.center.x as i64, feature.center.y as i64);
            let metrics = self
                .region_metrics(cx - radius, cy - radius, cx + radius + 1, cy + radius + 1)
                .ok_or_else(|| ChipError::StamperFailure {
                    chip: chip.to_string(),
                    message: format!("feature center ({cx}, {cy}) is outside the raster"),
                })?;
            feature.metrics = Some(metrics);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chiptile_collections::{Device, FeatureSelection, Pinout};
    use chiptile_geometry::CornerSet;
    use image::Luma;

    fn flat_raster(width: u32, height: u32, value: u16) -> Raster {
        Raster::from_pixel(width, height, Luma([value]))
    }

    fn tile_chip(corners: CornerSet) -> Chip {
        let device = Device::new("s1", "d1", corners, Pinout::new());
        Chip::new(
            &device,
            PathBuf::from("StitchedImg_1.tif"),
            (0, 0),
            corners,
            "egfp",
            500,
        )
    }

    fn square_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> CornerSet {
        CornerSet::new(
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
        )
    }

    #[test]
    fn find_samples_the_tile_region() {
        let raster = flat_raster(100, 80, 1_000);
        let stamper = IntensityStamper::new(&raster);
        let mut chip = tile_chip(square_corners(10.0, 10.0, 50.0, 40.0));

        chip.find_features(&stamper, FeatureSelection::Chamber).unwrap();
        let feature = &chip.features()[0];
        let metrics = feature.metrics.unwrap();
        assert!((metrics.mean - 1000.0).abs() < f64::EPSILON);
        assert!((metrics.median - 1000.0).abs() < f64::EPSILON);
        assert_eq!(metrics.area_px, 40 * 30);
        assert_eq!(feature.center, Point::new(30.0, 25.0));
    }

    #[test]
    fn find_clamps_to_the_raster() {
        let raster = flat_raster(30, 30, 5);
        let stamper = IntensityStamper::new(&raster);
        let mut chip = tile_chip(square_corners(20.0, 20.0, 60.0, 60.0));

        chip.find_features(&stamper, FeatureSelection::Chamber).unwrap();
        let metrics = chip.features()[0].metrics.unwrap();
        assert_eq!(metrics.area_px, 10 * 10);
    }

    #[test]
    fn find_fails_outside_the_raster() {
        let raster = flat_raster(30, 30, 5);
        let stamper = IntensityStamper::new(&raster);
        let mut chip = tile_chip(square_corners(100.0, 100.0, 150.0, 150.0));

        let err = chip
            .find_features(&stamper, FeatureSelection::Chamber)
            .unwrap_err();
        assert!(matches!(err, ChipError::StamperFailure { .. }));
    }

    #[test]
    fn quantify_samples_a_window_around_each_center() {
        // Bright disc of radius > SAMPLE_RADIUS at (50, 50) on black.
        let mut raster = flat_raster(100, 100, 0);
        for y in 30..70 {
            for x in 30..70 {
                raster.put_pixel(x, y, Luma([10_000]));
            }
        }
        let stamper = IntensityStamper::new(&raster);
        let chip = tile_chip(square_corners(0.0, 0.0, 99.0, 99.0));

        let mut features = vec![Feature {
            kind: FeatureKind::Button,
            index: (0, 0),
            id: None,
            center: Point::new(50.0, 50.0),
            metrics: None,
        }];
        stamper.quantify(&chip, &mut features).unwrap();
        let metrics = features[0].metrics.unwrap();
        assert!((metrics.mean - 10_000.0).abs() < f64::EPSILON);
        let window = 2 * SAMPLE_RADIUS + 1;
        assert_eq!(metrics.area_px, window * window);
    }
}

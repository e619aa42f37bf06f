//! Summary artifact writers: CSV tables and per-chip summary images.

use std::path::{Path, PathBuf};

use chiptile_collections::{Chip, SummaryTable};

use crate::raster::{Raster, RasterError, write_raster};
use crate::stamp::tile_bounds;

/// Folder name wrapping per-chip summary images.
pub const SUMMARY_IMAGE_DIR: &str = "SummaryImages";

/// Write a summary table as `<file_stem>.csv` under `target_dir`.
///
/// Returns the written path.
///
/// # Errors
///
/// Returns [`RasterError::Io`] if the directory cannot be created or the
/// file cannot be written.
pub fn save_summary(
    table: &SummaryTable,
    target_dir: &Path,
    file_stem: &str,
) -> Result<PathBuf, RasterError> {
    std::fs::create_dir_all(target_dir).map_err(|source| RasterError::Io {
        path: target_dir.to_path_buf(),
        source,
    })?;
    let path = target_dir.join(format!("{file_stem}.csv"));
    let csv = chiptile_export::to_csv(table);
    std::fs::write(&path, csv).map_err(|source| RasterError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), rows = table.len(), "summary saved");
    Ok(path)
}

/// Crop each chip's tile region out of `raster` and write it under
/// `<target_root>/SummaryImages/` as
/// `Summary_<source stem>_<column>_<row>.tif`.
///
/// Returns the written paths, one per chip.
///
/// # Errors
///
/// Returns [`RasterError::Io`] for directory/creation failures and
/// [`RasterError::Encode`] for image writes.
pub fn save_summary_images<'a>(
    raster: &Raster,
    chips: impl IntoIterator<Item = &'a Chip>,
    target_root: &Path,
) -> Result<Vec<PathBuf>, RasterError> {
    let target = target_root.join(SUMMARY_IMAGE_DIR);
    std::fs::create_dir_all(&target).map_err(|source| RasterError::Io {
        path: target.clone(),
        source,
    })?;

    let mut written = Vec::new();
    for chip in chips {
        let (x0, y0, x1, y1) = tile_bounds(&chip.corners);
        let x0 = x0.clamp(0, i64::from(raster.width()));
        let y0 = y0.clamp(0, i64::from(raster.height()));
        let x1 = x1.clamp(0, i64::from(raster.width()));
        let y1 = y1.clamp(0, i64::from(raster.height()));
        if x0 >= x1 || y0 >= y1 {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stamp = image::imageops::crop_imm(
            raster,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image();

        let source_stem = chip
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("chip");
        let name = format!(
            "Summary_{source_stem}_{}_{}.tif",
            chip.tile_index.0, chip.tile_index.1,
        );
        let path = target.join(name);
        write_raster(&stamp, &path)?;
        written.push(path);
    }
    tracing::debug!(
        target = %target.display(),
        count = written.len(),
        "summary images saved",
    );
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chiptile_collections::{Device, Pinout, SummaryTable};
    use chiptile_geometry::{CornerSet, Point};
    use image::Luma;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chiptile-summary-{tag}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn summary_csv_lands_at_the_expected_path() {
        let dir = temp_dir("csv");
        let path = save_summary(&SummaryTable::new(Vec::new()), &dir, "d1_kinetics_ChipSeries")
            .unwrap();
        assert_eq!(path, dir.join("d1_kinetics_ChipSeries.csv"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("setup,device,"));
    }

    #[test]
    fn summary_images_crop_each_tile() {
        let dir = temp_dir("images");
        let raster = Raster::from_pixel(100, 60, Luma([777]));

        let corners = CornerSet::new(
            Point::new(10.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(10.0, 50.0),
            Point::new(40.0, 50.0),
        );
        let device = Device::new("s1", "d1", corners, Pinout::new());
        let chip = Chip::new(
            &device,
            PathBuf::from("StitchedImg_500_egfp_2.tif"),
            (0, 0),
            corners,
            "egfp",
            500,
        );

        let written = save_summary_images(&raster, [&chip], &dir).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("SummaryImages/Summary_StitchedImg_500_egfp_2_0_0.tif"));

        let (stamp, extent) = crate::raster::read_raster(&written[0]).unwrap();
        assert_eq!((extent.width, extent.height), (30, 40));
        assert_eq!(stamp.get_pixel(0, 0).0[0], 777);
    }
}

//! Stitched-image series discovery.
//!
//! An imaging run drops one stitched raster per series point into a
//! directory, named `..._<index>.tif` with a recognizable stem marker.
//! Discovery scans the directory, filters out derived artifacts
//! (chamber-border overlays, summary images), and keys each raster by
//! its trailing index.
//!
//! Indexes are integers when every filename carries one; otherwise all
//! indexes are coerced to floats, so mixed runs stay consistently keyed.

use std::path::{Path, PathBuf};

use chiptile_collections::{Chip, ChipSeries, Device, SeriesKey};
use chiptile_geometry::CornerSet;

use crate::raster::RasterError;

/// Stem substring identifying stitched rasters.
pub const STITCHED_MARKER: &str = "StitchedImg";

/// Stem substrings identifying derived artifacts to skip.
const EXCLUDED_MARKERS: [&str; 2] = ["ChamberBorders", "Summary"];

/// Errors from series discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Directory listing failed.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// A matching filename has no parseable trailing index.
    #[error("no numeric index in raster filename {path}")]
    InvalidIndex {
        /// Offending file.
        path: PathBuf,
    },
}

/// Scan `root` for stitched rasters and key them by trailing index.
///
/// Files match when their stem contains `marker` (or
/// [`STITCHED_MARKER`] when `None`), their extension is `tif`/`tiff`,
/// and their stem names no derived artifact. The returned pairs are
/// sorted by key.
///
/// # Errors
///
/// Returns [`DiscoverError::InvalidIndex`] when a matching file has no
/// numeric trailing index, or a wrapped [`RasterError::Io`] when the
/// directory cannot be read.
pub fn discover_series(
    root: &Path,
    marker: Option<&str>,
) -> Result<Vec<(SeriesKey, PathBuf)>, DiscoverError> {
    let marker = marker.unwrap_or(STITCHED_MARKER);

    let mut matches: Vec<PathBuf> = Vec::new();
    let entries = std::fs::read_dir(root).map_err(|source| RasterError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| RasterError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if is_stitched_raster(&path, marker) {
            matches.push(path);
        }
    }

    let mut keyed = key_by_trailing_index(&matches)?;
    keyed.sort_by_key(|(key, _)| *key);
    tracing::debug!(
        root = %root.display(),
        count = keyed.len(),
        "stitched series discovered",
    );
    Ok(keyed)
}

/// Discover stitched rasters under `root` and add one chip per raster to
/// `series`, all tracking the same device tile.
///
/// Mirrors loading an indexed imaging run from a directory: every
/// discovered raster becomes the chip for its series point, keyed by the
/// filename index.
///
/// # Errors
///
/// Propagates [`DiscoverError`] from discovery.
#[allow(clippy::too_many_arguments)]
pub fn load_series(
    series: &mut ChipSeries,
    device: &Device,
    tile_index: (u32, u32),
    corners: CornerSet,
    channel: &str,
    exposure_ms: u32,
    root: &Path,
    marker: Option<&str>,
) -> Result<(), DiscoverError> {
    for (key, path) in discover_series(root, marker)? {
        let chip = Chip::new(device, path, tile_index, corners, channel, exposure_ms);
        series.add_chip(key, chip);
    }
    tracing::debug!(root = %root.display(), chips = series.len(), "series loaded");
    Ok(())
}

/// Whether `path` looks like a stitched raster of interest.
fn is_stitched_raster(path: &Path, marker: &str) -> bool {
    let extension_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"));
    if !extension_ok {
        return false;
    }
    path.file_stem().and_then(|s| s.to_str()).is_some_and(|stem| {
        stem.contains(marker) && !EXCLUDED_MARKERS.iter().any(|ex| stem.contains(ex))
    })
}

/// Key every path by the numeric token after its last underscore.
///
/// Integer indexes are preferred; if any file's index is not an integer,
/// every index is re-read as a float so the whole series shares one key
/// domain.
fn key_by_trailing_index(paths: &[PathBuf]) -> Result<Vec<(SeriesKey, PathBuf)>, DiscoverError> {
    let all_integers = paths
        .iter()
        .all(|path| trailing_token(path).is_some_and(|t| t.parse::<i64>().is_ok()));
    if !all_integers {
        tracing::info!("coerced image indexes to floats");
    }

    paths
        .iter()
        .map(|path| {
            let key = trailing_token(path)
                .and_then(|token| token.parse::<f64>().ok())
                .ok_or_else(|| DiscoverError::InvalidIndex { path: path.clone() })?;
            Ok((SeriesKey(key), path.clone()))
        })
        .collect()
}

/// The token after the last underscore of the file stem.
fn trailing_token(path: &Path) -> Option<&str> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('_').next()
}

//! chiptile-io: Raster and filesystem collaborators for chiptile.
//!
//! Everything here touches pixels or the filesystem, which the
//! computation crates never do: decoding stitched rasters, rotating them
//! with resize, discovering indexed imaging runs, sampling tile
//! intensities, and writing summary artifacts.

pub mod discover;
pub mod raster;
pub mod rotate;
pub mod stamp;
pub mod summary_files;

pub use discover::{DiscoverError, STITCHED_MARKER, discover_series, load_series};
pub use raster::{Raster, RasterError, extent_of, read_raster, write_raster};
pub use rotate::{rotate_raster, rotated_extent};
pub use stamp::{IntensityStamper, SAMPLE_RADIUS};
pub use summary_files::{SUMMARY_IMAGE_DIR, save_summary, save_summary_images};

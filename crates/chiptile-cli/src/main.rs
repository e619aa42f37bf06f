//! Tile a stitched chip raster into its sub-array grid, stamp every
//! tile, and export the per-tile intensity summary.

use std::path::PathBuf;

use clap::Parser;

use chiptile_collections::{Chip, Device, FeatureSelection, Pinout, SummaryTable};
use chiptile_geometry::{
    CornerSet, DEFAULT_TILE_SPACING, Point, TilingConfig, align_and_tile, rotation_angle,
};
use chiptile_io::{
    IntensityStamper, read_raster, rotate_raster, save_summary, save_summary_images, write_raster,
};

mod logging;

/// Tile a stitched chip raster into its sub-array grid, stamp every
/// tile with the built-in intensity stamper, and export summaries.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input stitched raster (16-bit TIFF; PNG also accepted).
    input: PathBuf,

    /// Device corners in unrotated raster pixels, as
    /// "x,y;x,y;x,y;x,y" ordered upper-left, upper-right, lower-left,
    /// lower-right.
    #[arg(long, value_name = "CORNERS")]
    corners: String,

    /// Sub-array grid columns.
    #[arg(long)]
    columns: u32,

    /// Sub-array grid rows.
    #[arg(long)]
    rows: u32,

    /// Inter-tile spacing in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SPACING)]
    spacing: f64,

    /// Imaging channel label carried into the summary.
    #[arg(long, default_value = "egfp")]
    channel: String,

    /// Exposure time in milliseconds.
    #[arg(long, default_value_t = 500)]
    exposure: u32,

    /// Imaging setup identifier.
    #[arg(long, default_value = "s1")]
    setup: String,

    /// Device name used in output filenames.
    #[arg(long, default_value = "d1")]
    device: String,

    /// Output directory for summaries.
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the rotated raster next to the summaries.
    #[arg(long)]
    save_rotated: bool,

    /// Also write per-tile summary images.
    #[arg(long)]
    save_images: bool,
}

/// Parse `--corners "x,y;x,y;x,y;x,y"` into a corner set.
fn parse_corners(s: &str) -> Result<CornerSet, String> {
    let points: Vec<Point> = s
        .split(';')
        .map(parse_point)
        .collect::<Result<_, String>>()?;
    match points.as_slice() {
        &[upper_left, upper_right, lower_left, lower_right] => Ok(CornerSet::new(
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        )),
        other => Err(format!("expected 4 corners, got {}", other.len())),
    }
}

/// Parse one `"x,y"` pair.
fn parse_point(s: &str) -> Result<Point, String> {
    let (x_str, y_str) = s
        .split_once(',')
        .ok_or_else(|| format!("corner must be 'x,y', got: '{s}'"))?;
    let x: f64 = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid corner x '{x_str}': {e}"))?;
    let y: f64 = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid corner y '{y_str}': {e}"))?;
    Ok(Point::new(x, y))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    let corners = parse_corners(&args.corners).map_err(|e| format!("--corners: {e}"))?;
    let config = TilingConfig::with_spacing(args.columns, args.rows, args.spacing);

    let (raster, extent) = read_raster(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        width = extent.width,
        height = extent.height,
        "raster loaded",
    );

    let angle = rotation_angle(corners.upper_left, corners.upper_right)?;
    let (rotated, rotated_extent) = rotate_raster(&raster, angle)?;
    tracing::info!(angle_degrees = angle, "raster rotated");

    let grid = align_and_tile(extent, rotated_extent, &corners, &config)?;
    tracing::info!(tiles = grid.len(), "device tiled");

    let device = Device::new(&args.setup, &args.device, corners, Pinout::new());
    let stamper = IntensityStamper::new(&rotated);
    let mut chips = Vec::with_capacity(grid.len());
    for (column, row, tile_corners) in grid.indexed() {
        let mut chip = Chip::new(
            &device,
            args.input.clone(),
            (column, row),
            *tile_corners,
            &args.channel,
            args.exposure,
        );
        chip.find_features(&stamper, FeatureSelection::Chamber)?;
        chips.push(chip);
    }

    let table = SummaryTable::new(chips.iter().flat_map(Chip::summarize).collect());
    let stem = format!("{}_{}_TileQuant", args.device, args.channel);
    let summary_path = save_summary(&table, &args.output, &stem)?;
    tracing::info!(path = %summary_path.display(), rows = table.len(), "summary written");

    if args.save_rotated {
        let rotated_path = args.output.join(format!("{stem}_rotated.tif"));
        write_raster(&rotated, &rotated_path)?;
        tracing::info!(path = %rotated_path.display(), "rotated raster written");
    }

    if args.save_images {
        let written = save_summary_images(&rotated, &chips, &args.output)?;
        tracing::info!(count = written.len(), "summary images written");
    }

    Ok(())
}

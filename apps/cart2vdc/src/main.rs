//! Forward-project a geographic bounding box into the meters-based extents a
//! VDC grid stores (spec §9B "standalone projection utility"). Unlike the
//! `*2vdc` converters this reads no data file at all; it exists so a
//! metadata-authoring step can resolve `Extents` without opening a full
//! `DcReader`.

use std::process::ExitCode;

use clap::Parser;

use vdc_common::{VdcError, VdcResult};
use vdc_metadata::cartographic_extents;

#[derive(Parser, Debug)]
#[command(name = "cart2vdc", about = "Forward-project a lon/lat bounding box to meters")]
struct Args {
    /// PROJ.4-style projection string; empty selects the idealized degree scale.
    #[arg(long, default_value = "")]
    proj: String,

    #[arg(long = "lon-min", allow_hyphen_values = true)]
    lon_min: f64,
    #[arg(long = "lon-max", allow_hyphen_values = true)]
    lon_max: f64,
    #[arg(long = "lat-min", allow_hyphen_values = true)]
    lat_min: f64,
    #[arg(long = "lat-max", allow_hyphen_values = true)]
    lat_max: f64,

    /// Operate quietly: print only the four extents values.
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet { "error" } else { "info" })
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.cli_line("cart2vdc"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> VdcResult<()> {
    if args.lon_min > args.lon_max || args.lat_min > args.lat_max {
        return Err(VdcError::invalid_region("min bound exceeds max bound"));
    }
    let (min_x, min_y, max_x, max_y) = cartographic_extents(
        &args.proj,
        (args.lon_min, args.lon_max),
        (args.lat_min, args.lat_max),
    )?;
    println!("{min_x} {min_y} {max_x} {max_y}");
    Ok(())
}

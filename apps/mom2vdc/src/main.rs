//! Convert one variable from a MOM curvilinear-grid NetCDF history file into
//! a VDC region archive (spec §6). See `wrf2vdc` for the shared CLI shape.

use std::process::ExitCode;

use clap::Parser;

use vdc_common::{default_max_level, Coord3, ConverterConfig, VdcError, VdcResult, WaveletKernel, DEFAULT_BLOCK_DIM};
use vdc_readers::{DcReader, GeoCoordNames, MomRomsReader};
use vdc_region::{GridGeometry, RegionWriter};

#[derive(Parser, Debug)]
#[command(name = "mom2vdc", about = "Convert a MOM NetCDF history file into a VDC region archive")]
struct Args {
    #[command(flatten)]
    common: ConverterConfig,

    #[arg(long = "map-proj", default_value = "")]
    map_proj: String,

    /// Name of the 2D latitude coordinate variable on the grid file.
    #[arg(long = "lat-var", default_value = "geolat_t")]
    lat_var: String,

    /// Name of the 2D longitude coordinate variable on the grid file.
    #[arg(long = "lon-var", default_value = "geolon_t")]
    lon_var: String,

    /// Name of the bottom-topography variable the derived `DEPTH` variable
    /// comes from (`ht`, or `HT` for POP data stored in centimeters). Omit
    /// to leave `DEPTH` unavailable.
    #[arg(long = "depth-var")]
    depth_var: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt().with_env_filter(args.common.log_filter()).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.cli_line("mom2vdc"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> VdcResult<()> {
    let config = &args.common;
    let geo = GeoCoordNames { lat_var: args.lat_var.clone(), lon_var: args.lon_var.clone(), depth_var: args.depth_var.clone() };
    let reader = MomRomsReader::open(config.source_files.clone(), args.map_proj.clone(), geo)?;

    if config.ts >= reader.num_time_steps() {
        return Err(VdcError::invalid_region(format!(
            "time step {} out of range (0..{})",
            config.ts,
            reader.num_time_steps()
        )));
    }

    let (nx, ny, _) = reader.grid_dim();
    let mut handle = reader.open_variable_read(config.ts, &config.varname)?;
    let slice_len = handle.slice_len();
    let data = handle.read_all();
    let nz = data.len() / slice_len.max(1);
    let native_dims = Coord3::new(nx, ny, nz);

    let block_dims = Coord3::new(
        DEFAULT_BLOCK_DIM.min(nx.max(1)),
        DEFAULT_BLOCK_DIM.min(ny.max(1)),
        DEFAULT_BLOCK_DIM.min(nz.max(1)),
    );
    let max_level = default_max_level(native_dims, block_dims);
    let geometry = GridGeometry::new(native_dims, block_dims, max_level);

    let out_path = config.vdf_file.with_extension(format!("{}.ts{}.vdc", config.varname, config.ts));
    let writer = RegionWriter::create(&out_path, geometry, WaveletKernel::Lifting53Symh)?;
    let range = writer.write_volume(&data)?;

    if !config.quiet {
        tracing::info!(path = %out_path.display(), dims = ?native_dims, max_level, min = range.min, max = range.max, "wrote region archive");
    }
    Ok(())
}

//! Convert a raw flat-binary volume into a VDC region archive (spec §6,
//! §9A). Unlike the NetCDF/GRIB converters, a raw file carries no
//! self-describing header, so dimensions and datatype arrive on the command
//! line rather than being read off the source file (matching
//! `original_source/apps/raw2vdf/raw2vdf.cpp`'s `-dim`/`-samples`/
//! `-swapbytes` options).

use std::process::ExitCode;

use clap::Parser;

use vdc_common::{default_max_level, Coord3, ConverterConfig, VdcError, VdcResult, WaveletKernel, DEFAULT_BLOCK_DIM};
use vdc_readers::{DcReader, RawDatatype, RawReader, RawReaderConfig};
use vdc_region::{GridGeometry, RegionWriter};

#[derive(Parser, Debug)]
#[command(name = "raw2vdc", about = "Convert a raw flat-binary volume into a VDC region archive")]
struct Args {
    #[command(flatten)]
    common: ConverterConfig,

    /// X dimension of the raw volume.
    #[arg(long)]
    nx: usize,
    /// Y dimension of the raw volume.
    #[arg(long)]
    ny: usize,
    /// Z dimension of the raw volume.
    #[arg(long)]
    nz: usize,

    /// Element datatype of the raw file.
    #[arg(long, value_enum, default_value = "f32")]
    dtype: Dtype,

    /// Byte-swap each element after reading (source file is foreign-endian).
    #[arg(long)]
    swap_bytes: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Dtype {
    F32,
    F64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt().with_env_filter(args.common.log_filter()).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.cli_line("raw2vdc"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> VdcResult<()> {
    let config = &args.common;
    let datatype = match args.dtype {
        Dtype::F32 => RawDatatype::F32,
        Dtype::F64 => RawDatatype::F64,
    };
    let native_dims = Coord3::new(args.nx, args.ny, args.nz);
    let reader = RawReader::open(
        config.source_files.clone(),
        RawReaderConfig {
            varname: config.varname.clone(),
            dims: (args.nx, args.ny, args.nz),
            datatype,
            swap_bytes: args.swap_bytes,
        },
    );

    if config.ts >= reader.num_time_steps() {
        return Err(VdcError::invalid_region(format!(
            "time step {} out of range (0..{})",
            config.ts,
            reader.num_time_steps()
        )));
    }

    let mut handle = reader.open_variable_read(config.ts, &config.varname)?;
    let data = handle.read_all();

    let block_dims = Coord3::new(
        DEFAULT_BLOCK_DIM.min(args.nx.max(1)),
        DEFAULT_BLOCK_DIM.min(args.ny.max(1)),
        DEFAULT_BLOCK_DIM.min(args.nz.max(1)),
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

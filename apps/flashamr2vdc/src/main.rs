//! Import a FLASH/Paramesh block table and one field variable into a VDC
//! AMR archive (spec §9B).
//!
//! Real FLASH checkpoints are HDF5 (`gid`, `bounding box`, `refine level`
//! datasets plus one dataset per field, as read by
//! `original_source/lib/vdf/flashhdf5.cpp`); no `hdf5` crate is pinned in
//! this workspace (see `vdc-readers::flash`'s module doc comment), so this
//! importer instead reads a NetCDF file carrying the same three block-table
//! arrays under the names `gid`/`bound_box`/`refine_level` plus the
//! requested field variable shaped `(nblocks, nzb, nyb, nxb)` — a stand-in
//! source format, not a byte-for-byte reimplementation of FLASH's vendor
//! HDF5 layout.

use std::process::ExitCode;

use clap::Parser;

use vdc_amr::{write_archive, AmrData, CellPayloadDims};
use vdc_common::{VdcError, VdcResult};
use vdc_readers::flash::OwnedParameshBlockTable;

#[derive(Parser, Debug)]
#[command(name = "flashamr2vdc", about = "Import a FLASH/Paramesh block table into a VDC AMR archive")]
struct Args {
    /// Destination AMR archive path.
    vdf_file: std::path::PathBuf,
    /// NetCDF file carrying the block table and field variable.
    source_file: std::path::PathBuf,

    #[arg(long = "varname", default_value = "dens")]
    varname: String,

    /// Per-block cell count on each axis (FLASH's `NXB`/`NYB`/`NZB`).
    #[arg(long, default_value_t = 8)]
    nxb: usize,
    #[arg(long, default_value_t = 8)]
    nyb: usize,
    #[arg(long, default_value_t = 8)]
    nzb: usize,

    #[arg(long)]
    quiet: bool,
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter = if args.debug { "debug" } else if args.quiet { "error" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.cli_line("flashamr2vdc"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> VdcResult<()> {
    let file = netcdf::open(&args.source_file)
        .map_err(|e| VdcError::io(format!("opening {}: {e}", args.source_file.display())))?;

    let gid = required_i32(&file, "gid")?;
    let refine_level = required_i32(&file, "refine_level")?;
    let nblocks = gid.len();
    let bound_box_var = required_var(&file, "bound_box")?;
    let bound_box_flat = bound_box_var
        .values::<f64>(None, None)
        .map_err(|e| VdcError::format(format!("reading bound_box: {e}")))?
        .into_raw_vec();
    if bound_box_flat.len() != nblocks * 6 {
        return Err(VdcError::format(format!(
            "bound_box has {} values, expected {} for {nblocks} blocks",
            bound_box_flat.len(),
            nblocks * 6
        )));
    }
    let bbox: Vec<[f64; 6]> = bound_box_flat.chunks_exact(6).map(|c| c.try_into().unwrap()).collect();

    let table = OwnedParameshBlockTable::new(gid, bbox.clone(), refine_level);
    let tree = table.import();

    let field_var = required_var(&file, &args.varname)?;
    let field_flat = field_var
        .values::<f32>(None, None)
        .map_err(|e| VdcError::format(format!("reading {}: {e}", args.varname)))?
        .into_raw_vec();
    let block_len = args.nxb * args.nyb * args.nzb;
    if field_flat.len() != nblocks * block_len {
        return Err(VdcError::format(format!(
            "{} has {} values, expected {} for {nblocks} blocks of {}x{}x{}",
            args.varname,
            field_flat.len(),
            nblocks * block_len,
            args.nxb,
            args.nyb,
            args.nzb
        )));
    }

    let payload_dims = CellPayloadDims::new(args.nxb, args.nyb, args.nzb);
    let mut data = AmrData::zeros(&tree, payload_dims);
    for i in 0..nblocks {
        let b = bbox[i];
        let center = [(b[0] + b[1]) / 2.0, (b[2] + b[3]) / 2.0, (b[4] + b[5]) / 2.0];
        let Some(leaf) = tree.find_leaf(center) else {
            tracing::warn!(block = i, "no tree leaf at this block's center, skipping");
            continue;
        };
        let payload = &field_flat[i * block_len..(i + 1) * block_len];
        data.set_cell_payload(&tree, leaf.id, payload)?;
    }

    write_archive(&args.vdf_file, &tree, &data)?;
    if !args.quiet {
        tracing::info!(path = %args.vdf_file.display(), nblocks, "wrote AMR archive");
    }
    Ok(())
}

fn required_var<'f>(file: &'f netcdf::File, name: &str) -> VdcResult<netcdf::Variable<'f>> {
    file.variable(name).ok_or_else(|| VdcError::invalid_variable(name, "missing from source file"))
}

fn required_i32(file: &netcdf::File, name: &str) -> VdcResult<Vec<i32>> {
    let var = required_var(file, name)?;
    var.values::<i32>(None, None).map(|a| a.into_raw_vec()).map_err(|e| VdcError::format(format!("reading {name}: {e}")))
}

//! CLI options shared by the sample converters (spec §6 "CLI surface",
//! §9A). Mirrors the teacher's `services/downloader` `Args` struct: one
//! `clap::Parser` derive per converter binary, with the options common to
//! every converter factored out here and `#[command(flatten)]`-ed in.
//!
//! The original toolkit's `OptionParser` accepts single-dash long options
//! (`-ts`, `-varname`); this implementation uses clap's double-dash
//! convention (`--ts`, `--varname`) for the same names instead of fighting
//! clap's parser over single-dash long flags.

use std::path::PathBuf;

use clap::Parser;

/// Options common to every `*2vdc` converter: which time step and variable
/// to convert, which refinement level to target, and verbosity.
#[derive(Parser, Debug)]
pub struct ConverterConfig {
    /// Metadata/VDF file path describing the destination collection.
    pub vdf_file: PathBuf,

    /// One or more source data files to convert.
    #[arg(required = true)]
    pub source_files: Vec<PathBuf>,

    /// Timestep of the data file, starting from 0.
    #[arg(long = "ts", default_value_t = 0)]
    pub ts: usize,

    /// Name of the variable to convert.
    #[arg(long = "varname", default_value = "var1")]
    pub varname: String,

    /// Refinement level to write: 0 = coarsest, -1 = all levels (native).
    #[arg(long = "level", default_value_t = -1)]
    pub level: i32,

    /// Operate quietly: suppress informational output.
    #[arg(long)]
    pub quiet: bool,

    /// Enable debug-level logging.
    #[arg(long)]
    pub debug: bool,
}

impl ConverterConfig {
    /// Translate `-level` into the `tracing` filter directive the CLI's
    /// `tracing-subscriber` setup should use.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

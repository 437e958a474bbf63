//! Error taxonomy shared by every VDC crate (spec §7).

use thiserror::Error;

/// Result type alias using [`VdcError`].
pub type VdcResult<T> = Result<T, VdcError>;

/// The process-wide error taxonomy for VDC operations.
///
/// Every public operation in the storage engine returns a `VdcResult`; there
/// is no exception propagation across component boundaries. Non-fatal
/// inconsistencies (skipped files, extrapolation near edges, unmapped target
/// vertices) are logged at `tracing::warn!` instead of being folded into this
/// type.
#[derive(Debug, Error)]
pub enum VdcError {
    /// File open/read/write/seek failure; carries the OS error string.
    #[error("I/O error: {0}")]
    Io(String),

    /// Structural violation in an input file (bad netCDF record, missing
    /// required variable, malformed XML).
    #[error("format error: {0}")]
    Format(String),

    /// Invalid or unsupported map projection string, or a failed forward
    /// transform.
    #[error("projection error: {0}")]
    Projection(String),

    /// Variable not present at the requested time step / reflevel, or wrong
    /// rank.
    #[error("invalid variable '{name}': {reason}")]
    InvalidVariable { name: String, reason: String },

    /// Requested voxel bounds out of range or inverted.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Allocation or resource-exhaustion failure.
    #[error("resource error: {0}")]
    Resource(String),

    /// Feature advertised by the file but not implemented by this VDC
    /// (e.g. a dimensionless vertical coordinate, an unrecognized wavelet
    /// kernel / boundary-mode pairing, szip compression without the library).
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl VdcError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }

    pub fn invalid_variable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVariable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// `<progname>: <message>` exit line for CLI converters (spec §6).
    pub fn cli_line(&self, progname: &str) -> String {
        format!("{progname}: {self}")
    }
}

impl From<std::io::Error> for VdcError {
    fn from(err: std::io::Error) -> Self {
        VdcError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_line_format() {
        let e = VdcError::invalid_region("max < min");
        assert_eq!(e.cli_line("raw2vdc"), "raw2vdc: invalid region: max < min");
    }

    #[test]
    fn io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let e: VdcError = io_err.into();
        assert!(matches!(e, VdcError::Io(_)));
    }
}

use polars::error::PolarsError;
use thiserror::Error;

/// Errors raised by civic-geo operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Column not found: {0:?}")]
    MissingColumn(String),

    #[error("CRS mismatch: EPSG:{left} vs EPSG:{right}")]
    CrsMismatch { left: u32, right: u32 },

    #[error("Row count mismatch: {rows} rows but {geometries} geometries")]
    LengthMismatch { rows: usize, geometries: usize },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for civic-geo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for building an [`Error::InvalidArgument`].
macro_rules! invalid {
    ($($arg:tt)*) => {
        $crate::error::Error::InvalidArgument(format!($($arg)*))
    };
}
pub(crate) use invalid;

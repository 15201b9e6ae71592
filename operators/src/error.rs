use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The pipeline's error model: user-input faults, domain faults
/// ("unable to compute"), and internal failures are distinguished so the
/// HTTP boundary can map each to the right status code and message.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))]
pub enum Error {
    #[snafu(display("bad request: {}", reason))]
    BadRequest { reason: String },

    #[snafu(display("unsupported spatial reference: {}", srid))]
    UnsupportedCrs { srid: u32 },

    #[snafu(display("layer not found: {} at zoom {}", name, zoom))]
    LayerNotFound { name: String, zoom: u8 },

    #[snafu(display(
        "dimension mismatch: {}x{} vs {}x{}",
        left_cols,
        left_rows,
        right_cols,
        right_rows
    ))]
    DimensionMismatch {
        left_cols: usize,
        left_rows: usize,
        right_cols: usize,
        right_rows: usize,
    },

    #[snafu(display("Unable to calculate breaks (NODATA)"))]
    UnableToCompute,

    #[snafu(display("internal error: {}", reason))]
    Internal { reason: String },

    #[snafu(display("internal error: {}", source))]
    DataType { source: gt_datatypes::Error },

    #[snafu(display("internal error: {}", source))]
    Gdal { source: gdal::errors::GdalError },

    #[snafu(display("internal error: {}", source))]
    Image { source: image::ImageError },

    #[snafu(display("internal error: {}", source))]
    Io { source: std::io::Error },

    #[snafu(display("internal error: {}", source))]
    Json { source: serde_json::Error },
}

impl From<gt_datatypes::Error> for Error {
    fn from(source: gt_datatypes::Error) -> Self {
        Self::DataType { source }
    }
}

impl From<gdal::errors::GdalError> for Error {
    fn from(source: gdal::errors::GdalError) -> Self {
        Self::Gdal { source }
    }
}

impl From<image::ImageError> for Error {
    fn from(source: image::ImageError) -> Self {
        Self::Image { source }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

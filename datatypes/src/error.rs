use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))]
pub enum Error {
    #[snafu(display(
        "raster dimensions mismatch: grid is {}x{} but {} values were supplied",
        cols,
        rows,
        len
    ))]
    GridSizeMismatch { cols: usize, rows: usize, len: usize },

    #[snafu(display("invalid extent: xmin/ymin must be less than xmax/ymax"))]
    InvalidExtent,

    #[snafu(display("unsupported spatial reference identifier: {}", srid))]
    UnsupportedSpatialReference { srid: u32 },

    #[snafu(display("geojson input could not be parsed: {}", source))]
    GeoJson { source: serde_json::Error },
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::GeoJson { source }
    }
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid series id: {0}")]
    InvalidSeriesId(String),

    #[error("Invalid timestamp for \"{field}\": {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

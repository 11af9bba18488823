use thiserror::Error;

/// Error type for allometric computation, configuration and sheet input.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CarbonError {
    #[error("unknown species group: '{label}'")]
    UnknownSpecies { label: String },

    #[error("invalid diameter for {field}: {value} (must be a positive finite number of inches)")]
    InvalidDiameter { field: String, value: f64 },

    #[error("missing diameter for {field}")]
    MissingDiameter { field: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration could not be decoded: {0}")]
    ConfigParse(String),

    #[error("sheet parse error at line {line}: {message}")]
    SheetParse { line: u32, message: String },

    #[error("sheet header is missing column '{0}'")]
    MissingColumn(String),

    #[error("column {column} is not available on {record} records")]
    UnsupportedColumn { column: String, record: String },

    #[error("row {row_index} ({team}) rejected: {reason}")]
    RowRejected {
        row_index: u32,
        team: String,
        reason: String,
    },
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("sheet `{sheet}` header {found:?} does not match expected columns {expected:?}")]
    SchemaMismatch {
        sheet: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("sheet `{sheet}` row {index}: field `{field}` has unreadable value {value:?}")]
    Malformed {
        sheet: String,
        index: usize,
        field: String,
        value: String,
    },
}

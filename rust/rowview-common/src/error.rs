use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Column data was requested from a logical row that has no backing source row.
    pub fn empty_row() -> Error {
        Error(ErrorKind::EmptyRow.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, len }.into())
    }

    pub fn position_out_of_range(position: i64, count: u64) -> Error {
        Error(ErrorKind::PositionOutOfRange { position, count }.into())
    }

    pub fn join_violation(column: impl Into<String>, values: Vec<String>) -> Error {
        Error(
            ErrorKind::JoinViolation {
                column: column.into(),
                values,
            }
            .into(),
        )
    }

    pub fn unsupported(name: impl Into<String>) -> Error {
        Error(ErrorKind::UnsupportedOperation { name: name.into() }.into())
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn column_not_found(name: impl Into<String>) -> Error {
        Error(ErrorKind::ColumnNotFound { name: name.into() }.into())
    }

    pub fn type_mismatch(column: usize, expected: &'static str) -> Error {
        Error(ErrorKind::TypeMismatch { column, expected }.into())
    }

    pub fn closed(context: impl Into<String>) -> Error {
        Error(
            ErrorKind::Closed {
                context: context.into(),
            }
            .into(),
        )
    }

    pub fn source<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Source {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn is_empty_row(&self) -> bool {
        matches!(self.kind(), ErrorKind::EmptyRow)
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("cannot access data in an empty row")]
    EmptyRow,

    #[error("index {index} is out of range for a position map of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("position {position} is outside of [0, {count})")]
    PositionOutOfRange { position: i64, count: u64 },

    #[error(
        "source is missing entries for the column \"{column}\" with values {}",
        values.join(", "))]
    JoinViolation { column: String, values: Vec<String> },

    #[error("unsupported operation {name}")]
    UnsupportedOperation { name: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("column '{name}' does not exist")]
    ColumnNotFound { name: String },

    #[error("column {column} cannot be read as {expected}")]
    TypeMismatch {
        column: usize,
        expected: &'static str,
    },

    #[error("row source is closed: {context}")]
    Closed { context: String },

    #[error("row source error: {context}")]
    Source {
        context: String,
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

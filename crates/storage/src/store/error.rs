#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    Encode(serde_json::Error),
    Decode {
        column: &'static str,
        message: String,
    },
    InvalidInput(&'static str),
    InvalidAggregate(String),
    NotFound,
    LockPoisoned,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQL",
            Self::Encode(_) => "ENCODE",
            Self::Decode { .. } => "DECODE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidAggregate(_) => "INVALID_AGGREGATE",
            Self::NotFound => "NOT_FOUND",
            Self::LockPoisoned => "LOCK_POISONED",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::Encode(err) => write!(f, "encode: {err}"),
            Self::Decode { column, message } => write!(f, "decode {column}: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidAggregate(raw) => write!(f, "invalid aggregate: {raw}"),
            Self::NotFound => write!(f, "no such job or user"),
            Self::LockPoisoned => write!(f, "statement cache lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<cm_core::filter::AggregateError> for StoreError {
    fn from(value: cm_core::filter::AggregateError) -> Self {
        match value {
            cm_core::filter::AggregateError::Invalid(raw) => Self::InvalidAggregate(raw),
        }
    }
}

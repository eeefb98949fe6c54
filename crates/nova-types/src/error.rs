use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A required input was missing (for example an empty bound list).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The descriptor has a shape the relation queries cannot reason about.
    #[error("unsupported type form: {0}")]
    Unsupported(String),
}

impl TypeError {
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        TypeError::Unsupported(message.into())
    }
}

pub type Result<T, E = TypeError> = std::result::Result<T, E>;

/// Failure to decode one of the dashboard's JSON resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    Json { resource: &'static str, message: String },
}

impl FormatError {
    pub(crate) fn json(resource: &'static str, err: serde_json::Error) -> Self {
        FormatError::Json {
            resource,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Json { resource, message } => {
                write!(f, "invalid {resource} json: {message}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

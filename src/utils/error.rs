use thiserror::Error;

#[derive(Error, Debug)]
pub enum GsError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML encoding error: {0}")]
    TomlEncodeError(#[from] toml::ser::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Environment variable {var} is not set")]
    MissingCredentialsError { var: String },

    #[error("Authentication with {service} failed: {message}")]
    AuthError { service: String, message: String },

    #[error("{service} rejected the request: {message}")]
    RemoteError { service: String, message: String },

    #[error("Could not parse {what}: {message}")]
    ParseError { what: String, message: String },

    #[error("Course '{identifier}' is not configured")]
    CourseNotFoundError { identifier: String },

    #[error("Input aborted: {message}")]
    PromptError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Remote,
    Data,
    Io,
    Interaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl GsError {
    pub fn config(message: impl Into<String>) -> Self {
        GsError::ConfigError {
            message: message.into(),
        }
    }

    pub fn auth(service: impl Into<String>, message: impl Into<String>) -> Self {
        GsError::AuthError {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        GsError::RemoteError {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        GsError::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GsError::ApiError(_) => ErrorCategory::Network,
            GsError::CsvError(_) | GsError::SerializationError(_) | GsError::ParseError { .. } => {
                ErrorCategory::Data
            }
            GsError::IoError(_) | GsError::TomlEncodeError(_) => ErrorCategory::Io,
            GsError::ConfigError { .. }
            | GsError::MissingConfigError { .. }
            | GsError::InvalidConfigValueError { .. }
            | GsError::CourseNotFoundError { .. } => ErrorCategory::Configuration,
            GsError::MissingCredentialsError { .. } | GsError::AuthError { .. } => {
                ErrorCategory::Authentication
            }
            GsError::RemoteError { .. } => ErrorCategory::Remote,
            GsError::PromptError { .. } => ErrorCategory::Interaction,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Configuration
            | ErrorCategory::Interaction
            | ErrorCategory::Authentication
            | ErrorCategory::Remote
            | ErrorCategory::Data => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GsError::ApiError(_) => "Check your network connection and try again".to_string(),
            GsError::CsvError(_) => {
                "Make sure the roster CSV is an unmodified Gradescope or Piazza export".to_string()
            }
            GsError::IoError(_) | GsError::TomlEncodeError(_) => {
                "Check that the settings directory exists and is writable".to_string()
            }
            GsError::SerializationError(_) | GsError::ParseError { .. } => {
                "The platform may have changed its page layout; run with --verbose for details"
                    .to_string()
            }
            GsError::ConfigError { .. }
            | GsError::MissingConfigError { .. }
            | GsError::InvalidConfigValueError { .. } => {
                "Fix settings.toml by hand or run gs-tools without arguments to reconfigure"
                    .to_string()
            }
            GsError::MissingCredentialsError { var } => {
                format!("Export {} before running gs-tools", var)
            }
            GsError::AuthError { .. } => {
                "Double-check the email and password in your environment".to_string()
            }
            GsError::RemoteError { .. } => {
                "Confirm that your account has staff permissions for this course".to_string()
            }
            GsError::CourseNotFoundError { .. } => {
                "Run `gs-tools configure` to add the course, or pass a configured --id".to_string()
            }
            GsError::PromptError { .. } => "Re-run the command in an interactive terminal".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GsError::ApiError(e) if e.is_timeout() => "The request timed out".to_string(),
            GsError::ApiError(_) => "Could not reach the remote service".to_string(),
            GsError::AuthError { service, .. } => format!("Could not log in to {}", service),
            GsError::MissingCredentialsError { var } => format!("{} is not set", var),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GsError>;

use crate::utils::error::{GsError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> GsError {
    GsError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Adapter base URLs: http(s) only, so tests can point at a local mock server.
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("not a URL ({})", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(field, raw, format!("scheme {} is not http(s)", other))),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "a directory is required"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "contains a NUL byte"));
    }
    Ok(())
}

pub fn validate_positive_number(field: &str, value: u32, min: u32) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be {} or more", min)));
    }
    Ok(())
}

/// Course identifiers double as file names under `course-path`.
pub fn validate_course_identifier(field: &str, identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(invalid(field, identifier, "an identifier is required"));
    }
    if identifier
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '\\'))
    {
        return Err(invalid(
            field,
            identifier,
            "no spaces or path separators allowed",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("gradescope.base_url", "https://www.gradescope.com").is_ok());
        assert!(validate_url("gradescope.base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("gradescope.base_url", "").is_err());
        assert!(validate_url("gradescope.base_url", "invalid-url").is_err());
        assert!(validate_url("gradescope.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("default-extension-days", 5, 1).is_ok());
        assert!(validate_positive_number("default-extension-days", 0, 1).is_err());
    }

    #[test]
    fn test_validate_course_identifier() {
        assert!(validate_course_identifier("identifier", "cs101-fa24").is_ok());
        assert!(validate_course_identifier("identifier", "").is_err());
        assert!(validate_course_identifier("identifier", "cs 101").is_err());
        assert!(validate_course_identifier("identifier", "../etc").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("course-path", "./courses").is_ok());
        assert!(validate_path("course-path", "").is_err());
    }
}

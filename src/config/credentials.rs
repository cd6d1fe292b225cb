use crate::domain::model::Credentials;
use crate::utils::error::{GsError, Result};

pub const GS_EMAIL: &str = "GS_EMAIL";
pub const GS_PASSWORD: &str = "GS_PASSWORD";
pub const PZ_EMAIL: &str = "PZ_EMAIL";
pub const PZ_PASSWORD: &str = "PZ_PASSWORD";

/// Reads a credential pair through `lookup`, treating blank values as unset.
pub fn credentials_from<F>(lookup: F, email_var: &str, password_var: &str) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |var: &str| {
        lookup(var)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| GsError::MissingCredentialsError {
                var: var.to_string(),
            })
    };

    Ok(Credentials {
        email: read(email_var)?,
        password: read(password_var)?,
    })
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Grading-platform login from `GS_EMAIL` / `GS_PASSWORD`.
pub fn gradescope_from_env() -> Result<Credentials> {
    credentials_from(env_lookup, GS_EMAIL, GS_PASSWORD)
}

/// Discussion-board login from `PZ_EMAIL` / `PZ_PASSWORD`, if both are set.
pub fn piazza_from_env() -> Option<Credentials> {
    credentials_from(env_lookup, PZ_EMAIL, PZ_PASSWORD).ok()
}

//! Secret references in `config.toml`.
//!
//! `api_key` and `access_token` may be written as `env::VAR_NAME` to read
//! them from the environment instead of storing them in the file. Any other
//! value is used as-is.

use crate::error::{ClientError, ClientResult};

/// Resolves a value that may be an `env::` reference.
pub fn resolve(value: &str) -> ClientResult<String> {
    match value.strip_prefix("env::") {
        Some(var) => std::env::var(var).map_err(|_| {
            ClientError::Config(format!("environment variable `{}` is not set", var))
        }),
        None => Ok(value.to_string()),
    }
}

/// Resolves an optional value, treating an empty string as unset.
pub fn resolve_opt(value: Option<&str>) -> ClientResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => resolve(v).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("AIza-plain").unwrap(), "AIza-plain");
        assert_eq!(resolve_opt(Some("  ")).unwrap(), None);
        assert_eq!(resolve_opt(None).unwrap(), None);
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_MAILCAL_TEST_SECRET", "from-env");
        }
        assert_eq!(resolve("env::_MAILCAL_TEST_SECRET").unwrap(), "from-env");
        assert_eq!(
            resolve_opt(Some("env::_MAILCAL_TEST_SECRET")).unwrap(),
            Some("from-env".to_string())
        );
        unsafe {
            std::env::remove_var("_MAILCAL_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_MAILCAL_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.to_string().contains("not set"));
    }
}

//! Environment variable interpolation for config files.
//!
//! Supported syntax:
//! - `${VAR}` - substitute with the env var value, error if missing
//! - `${VAR:-default}` - use `default` if VAR is unset or empty
//! - `$$` - escape sequence for a literal `$`
//!
//! Credentials and connection URLs reach the config this way, so missing
//! variables are accumulated and reported together rather than one at a time.

use regex::Regex;
use std::env;
use std::sync::LazyLock;

use crate::error::ConfigError;

/// Matches `$$`, `${VAR}`, and `${VAR:-default}`.
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("invalid env var pattern")
});

/// Interpolate environment variables in the given text.
///
/// All missing variables are reported in a single error so the operator can
/// fix the whole environment at once.
pub fn interpolate(input: &str) -> Result<String, ConfigError> {
    let mut missing = Vec::new();

    let text = ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let full_match = caps.get(0).unwrap().as_str();
            if full_match == "$$" {
                return "$".to_string();
            }

            let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let default = caps.get(2).map(|m| m.as_str());

            match env::var(name) {
                Ok(value) if !value.is_empty() => value,
                Ok(_) | Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        missing.push(format!("environment variable '{name}' is not set"));
                        full_match.to_string()
                    }
                },
            }
        })
        .to_string();

    if missing.is_empty() {
        Ok(text)
    } else {
        Err(ConfigError::EnvInterpolation {
            message: missing.join("\n"),
        })
    }
}

use anyhow::Result;
use regex::Regex;
use std::env;
use tracing::{debug, warn};

const ENV_VAR_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(ENV_VAR_PATTERN)?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let placeholder = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let Some(var_name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
            return placeholder.to_string();
        };

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                // Leave the placeholder; parsing or validation reports it
                placeholder.to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!("Environment variables not set: {:?}", missing_vars);
    }

    Ok(result.into_owned())
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> Result<bool> {
    let re = Regex::new(ENV_VAR_PATTERN)?;
    Ok(re.is_match(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_both_forms() {
        env::set_var("OPTX_TEST_RATE", "0.03");
        env::set_var("OPTX_TEST_PORT", "9100");
        let out = substitute_env_vars("rate: ${OPTX_TEST_RATE}\nport: $OPTX_TEST_PORT").unwrap();
        assert_eq!(out, "rate: 0.03\nport: 9100");
    }

    #[test]
    fn test_missing_var_left_in_place() {
        let out = substitute_env_vars("rate: ${OPTX_TEST_DEFINITELY_UNSET}").unwrap();
        assert_eq!(out, "rate: ${OPTX_TEST_DEFINITELY_UNSET}");
        assert!(has_unresolved_env_vars(&out).unwrap());
        assert!(!has_unresolved_env_vars("rate: 0.05").unwrap());
    }
}

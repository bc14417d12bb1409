use crate::config::types::{JobConfig, ParseConfig, ParseMode, RunnerConfig, ScrapeConfig};
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &ScrapeConfig) -> Result<(), ConfigError> {
    validate_job_config(&config.job)?;
    validate_runner_config(&config.runner)?;
    validate_parse_config(&config.parse)?;
    Ok(())
}

/// Validates job configuration
fn validate_job_config(config: &JobConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "job name cannot be empty".to_string(),
        ));
    }

    // The name becomes a file name prefix, so keep it path-safe.
    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "job name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates runner configuration
fn validate_runner_config(config: &RunnerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 1000 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 1000, got {}",
            config.concurrency
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates parse configuration
fn validate_parse_config(config: &ParseConfig) -> Result<(), ConfigError> {
    match config.mode {
        ParseMode::Select => {
            let Some(selector) = config.selector.as_deref() else {
                return Err(ConfigError::Validation(
                    "parse mode 'select' requires a selector".to_string(),
                ));
            };
            Selector::parse(selector)
                .map_err(|e| ConfigError::InvalidSelector(format!("{selector}: {e}")))?;
        }
        _ => {
            if config.selector.is_some() {
                return Err(ConfigError::Validation(
                    "selector is only meaningful with parse mode 'select'".to_string(),
                ));
            }
        }
    }

    Ok(())
}

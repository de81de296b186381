use crate::config::types::{Config, OutputConfig, PipelineConfig, SeedConfig, UserAgentConfig};
use crate::ValidationError;
use url::Url;

const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_pipeline_config(&config.pipeline)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ValidationError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ValidationError::new(
            "pipeline.workers",
            config.workers.to_string(),
            format!("must be between 1 and {}", MAX_WORKERS),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ValidationError::new(
            "pipeline.timeout-secs",
            "0",
            "must be greater than zero",
        ));
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ValidationError::new(
            "pipeline.fetch-timeout-secs",
            "0",
            "must be greater than zero",
        ));
    }

    if config.max_body_bytes == 0 {
        return Err(ValidationError::new(
            "pipeline.max-body-bytes",
            "0",
            "must be greater than zero",
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ValidationError> {
    if config.name.is_empty() {
        return Err(ValidationError::new(
            "user-agent.name",
            "",
            "cannot be empty",
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new(
            "user-agent.name",
            config.name.clone(),
            "must contain only alphanumeric characters, hyphens and underscores",
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ValidationError> {
    if config.database_path.is_empty() {
        return Err(ValidationError::new(
            "output.database-path",
            "",
            "cannot be empty",
        ));
    }
    Ok(())
}

fn validate_seeds(seeds: &SeedConfig) -> Result<(), ValidationError> {
    for seed in &seeds.urls {
        validate_seed_url(seed)?;
    }
    Ok(())
}

/// Checks that a seed is an absolute http(s) URL
fn validate_seed_url(seed: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(seed)
        .map_err(|e| ValidationError::new("seeds.urls", seed, format!("not a valid URL: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::new(
            "seeds.urls",
            seed,
            "must use http or https scheme",
        ));
    }

    if url.host_str().is_none() {
        return Err(ValidationError::new("seeds.urls", seed, "must have a host"));
    }

    Ok(url)
}

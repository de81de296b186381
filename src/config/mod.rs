//! Configuration module for linkscrape
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to its default.
//!
//! # Example
//!
//! ```no_run
//! use linkscrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkscrape.toml")).unwrap();
//! println!("Pipeline will use {} workers", config.pipeline.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_worker_count, Config, OutputConfig, PipelineConfig, SeedConfig, UserAgentConfig,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_SEED_URLS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

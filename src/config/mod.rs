//! Configuration module for fdio
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use fdio::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fdio.toml")).unwrap();
//! println!("Searching {}", config.github.api_endpoint);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, GitHubConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

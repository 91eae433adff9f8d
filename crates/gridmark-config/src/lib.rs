//! # Gridmark Configuration Library
//!
//! Typed configuration for the gridmark markup renderer: palette defaults,
//! widget glyphs, layout tweaks and script-extraction settings.
//!
//! ## Features
//!
//! - Multi-format support (TOML, YAML, JSON)
//! - Every field defaulted, so partial files are valid
//! - Validation before the configuration reaches the pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridmark_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("gridmark.toml")?;
//!     println!("default foreground: {}", config.palette.foreground);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use loader::*;

// src/config/mod.rs

//! Configuration loading and validation for jobwatch.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a config file and applying environment overrides.
//! - `validate.rs`: turning a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, ROOT_ENV_VAR};
pub use model::{
    ConfigFile, ConfigSection, RawConfigFile, RegistrySection, StatusSection, SummarySection,
    TaskConfig, TitleRuleConfig, TitleSection,
};

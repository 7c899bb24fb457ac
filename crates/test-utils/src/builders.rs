#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use jobwatch::config::{
    ConfigFile, ConfigSection, RawConfigFile, RegistrySection, StatusSection, SummarySection,
    TaskConfig, TitleSection,
};
use jobwatch::types::RecordStorageMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                registry: RegistrySection::default(),
                status: StatusSection::default(),
                summary: SummarySection::default(),
                title: TitleSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, key: &str, task: TaskConfig) -> Self {
        self.config.task.insert(key.to_string(), task);
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.registry.root = root.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config.log_dir = dir.into();
        self
    }

    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config.state_dir = dir.into();
        self
    }

    pub fn record_storage(mut self, mode: RecordStorageMode) -> Self {
        self.config.config.record_storage = mode;
        self
    }

    pub fn list_limit(mut self, limit: usize) -> Self {
        self.config.config.list_limit = limit;
        self
    }

    pub fn raw_limit_bytes(mut self, limit: u64) -> Self {
        self.config.config.raw_limit_bytes = limit;
        self
    }

    pub fn scan_limit_bytes(mut self, limit: u64) -> Self {
        self.config.config.scan_limit_bytes = limit;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new<I, S>(cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            task: TaskConfig {
                cmd: cmd.into_iter().map(Into::into).collect(),
                cwd: None,
                label: None,
                script: None,
            },
        }
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.task.cwd = Some(dir.into());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.task.label = Some(label.to_string());
        self
    }

    pub fn script(mut self, script: impl Into<PathBuf>) -> Self {
        self.task.script = Some(script.into());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

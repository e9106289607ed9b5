use anyhow::{Context, Result};
use directories_next::BaseDirs;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How random generators are seeded across the sets of one run.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// One generator consumed by every set in order.
    Shared,
    /// One generator per set, derived from the run seed and the set id.
    PerSet,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sets: u32,
    pub num_mcq: Option<i64>,
    pub num_subjective: Option<i64>,
    pub layout: String,
    pub output_dir: PathBuf,
    pub compile_pdf: bool,
    pub seed: Option<u64>,
    pub seed_strategy: SeedStrategy,
    pub latex_command: String,
    pub compile_passes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sets: 3,
            num_mcq: None,
            num_subjective: None,
            layout: "default".to_owned(),
            output_dir: PathBuf::from("output"),
            compile_pdf: true,
            seed: None,
            seed_strategy: SeedStrategy::Shared,
            latex_command: "pdflatex".to_owned(),
            compile_passes: 2,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().join("quizset").join("settings.yaml"))
    }

    pub fn from_yaml_str(content: &str) -> Result<Settings> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Could not read {:?}", path))?;
        Settings::from_yaml_str(&content)
            .with_context(|| format!("Invalid settings file {:?}", path))
    }

    /// An explicit file must exist; the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Settings> {
        if let Some(path) = explicit {
            return Settings::from_file(path);
        }
        match Settings::default_path() {
            Some(path) if path.exists() => {
                debug!("Reading settings from {:?}", path);
                Settings::from_file(&path)
            }
            _ => Ok(Settings::default()),
        }
    }
}

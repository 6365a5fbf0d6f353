use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::ProjectionResult,
    ledger::{category::UNCATEGORIZED_LABEL, Period, PeriodCalendar},
    utils::paths::{app_data_dir, config_file_in, ensure_dir},
};

const TMP_SUFFIX: &str = "tmp";

/// Engine defaults applied when callers do not thread explicit values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub week_start: Weekday,
    pub default_period: Period,
    pub uncategorized_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
            default_period: Period::Month,
            uncategorized_label: UNCATEGORIZED_LABEL.into(),
        }
    }
}

impl EngineConfig {
    pub fn calendar(&self) -> PeriodCalendar {
        PeriodCalendar::new(self.week_start)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            path: config_file_in(&base),
        }
    }

    /// Reads the stored configuration, falling back to defaults when no file exists.
    pub fn load(&self) -> ProjectionResult<EngineConfig> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            tracing::debug!(path = %self.path.display(), "no configuration file, using defaults");
            Ok(EngineConfig::default())
        }
    }

    pub fn save(&self, config: &EngineConfig) -> ProjectionResult<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "saved engine configuration");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> ProjectionResult<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

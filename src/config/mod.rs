#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use toml_config::LibraryConfig;

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_DATA_FILE: &str = "library_data.json";
pub const DEFAULT_TERM_DAYS: i64 = 14;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "small-library")]
#[command(about = "A small library circulation tracker")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the data file from the configuration
    #[arg(long, global = true)]
    pub data_file: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: cli::Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

/// 合併設定檔與命令列之後實際使用的設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: String,
    pub default_term_days: i64,
    pub verbose: bool,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: DEFAULT_DATA_FILE.to_string(),
            default_term_days: DEFAULT_TERM_DAYS,
            verbose: false,
            log_format: LogFormat::Compact,
        }
    }
}

impl Settings {
    pub fn from_config(config: &LibraryConfig) -> Result<Self> {
        let defaults = Self::default();
        let logging = config.logging.as_ref();
        let log_format = match logging.and_then(|l| l.format.as_deref()) {
            None => defaults.log_format,
            Some(format) => parse_log_format(format)?,
        };

        Ok(Self {
            data_file: config.storage.data_file.clone(),
            default_term_days: config
                .loans
                .as_ref()
                .and_then(|l| l.default_term_days)
                .unwrap_or(defaults.default_term_days),
            verbose: logging.and_then(|l| l.verbose).unwrap_or(false),
            log_format,
        })
    }

    /// 讀取（可選的）設定檔，再套用命令列覆蓋
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::from_config(&LibraryConfig::from_file(path)?)?,
            None => Self::default(),
        };

        if let Some(data_file) = &cli.data_file {
            settings.data_file = data_file.clone();
        }
        if cli.verbose {
            settings.verbose = true;
        }
        if cli.json_logs {
            settings.log_format = LogFormat::Json;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    validation::validate_one_of("logging.format", value, &["compact", "json"])?;
    Ok(if value == "json" {
        LogFormat::Json
    } else {
        LogFormat::Compact
    })
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("storage.data_file", &self.data_file)?;
        validation::validate_positive_number("loans.default_term_days", self.default_term_days, 1)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn data_file(&self) -> &str {
        &self.data_file
    }

    fn default_term_days(&self) -> i64 {
        self.default_term_days
    }
}

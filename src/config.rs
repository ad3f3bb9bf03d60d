use crate::error::DriveCopyError;
use clap::Parser;
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/drive/v3";

pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    /// Id of the folder the walk starts from
    #[arg(short, long)]
    pub root: Option<String>,

    /// Email of the user whose items get copied
    #[arg(short, long)]
    pub target: Option<String>,

    #[arg(short, long)]
    pub config_path: Option<String>,

    #[arg(short, long, default_value = "INFO")]
    pub log_level: tracing::Level,

    #[arg(short, long)]
    pub page_size: Option<u32>,

    /// Report what would be copied without creating anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Drive v3 API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Amount of children requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            access_token: None,
        }
    }
}

impl Config {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, DriveCopyError> {
        let config = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&config)?)
    }

    /// `DRIVE_ACCESS_TOKEN` takes precedence over the token in the file.
    pub fn access_token(&self) -> Result<String, DriveCopyError> {
        std::env::var("DRIVE_ACCESS_TOKEN")
            .ok()
            .or_else(|| self.access_token.clone())
            .filter(|token| !token.trim().is_empty())
            .ok_or(DriveCopyError::MissingToken)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

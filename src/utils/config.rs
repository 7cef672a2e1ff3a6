// src/utils/config.rs

use crate::api::config::{BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::errors::AppError;
use crate::models::CompletionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub log_level: String,
    pub output_directory: String,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            log_level: "off".to_string(),
            output_directory: "./".to_string(),
            temperature: 0.0,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            retries: 3,
        }
    }
}

impl Config {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, AppError> {
    let mut path = get_executable_dir()?;
    path.push("config.toml");
    Ok(path)
}

/// Validate config to prevent obviously wrong or missing values.
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(AppError::InvalidInput(
            "Temperature must be between 0.0 and 2.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.top_p) {
        return Err(AppError::InvalidInput(
            "top_p must be between 0.0 and 1.0".to_string(),
        ));
    }
    if !(-2.0..=2.0).contains(&config.frequency_penalty)
        || !(-2.0..=2.0).contains(&config.presence_penalty)
    {
        return Err(AppError::InvalidInput(
            "Penalties must be between -2.0 and 2.0".to_string(),
        ));
    }
    if config.max_tokens == 0 {
        return Err(AppError::InvalidInput(
            "max_tokens cannot be zero".to_string(),
        ));
    }
    if !Path::new(&config.output_directory).is_dir() {
        return Err(AppError::InvalidInput(format!(
            "Output directory does not exist: {}",
            config.output_directory
        )));
    }
    Ok(())
}

/// Read config from file, and create a default config if none exists.
pub fn read_config() -> Result<Config, AppError> {
    read_config_from(&get_config_path()?)
}

pub fn read_config_from(config_path: &Path) -> Result<Config, AppError> {
    if !config_path.exists() {
        write_config_to(config_path, &Config::default())?;
    }
    let config_str = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&config_str)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn write_config(config: &Config) -> Result<(), AppError> {
    write_config_to(&get_config_path()?, config)
}

pub fn write_config_to(config_path: &Path, config: &Config) -> Result<(), AppError> {
    let config_str = toml::to_string(config)?;
    fs::write(config_path, config_str)?;
    Ok(())
}

fn get_executable_dir() -> Result<PathBuf, AppError> {
    let exe = env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        AppError::InvalidInput(format!("Executable has no parent directory: {}", exe.display()))
    })
}

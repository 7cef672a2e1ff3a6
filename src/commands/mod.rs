use crate::cli::args::Commands;
use crate::cli::display::CliDisplayManager;
use crate::errors::AppError;
use crate::file_processing::writer;
use crate::parser;
use crate::utils::config::{read_config, write_config};
use std::path::{Path, PathBuf};

/// Runs a subcommand. Returns `false` when there was none to run.
pub async fn handle_subcommands(command: Option<Commands>) -> Result<bool, AppError> {
    match command {
        Some(Commands::Rollback) => handle_rollback_subcommand().await?,
        Some(Commands::Config {
            set_log_level,
            set_output_directory,
            set_retries,
        }) => handle_config_subcommand(set_log_level, set_output_directory, set_retries).await?,
        Some(Commands::ModelConfig {
            set_api_key,
            set_base_url,
            set_model,
            set_temperature,
            set_max_tokens,
        }) => {
            handle_model_config_subcommand(
                set_api_key,
                set_base_url,
                set_model,
                set_temperature,
                set_max_tokens,
            )
            .await?
        }
        Some(Commands::Parse { file, json }) => handle_parse_subcommand(&file, json).await?,
        None => return Ok(false),
    }
    Ok(true)
}

/// Directory under the configured output directory that holds run artifacts.
pub fn run_output_directory(output_directory: &str) -> PathBuf {
    Path::new(output_directory).join("z9.output")
}

/// Handles the rollback subcommand
pub async fn handle_rollback_subcommand() -> Result<(), AppError> {
    let config = read_config()?;
    writer::rollback_last_run(&run_output_directory(&config.output_directory)).await?;
    println!("Rolled back the last run");
    Ok(())
}

/// Handles the parse subcommand
pub async fn handle_parse_subcommand(file: &Path, json: bool) -> Result<(), AppError> {
    let raw_text = tokio::fs::read_to_string(file).await?;
    let result = parser::parse(&raw_text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        CliDisplayManager::new().print_result(&result, Path::new("."));
    }
    Ok(())
}

/// Handles the config subcommand
pub async fn handle_config_subcommand(
    set_log_level: Option<String>,
    set_output_directory: Option<String>,
    set_retries: Option<u32>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(log_level) = set_log_level {
        config.log_level = log_level.clone();
        println!("Log level set to {}", log_level);
    }

    if let Some(output_directory) = set_output_directory {
        config.output_directory = output_directory.clone();
        println!("Output directory set to {}", output_directory);
    }

    if let Some(retries) = set_retries {
        config.retries = retries;
        println!("Retries set to {}", retries);
    }

    write_config(&config)?;
    Ok(())
}

/// Handles the model-config subcommand
pub async fn handle_model_config_subcommand(
    set_api_key: Option<String>,
    set_base_url: Option<String>,
    set_model: Option<String>,
    set_temperature: Option<f32>,
    set_max_tokens: Option<u32>,
) -> Result<(), AppError> {
    let mut config = read_config()?;

    if let Some(api_key) = set_api_key {
        config.api_key = Some(api_key);
        println!("API key set");
    }

    if let Some(base_url) = set_base_url {
        config.base_url = base_url.clone();
        println!("Base URL set to: {}", base_url);
    }

    if let Some(model) = set_model {
        config.model = model.clone();
        println!("Model set to: {}", model);
    }

    if let Some(temperature) = set_temperature {
        config.temperature = temperature;
        println!("Temperature set to: {}", temperature);
    }

    if let Some(max_tokens) = set_max_tokens {
        config.max_tokens = max_tokens;
        println!("Max tokens set to: {}", max_tokens);
    }

    write_config(&config)?;
    Ok(())
}

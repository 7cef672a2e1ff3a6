use clap::Parser;
use std::path::Path;
use std::time::{Duration, Instant};
use z9_assist::api::client::CompletionClient;
use z9_assist::api::prompt;
use z9_assist::cli::args::Args;
use z9_assist::cli::display::CliDisplayManager;
use z9_assist::commands;
use z9_assist::file_processing::reader;
use z9_assist::file_processing::writer::{self, LocalProjectStore};
use z9_assist::models::ParsedResult;
use z9_assist::parser;
use z9_assist::utils::config::read_config;
use z9_assist::utils::logger;
use z9_assist::AppError;

/// The main entry point of the application
#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let start_time = Instant::now();

    // Subcommands log too; an invalid config is left for them to report or fix.
    let config = read_config();
    if let Ok(config) = &config {
        logger::setup_logger(config);
    }

    if commands::handle_subcommands(args.command.clone()).await? {
        return Ok(());
    }

    // Ensure prompt is provided
    let prompt_text = args.prompt.clone().ok_or(AppError::MissingPrompt)?;

    let config = config?;
    let api_key = config.api_key.clone().ok_or(AppError::MissingApiKey)?;

    let mut display_manager = CliDisplayManager::new();
    display_manager.print_header();

    let tree = match &args.tree {
        Some(tree_path) => reader::load_tree(tree_path).await?,
        None => reader::scan_directory(&args.project, &args.ignore)?,
    };
    let image = match &args.image {
        Some(image) => Some(reader::load_image(image).await?),
        None => None,
    };

    let outline_entries = prompt::render_tree(&tree).map(|outline| outline.lines().count());
    display_manager.print_prompt_start(outline_entries, image.is_some());
    let messages = prompt::build_messages(&prompt_text, Some(tree.as_slice()), image.as_deref());

    display_manager.print_query_start();

    let client = CompletionClient::new(api_key, config.base_url.clone());
    let options = config.completion_options();

    display_manager.start_spinner("Waiting for assistant response");

    let mut retries = config.retries;
    let response = loop {
        match client.send(&messages, &options).await {
            Ok(response) => break response,
            Err(e) if retries > 0 => {
                retries -= 1;
                log::warn!("API call failed, retries left: {} ({})", retries, e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                display_manager.stop_spinner();
                display_manager.print_result(&ParsedResult::failure(e.to_string()), &args.project);
                return Err(e.into());
            }
        }
    };

    display_manager.stop_spinner();
    display_manager.print_response_success(response.len());

    let result = parser::parse(&response);
    display_manager.print_result(&result, &args.project);

    display_manager.print_saving_results_start();

    let output_directory = commands::run_output_directory(&config.output_directory);
    tokio::fs::create_dir_all(&output_directory).await?;
    let saved_json = save_response(&output_directory, &response, &result).await?;
    display_manager.print_saved_response(&saved_json);

    let report = match (&result.code_project, args.apply) {
        (Some(directives), true) => {
            let mut store = LocalProjectStore::open(&args.project, &output_directory).await?;
            let report = writer::apply_directives(&mut store, directives).await;
            store.finish().await?;
            display_manager.print_apply_report(&report);
            Some(report)
        }
        _ => None,
    };

    display_manager.print_footer(report.as_ref(), start_time.elapsed());

    Ok(())
}

/// Saves the raw reply and its parsed form, returning the JSON path.
async fn save_response(
    output_directory: &Path,
    response: &str,
    result: &ParsedResult,
) -> Result<std::path::PathBuf, AppError> {
    tokio::fs::write(output_directory.join("response.txt"), response).await?;
    let json_path = output_directory.join("response.json");
    tokio::fs::write(&json_path, serde_json::to_string_pretty(result)?).await?;
    Ok(json_path)
}

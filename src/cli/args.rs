use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the Z9 assistant.
#[derive(Parser, Debug, PartialEq, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Prompt for the AI.
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Project directory whose tree is sent with the prompt and that directives apply to.
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// JSON file holding an exported project tree, used instead of scanning the project.
    #[arg(long)]
    pub tree: Option<PathBuf>,

    /// PNG file or data URI sent alongside the prompt.
    #[arg(long)]
    pub image: Option<String>,

    /// Apply the returned directives to the project directory.
    #[arg(short, long)]
    pub apply: bool,

    /// Paths to files or directories to leave out of the project tree.
    #[arg(short, long, num_args = 1.., value_delimiter = '&')]
    pub ignore: Vec<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for the Z9 assistant.
#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Manage configuration options.
    Config {
        /// Set the log level (debug, info, warn, error).
        #[arg(long)]
        set_log_level: Option<String>,

        /// Set the output directory.
        #[arg(long)]
        set_output_directory: Option<String>,

        /// Set the maximum number of retries for API calls.
        #[arg(long)]
        set_retries: Option<u32>,
    },

    /// Manage model configuration options.
    ModelConfig {
        /// Set the API key for the completion endpoint.
        #[arg(long)]
        set_api_key: Option<String>,

        /// Set the base URL of the completion endpoint.
        #[arg(long)]
        set_base_url: Option<String>,

        /// Set the model name.
        #[arg(long)]
        set_model: Option<String>,

        /// Set the temperature for the AI.
        #[arg(long)]
        set_temperature: Option<f32>,

        /// Set the maximum number of tokens in a reply.
        #[arg(long)]
        set_max_tokens: Option<u32>,
    },

    /// Rollback changes made by the last applied run.
    Rollback,

    /// Parse a saved response without contacting the API.
    Parse {
        /// File holding the raw response text.
        file: PathBuf,

        /// Print the parsed result as JSON.
        #[arg(long)]
        json: bool,
    },
}

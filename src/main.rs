// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use dialogai::app_config::{self, Config, TranslationProvider};
use dialogai::app_controller::Controller;
use dialogai::errors::{AppError, TranslationError};
use dialogai::file_utils::FileManager;
use dialogai::game_data;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    OpenRouter,
    OpenAI,
    Anthropic,
    Ollama,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenRouter => TranslationProvider::OpenRouter,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an extracted dialogue document
    #[command(alias = "t")]
    Translate(TranslateArgs),

    /// Extract the dialogue document from a folder of .tsc scripts
    #[command(alias = "d")]
    Dump {
        /// Game data folder to scan for .tsc scripts
        #[arg(value_name = "GAME_DATA")]
        game_data: PathBuf,

        /// Where to write the dialogue document
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Force overwrite of an existing output file
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Write a translated dialogue document back into .tsc scripts
    #[command(alias = "w")]
    Write {
        /// Translated dialogue document
        #[arg(value_name = "TRANSLATION_FILE")]
        translation_file: PathBuf,

        /// Folder receiving the rebuilt scripts, laid out like the game data folder
        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,
    },

    /// Generate shell completions for dialogai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Dialogue document to translate
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the translated document
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language code (e.g., 'la', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// dialogai - game dialogue translation with AI
///
/// Translates an extracted dialogue corpus with a language model while keeping
/// every speech and line in place, so the result can be written back into the game.
#[derive(Parser, Debug)]
#[command(name = "dialogai")]
#[command(version)]
#[command(about = "AI-powered game dialogue translation tool")]
#[command(long_about = "dialogai extracts dialogue from game scripts, translates it with AI providers
keeping the speech and line structure of every dialogue intact, and writes it back.

EXAMPLES:
    dialogai dump data/ dialogues.json                      # Extract dialogue from the game scripts
    dialogai translate dialogues.json dialogues.la.json     # Translate using default config
    dialogai t -f dialogues.json out.json                   # Overwrite an existing output
    dialogai t -p ollama -m gemma3:4b in.json out.json      # Use a specific provider and model
    dialogai t -t fr --log-level debug in.json out.json     # Translate to French with debug logging
    dialogai write dialogues.la.json data.la/               # Write translated scripts
    dialogai completions bash > dialogai.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openrouter - OpenRouter API (default, requires OPENROUTER_API_KEY)
    openai     - OpenAI API (requires OPENAI_API_KEY)
    anthropic  - Anthropic API (requires ANTHROPIC_API_KEY)
    ollama     - Local Ollama server
    lmstudio   - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dialogai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Dump {
            game_data,
            output,
            force_overwrite,
        } => {
            FileManager::check_output_path(&output, force_overwrite)?;
            let document = game_data::extract_document(&game_data)?;
            FileManager::write_document(&output, &document)?;
            info!("Dialogue document written to {}", output.display());
            Ok(())
        }
        Commands::Write {
            translation_file,
            output_dir,
        } => {
            let document = FileManager::read_document(&translation_file)?;
            let written = game_data::write_game_files(&document, &output_dir)?;
            info!("{} scripts written to {}", written.len(), output_dir.display());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = Config::load_validated(&options.config_path, |config| apply_overrides(config, &options))?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let cancel = CancellationToken::new();
    let listener = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the pending request…");
            listener.cancel();
        }
    });

    let controller = Controller::with_config(config)?;
    match controller
        .run(&options.input, &options.output, options.force_overwrite, cancel)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if is_cancellation(&e) => {
            warn!("Translation cancelled, nothing was written");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

// Apply command-line overrides on top of the config file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
        // A variant such as "Classical" only makes sense for the language it was written for
        config.language_variant = None;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

fn is_cancellation(error: &anyhow::Error) -> bool {
    if let Some(TranslationError::Cancelled) = error.downcast_ref::<TranslationError>() {
        return true;
    }
    error
        .downcast_ref::<AppError>()
        .is_some_and(AppError::is_cancellation)
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use vttflow::app_config::{self, Config, TranslationProvider};
use vttflow::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
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
    /// Translate WebVTT subtitles using AI providers (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for vttflow
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// Input .vtt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Directory for translated files (defaults to next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Show how cues group into sentences without translating
    #[arg(short, long)]
    dry_run: bool,
}

/// vttflow - sentence-aware WebVTT translation with AI
#[derive(Parser, Debug)]
#[command(name = "vttflow")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Sentence-aware WebVTT subtitle translation")]
#[command(long_about = "vttflow merges subtitle cues into whole sentences, translates each sentence with an AI provider and spreads the translation back over the original cue timings.

EXAMPLES:
    vttflow talk.vtt                            # Translate using default config
    vttflow -f talk.vtt                         # Force overwrite existing files
    vttflow -p openai -m gpt-4o talk.vtt        # Use specific provider and model
    vttflow -s en -t es talk.vtt                # Translate from English to Spanish
    vttflow -d talk.vtt                         # Show sentence groups only
    vttflow --log-level debug /lectures/        # Process entire directory with debug logging
    vttflow completions bash > vttflow.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Level is read back from log::max_level so it can change after init
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
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
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()), now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vttflow", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

/// Load the config file and apply command line overrides
fn load_config(options: &TranslateArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = options.input_path.clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    let config = load_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.dry_run {
        return if input_path.is_dir() {
            for file in vttflow::file_utils::FileManager::find_files(&input_path, vttflow::file_utils::VTT_EXTENSION)? {
                controller.dry_run(&file)?;
            }
            Ok(())
        } else {
            controller.dry_run(&input_path).map(|_| ())
        };
    }

    if input_path.is_file() {
        let output_dir = options.output_dir.clone()
            .unwrap_or_else(|| input_path.parent().unwrap_or(Path::new(".")).to_path_buf());
        controller.run(input_path, output_dir, options.force_overwrite).await?;
    } else if input_path.is_dir() {
        let summary = controller.run_folder(input_path, options.output_dir.clone(), options.force_overwrite).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed to translate", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    info!("Done");
    Ok(())
}

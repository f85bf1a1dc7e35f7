use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset_builder::{
    interactive, into_records, Config, ConsoleNotifier, DatasetFormat, DatasetWriter,
    NoticeLevel, Notifier, ResilientCompletionClient, TaskRunner, TracingNotifier,
    DEFAULT_CONFIG_PATH, DEFAULT_DATASET_NAME, DEFAULT_OUTPUT_DIR,
};

/// Build a dataset by fetching text from several sources and processing it with Mistral
#[derive(Parser, Debug)]
#[command(name = "dataset-builder", version, about)]
struct Cli {
    /// Config file with API keys and, optionally, tasks
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Dataset name (file name without extension)
    #[arg(short, long, default_value = DEFAULT_DATASET_NAME)]
    name: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = DatasetFormat::Json)]
    format: DatasetFormat,

    /// Directory the dataset is written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Enter tasks interactively even if the config file has some
    #[arg(short, long)]
    interactive: bool,

    /// Suppress status output (only the dataset path is printed)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if !cli.quiet {
        print_banner();
    }

    // Quiet mode keeps status messages in the log instead of on stdout
    let notifier: Arc<dyn Notifier> = if cli.quiet {
        Arc::new(TracingNotifier)
    } else {
        Arc::new(ConsoleNotifier)
    };

    let writer = DatasetWriter::new(&cli.output_dir);
    writer
        .ensure_dir()
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;

    let config = Config::load(&cli.config).context("Failed to load configuration")?;

    let tasks = if cli.interactive || config.tasks.is_empty() {
        notifier.notify(NoticeLevel::Info, "Enter tasks interactively");
        interactive::collect_tasks(&config, notifier.as_ref())?
    } else {
        notifier.notify(
            NoticeLevel::Info,
            &format!("Loaded {} task(s) from {}", config.tasks.len(), cli.config.display()),
        );
        config.tasks.clone()
    };

    if tasks.is_empty() {
        notifier.notify(NoticeLevel::Error, "No tasks to process");
        bail!("no tasks to process");
    }

    let mistral = config
        .completion
        .build_client(&config.mistral_api_key)
        .context("Failed to create Mistral client")?;
    let completion = ResilientCompletionClient::new(Arc::new(mistral), notifier.clone())
        .with_settings(config.completion.settings())
        .with_policy(config.completion.retry_policy());
    let fetcher = config
        .source_fetcher()
        .context("Failed to create source fetchers")?;

    let runner = TaskRunner::new(Arc::new(fetcher), Arc::new(completion), notifier.clone());
    let records = into_records(runner.run_all(&tasks).await);

    let path = writer
        .save(&records, &cli.name, cli.format, notifier.as_ref())
        .context("Failed to save dataset")?;

    if cli.quiet {
        println!("{}", path.display());
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        "╔════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        "║      Multi-Source Dataset Builder      ║".bright_cyan()
    );
    println!(
        "{}",
        "║   YouTube · Google · Web · PDF · Text  ║".bright_cyan()
    );
    println!(
        "{}",
        "╚════════════════════════════════════════╝".bright_cyan()
    );
    println!();
}

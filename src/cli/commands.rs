use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::models::{ChatExport, Provider};
use crate::namespace::{ProjectionOptions, build_namespace};
use crate::parsers::Archive;
use crate::utils::DEFAULT_MAX_SLUG_LEN;

#[derive(Parser)]
#[command(name = "chat-ffs")]
#[command(version = "0.1.0")]
#[command(about = "Turn chat service exports into a mountable filesystem tree", long_about = None)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProviderChoice {
    /// Detect the schema from the archive contents
    #[default]
    Auto,
    Claude,
    #[value(name = "chatgpt")]
    ChatGpt,
}

impl ProviderChoice {
    fn provider(self) -> Option<Provider> {
        match self {
            ProviderChoice::Auto => None,
            ProviderChoice::Claude => Some(Provider::Claude),
            ProviderChoice::ChatGpt => Some(Provider::ChatGpt),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a summary of an export archive
    Info {
        /// Export ZIP file or extracted export directory
        archive: PathBuf,
        #[arg(long, value_enum, default_value_t = ProviderChoice::Auto)]
        provider: ProviderChoice,
    },
    /// Write the namespace tree into a directory
    Export {
        /// Export ZIP file or extracted export directory
        archive: PathBuf,
        /// Output directory (created if missing)
        outdir: PathBuf,
        #[arg(long, value_enum, default_value_t = ProviderChoice::Auto)]
        provider: ProviderChoice,
        /// Longest slug used in generated names (values below 8 act as 8)
        #[arg(long, default_value_t = DEFAULT_MAX_SLUG_LEN)]
        max_name_len: usize,
    },
    /// Print the namespace document as JSON for a filesystem mounter
    Render {
        /// Export ZIP file or extracted export directory
        archive: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ProviderChoice::Auto)]
        provider: ProviderChoice,
        /// Longest slug used in generated names (values below 8 act as 8)
        #[arg(long, default_value_t = DEFAULT_MAX_SLUG_LEN)]
        max_name_len: usize,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    super::init_logging(cli.verbose);

    match &cli.command {
        Commands::Info { archive, provider } => {
            show_info(archive, *provider)?;
        }
        Commands::Export { archive, outdir, provider, max_name_len } => {
            let options = ProjectionOptions { max_name_len: *max_name_len };
            write_export(archive, outdir, *provider, &options)?;
        }
        Commands::Render { archive, output, provider, max_name_len } => {
            let options = ProjectionOptions { max_name_len: *max_name_len };
            render_document(archive, output.as_deref(), *provider, &options)?;
        }
    }

    Ok(())
}

/// An export plus whether its provider was auto-detected
struct LoadedExport {
    export: ChatExport,
    detected: bool,
}

fn load_export(path: &Path, choice: ProviderChoice) -> Result<LoadedExport> {
    let archive = Archive::open(path)?;

    let (provider, detected) = match choice.provider() {
        Some(provider) => (provider, false),
        None => {
            let provider =
                Provider::detect_in(&archive).context("Could not detect export provider")?;
            (provider, true)
        }
    };

    info!(provider = %provider, archive = %path.display(), "Loading export");
    Ok(LoadedExport { export: provider.load(&archive), detected })
}

fn show_info(path: &Path, choice: ProviderChoice) -> Result<()> {
    let LoadedExport { export, .. } = load_export(path, choice)?;
    let stats = export.stats();

    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

    println!("Chat Export Summary");
    println!("===================");
    println!("File: {}", file_name);
    println!("Provider: {}", export.provider);
    println!("Conversations: {}", stats.conversation_count);
    println!("Total messages: {}", stats.message_count);

    if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
        println!("Date range: {} to {}", earliest.format("%Y-%m-%d"), latest.format("%Y-%m-%d"));
    }
    if stats.project_count > 0 {
        println!("Projects: {}", stats.project_count);
        println!("Project documents: {}", stats.doc_count);
    }

    Ok(())
}

fn write_export(
    path: &Path,
    outdir: &Path,
    choice: ProviderChoice,
    options: &ProjectionOptions,
) -> Result<()> {
    if outdir.exists() && !outdir.is_dir() {
        bail!("Output path exists and is not a directory: {}", outdir.display());
    }

    let LoadedExport { export, detected } = load_export(path, choice)?;
    if detected {
        println!("Detected provider: {}", export.provider);
    }

    if export.conversations.is_empty() {
        bail!("No conversations found in {}", path.display());
    }

    println!("Found {} conversation(s)", export.conversations.len());
    if !export.projects.is_empty() {
        println!("Found {} project(s)", export.projects.len());
    }

    let namespace = build_namespace(&export, options);
    let stats = namespace.materialize(outdir)?;

    println!("Created {} directories, wrote {} files", stats.dirs_created, stats.files_written);
    println!("Output: {}", outdir.display());

    Ok(())
}

fn render_document(
    path: &Path,
    output: Option<&Path>,
    choice: ProviderChoice,
    options: &ProjectionOptions,
) -> Result<()> {
    let LoadedExport { export, .. } = load_export(path, choice)?;
    let json = build_namespace(&export, options).to_json_string()?;

    match output {
        Some(file) => fs::write(file, json)
            .with_context(|| format!("Failed to write namespace document: {}", file.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes()).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

//! docweave CLI application logic

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use docweave_ast::{Content, Header};
use docweave_core::{Config, OpenMode};

/// docweave - build Word and HTML documents from content nodes
#[derive(Parser, Debug)]
#[command(name = "docweave")]
#[command(author, version, about = "Build and edit .docx and .html documents", long_about = None)]
pub struct Cli {
    /// Settings file applied to every subcommand
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show format, paragraph count and custom properties
    Info {
        /// Document to inspect
        file: PathBuf,
    },

    /// List custom properties as name = value
    Props {
        /// Document to inspect
        file: PathBuf,
    },

    /// Print one custom property
    Get {
        /// Document to read
        file: PathBuf,

        /// Property name
        name: String,
    },

    /// Set a custom property and update the fields that show it
    Set {
        /// Document to update in place
        file: PathBuf,

        /// Property name
        name: String,

        /// New value
        value: String,
    },

    /// Append content to a document, creating it if needed
    Append {
        /// Document to append to
        file: PathBuf,

        /// Paragraph text (repeatable)
        #[arg(short, long)]
        text: Vec<String>,

        /// JSON file holding a content node, table rows or an array of nodes
        #[arg(short, long)]
        json: Option<PathBuf>,
    },

    /// Create a new, empty document
    New {
        /// Output file
        file: PathBuf,

        /// Title heading, also stored as the Title property
        #[arg(short, long)]
        title: Option<String>,
    },
}

/// Output format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Word package (`.docx`)
    Office,
    /// Standalone page (`.html`, `.htm`)
    Html,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "docx" => Ok(Format::Office),
            "html" | "htm" => Ok(Format::Html),
            _ => bail!(
                "Cannot tell the format of {}: expected .docx, .html or .htm",
                path.display()
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Office => "docx",
            Format::Html => "html",
        }
    }
}

/// A document of either backend
#[derive(Debug)]
pub enum AnyDocument {
    Office(docweave_ooxml::Document),
    Html(docweave_html::Document),
}

impl AnyDocument {
    /// Open `path` with the backend its extension selects
    pub fn open(path: &Path, mode: OpenMode, config: &Config) -> Result<Self> {
        let doc = match Format::from_path(path)? {
            Format::Office => AnyDocument::Office(docweave_ooxml::Document::open_with_config(
                path,
                mode,
                config.office.clone(),
            )?),
            Format::Html => AnyDocument::Html(docweave_html::Document::open_with_config(
                path,
                mode,
                config.html.clone(),
            )?),
        };
        debug!("Opened {} in {:?} mode", path.display(), mode);
        Ok(doc)
    }

    pub fn format(&self) -> Format {
        match self {
            AnyDocument::Office(_) => Format::Office,
            AnyDocument::Html(_) => Format::Html,
        }
    }

    pub fn append(&mut self, content: impl Into<Content>) -> Result<()> {
        match self {
            AnyDocument::Office(doc) => doc.append(content)?,
            AnyDocument::Html(doc) => doc.append(content)?,
        }
        Ok(())
    }

    pub fn paragraph_texts(&self) -> Vec<String> {
        match self {
            AnyDocument::Office(doc) => doc.paragraph_texts(),
            AnyDocument::Html(doc) => doc.paragraph_texts(),
        }
    }

    pub fn property_names(&self) -> Vec<String> {
        match self {
            AnyDocument::Office(doc) => doc.property_names(),
            AnyDocument::Html(doc) => doc.property_names(),
        }
    }

    pub fn get_property(&self, name: &str) -> Option<String> {
        match self {
            AnyDocument::Office(doc) => doc.get_property(name),
            AnyDocument::Html(doc) => doc.get_property(name),
        }
    }

    pub fn set_property(&mut self, name: &str, value: &str) {
        match self {
            AnyDocument::Office(doc) => doc.set_property(name, value),
            AnyDocument::Html(doc) => doc.set_property(name, value),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        match self {
            AnyDocument::Office(doc) => doc.write_to(path)?,
            AnyDocument::Html(doc) => doc.write_to(path)?,
        }
        Ok(())
    }

    /// Flush according to the open mode and release the workspace
    pub fn close(self) -> Result<()> {
        match self {
            AnyDocument::Office(doc) => doc.close()?,
            AnyDocument::Html(doc) => doc.close()?,
        }
        Ok(())
    }
}

/// Parse arguments, set up logging and run the selected subcommand
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let directives = log_directives(cli.verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid {}: {}", EnvFilter::DEFAULT_ENV, e);
        EnvFilter::new(default_level(cli.verbose))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    run(cli)
}

/// `RUST_LOG` wins when set; otherwise `-v` picks debug over warn
fn log_directives(verbose: bool, rust_log: Option<String>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_level(verbose).to_string())
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Run an already parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Info { file } => info_command(&file, &config),
        Commands::Props { file } => props_command(&file, &config),
        Commands::Get { file, name } => get_command(&file, &name, &config),
        Commands::Set { file, name, value } => set_command(&file, &name, &value, &config),
        Commands::Append { file, text, json } => {
            append_command(&file, &text, json.as_deref(), &config)
        }
        Commands::New { file, title } => new_command(&file, title.as_deref(), &config),
    }
}

/// Print format, paragraph count and properties
pub fn info_command(file: &Path, config: &Config) -> Result<()> {
    let doc = open_existing(file, config)?;

    println!("File: {}", file.display());
    println!("Format: {}", doc.format().as_str());
    println!("Paragraphs: {}", doc.paragraph_texts().len());

    let names = doc.property_names();
    if names.is_empty() {
        println!("Properties: none");
    } else {
        println!("Properties:");
        for name in names {
            println!("  {} = {}", name, doc.get_property(&name).unwrap_or_default());
        }
    }
    doc.close()
}

/// Print every property as `name = value`
pub fn props_command(file: &Path, config: &Config) -> Result<()> {
    let doc = open_existing(file, config)?;
    for name in doc.property_names() {
        println!("{} = {}", name, doc.get_property(&name).unwrap_or_default());
    }
    doc.close()
}

pub fn get_command(file: &Path, name: &str, config: &Config) -> Result<()> {
    let doc = open_existing(file, config)?;
    let Some(value) = doc.get_property(name) else {
        bail!("Property {} is not set in {}", name, file.display());
    };
    println!("{value}");
    doc.close()
}

pub fn set_command(file: &Path, name: &str, value: &str, config: &Config) -> Result<()> {
    let mut doc = AnyDocument::open(file, OpenMode::Update, config)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    doc.set_property(name, value);
    doc.close()
        .with_context(|| format!("Failed to save {}", file.display()))?;

    info!("Set {} in {}", name, file.display());
    println!("Set {name} = {value}");
    Ok(())
}

/// Append text paragraphs, then JSON content, in that order
pub fn append_command(
    file: &Path,
    texts: &[String],
    json: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let contents = match json {
        Some(path) => read_json_contents(path)?,
        None => Vec::new(),
    };
    if texts.is_empty() && contents.is_empty() {
        bail!("Nothing to append: pass --text or --json");
    }

    let mut doc = AnyDocument::open(file, OpenMode::Append, config)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let count = texts.len() + contents.len();
    for text in texts {
        doc.append(text.as_str())?;
    }
    for content in contents {
        doc.append(content)?;
    }
    doc.close()
        .with_context(|| format!("Failed to save {}", file.display()))?;

    println!("Appended {} block(s) to {}", count, file.display());
    Ok(())
}

pub fn new_command(file: &Path, title: Option<&str>, config: &Config) -> Result<()> {
    let mut doc = AnyDocument::open(file, OpenMode::Create, config)?;
    if let Some(title) = title {
        doc.append(Header::new(1, title))?;
        doc.set_property("Title", title);
    }
    doc.write_to(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    doc.close()?;

    println!("Created {} ({})", file.display(), Format::from_path(file)?.as_str());
    Ok(())
}

fn open_existing(file: &Path, config: &Config) -> Result<AnyDocument> {
    AnyDocument::open(file, OpenMode::CopyOnWrite, config)
        .with_context(|| format!("Failed to open {}", file.display()))
}

/// Content values from a JSON file
///
/// An array whose items are all arrays is table data; any other array is
/// a sequence of content values.
pub fn read_json_contents(path: &Path) -> Result<Vec<Content>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    json_contents(&value).with_context(|| format!("Unsupported content in {}", path.display()))
}

fn json_contents(value: &Value) -> Result<Vec<Content>> {
    match value {
        Value::Array(items) if !items.iter().all(Value::is_array) => items
            .iter()
            .map(|item| Content::from_json(item).map_err(anyhow::Error::from))
            .collect(),
        other => Ok(vec![Content::from_json(other)?]),
    }
}

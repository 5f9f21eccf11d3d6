//! # folio-cli
//!
//! Command-line driver for document structure inference.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use folio_structure::{
    build_graph, extract_cross_references, extract_index, find_references, Analyzer,
    AnalyzerConfig, DocumentInput, IndexResult,
};
use folio_types::{
    CrossReference, ExtractedDocument, FontObservation, OutlineNode, ReferenceTarget,
    StructureResult,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// folio - recover chapters, sections, index and cross references from a document
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Document structure inference", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format (json, llm, markdown, summary)
    #[arg(short = 'f', long = "format", global = true, default_value = "summary")]
    format: OutputFormat,

    /// YAML file overriding detector thresholds
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Infer the section hierarchy and attach index and cross references
    Analyze {
        /// Plain text, or the extractor's JSON output (`.json`)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Embedded outline as JSON: `[{title, pageNumber, children}]`
        #[arg(long, value_name = "FILE")]
        outline: Option<PathBuf>,

        /// Font observations as JSON: `[{text, page, fontHeight, fontName}]`
        #[arg(long, value_name = "FILE")]
        fonts: Option<PathBuf>,

        /// Run detectors one after another instead of concurrently
        #[arg(long)]
        sequential: bool,
    },
    /// Print the back-of-book index
    Index {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Only entries whose term or sub-entry contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print in-text cross references
    Refs {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Only references to this chapter
        #[arg(long, conflicts_with_all = ["section", "page"])]
        chapter: Option<String>,

        /// Only references to this section
        #[arg(long, conflicts_with = "page")]
        section: Option<String>,

        /// Only references to this page
        #[arg(long)]
        page: Option<u32>,
    },
}

/// Output format for results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Flat JSON layout for LLM prompts
    Llm,
    /// Markdown outline
    Markdown,
    /// Colored human-readable summary (default)
    #[default]
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze {
            input,
            outline,
            fonts,
            sequential,
        } => {
            let mut document = load_document(&input)?;
            if let Some(path) = outline {
                document.outline = Some(load_json::<Vec<OutlineNode>>(&path)?);
            }
            if let Some(path) = fonts {
                document.fonts = Some(load_json::<Vec<FontObservation>>(&path)?);
            }
            let result = run_analysis(config, document, sequential).await?;
            print_structure(&result, cli.format)
        }
        Command::Index { input, search } => {
            let document = load_document(&input)?;
            let index = extract_index(&document.text, &config.index);
            print_index(&index, search.as_deref(), cli.format)
        }
        Command::Refs {
            input,
            chapter,
            section,
            page,
        } => {
            let document = load_document(&input)?;
            let refs = extract_cross_references(
                &document.text,
                document.page_map.as_ref(),
                &config.cross_refs,
            );
            let target = reference_target(chapter, section, page);
            let selected: Vec<&CrossReference> = match &target {
                Some(target) => find_references(&refs, target),
                None => refs.iter().collect(),
            };
            print_references(&selected, config.cross_refs.graph_bucket_pages, cli.format)
        }
    }
}

/// Loads the YAML config, falling back to defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    let Some(path) = path else {
        return Ok(AnalyzerConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: AnalyzerConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Reads the document text. A `.json` file is taken to be the extractor's
/// output and also supplies the page map.
fn load_document(path: &Path) -> Result<DocumentInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Ok(DocumentInput::from_text(raw));
    }

    let extracted: ExtractedDocument = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid extractor output: {}", path.display()))?;
    if !extracted.success {
        bail!(
            "Text extraction failed for {}: {}",
            path.display(),
            extracted.error.as_deref().unwrap_or("unknown error")
        );
    }

    let page_map = extracted.page_map();
    let mut document = DocumentInput::from_text(extracted.text);
    document.page_map = page_map;
    Ok(document)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

async fn run_analysis(
    config: AnalyzerConfig,
    document: DocumentInput,
    sequential: bool,
) -> Result<StructureResult> {
    let analyzer = Analyzer::new(config)?;
    if sequential {
        return Ok(analyzer.analyze(&document)?);
    }

    let cancel = async {
        // Without a signal handler the run simply cannot be interrupted.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let result = analyzer
        .analyze_concurrently(Arc::new(document), cancel)
        .await?;
    info!(method = result.detection_method.as_str(), "analysis complete");
    Ok(result)
}

fn reference_target(
    chapter: Option<String>,
    section: Option<String>,
    page: Option<u32>,
) -> Option<ReferenceTarget> {
    chapter
        .map(ReferenceTarget::Chapter)
        .or_else(|| section.map(ReferenceTarget::Section))
        .or_else(|| page.map(ReferenceTarget::Page))
}

fn print_structure(result: &StructureResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Llm => println!("{}", serde_json::to_string_pretty(&result.to_llm_json())?),
        OutputFormat::Markdown => print!("{}", result.to_markdown()),
        OutputFormat::Summary => {
            let status = if result.detected {
                "detected".green().bold()
            } else {
                "not detected".yellow().bold()
            };
            println!("{} {}", "Structure:".cyan().bold(), status);
            println!(
                "  method: {}  confidence: {:.2}  sections: {}",
                result.detection_method.as_str(),
                result.confidence,
                result.section_count()
            );
            for section in &result.sections {
                for (depth, node) in section.walk() {
                    println!(
                        "{}{} {}",
                        "  ".repeat(depth),
                        node.title,
                        format!("(pp. {}-{})", node.page_range.start, node.page_range.end).dimmed()
                    );
                }
            }
            if let Some(index) = &result.index {
                println!("{} {} entries", "Index:".cyan().bold(), index.len());
            }
            if let Some(refs) = &result.cross_references {
                println!("{} {}", "Cross references:".cyan().bold(), refs.len());
            }
        }
    }
    Ok(())
}

fn print_index(index: &IndexResult, search: Option<&str>, format: OutputFormat) -> Result<()> {
    let entries: Vec<_> = match search {
        Some(needle) => index.search(needle),
        None => index.entries.iter().collect(),
    };

    match format {
        OutputFormat::Json | OutputFormat::Llm => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Markdown | OutputFormat::Summary => {
            if !index.detected {
                println!("{}", "No index detected".yellow());
                return Ok(());
            }
            for entry in entries {
                let pages: Vec<String> = entry.pages.iter().map(u32::to_string).collect();
                println!("{}: {}", entry.term.bold(), pages.join(", "));
                for sub in &entry.sub_entries {
                    println!("    {}", sub);
                }
                if let Some(see_also) = &entry.see_also {
                    println!("    {} {}", "see also".dimmed(), see_also.join("; "));
                }
            }
        }
    }
    Ok(())
}

fn print_references(refs: &[&CrossReference], bucket_pages: u32, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Llm => {
            let owned: Vec<CrossReference> = refs.iter().map(|reference| (*reference).clone()).collect();
            let graph = build_graph(&owned, bucket_pages);
            let json = serde_json::json!({ "references": owned, "graph": graph });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Markdown | OutputFormat::Summary => {
            for reference in refs {
                println!(
                    "p.{:<4} {:<13} {} {}",
                    reference.from.page,
                    reference.kind.as_str(),
                    reference.to.key().cyan(),
                    format!("\"{}\"", reference.from.matched_text).dimmed()
                );
            }
            println!("{} {}", "Total:".bold(), refs.len());
        }
    }
    Ok(())
}

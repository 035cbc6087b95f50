//! kwindex CLI - incremental keyword indexing
//!
//! Re-indexes a data root of keyword descriptors and typeset documents,
//! and answers questions against the persisted indices.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use kwindex::{find_citations, Config, KeywordIndex, RelationIndex};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kwindex")]
#[command(author, version, about = "Incremental keyword and document-relation indexer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the conventional layout config and create its directories
    Init {
        /// Data root to initialize
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Document extension filter
        #[arg(long, default_value = ".tex")]
        document_ext: String,
    },

    /// Re-scan keyword descriptors and documents, updating both indices
    Rescan {
        /// Data root to scan
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List raw keyword references found in one document
    Refs {
        /// Document to scan
        file: PathBuf,

        /// Data root holding the indices
        #[arg(short = 'p', long, default_value = ".")]
        path: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show canonical keywords and their registered aliases
    Synonyms {
        /// Data root holding the indices
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Register a synonym for an existing canonical keyword
    Alias {
        /// Canonical keyword the alias resolves to
        canonical: String,

        /// The alias to register
        synonym: String,

        /// Data root holding the indices
        #[arg(short = 'p', long, default_value = ".")]
        path: PathBuf,
    },

    /// List citation references in a document
    Cites {
        /// Document to scan
        file: PathBuf,
    },

    /// Show index statistics
    Stats {
        /// Data root holding the indices
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { path, document_ext } => cmd_init(path, document_ext),
        Commands::Rescan { path } => cmd_rescan(path),
        Commands::Refs { file, path, json } => cmd_refs(file, path, json),
        Commands::Synonyms { path } => cmd_synonyms(path),
        Commands::Alias {
            canonical,
            synonym,
            path,
        } => cmd_alias(canonical, synonym, path),
        Commands::Cites { file } => cmd_cites(file),
        Commands::Stats { path } => cmd_stats(path),
    }
}

fn open_keywords(config: &Config) -> Result<KeywordIndex> {
    Ok(KeywordIndex::with_options(
        &config.keyword_index,
        Some(config.keyword_dir.clone()),
        &config.keyword_ext,
    )?)
}

fn open_relations(config: &Config) -> Result<RelationIndex> {
    let keywords = open_keywords(config)?;
    Ok(RelationIndex::with_options(
        &config.relation_index,
        keywords,
        Some(config.relation_dir.clone()),
        &config.document_ext,
    )?)
}

fn cmd_init(path: PathBuf, document_ext: String) -> Result<()> {
    let config = Config::new(path.clone()).with_document_ext(&document_ext);
    std::fs::create_dir_all(&config.keyword_dir)?;
    std::fs::create_dir_all(&config.relation_dir)?;
    config.save()?;

    println!(
        "{} {}",
        "Initialized".green().bold(),
        config.config_path().display()
    );
    println!("  descriptors: {}", config.keyword_dir.display());
    println!("  documents:   {}", config.relation_dir.display());

    Ok(())
}

fn cmd_rescan(path: PathBuf) -> Result<()> {
    let config = Config::load_or_default(&path)?;
    let mut relations = open_relations(&config)?;

    // Vocabulary first, so the report separates the two indices; the
    // relation rescan re-runs it as a no-op.
    let keywords_changed = relations.keywords_mut().rescan()?;
    report_rescan("Keyword index", keywords_changed);

    let relations_changed = relations.rescan()?;
    report_rescan("Relation index", relations_changed);

    Ok(())
}

fn report_rescan(name: &str, changed: bool) {
    if changed {
        println!("{} {} has been updated.", "✓".green(), name);
    } else {
        println!("{} {} unchanged.", "·".dimmed(), name);
    }
}

fn cmd_refs(file: PathBuf, path: PathBuf, json: bool) -> Result<()> {
    let config = Config::load_or_default(&path)?;
    let relations = open_relations(&config)?;

    let raw = relations.find_keyword_references(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        println!(
            "{} references in {}:",
            raw.len().to_string().green().bold(),
            file.display()
        );
        for token in raw {
            let canonical = relations.keywords().resolve(&token)?;
            if canonical == token {
                println!("  {token}");
            } else {
                println!("  {token} {} {canonical}", "->".dimmed());
            }
        }
    }

    Ok(())
}

fn cmd_synonyms(path: PathBuf) -> Result<()> {
    let config = Config::load_or_default(&path)?;
    let keywords = open_keywords(&config)?;

    if keywords.is_empty() {
        println!("No keywords registered. Run {} first.", "kwindex rescan".yellow());
        return Ok(());
    }

    for (canonical, aliases) in keywords.synonyms() {
        if aliases.is_empty() {
            println!("{}", canonical.green());
        } else {
            println!("{}: {}", canonical.green(), aliases.join(", "));
        }
    }

    Ok(())
}

fn cmd_alias(canonical: String, synonym: String, path: PathBuf) -> Result<()> {
    let config = Config::load_or_default(&path)?;
    let mut keywords = open_keywords(&config)?;

    if keywords.register_synonym(&canonical, &synonym)? {
        keywords.save()?;
        println!(
            "{} {} now resolves to {}",
            "✓".green(),
            synonym.yellow(),
            canonical.green()
        );
    } else {
        println!("{} already registered", synonym.yellow());
    }

    Ok(())
}

fn cmd_cites(file: PathBuf) -> Result<()> {
    let citations = find_citations(&file)?;

    if citations.is_empty() {
        println!("No citations found in {}", file.display());
        return Ok(());
    }

    for reference in citations {
        println!("{reference}");
    }

    Ok(())
}

fn cmd_stats(path: PathBuf) -> Result<()> {
    let config = Config::load_or_default(&path)?;
    let relations = open_relations(&config)?;
    let keywords = relations.keywords();

    let canonical = keywords.unique_keys().count();
    let synonyms = keywords.len() - canonical;

    println!("{}", "Index Statistics".cyan().bold());
    println!("  Canonical keywords: {}", canonical.to_string().green());
    println!("  Synonyms:           {}", synonyms.to_string().green());
    println!("  Documents:          {}", relations.len().to_string().green());
    print_origin("keyword index", keywords.path());
    print_origin("relation index", relations.path());

    Ok(())
}

fn print_origin(name: &str, path: &Path) {
    if path.exists() {
        println!("  ({} at {})", name, path.display());
    } else {
        println!("  ({} not yet written)", name);
    }
}

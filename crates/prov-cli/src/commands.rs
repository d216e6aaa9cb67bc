use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use prov_lineage::{Direction, InMemoryCatalog, Walker};
use prov_manifest::Manifest;
use prov_merge::{merge_selectors, CollectionSource, MergeError, MergeResult, MergedCollection, Selector};
use prov_types::NodeId;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, cli.format),
        Command::Ls(args) => cmd_ls(args, cli.format),
        Command::Hash(args) => cmd_hash(args, cli.format),
        Command::Lineage(args) => cmd_lineage(args, cli.format, config),
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Split an `ID=FILE` argument, normalizing the identifier.
fn parse_source(arg: &str) -> anyhow::Result<(String, &Path)> {
    let Some((id, file)) = arg.split_once('=') else {
        bail!("expected ID=FILE, got {arg:?}");
    };
    let Some(id) = NodeId::parse(id) else {
        bail!("{id:?} is neither a content hash nor a UUID");
    };
    Ok((id.key(), Path::new(file)))
}

fn load_sources(args: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut sources = BTreeMap::new();
    for arg in args {
        let (id, path) = parse_source(arg)?;
        debug!(id = %id, path = %path.display(), "loaded source manifest");
        sources.insert(id, read_text(path)?);
    }
    Ok(sources)
}

/// Manifests given on the command line, falling back to files named by
/// collection ID under an optional directory.
struct CliSources {
    loaded: BTreeMap<String, String>,
    dir: Option<PathBuf>,
}

impl CollectionSource for CliSources {
    fn manifest_text(&self, id: &NodeId) -> MergeResult<Option<String>> {
        if let Some(text) = self.loaded.manifest_text(id)? {
            return Ok(Some(text));
        }
        let Some(dir) = &self.dir else {
            return Ok(None);
        };
        let path = dir.join(id.key());
        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(id = %id, path = %path.display(), "read source manifest");
                Ok(Some(text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(MergeError::Source(format!("{}: {err}", path.display()))),
        }
    }
}

fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let sources = CliSources {
        loaded: load_sources(&args.sources)?,
        dir: args.source_dir,
    };
    let selectors = args
        .selectors
        .iter()
        .map(|s| {
            let selector = Selector::parse(s)?;
            Ok(match &args.into {
                Some(dest) => selector.with_dest(dest.clone()),
                None => selector,
            })
        })
        .collect::<Result<Vec<_>, MergeError>>()?;

    let merged = merge_selectors(&selectors, &sources)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&merge_json(&merged))?),
        OutputFormat::Text => {
            print!("{}", merged.manifest_text);
            for copy in merged.report.renamed() {
                eprintln!("  {} {} -> {}", "renamed:".yellow(), copy.source, copy.dest.bold());
            }
            for path in &merged.report.skipped {
                eprintln!("  {} {}", "skipped:".yellow(), path);
            }
            eprintln!(
                "{} {} files, portable data hash {}",
                "✓".green().bold(),
                merged.manifest.file_count(),
                merged.portable_data_hash.to_string().cyan()
            );
        }
    }
    Ok(())
}

fn merge_json(merged: &MergedCollection) -> serde_json::Value {
    let copied: Vec<_> = merged
        .report
        .copied
        .iter()
        .map(|c| json!({"source": c.source, "dest": c.dest, "renamed": c.renamed}))
        .collect();
    json!({
        "manifest_text": merged.manifest_text,
        "portable_data_hash": merged.portable_data_hash.to_string(),
        "copied": copied,
        "skipped": merged.report.skipped,
    })
}

fn cmd_ls(args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let text = read_text(&args.file)?;
    let manifest = Manifest::parse(&text)?;
    let pdh = prov_crypto::portable_data_hash(&manifest.to_text());

    match format {
        OutputFormat::Json => {
            let files: Vec<_> = manifest
                .streams()
                .flat_map(|stream| {
                    stream.files().iter().map(move |file| {
                        json!({
                            "path": prov_manifest::join_path(stream.path(), file.name()),
                            "size": file.size(),
                        })
                    })
                })
                .collect();
            let out = json!({"portable_data_hash": pdh.to_string(), "files": files});
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for stream in manifest.streams() {
                for file in stream.files() {
                    let path = prov_manifest::join_path(stream.path(), file.name());
                    println!("{:>12}  {}", file.size(), path);
                }
            }
            println!(
                "{} files, {} bytes, portable data hash {}",
                manifest.file_count().to_string().bold(),
                manifest.total_size(),
                pdh.to_string().cyan()
            );
        }
    }
    Ok(())
}

fn cmd_hash(args: HashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let text = read_text(&args.file)?;
    Manifest::parse(&text).with_context(|| format!("{} is not a manifest", args.file.display()))?;
    let pdh = prov_crypto::portable_data_hash(&text);
    match format {
        OutputFormat::Json => println!("{}", json!({"portable_data_hash": pdh.to_string()})),
        OutputFormat::Text => println!("{pdh}"),
    }
    Ok(())
}

fn cmd_lineage(args: LineageArgs, format: OutputFormat, config: CliConfig) -> anyhow::Result<()> {
    let text = read_text(&args.catalog)?;
    let catalog = InMemoryCatalog::from_json(&text)
        .with_context(|| format!("parsing catalog {}", args.catalog.display()))?;

    let mut walker_config = config.walker;
    if let Some(max) = args.max_nodes {
        walker_config.max_nodes = Some(max);
    }
    let direction = if args.down {
        Direction::Downstream
    } else {
        Direction::Upstream
    };

    let trace = Walker::with_config(&catalog, walker_config).walk_traced(&args.id, direction)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trace.graph)?),
        OutputFormat::Text => {
            println!("{} lineage of {}", direction.to_string().bold(), args.id.yellow());
            for (id, node) in trace.graph.iter() {
                println!("  {:<18} {}  {}", node.kind().cyan(), id, node.label().dimmed());
            }
            for id in &trace.denied {
                println!("  {} {}", "denied:".red(), id);
            }
            if trace.truncated {
                println!("  {}", "(truncated at node limit)".yellow());
            }
            println!("{} {} nodes", "✓".green().bold(), trace.graph.len());
        }
    }
    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "prov",
    about = "Merge collection manifests and walk their lineage",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge files from several collections into one manifest
    Merge(MergeArgs),
    /// List the files of a manifest
    Ls(LsArgs),
    /// Print the portable data hash of a manifest
    Hash(HashArgs),
    /// Walk the lineage of a collection
    Lineage(LineageArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Manifest text for a collection, as ID=FILE
    #[arg(long = "source", value_name = "ID=FILE")]
    pub sources: Vec<String>,
    /// Directory of manifests named by collection ID, read on demand
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,
    /// Destination directory for every selector
    #[arg(long)]
    pub into: Option<String>,
    /// What to copy, as ID or ID/PATH
    #[arg(required = false)]
    pub selectors: Vec<String>,
}

#[derive(Args)]
pub struct LsArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct LineageArgs {
    /// JSON catalog of collections, jobs, containers and links
    #[arg(long)]
    pub catalog: PathBuf,
    /// Walk downstream instead of upstream
    #[arg(long)]
    pub down: bool,
    /// Stop after this many nodes
    #[arg(long)]
    pub max_nodes: Option<usize>,
    /// Content hash or UUID to start from
    pub id: String,
}

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::model::record::RecordId;

#[derive(Parser)]
#[command(
    name = "tisk",
    about = concat!(
        "tisk v",
        env!("CARGO_PKG_VERSION"),
        " - outline-ordered tasks and projects, offline"
    ),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to read
    #[arg(long, global = true, default_value = "tisk.toml")]
    pub config: PathBuf,

    /// Snapshot directory (overrides the config)
    #[arg(long = "cache-dir", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter tisk.toml
    Init(InitArgs),
    /// Show the outline of a JSON file of tasks or projects
    Tree(TreeArgs),
    /// Replace a saved snapshot with the contents of a JSON file
    Import(ImportArgs),
    /// List the saved projects as an outline
    List(ListArgs),
    /// Delete a saved project and everything nested under it
    Delete(DeleteArgs),
    /// Indent or outdent a saved project
    Indent(IndentArgs),
    /// Renumber saved projects by their position
    Renumber,
    /// Show the saved start page
    Queries(QueriesArgs),
    /// Remove every saved snapshot
    Clear,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Task,
    Project,
}

#[derive(Args)]
pub struct TreeArgs {
    /// JSON array of records
    pub file: PathBuf,
    /// What the file holds
    #[arg(long, value_enum, default_value = "task")]
    pub kind: RecordKind,
    /// Include records under collapsed parents
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON array of projects (or query results with --queries)
    pub file: PathBuf,
    /// The file holds start-page query results
    #[arg(long)]
    pub queries: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Include projects under collapsed parents
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Project id
    pub id: RecordId,
}

#[derive(Args)]
pub struct IndentArgs {
    /// Project id
    pub id: RecordId,
    /// Outdent instead
    #[arg(long)]
    pub out: bool,
}

#[derive(Args)]
pub struct QueriesArgs {
    /// Print the queries a start-page setting expands to instead
    #[arg(long, value_name = "SETTING")]
    pub expand: Option<String>,
}

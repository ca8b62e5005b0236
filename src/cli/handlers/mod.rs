mod init;
pub use init::cmd_init;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::cache::FileSnapshotCache;
use crate::io::config_io;
use crate::io::snapshots::CacheManager;
use crate::model::config::Config;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::ops::project_ops::{ProjectCollection, ProjectSnapshotHook};
use crate::ops::queries::{self, QueryResults};
use crate::ops::task_ops::TaskCollection;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// What every command that touches snapshots needs
struct Session {
    config: Config,
    cache: CacheManager,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let session = || open_session(&cli.config, cli.cache_dir.as_deref(), json);

    match cli.command {
        // Neither needs the snapshot cache
        Commands::Init(args) => cmd_init(args, &cli.config),
        Commands::Tree(args) => {
            let config = config_io::read_config(&cli.config)?;
            cmd_tree(args, &config, json)
        }

        // Read commands
        Commands::List(args) => cmd_list(args, &session()?),
        Commands::Queries(args) => cmd_queries(args, &session()?),

        // Write commands
        Commands::Import(args) => cmd_import(args, &session()?),
        Commands::Delete(args) => cmd_delete(args, &session()?),
        Commands::Indent(args) => cmd_indent(args, &session()?),
        Commands::Renumber => cmd_renumber(&session()?),
        Commands::Clear => cmd_clear(&session()?),
    }
}

fn open_session(
    config_path: &Path,
    cache_dir: Option<&Path>,
    json: bool,
) -> Result<Session, Box<dyn std::error::Error>> {
    let config = config_io::read_config(config_path)?;
    let dir = match cache_dir {
        Some(dir) => dir.to_path_buf(),
        None => config_io::resolve_cache_dir(&config, config_path),
    };
    debug!(dir = %dir.display(), "opening snapshot cache");
    let store = FileSnapshotCache::open(&dir)?;
    let cache = CacheManager::with_config(Arc::new(store), &config.cache);
    Ok(Session {
        config,
        cache,
        json,
    })
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("could not parse {}: {}", path.display(), e))?;
    Ok(value)
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The saved project list regardless of age, mirrored back on change
fn load_projects(session: &Session) -> Result<ProjectCollection, Box<dyn std::error::Error>> {
    let saved = session.cache.projects_any_age()?.unwrap_or_default();
    Ok(ProjectCollection::seeded(session.cache.clone(), saved))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_tree(args: TreeArgs, config: &Config, json: bool) -> CmdResult {
    let lines = match args.kind {
        RecordKind::Task => {
            let mut tasks = TaskCollection::default();
            tasks.import_array(read_json_file::<Vec<Task>>(&args.file)?);
            if json {
                return print_json(&tree_to_json(&tasks));
            }
            let tz = config.user.tz_offset_hours;
            let now = Utc::now();
            format_tree(&tasks, args.all, |t| format_task_line(t, tz, now))
        }
        RecordKind::Project => {
            let mut projects = ProjectCollection::new(ProjectSnapshotHook::default());
            projects.import_array(read_json_file::<Vec<Project>>(&args.file)?);
            if json {
                return print_json(&tree_to_json(&projects));
            }
            format_tree(&projects, args.all, format_project_line)
        }
    };
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_list(args: ListArgs, session: &Session) -> CmdResult {
    let projects = load_projects(session)?;
    if session.json {
        let out: Vec<ProjectJson> = projects
            .records()
            .iter()
            .map(|p| project_to_json(&projects, p))
            .filter(|p| args.all || !p.hidden)
            .collect();
        return print_json(&out);
    }
    if projects.is_empty() {
        println!("no saved projects");
        return Ok(());
    }
    for line in format_tree(&projects, args.all, format_project_line) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_queries(args: QueriesArgs, session: &Session) -> CmdResult {
    if let Some(setting) = args.expand {
        let now = Utc::now().naive_utc()
            + chrono::Duration::hours(session.config.user.tz_offset_hours as i64);
        let expanded = queries::start_page_queries(&setting, now);
        if session.json {
            return print_json(&expanded);
        }
        for query in expanded {
            println!("{}", query);
        }
        return Ok(());
    }

    let Some(mut results) = session.cache.start_page_queries_any_age()? else {
        if session.json {
            return print_json(&serde_json::Value::Null);
        }
        println!("no saved start page");
        return Ok(());
    };
    if session.json {
        return print_json(&start_page_to_json(&mut results));
    }
    let tz = session.config.user.tz_offset_hours;
    for line in format_start_page(&mut results, tz, Utc::now()) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_import(args: ImportArgs, session: &Session) -> CmdResult {
    if args.queries {
        let mut results: QueryResults = read_json_file(&args.file)?;
        session.cache.set_start_page_queries(&results)?;
        let count = results.aggregate().len();
        info!(queries = results.results().len(), tasks = count, "imported start page");
        println!("imported {} queries ({} tasks)", results.results().len(), count);
        return Ok(());
    }

    let incoming: Vec<Project> = read_json_file(&args.file)?;
    let mut projects = ProjectCollection::seeded(session.cache.clone(), Vec::new());
    projects.import_array(incoming);
    info!(count = projects.len(), "imported projects");
    println!("imported {} projects", projects.len());
    Ok(())
}

fn cmd_delete(args: DeleteArgs, session: &Session) -> CmdResult {
    let mut projects = load_projects(session)?;
    let Some(project) = projects.get(args.id) else {
        return Err(format!("no saved project with id {}", args.id).into());
    };
    let name = project.display_name().to_string();
    let before = projects.len();
    projects.delete(args.id);
    let removed = before - projects.len();
    println!("deleted {} ({} project(s) removed)", name, removed);
    Ok(())
}

fn cmd_indent(args: IndentArgs, session: &Session) -> CmdResult {
    let mut projects = load_projects(session)?;
    if projects.get(args.id).is_none() {
        return Err(format!("no saved project with id {}", args.id).into());
    }
    let delta = if args.out { -1 } else { 1 };
    projects.reindent(args.id, delta);
    let indent = projects.get(args.id).map_or(0, |p| p.meta.indent());
    let parent = projects.parent(args.id).map(|p| p.display_name().to_string());
    match parent {
        Some(parent) => println!("{} now at indent {} under {}", args.id, indent, parent),
        None => println!("{} now at indent {}", args.id, indent),
    }
    Ok(())
}

fn cmd_renumber(session: &Session) -> CmdResult {
    let mut projects = load_projects(session)?;
    projects.update_orders();
    println!("renumbered {} projects", projects.len());
    Ok(())
}

fn cmd_clear(session: &Session) -> CmdResult {
    session.cache.clear_all()?;
    println!("cleared saved snapshots");
    Ok(())
}

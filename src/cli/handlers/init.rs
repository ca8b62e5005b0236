use std::fs;
use std::path::Path;

use tracing::info;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, DEFAULT_CACHE_DIR};

const CONFIG_TEMPLATE: &str = r##"# tisk configuration

[cache]
# Snapshot directory, relative to this file.
dir = "{cache_dir}"

# How long saved snapshots stay usable, in seconds.
projects_max_age_secs = 86400
queries_max_age_secs = 7200

[user]
# Offset of your timezone from UTC, in whole hours.
tz_offset_hours = 0
"##;

pub fn cmd_init(args: InitArgs, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let text = CONFIG_TEMPLATE.replace("{cache_dir}", DEFAULT_CACHE_DIR);
    fs::write(config_path, text)?;

    // make sure what we wrote reads back
    let config = config_io::read_config(config_path)?;
    let cache_dir = config_io::resolve_cache_dir(&config, config_path);
    info!(path = %config_path.display(), cache = %cache_dir.display(), "wrote config");
    println!("wrote {}", config_path.display());
    Ok(())
}

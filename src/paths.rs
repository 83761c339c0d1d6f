use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data roots
const APP_DIR: &str = "reel";

/// Environment override for the config/data directory
pub const CONFIG_DIR_ENV: &str = "REEL_CONFIG_DIR";

/// Default playlist file name
pub const PLAYLIST_FILE: &str = "reel.json";

/// Default log file name
pub const LOG_FILE: &str = "reel.log";

/// Overrides for the default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (REEL_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a configuration file (playlists).
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. REEL_CONFIG_DIR environment variable
/// 3. Current folder IF it already holds reel.json or reel.log
/// 4. Platform config directory from dirs-next (~/.config/reel on Linux)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    let cwd = std::env::current_dir().ok();
    resolve_dir(config, cwd.as_deref(), dirs_next::config_dir()).join(name)
}

/// Path to a data file (logs). Same priority as [`config_file`], with the
/// platform data directory (~/.local/share/reel on Linux) as the default.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    let cwd = std::env::current_dir().ok();
    resolve_dir(config, cwd.as_deref(), dirs_next::data_dir()).join(name)
}

/// Create the directories holding `files` if missing.
pub fn ensure_parent_dirs(files: &[&Path]) -> Result<()> {
    for file in files {
        if let Some(dir) = file.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [PLAYLIST_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, cwd: Option<&Path>, platform_root: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Some(cwd) = cwd
        && has_local_files(cwd)
    {
        return cwd.to_path_buf();
    }

    platform_root
        .map(|root| root.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

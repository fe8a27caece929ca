use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AerostockConfig {
    pub database: Option<String>,
    pub user: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("aerostock.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".aerostock").join("inventory.db")
}

/// Name stamped into audit fields when neither flag nor config sets one
pub fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

impl AerostockConfig {
    /// Database path: flag, then config file, then the default under `base`
    pub fn resolve_database(&self, flag: Option<&Path>, base: &Path) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        match &self.database {
            Some(db) => base.join(db),
            None => default_database_path_in(base),
        }
    }

    /// Acting user: flag, then config file, then the environment
    pub fn resolve_user(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.user.clone())
            .unwrap_or_else(default_user)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Option<AerostockConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: AerostockConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &AerostockConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".aerostock/";

    let mut content = String::new();
    if gitignore_path.exists() {
        content = std::fs::read_to_string(&gitignore_path)?;
        if content.lines().any(|line| line.trim() == entry) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}

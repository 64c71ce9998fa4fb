//! `envelopr init`: config file and project directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::{DEFAULT_CONFIG, PathsConfig};
use crate::log;

/// Write the default config into `root` and create the default directories.
///
/// Refuses to overwrite an existing config unless `force` is set. Existing
/// directories are left as they are.
pub fn init_project(root: &Path, config_name: &Path, force: bool) -> Result<PathBuf> {
    let config_path = root.join(config_name);
    if config_path.exists() && !force {
        bail!(
            "`{}` already exists, use --force to overwrite it",
            config_path.display()
        );
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create project directory {}", root.display()))?;
    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    log!("init"; "created {}", config_path.display());

    let paths = PathsConfig::default();
    for dir in [&paths.documents, &paths.partials, &paths.output] {
        let dir = root.join(dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        log!("init"; "created {}/", dir.display());
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mails");

        let config = init_project(&root, Path::new("envelopr.toml"), false).unwrap();
        assert_eq!(fs::read_to_string(config).unwrap(), DEFAULT_CONFIG);
        assert!(root.join("documents").is_dir());
        assert!(root.join("partials").is_dir());
        assert!(root.join("output").is_dir());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("envelopr.toml"), "# mine").unwrap();

        let err = init_project(dir.path(), Path::new("envelopr.toml"), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            fs::read_to_string(dir.path().join("envelopr.toml")).unwrap(),
            "# mine"
        );
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("envelopr.toml"), "# mine").unwrap();

        init_project(dir.path(), Path::new("envelopr.toml"), true).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("envelopr.toml")).unwrap(),
            DEFAULT_CONFIG
        );
    }
}

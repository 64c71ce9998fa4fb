//! Project configuration management for `envelopr.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                            |
//! |---------------|----------------------------------------------------|
//! | `[paths]`     | Documents, partials and output directories         |
//! | `[mjml]`      | MJML compilation (comments, fonts)                 |
//! | `[template]`  | Global and per-document variables, href handling   |
//! | `[serve]`     | Preview server (interface, ports)                  |

mod error;
pub mod section;
mod template;
mod util;

pub use error::ConfigError;
pub use section::{MjmlConfig, PathsConfig, ServeConfig, TemplateConfig};
pub use template::DEFAULT_CONFIG;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands, PathArgs};
use crate::compiler::CompileOptions;
use crate::log;
use util::find_config_file;

/// Root configuration structure representing envelopr.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub mjml: MjmlConfig,

    #[serde(default)]
    pub template: TemplateConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl ProjectConfig {
    /// Load configuration for the `build` and `serve` commands.
    ///
    /// Searches upward from cwd for the config file; the project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = find_config_file(&cli.config, &cwd)
            .ok_or_else(|| ConfigError::NotFound(cwd.join(&cli.config)))?;

        let mut config = Self::from_path(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.config_path = crate::utils::path::normalize_path(&config_path);
        config.apply_command_options(cli);
        config.finalize(&root);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Set the project root and resolve every path against it.
    pub fn finalize(&mut self, root: &Path) {
        self.root = crate::utils::path::normalize_path(root);
        self.paths.resolve(&self.root);
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { paths } => self.apply_path_args(paths),
            Commands::Serve {
                paths,
                interface,
                port,
            } => {
                self.apply_path_args(paths);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            Commands::Init { .. } => {}
        }
    }

    fn apply_path_args(&mut self, args: &PathArgs) {
        Self::update_option(&mut self.paths.documents, args.documents.as_ref());
        Self::update_option(&mut self.paths.partials, args.partials.as_ref());
        Self::update_option(&mut self.paths.output, args.output.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Options for the MJML compilation stage.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            keep_comments: self.mjml.keep_comments,
            fonts: self.mjml.fonts.clone(),
            preserve_href_expressions: self.template.preserve_href_expressions,
        }
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.documents.as_os_str().is_empty() {
            return Err(ConfigError::Validation("`paths.documents` must not be empty".into()));
        }
        if self.paths.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation("`paths.output` must not be empty".into()));
        }
        if self.paths.output == self.paths.documents {
            return Err(ConfigError::Validation(
                "`paths.output` must differ from `paths.documents`".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with default paths resolved.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> ProjectConfig {
    let mut config = test_parse_config(content);
    config.finalize(root);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(ProjectConfig::from_str("[paths\ndocuments = \"x\"").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nouptut = \"dist\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.paths.output, PathBuf::from("output"));
        assert!(ignored.iter().any(|f| f.contains("ouptut")));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[paths]\ndocuments = \"mails\"\n[template.variables]\nanything = 1";
        let (_, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "envelopr", "serve", "--output", "dist", "--partials", "shared", "--port", "8080",
        ]);
        let mut config = test_parse_config("");
        config.apply_command_options(&cli);
        config.finalize(Path::new("/project"));

        assert_eq!(config.paths.output, PathBuf::from("/project/dist"));
        assert_eq!(config.paths.documents, PathBuf::from("/project/documents"));
        assert_eq!(
            config.paths.partials_root(),
            Some(Path::new("/project/shared"))
        );
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn test_validate() {
        let config = test_config_at(Path::new("/project"), "");
        assert!(config.validate().is_ok());

        let config = test_config_at(Path::new("/project"), "[paths]\noutput = \"documents\"");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compile_options() {
        let config = test_parse_config("[mjml]\nkeep_comments = true");
        let options = config.compile_options();
        assert!(options.keep_comments);
        assert!(options.preserve_href_expressions);
    }

    #[test]
    fn test_root_relative() {
        let config = test_config_at(Path::new("/project"), "");
        assert_eq!(
            config.root_relative(&config.paths.output),
            PathBuf::from("output")
        );
    }
}

use std::path::PathBuf;
use std::time::Duration;

use project_files::{DEFAULT_BASE_PATH, FallbackLocation, PROJECTS_ARCHIVE_URL};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Primary archive location.
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    /// Explicit fallback location; wins over `deployment_url`.
    pub fallback_url: Option<String>,
    /// Address the IDE is deployed at, used to find the bundled archive.
    pub deployment_url: Option<String>,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_true")]
    pub use_fallback: bool,
    /// Directory virtual paths are resolved under. Defaults to the
    /// current directory.
    pub root: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            fallback_url: None,
            deployment_url: None,
            base_path: default_base_path(),
            use_fallback: true,
            root: None,
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn fallback_location(&self) -> FallbackLocation {
        match (&self.fallback_url, &self.deployment_url) {
            (Some(url), _) => FallbackLocation::Fixed(url.clone()),
            (None, Some(address)) => FallbackLocation::Deployment(address.clone()),
            (None, None) => FallbackLocation::Local,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_archive_url() -> String {
    PROJECTS_ARCHIVE_URL.into()
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.into()
}

/// Config file path: `~/.config/project-files/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("project-files").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config, using defaults"
            ),
        }
    }

    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.archive_url, PROJECTS_ARCHIVE_URL);
        assert_eq!(config.base_path, "/projects");
        assert!(config.use_fallback);
        assert_eq!(config.root, None);
        assert_eq!(config.fallback_location(), FallbackLocation::Local);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
archive_url = "https://mirror.example.com/projects.zip"
deployment_url = "https://example.com/web-ide/chip"
base_path = "/home/student/projects"
use_fallback = false
root = "/srv/ide"
timeout_secs = 30
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.archive_url, "https://mirror.example.com/projects.zip");
        assert_eq!(config.base_path, "/home/student/projects");
        assert!(!config.use_fallback);
        assert_eq!(config.root, Some(PathBuf::from("/srv/ide")));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.fallback_location(),
            FallbackLocation::Deployment("https://example.com/web-ide/chip".into())
        );
    }

    #[test]
    fn fallback_url_wins_over_deployment() {
        let toml_str = r#"
fallback_url = "/opt/ide/projects.zip"
deployment_url = "https://example.com/web-ide/"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.fallback_location(),
            FallbackLocation::Fixed("/opt/ide/projects.zip".into())
        );
    }

    #[test]
    fn invalid_type_is_rejected() {
        let result = toml::from_str::<AppConfig>("use_fallback = \"sometimes\"");
        assert!(result.is_err());
    }
}

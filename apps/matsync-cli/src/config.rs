//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/matsync/matsync.toml`
//! - Windows: `%APPDATA%/matsync/matsync.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use matsync_protocol::PrinterRecord;
use matsync_sync_job::SyncConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bearer token for the cloud API.
    #[serde(default)]
    pub token: String,

    /// Pre-built material archive to upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,

    /// Keep the temporary archive copy after the sync.
    #[serde(default)]
    pub keep_archive: bool,

    /// Per-request timeout in seconds. No timeout if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Endpoint and upload settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Known printers.
    #[serde(default)]
    pub printers: Vec<PrinterRecord>,
}

impl AppConfig {
    /// Loads configuration from `path` (or the platform default), creating
    /// a default file if none exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: AppConfig = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(&path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix (holds the API token).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("matsync")
            .join("matsync.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("matsync").join("matsync.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/matsync/matsync.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matsync_protocol::ConnectionType;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert!(config.token.is_empty());
        assert!(config.archive.is_none());
        assert!(!config.keep_archive);
        assert!(config.printers.is_empty());
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn config_partial_toml() {
        let toml_str = r#"
token = "abc"

[sync]
origin = "bench"

[[printers]]
name = "S5"
connection_type = "cloud"
is_online = true
host_guid = "p1"
cluster_id = "c1"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.sync.origin, "bench");
        assert_eq!(config.sync.file_name, "cura.umm");
        assert_eq!(config.printers.len(), 1);
        assert_eq!(config.printers[0].connection_type, ConnectionType::Cloud);
        assert_eq!(config.printers[0].host_guid.as_deref(), Some("p1"));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("matsync.toml");

        let config = AppConfig::load(Some(&path)).unwrap();
        assert!(config.token.is_empty());
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("matsync.toml");

        let config = AppConfig {
            token: "secret".into(),
            archive: Some(PathBuf::from("/data/materials.umm")),
            keep_archive: true,
            timeout_secs: Some(30),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.token, "secret");
        assert_eq!(loaded.archive, Some(PathBuf::from("/data/materials.umm")));
        assert!(loaded.keep_archive);
        assert_eq!(loaded.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("matsync"));
    }
}

//! Known rclone remotes and their persisted configuration

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};

use crate::mounts;

/// A remote bucket made visible on the local filesystem at `mountpoint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub bucket: String,
    pub mountpoint: std::path::PathBuf,
}

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotesConfig {
    #[serde(default)]
    pub remotes: Vec<Remote>,
}

/// Default location of the configuration file: `<config dir>/rmcp/rmcp.yaml`
#[must_use]
pub fn default_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rmcp").join("rmcp.yaml"))
}

impl RemotesConfig {
    /// Snapshot of a registry suitable for saving, exact duplicates are dropped
    #[must_use]
    pub fn from_registry(remotes: &[Remote]) -> Self {
        let mut unique: Vec<Remote> = Vec::with_capacity(remotes.len());
        for remote in remotes {
            if !unique.contains(remote) {
                unique.push(remote.clone());
            }
        }
        Self { remotes: unique }
    }

    /// Load configuration from `path`, a missing file is not an error
    pub fn load(path: &std::path::Path) -> anyhow::Result<Option<Self>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error).with_context(|| format!("failed reading {}", path.display()));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed parsing {}", path.display()))?;
        for remote in &config.remotes {
            if !remote.mountpoint.is_absolute() {
                return Err(anyhow!(
                    "mountpoint of remote '{}:{}' must be absolute: {}",
                    remote.name,
                    remote.bucket,
                    remote.mountpoint.display()
                ));
            }
        }
        Ok(Some(config))
    }

    /// Write configuration to `path`, replacing any previous contents
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
        let contents = serde_yaml::to_string(self).context("failed serializing remotes")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed writing {}", path.display()))?;
        tracing::info!("write config to {}", path.display());
        Ok(())
    }
}

/// Merge persisted and discovered remotes, persisted ones first so they win resolution
#[must_use]
pub fn build_registry(persisted: Option<RemotesConfig>, discovered: Vec<Remote>) -> Vec<Remote> {
    let mut registry = persisted.map(|config| config.remotes).unwrap_or_default();
    registry.extend(discovered);
    registry
}

/// Assemble the registry for this run from the mount table and the configuration file
///
/// When `config_path` is `None` the default location is used, if the platform has one.
pub fn load_registry(config_path: Option<&std::path::Path>) -> anyhow::Result<Vec<Remote>> {
    let entries = mounts::read_mount_table().map_err(|err| anyhow!("mount info: {err:#}"))?;
    let discovered = mounts::discover_remote_mounts(entries);
    let config_path = config_path
        .map(std::path::Path::to_path_buf)
        .or_else(default_config_path);
    let persisted = match config_path {
        Some(path) => {
            RemotesConfig::load(&path).map_err(|err| anyhow!("read config: {err:#}"))?
        }
        None => None,
    };
    let registry = build_registry(persisted, discovered);
    tracing::debug!("remotes: {:?}", &registry);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str, bucket: &str, mountpoint: &str) -> Remote {
        Remote {
            name: name.to_string(),
            bucket: bucket.to_string(),
            mountpoint: mountpoint.into(),
        }
    }

    #[test]
    fn missing_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = RemotesConfig::load(&dir.path().join("rmcp.yaml")).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn empty_config_has_no_remotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmcp.yaml");
        std::fs::write(&path, "\n").unwrap();
        let loaded = RemotesConfig::load(&path).unwrap().unwrap();
        assert!(loaded.remotes.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rmcp.yaml");
        let config = RemotesConfig {
            remotes: vec![remote("s3", "photos", "/mnt/photos")],
        };
        config.save(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("mountpoint: /mnt/photos"));
        assert_eq!(RemotesConfig::load(&path).unwrap(), Some(config));
    }

    #[test]
    fn reads_handwritten_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmcp.yaml");
        std::fs::write(
            &path,
            "remotes:\n- name: gcs\n  bucket: logs\n  mountpoint: /data/logs\n",
        )
        .unwrap();
        let loaded = RemotesConfig::load(&path).unwrap().unwrap();
        assert_eq!(loaded.remotes, vec![remote("gcs", "logs", "/data/logs")]);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmcp.yaml");
        std::fs::write(&path, "remotes: [name: {").unwrap();
        let error = RemotesConfig::load(&path).unwrap_err();
        assert!(format!("{error:#}").contains("failed parsing"));
    }

    #[test]
    fn relative_mountpoint_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmcp.yaml");
        std::fs::write(
            &path,
            "remotes:\n- name: gcs\n  bucket: logs\n  mountpoint: data/logs\n",
        )
        .unwrap();
        let error = RemotesConfig::load(&path).unwrap_err();
        assert!(error.to_string().contains("must be absolute"));
    }

    #[test]
    fn persisted_remotes_come_first() {
        let persisted = RemotesConfig {
            remotes: vec![remote("a", "one", "/mnt/x")],
        };
        let discovered = vec![remote("b", "two", "/mnt/x"), remote("c", "three", "/mnt/y")];
        let registry = build_registry(Some(persisted), discovered);
        let names: Vec<&str> = registry.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(build_registry(None, vec![]), vec![]);
    }

    #[test]
    fn snapshot_drops_exact_duplicates() {
        let registry = vec![
            remote("a", "one", "/mnt/x"),
            remote("b", "two", "/mnt/y"),
            remote("a", "one", "/mnt/x"),
            remote("a", "one", "/mnt/z"),
        ];
        let config = RemotesConfig::from_registry(&registry);
        assert_eq!(config.remotes.len(), 3);
        assert_eq!(config.remotes[2].mountpoint, std::path::PathBuf::from("/mnt/z"));
    }

    #[test]
    fn registry_uses_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmcp.yaml");
        RemotesConfig {
            remotes: vec![remote("s3", "photos", "/mnt/photos")],
        }
        .save(&path)
        .unwrap();
        let registry = load_registry(Some(&path)).unwrap();
        assert_eq!(registry[0], remote("s3", "photos", "/mnt/photos"));
    }

    #[test]
    fn registry_fails_on_broken_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmcp.yaml");
        std::fs::write(&path, "remotes: 42").unwrap();
        let error = load_registry(Some(&path)).unwrap_err();
        assert!(error.to_string().starts_with("read config:"));
    }
}

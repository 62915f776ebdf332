//! Where buildchain keeps its files
//!
//! The root config lives in the config directory, per-context configs in the
//! data directory. Each can be moved with an environment variable; otherwise
//! XDG locations are used on Unix and the Known Folder locations on Windows.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

const APP_NAME: &str = "buildchain";

#[derive(Debug, Clone, Copy)]
enum AppDir {
    Config,
    Data,
}

impl AppDir {
    fn override_var(self) -> &'static str {
        match self {
            AppDir::Config => "BUILDCHAIN_CONFIG_DIR",
            AppDir::Data => "BUILDCHAIN_DATA_DIR",
        }
    }

    fn xdg_var(self) -> &'static str {
        match self {
            AppDir::Config => "XDG_CONFIG_HOME",
            AppDir::Data => "XDG_DATA_HOME",
        }
    }

    /// Location under the home directory when the XDG variable is unset
    fn home_relative(self) -> &'static [&'static str] {
        match self {
            AppDir::Config => &[".config"],
            AppDir::Data => &[".local", "share"],
        }
    }

    fn known_folder(self, dirs: &ProjectDirs) -> PathBuf {
        match self {
            AppDir::Config => dirs.config_dir().to_path_buf(),
            AppDir::Data => dirs.data_dir().to_path_buf(),
        }
    }

    fn resolve(self, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty()).map(PathBuf::from);

        if let Some(dir) = var(self.override_var()) {
            return dir;
        }
        if cfg!(windows) {
            if let Some(dirs) = ProjectDirs::from("", "", APP_NAME) {
                return self.known_folder(&dirs);
            }
        }

        let base = var(self.xdg_var()).unwrap_or_else(|| {
            let home = BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            self.home_relative().iter().fold(home, |dir, part| dir.join(part))
        });
        base.join(APP_NAME)
    }
}

/// Directory of the root config (`BUILDCHAIN_CONFIG_DIR` wins)
pub fn config_dir() -> PathBuf {
    AppDir::Config.resolve(|name| std::env::var(name).ok())
}

/// Directory of per-context data (`BUILDCHAIN_DATA_DIR` wins)
pub fn data_dir() -> PathBuf {
    AppDir::Data.resolve(|name| std::env::var(name).ok())
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the kube-context-specific config file path
pub fn context_config_path(context: &str) -> PathBuf {
    data_dir().join("contexts").join(context).join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_override_variable_is_used_as_is() {
        let dir = AppDir::Config.resolve(env(&[
            ("BUILDCHAIN_CONFIG_DIR", "/etc/buildchain"),
            ("XDG_CONFIG_HOME", "/xdg"),
        ]));
        assert_eq!(dir, PathBuf::from("/etc/buildchain"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_xdg_variable_gets_app_name() {
        let dir = AppDir::Data.resolve(env(&[("XDG_DATA_HOME", "/xdg/data")]));
        assert_eq!(dir, PathBuf::from("/xdg/data/buildchain"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_empty_variables_fall_back_to_home() {
        let dir = AppDir::Data.resolve(env(&[
            ("BUILDCHAIN_DATA_DIR", ""),
            ("XDG_DATA_HOME", ""),
        ]));
        assert!(dir.ends_with(".local/share/buildchain"));
    }

    #[test]
    fn test_context_config_path() {
        let path = context_config_path("dev-cluster");
        assert!(path.ends_with("contexts/dev-cluster/config.yaml"));
    }

    #[test]
    fn test_ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}

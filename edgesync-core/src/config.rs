//! YAML config storage.
//!
//! # Storage layout
//!
//! ```text
//! ~/.edgesync/
//!   config.yaml      (mode 0600; directory mode 0700)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::ConfigError;
use crate::types::{Config, ServiceId};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.edgesync/`
///
/// Creates the directory (mode `0700`) if it does not yet exist.
pub fn config_dir_at(home: &Path) -> Result<PathBuf, ConfigError> {
    let dir = home.join(".edgesync");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.edgesync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".edgesync").join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.edgesync/config.yaml` and validate it.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: Config =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    config.validate()?;
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    config_dir_at(home)?;
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Scaffold a config for `service_id`.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(
    home: &Path,
    service_id: ServiceId,
    api_key: &str,
) -> Result<Config, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    let config = Config::new(service_id, api_key);
    config.validate()?;
    save_at(home, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init(service_id: ServiceId, api_key: &str) -> Result<Config, ConfigError> {
    init_at(&home()?, service_id, api_key)
}

/// Apply `edit` to the stored config and save it, bumping `updated_at`.
pub fn update_at(
    home: &Path,
    edit: impl FnOnce(&mut Config),
) -> Result<Config, ConfigError> {
    let mut config = load_at(home)?;
    edit(&mut config);
    config.updated_at = Utc::now();
    config.validate()?;
    save_at(home, &config)?;
    Ok(config)
}

/// `update_at` convenience wrapper.
pub fn update(edit: impl FnOnce(&mut Config)) -> Result<Config, ConfigError> {
    update_at(&home()?, edit)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VclSpec;
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    #[test]
    fn config_path_is_correct() {
        let home = make_home();
        assert!(config_path_at(home.path()).ends_with(".edgesync/config.yaml"));
    }

    #[test]
    fn config_dir_created_with_perms() {
        let home = make_home();
        let dir = config_dir_at(home.path()).expect("config_dir_at");
        assert!(dir.exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
        }
    }

    #[test]
    fn save_and_load_roundtrip_keeps_edge_logic() {
        let home = make_home();
        let mut cfg = Config::new(ServiceId::from("svc123"), "secret");
        cfg.edge_logic.vcl.push(VclSpec::new("default", "recv"));
        save_at(home.path(), &cfg).expect("save");

        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded.service_id, cfg.service_id);
        assert_eq!(loaded.edge_logic, cfg.edge_logic);
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        save_at(home.path(), &Config::new(ServiceId::from("svc"), "k")).expect("save");
        let tmp = config_path_at(home.path()).with_file_name("config.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn init_is_idempotent() {
        let home = make_home();
        let first = init_at(home.path(), ServiceId::from("svc"), "k1").expect("init");
        let second = init_at(home.path(), ServiceId::from("other"), "k2").expect("init again");
        assert_eq!(first.service_id, second.service_id);
        assert_eq!(second.api_key, "k1");
    }

    #[test]
    fn update_bumps_updated_at() {
        let home = make_home();
        let created = init_at(home.path(), ServiceId::from("svc"), "k").expect("init");
        let updated = update_at(home.path(), |c| c.snippet_prefix = "site".into()).expect("update");
        assert_eq!(updated.snippet_prefix, "site");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn load_missing_returns_not_found() {
        let home = make_home();
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}

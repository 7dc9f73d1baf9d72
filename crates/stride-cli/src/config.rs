//! Configuration file management for stride.
//!
//! Provides a TOML-based config file at `~/.config/stride/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stride_core::model::OpenRouterConfig;
use stride_core::model::openrouter::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use stride_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub model: ModelSection,
    pub user: UserSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelSection {
    pub name: String,
    pub base_url: String,
    /// API key for the model endpoint. Usually supplied via the
    /// OPENROUTER_API_KEY env var instead of being written to disk.
    pub api_key: Option<String>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSection {
    /// Owner identity stamped on every project this install creates.
    pub id: Uuid,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the stride config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/stride` or `~/.config/stride`.
/// We intentionally ignore the platform-specific `dirs::config_dir()`
/// (which returns `~/Library/Application Support` on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("stride");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("stride")
}

/// Return the path to the stride config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // Set permissions to 0600 (owner read/write only) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct StrideConfig {
    pub db_config: DbConfig,
    pub user_id: Uuid,
    model_name: String,
    model_base_url: String,
    file_api_key: Option<String>,
}

impl StrideConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `STRIDE_DATABASE_URL` env > `config_file.database.url` > `DbConfig::DEFAULT_URL`
    /// - User id: `STRIDE_USER_ID` env > `config_file.user.id` > error
    /// - Model name/base URL: config file > built-in defaults
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        // DB URL resolution.
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("STRIDE_DATABASE_URL") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let db_config = DbConfig::new(db_url);

        // User id resolution.
        let user_id = if let Ok(raw) = std::env::var("STRIDE_USER_ID") {
            raw.parse()
                .context("STRIDE_USER_ID env var is not a valid UUID")?
        } else if let Some(ref cfg) = file_config {
            cfg.user.id
        } else {
            bail!("user id not found; set STRIDE_USER_ID or run `stride init` to create a config file");
        };

        let (model_name, model_base_url, file_api_key) = match file_config {
            Some(cfg) => (cfg.model.name, cfg.model.base_url, cfg.model.api_key),
            None => (DEFAULT_MODEL.to_owned(), DEFAULT_BASE_URL.to_owned(), None),
        };

        Ok(Self {
            db_config,
            user_id,
            model_name,
            model_base_url,
            file_api_key,
        })
    }

    /// Build the model endpoint config, resolving the API key as
    /// `OPENROUTER_API_KEY` env > `config_file.model.api_key` > error.
    ///
    /// Only commands that actually call the model need this; everything
    /// else works without a key.
    pub fn model_config(&self) -> Result<OpenRouterConfig> {
        let api_key = if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            key
        } else if let Some(ref key) = self.file_api_key {
            key.clone()
        } else {
            bail!(
                "model API key not found; set OPENROUTER_API_KEY or add model.api_key to {}",
                config_path().display()
            );
        };

        Ok(OpenRouterConfig {
            api_key,
            model: self.model_name.clone(),
            base_url: self.model_base_url.clone(),
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Serialize env-var-touching tests within this binary.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn sample_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://testhost:5432/testdb".to_string(),
            },
            model: ModelSection::default(),
            user: UserSection { id: Uuid::new_v4() },
        }
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let original = sample_config();
        let contents = toml::to_string_pretty(&original).unwrap();
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();

        assert_eq!(loaded.database.url, original.database.url);
        assert_eq!(loaded.model.name, DEFAULT_MODEL);
        assert_eq!(loaded.model.base_url, DEFAULT_BASE_URL);
        assert!(loaded.model.api_key.is_none());
        assert_eq!(loaded.user.id, original.user.id);
    }

    #[cfg(unix)]
    #[test]
    fn permissions_can_be_restricted() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("test.toml");
        std::fs::write(&file, "test").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&file, perms).unwrap();

        let meta = std::fs::metadata(&file).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();

        // Even if env var is set, CLI flag wins.
        unsafe { std::env::set_var("STRIDE_DATABASE_URL", "postgresql://env:5432/envdb") };
        unsafe {
            std::env::set_var(
                "STRIDE_USER_ID",
                "00000000-0000-0000-0000-000000000001",
            )
        };

        let config = StrideConfig::resolve(Some("postgresql://cli:5432/clidb")).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");

        unsafe { std::env::remove_var("STRIDE_DATABASE_URL") };
        unsafe { std::env::remove_var("STRIDE_USER_ID") };
    }

    #[test]
    fn resolve_with_env_var_sets_db_and_user() {
        let _lock = lock_env();

        unsafe { std::env::set_var("STRIDE_DATABASE_URL", "postgresql://env:5432/envdb") };
        unsafe {
            std::env::set_var(
                "STRIDE_USER_ID",
                "00000000-0000-0000-0000-000000000002",
            )
        };

        let config = StrideConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(
            config.user_id.to_string(),
            "00000000-0000-0000-0000-000000000002"
        );

        unsafe { std::env::remove_var("STRIDE_DATABASE_URL") };
        unsafe { std::env::remove_var("STRIDE_USER_ID") };
    }

    #[test]
    fn resolve_rejects_invalid_user_id_env() {
        let _lock = lock_env();

        unsafe { std::env::set_var("STRIDE_USER_ID", "not-a-uuid") };
        let result = StrideConfig::resolve(None);
        unsafe { std::env::remove_var("STRIDE_USER_ID") };

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("not a valid UUID"), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_errors_when_no_user_id() {
        let _lock = lock_env();

        unsafe { std::env::remove_var("STRIDE_USER_ID") };
        // Point HOME and XDG_CONFIG_HOME to a temp dir so load_config() cannot
        // find a real config file.
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_home = std::env::var("HOME").ok();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("HOME", tmp.path()) };
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        let result = StrideConfig::resolve(Some("postgresql://localhost:5432/stride"));

        // Restore env before asserting, to avoid poisoning the mutex on failure.
        match orig_home {
            Some(h) => unsafe { std::env::set_var("HOME", h) },
            None => unsafe { std::env::remove_var("HOME") },
        }
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("user id not found"), "unexpected error: {msg}");
    }

    #[test]
    fn model_config_prefers_env_key() {
        let _lock = lock_env();

        unsafe { std::env::set_var("OPENROUTER_API_KEY", "sk-env") };
        let config = StrideConfig {
            db_config: DbConfig::new(DbConfig::DEFAULT_URL.to_string()),
            user_id: Uuid::new_v4(),
            model_name: DEFAULT_MODEL.to_owned(),
            model_base_url: DEFAULT_BASE_URL.to_owned(),
            file_api_key: Some("sk-file".to_owned()),
        };
        let model = config.model_config().unwrap();
        unsafe { std::env::remove_var("OPENROUTER_API_KEY") };

        assert_eq!(model.api_key, "sk-env");
        assert_eq!(model.model, DEFAULT_MODEL);
    }

    #[test]
    fn model_config_errors_without_any_key() {
        let _lock = lock_env();

        unsafe { std::env::remove_var("OPENROUTER_API_KEY") };
        let config = StrideConfig {
            db_config: DbConfig::new(DbConfig::DEFAULT_URL.to_string()),
            user_id: Uuid::new_v4(),
            model_name: DEFAULT_MODEL.to_owned(),
            model_base_url: DEFAULT_BASE_URL.to_owned(),
            file_api_key: None,
        };
        let msg = config.model_config().unwrap_err().to_string();
        assert!(msg.contains("API key not found"), "unexpected error: {msg}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("stride/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}

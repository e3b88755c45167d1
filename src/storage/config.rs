use crate::error::HogError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "https://app.posthog.com";

pub const ENV_API_KEY: &str = "POSTHOG_API_KEY";
pub const ENV_HOST: &str = "POSTHOG_HOST";
pub const ENV_PROJECT_ID: &str = "POSTHOG_PROJECT_ID";

/// A named account profile: personal API key, host, optional default project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub api_key: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project: Option<u64>,
}

/// Persisted credential store state.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,
    #[serde(default)]
    pub accounts: HashMap<String, Account>,
}

/// Identity computed per invocation from env, CLI flags, and stored state.
/// Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAccount {
    pub api_key: String,
    pub host: String,
    pub project_id: Option<u64>,
}

/// A resolved identity that is guaranteed to carry a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProject {
    pub api_key: String,
    pub host: String,
    pub project_id: u64,
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            HogError::config(format!(
                "Failed to read config file: {} — {}",
                config_path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|_| {
            HogError::config(format!(
                "Failed to parse config file: {}",
                config_path.display()
            ))
        })
    }

    /// Writes to a temp file in the same directory, then renames over the
    /// target, so a concurrent reader never observes a half-written file.
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HogError::config(format!(
                    "Failed to create config directory: {} — {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| HogError::config(format!("Failed to serialize config: {}", e)))?
            + "\n";

        let tmp_path = config_path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            HogError::config(format!(
                "Failed to write config file: {} — {}",
                tmp_path.display(),
                e
            ))
        })?;
        fs::rename(&tmp_path, &config_path).map_err(|e| {
            HogError::config(format!(
                "Failed to write config file: {} — {}",
                config_path.display(),
                e
            ))
        })
    }

    fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HogError::config("Could not determine the user config directory"))?;
        Ok(config_dir.join("hog-cli").join("config.json"))
    }

    pub fn get_account(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    /// Add or overwrite a profile by name. An existing default project for
    /// that name is preserved; the first profile ever added becomes the
    /// store default.
    pub fn add_account(&mut self, name: &str, api_key: String, host: String) {
        let default_project = self.accounts.get(name).and_then(|a| a.default_project);
        self.accounts.insert(
            name.to_string(),
            Account {
                api_key,
                host,
                default_project,
            },
        );
        if self.default_account.is_none() {
            self.default_account = Some(name.to_string());
        }
    }

    /// Remove a profile. When the removed profile was the default, the
    /// default moves to the first remaining key (iteration order is
    /// arbitrary), or clears when none remain.
    pub fn remove_account(&mut self, name: &str) -> Result<()> {
        if self.accounts.remove(name).is_none() {
            return Err(HogError::config(format!("Account not found: \"{}\"", name)));
        }
        if self.default_account.as_deref() == Some(name) {
            self.default_account = self.accounts.keys().next().cloned();
        }
        Ok(())
    }

    pub fn set_default_account(&mut self, name: &str) -> Result<()> {
        if !self.accounts.contains_key(name) {
            return Err(HogError::config(format!("Account not found: \"{}\"", name)));
        }
        self.default_account = Some(name.to_string());
        Ok(())
    }

    /// Set the default project for the active account (explicit override or
    /// the store default).
    pub fn set_default_project(&mut self, account: Option<&str>, project_id: u64) -> Result<String> {
        let name = match account.or(self.default_account.as_deref()) {
            Some(n) => n.to_string(),
            None => return Err(no_account_configured()),
        };
        match self.accounts.get_mut(&name) {
            Some(acc) => {
                acc.default_project = Some(project_id);
                Ok(name)
            }
            None => Err(HogError::NoAccount {
                message: format!("Account not found: \"{}\"", name),
            }),
        }
    }

    /// Tiers 2 and 3 of the precedence rule: explicit CLI account name, then
    /// the stored default; project from CLI override, then the profile.
    pub fn resolve_stored(
        &self,
        account: Option<&str>,
        project: Option<u64>,
    ) -> Result<ResolvedAccount> {
        let name = match account.or(self.default_account.as_deref()) {
            Some(n) => n,
            None => return Err(no_account_configured()),
        };

        let acc = self.accounts.get(name).ok_or_else(|| HogError::NoAccount {
            message: format!("Account not found: \"{}\"", name),
        })?;

        Ok(ResolvedAccount {
            api_key: acc.api_key.clone(),
            host: acc.host.clone(),
            project_id: project.or(acc.default_project),
        })
    }
}

fn no_account_configured() -> HogError {
    HogError::NoAccount {
        message: "No account configured. Run: hog-cli accounts add <name> --api-key <key>"
            .to_string(),
    }
}

/// Tier 1: an environment API key is self-contained and never consults the
/// store, not even for the project id. An empty value counts as unset.
fn resolve_from_env() -> Result<Option<ResolvedAccount>> {
    let api_key = match env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty()) {
        Some(k) => k,
        None => return Ok(None),
    };

    let host = env::var(ENV_HOST)
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let project_id = match env::var(ENV_PROJECT_ID).ok().filter(|p| !p.is_empty()) {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            HogError::config(format!("Invalid {}: \"{}\" is not an integer", ENV_PROJECT_ID, raw))
        })?),
        None => None,
    };

    Ok(Some(ResolvedAccount {
        api_key,
        host,
        project_id,
    }))
}

/// Strict precedence: environment, then explicit CLI account, then stored
/// default. The tiers are a design contract and are never merged.
pub fn resolve_account(
    config_path: Option<PathBuf>,
    account: Option<&str>,
    project: Option<u64>,
) -> Result<ResolvedAccount> {
    if let Some(resolved) = resolve_from_env()? {
        return Ok(resolved);
    }
    Config::load(config_path)?.resolve_stored(account, project)
}

/// The gate every project-scoped command passes through.
pub fn require_project_id(
    config_path: Option<PathBuf>,
    account: Option<&str>,
    project: Option<u64>,
) -> Result<ResolvedProject> {
    let resolved = resolve_account(config_path, account, project)?;
    match resolved.project_id {
        Some(project_id) => Ok(ResolvedProject {
            api_key: resolved.api_key,
            host: resolved.host,
            project_id,
        }),
        None => Err(HogError::NoProject {
            message: "No project configured. Run: hog-cli projects use <id>".to_string(),
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{clear_env, env_guard};
    use super::*;
    use tempfile::tempdir;

    fn two_account_config() -> Config {
        let mut config = Config::default();
        config.accounts.insert(
            "a".to_string(),
            Account {
                api_key: "k1".to_string(),
                host: "H1".to_string(),
                default_project: None,
            },
        );
        config.accounts.insert(
            "b".to_string(),
            Account {
                api_key: "k2".to_string(),
                host: "H2".to_string(),
                default_project: Some(7),
            },
        );
        config.default_account = Some("b".to_string());
        config
    }

    #[test]
    fn test_load_missing_file_is_empty_store() {
        let dir = tempdir().expect("tempdir");
        let config = Config::load(Some(dir.path().join("config.json"))).expect("load");
        assert!(config.default_account.is_none());
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_load_unparsable_content_is_config_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").expect("write");
        let err = Config::load(Some(path)).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_save_load_round_trip_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");

        let config = two_account_config();
        config.save(Some(path.clone())).expect("save");

        let first = fs::read_to_string(&path).expect("read");
        let loaded = Config::load(Some(path.clone())).expect("load");
        loaded.save(Some(path.clone())).expect("save again");
        let second = fs::read_to_string(&path).expect("read");

        // Byte-for-byte equivalent structured content, modulo key order.
        let a: serde_json::Value = serde_json::from_str(&first).expect("parse");
        let b: serde_json::Value = serde_json::from_str(&second).expect("parse");
        assert_eq!(a, b);

        assert_eq!(loaded.default_account.as_deref(), Some("b"));
        assert_eq!(loaded.accounts.len(), 2);
        assert_eq!(loaded.get_account("b").unwrap().default_project, Some(7));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        Config::default().save(Some(path.clone())).expect("save");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_add_account_first_becomes_default_and_preserves_project() {
        let mut config = Config::default();
        config.add_account("work", "k1".to_string(), DEFAULT_HOST.to_string());
        assert_eq!(config.default_account.as_deref(), Some("work"));

        config.set_default_project(None, 12).expect("set project");
        // re-adding (key rotation) keeps the default project
        config.add_account("work", "k2".to_string(), DEFAULT_HOST.to_string());
        let acc = config.get_account("work").unwrap();
        assert_eq!(acc.api_key, "k2");
        assert_eq!(acc.default_project, Some(12));

        // adding a second account does not steal the default
        config.add_account("personal", "k3".to_string(), DEFAULT_HOST.to_string());
        assert_eq!(config.default_account.as_deref(), Some("work"));
    }

    #[test]
    fn test_remove_account_rederives_default() {
        let mut config = two_account_config();
        config.remove_account("b").expect("remove");
        // only "a" remains, so it becomes the default
        assert_eq!(config.default_account.as_deref(), Some("a"));

        config.remove_account("a").expect("remove");
        assert!(config.default_account.is_none());
        assert!(config.accounts.is_empty());

        let err = config.remove_account("a").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_set_default_account_requires_existing() {
        let mut config = two_account_config();
        config.set_default_account("a").expect("set default");
        assert_eq!(config.default_account.as_deref(), Some("a"));
        assert!(config.set_default_account("ghost").is_err());
    }

    #[test]
    fn test_resolve_stored_uses_default_account_and_its_project() {
        let _guard = env_guard();
        clear_env();

        let config = two_account_config();
        let resolved = config.resolve_stored(None, None).expect("resolve");
        assert_eq!(
            resolved,
            ResolvedAccount {
                api_key: "k2".to_string(),
                host: "H2".to_string(),
                project_id: Some(7),
            }
        );
    }

    #[test]
    fn test_resolve_stored_cli_overrides() {
        let _guard = env_guard();
        clear_env();

        let config = two_account_config();
        let resolved = config.resolve_stored(Some("a"), None).expect("resolve");
        assert_eq!(resolved.api_key, "k1");
        assert_eq!(resolved.host, "H1");
        assert_eq!(resolved.project_id, None);

        let resolved = config.resolve_stored(Some("b"), Some(99)).expect("resolve");
        assert_eq!(resolved.project_id, Some(99));
    }

    #[test]
    fn test_resolve_stored_failures_are_no_account() {
        let _guard = env_guard();
        clear_env();

        let empty = Config::default();
        assert_eq!(empty.resolve_stored(None, None).unwrap_err().code(), "NO_ACCOUNT");

        let config = two_account_config();
        assert_eq!(
            config.resolve_stored(Some("ghost"), None).unwrap_err().code(),
            "NO_ACCOUNT"
        );
    }

    #[test]
    fn test_env_key_wins_over_store_and_cli_override() {
        let _guard = env_guard();
        clear_env();

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        two_account_config().save(Some(path.clone())).expect("save");

        unsafe {
            env::set_var(ENV_API_KEY, "env-key");
            env::set_var(ENV_HOST, "https://eu.example.com");
        }
        let resolved = resolve_account(Some(path.clone()), Some("a"), None).expect("resolve");
        assert_eq!(resolved.api_key, "env-key");
        assert_eq!(resolved.host, "https://eu.example.com");
        // the env tier never consults the store for a project
        assert_eq!(resolved.project_id, None);

        unsafe {
            env::set_var(ENV_PROJECT_ID, "31");
        }
        let resolved = resolve_account(Some(path.clone()), None, None).expect("resolve");
        assert_eq!(resolved.project_id, Some(31));

        unsafe {
            env::set_var(ENV_PROJECT_ID, "not-a-number");
        }
        let err = resolve_account(Some(path), None, None).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");

        clear_env();
    }

    #[test]
    fn test_env_defaults_host_when_unset() {
        let _guard = env_guard();
        clear_env();

        unsafe {
            env::set_var(ENV_API_KEY, "env-key");
        }
        let resolved = resolve_account(None, None, None).expect("resolve");
        assert_eq!(resolved.host, DEFAULT_HOST);

        clear_env();
    }

    #[test]
    fn test_empty_env_key_falls_through_to_store() {
        let _guard = env_guard();
        clear_env();

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        two_account_config().save(Some(path.clone())).expect("save");

        unsafe {
            env::set_var(ENV_API_KEY, "");
        }
        let resolved = resolve_account(Some(path), None, None).expect("resolve");
        assert_eq!(resolved.api_key, "k2");

        clear_env();
    }

    #[test]
    fn test_require_project_id_gate() {
        let _guard = env_guard();
        clear_env();

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        two_account_config().save(Some(path.clone())).expect("save");

        let scoped = require_project_id(Some(path.clone()), None, None).expect("resolve");
        assert_eq!(scoped.project_id, 7);
        assert_eq!(scoped.api_key, "k2");

        // account "a" has no default project and no override was given
        let err = require_project_id(Some(path.clone()), Some("a"), None).unwrap_err();
        assert_eq!(err.code(), "NO_PROJECT");

        let scoped = require_project_id(Some(path), Some("a"), Some(4)).expect("resolve");
        assert_eq!(scoped.project_id, 4);
    }
}

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod models;
pub use models::*;

/// Marker value that is replaced by an environment variable at load time.
pub const SECRET_MARKER: &str = "secret_from_env";

const DEFAULT_PREFIX: &str = "CALPROXY";

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `{CALPROXY_CONFIG_DIR}/default.{toml,yaml,json}` (dir defaults to `config`)
/// 2. `{CALPROXY_CONFIG_DIR}/{RUN_ENV}.*` (`RUN_ENV` defaults to `debug`)
/// 3. `CALPROXY__SECTION__KEY` environment variables (prefix overridable via `PREFIX`)
///
/// Values equal to [`SECRET_MARKER`] are then resolved from the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env::var("CALPROXY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());

    load_config_from(Path::new(&config_dir), &run_env, &prefix)
}

/// Loads configuration from an explicit directory, run environment and env prefix.
pub fn load_config_from(
    config_dir: &Path,
    run_env: &str,
    prefix: &str,
) -> Result<AppConfig, ConfigError> {
    let default_path: PathBuf = config_dir.join("default");
    let env_path: PathBuf = config_dir.join(run_env);
    debug!(
        default = %default_path.display(),
        env = %env_path.display(),
        "loading configuration"
    );

    let raw: AppConfig = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(prefix).separator("__"))
        .build()?
        .try_deserialize()?;

    let config = apply_env_overrides_from_marker(raw, |key| env::var(key).ok())?;

    let missing = config.missing_fields();
    if !missing.is_empty() {
        return Err(ConfigError::Message(format!(
            "missing mandatory settings: {}",
            missing.join(", ")
        )));
    }
    Ok(config)
}

/// Recursively replaces every [`SECRET_MARKER`] string with the value returned by
/// `lookup` for the upper-cased, `_`-joined path (`events.client_secret` ->
/// `EVENTS_CLIENT_SECRET`). Unresolved markers are left in place.
fn inject_env_secrets<F>(value: &mut Value, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    fn walk<F>(path: &mut Vec<String>, obj: &mut Value, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.clone());
                    walk(path, v, lookup);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match lookup(&env_key) {
                    Some(env_val) => *obj = Value::String(env_val),
                    None => warn!("env var {} not found for {}", env_key, SECRET_MARKER),
                }
            }
            _ => {}
        }
    }

    walk(&mut Vec::new(), value, lookup);
}

/// Applies environment overrides based on [`SECRET_MARKER`] values in the config.
pub fn apply_env_overrides_from_marker<F>(
    config: AppConfig,
    lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    inject_env_secrets(&mut json, &lookup);
    let config: AppConfig = serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))?;

    // An unresolved marker would otherwise be sent upstream as the secret.
    if config.events.client_secret == SECRET_MARKER {
        return Err(ConfigError::Message(
            "events.client_secret is secret_from_env but EVENTS_CLIENT_SECRET is not set"
                .to_string(),
        ));
    }
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// The path is taken from `DOTENV_OVERRIDE`, then from the first command line
/// argument if it starts with `.env`, and falls back to `.env`. Returns the
/// path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file given with
//! `--config`, `APP__`-prefixed environment variables (`APP__SERVER__PORT=8080`
//! sets `server.port`), then the explicit `PORT` / CLI overrides applied by
//! the binary after loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::paths::home_dir::resolve_home_dir;

/// Fallback listening port when neither the config file, `PORT` nor `--port` set one.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable consulted for a port override.
pub const PORT_ENV: &str = "PORT";

/// Prefix for structured environment overrides; `__` separates nesting levels.
pub const ENV_PREFIX: &str = "APP__";

/// Logging section that sets the fallback level and owns the log file.
pub const DEFAULT_SECTION: &str = "default";

/// Created under the user's home directory (the roaming config dir on Windows) when `server.home_dir` is empty.
const HOME_SUBDIR: &str = ".pulse";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// `None` until a file or env layer provides one; the binary then falls back to defaults.
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files merged into `modules` after loading.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Raw per-module sections, decoded lazily with [`AppConfig::module_config`].
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base for relative data and log paths. Absolute after loading.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Per-request handler timeout in seconds; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            timeout_sec: 30,
        }
    }
}

impl ServerConfig {
    /// Replace `home_dir` with its absolute form and make sure the directory exists.
    fn normalize_home_dir(&mut self) -> Result<()> {
        let configured = Some(self.home_dir.trim())
            .filter(|dir| !dir.is_empty())
            .map(str::to_owned);

        let resolved = resolve_home_dir(configured, HOME_SUBDIR, true)
            .with_context(|| format!("cannot resolve server.home_dir '{}'", self.home_dir))?;
        self.home_dir = resolved.to_string_lossy().into_owned();
        Ok(())
    }
}

/// Subsystem (tracing target) → levels. [`DEFAULT_SECTION`] covers every other target.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Section {
    /// One of `trace`, `debug`, `info`, `warn`, `error`, `off`.
    pub console_level: String,
    /// Log file, relative to `home_dir`. Only read from the default section.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

/// Console at `info`, a JSON file at `debug` under `logs/`.
pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        DEFAULT_SECTION.to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/pulse.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file, then `APP__*` variables. The file must exist.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            bail!("Config file not found: {}", config_path.display());
        }

        let defaults = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(defaults))
            .merge(Yaml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

        config.server.normalize_home_dir()?;

        if let Some(dir) = config.modules_dir.as_deref() {
            // file sections win over inline ones with the same name
            let from_files = read_module_dir(Path::new(dir))?;
            config.modules.extend(from_files);
        }

        Ok(config)
    }

    /// [`AppConfig::load_layered`] when a path is given, built-in defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_layered(path);
        }
        let mut config = Self::default();
        config.server.normalize_home_dir()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("cannot render configuration as YAML")
    }

    /// Typed view of one module's section; a missing section yields `T::default()`.
    pub fn module_config<T>(&self, module_name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(module_name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("Invalid configuration for module '{module_name}'")),
            None => Ok(T::default()),
        }
    }

    /// Apply the `PORT` environment override, if present and valid.
    pub fn apply_env_overrides(&mut self) {
        self.apply_port_override(std::env::var(PORT_ENV).ok().as_deref());
    }

    fn apply_port_override(&mut self, raw: Option<&str>) {
        let Some(raw) = raw else {
            return;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.server.port = port,
            // logging is not up yet
            Err(_) => eprintln!("Ignoring invalid {PORT_ENV} value '{raw}'"),
        }
    }

    /// `--port` replaces the port; each `-v` raises the default console level.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let Some(level) = verbosity_level(args.verbose) else {
            return;
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut(DEFAULT_SECTION) {
            section.console_level = level.to_string();
        }
    }
}

fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Values the binary forwards from its command line.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Read every `*.yaml` / `*.yml` file in `dir` as the section named by its file stem.
/// A missing directory contributes nothing.
fn read_module_dir(dir: &Path) -> Result<HashMap<String, serde_json::Value>> {
    let mut sections = HashMap::new();
    if !dir.is_dir() {
        return Ok(sections);
    }

    for entry in std::fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_yaml {
            continue;
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read module config {}", path.display()))?;
        let value: serde_json::Value = serde_yaml::from_str(&text)
            .with_context(|| format!("parse module config {}", path.display()))?;
        sections.insert(name.to_string(), value);
    }
    Ok(sections)
}

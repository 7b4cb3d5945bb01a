use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BOOKMARK_FILE: &str = "bookmarks.json";

#[derive(Parser, Debug, Default)]
#[command(name = "duree")]
#[command(about = "Serves and saves a personal bookmark list", long_about = None)]
pub struct Cli {
    /// YAML config file
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(short = 'l', long = "listen")]
    pub listen_addr: Option<String>,

    /// JSON file the bookmarks are kept in
    #[arg(short = 'f', long = "file")]
    pub bookmark_file: Option<PathBuf>,
}

pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".duree")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    #[serde(default)]
    pub listen_addr: Option<String>,
    #[serde(default)]
    pub bookmark_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: App,
}

/// What the server runs with once flags, config file and defaults are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub listen_addr: String,
    pub bookmark_file: PathBuf,
}

impl Config {
    pub fn new(path: &Path) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Config::parse(&yaml_str).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = substitute_env_vars(yaml_str, |name| env::var(name).ok());
        // An empty document means "all defaults".
        if yaml_with_env.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }
}

impl Settings {
    /// Flags win over the config file, which wins over defaults. A relative
    /// `bookmark_file` in the config file is taken relative to that file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let (app, base_dir) = match &cli.config_path {
            Some(path) => {
                let cfg = Config::new(path)?;
                let dir = path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                (cfg.app, dir)
            }
            None => (App::default(), default_data_dir()),
        };

        Ok(Settings::merge(cli, app, &base_dir))
    }

    fn merge(cli: &Cli, app: App, base_dir: &Path) -> Self {
        let listen_addr = cli
            .listen_addr
            .clone()
            .or(app.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let bookmark_file = match (&cli.bookmark_file, app.bookmark_file) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) if path.is_relative() => base_dir.join(path),
            (None, Some(path)) => path,
            (None, None) => base_dir.join(DEFAULT_BOOKMARK_FILE),
        };

        Settings {
            listen_addr,
            bookmark_file,
        }
    }
}

/// Expands `${VAR}` and `${VAR:-default}` using `lookup`.
fn substitute_env_vars<F>(yaml_str: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = yaml_str.to_string();
    let mut offset = 0;

    while let Some(start) = result[offset..].find("${") {
        let actual_start = offset + start;
        let Some(end) = result[actual_start..].find('}') else {
            break;
        };
        let var_name = &result[actual_start + 2..actual_start + end];

        let env_value = match var_name.split_once(":-") {
            Some((actual_var, default_val)) => {
                lookup(actual_var).unwrap_or_else(|| default_val.to_string())
            }
            None => lookup(var_name).unwrap_or_else(|| {
                tracing::warn!(var = var_name, "environment variable not found");
                String::new()
            }),
        };

        result.replace_range(actual_start..actual_start + end + 1, &env_value);
        offset = actual_start + env_value.len();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_substitute_env_vars() {
        let lookup = vars(&[("DUREE_PORT", "9090")]);
        let out = substitute_env_vars(
            "listen_addr: \"0.0.0.0:${DUREE_PORT}\"\nbookmark_file: ${DUREE_FILE:-marks.json}\nx: ${MISSING}",
            lookup,
        );
        assert_eq!(
            out,
            "listen_addr: \"0.0.0.0:9090\"\nbookmark_file: marks.json\nx: "
        );
    }

    #[test]
    fn test_unterminated_placeholder_is_left_alone() {
        let out = substitute_env_vars("a: ${OPEN", vars(&[]));
        assert_eq!(out, "a: ${OPEN");
    }

    #[test]
    fn test_parse_config() {
        let cfg = Config::parse("app:\n  listen_addr: \"0.0.0.0:3000\"\n  bookmark_file: data/b.json\n").unwrap();
        assert_eq!(cfg.app.listen_addr.as_deref(), Some("0.0.0.0:3000"));
        assert_eq!(cfg.app.bookmark_file, Some(PathBuf::from("data/b.json")));

        assert!(Config::parse("").unwrap().app.listen_addr.is_none());
        assert!(Config::parse("app: 42").is_err());
    }

    #[test]
    fn test_merge_precedence() {
        let base = Path::new("/etc/duree");
        let app = App {
            listen_addr: Some("0.0.0.0:3000".to_string()),
            bookmark_file: Some(PathBuf::from("b.json")),
        };

        let from_file = Settings::merge(&Cli::default(), app.clone(), base);
        assert_eq!(from_file.listen_addr, "0.0.0.0:3000");
        assert_eq!(from_file.bookmark_file, PathBuf::from("/etc/duree/b.json"));

        let cli = Cli {
            config_path: None,
            listen_addr: Some("127.0.0.1:1".to_string()),
            bookmark_file: Some(PathBuf::from("here.json")),
        };
        let from_cli = Settings::merge(&cli, app, base);
        assert_eq!(from_cli.listen_addr, "127.0.0.1:1");
        assert_eq!(from_cli.bookmark_file, PathBuf::from("here.json"));

        let defaults = Settings::merge(&Cli::default(), App::default(), base);
        assert_eq!(defaults.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(defaults.bookmark_file, base.join(DEFAULT_BOOKMARK_FILE));
    }

    #[test]
    fn test_resolve_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "app:\n  bookmark_file: marks.json\n").unwrap();

        let cli = Cli {
            config_path: Some(path),
            ..Cli::default()
        };
        let settings = Settings::resolve(&cli).unwrap();
        assert_eq!(settings.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(settings.bookmark_file, dir.path().join("marks.json"));
    }

    #[test]
    fn test_resolve_missing_config_file_fails() {
        let cli = Cli {
            config_path: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..Cli::default()
        };
        let err = Settings::resolve(&cli).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}

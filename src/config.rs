use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

/// Environment variable naming the `go` executable to use.
pub const GO_ENV: &str = "SIMPLEC_GO";

/// Settings read from the user's config file. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub go_path: Option<PathBuf>,
    pub lenient: Option<bool>,
}

impl Config {
    /// Reads `$XDG_CONFIG_HOME/simplec/config`. A missing or unreadable file
    /// yields the empty config.
    pub fn load() -> Self {
        match config_file_path() {
            Some(path) => Self::from_file(&path),
            None => Config::default(),
        }
    }

    pub fn from_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!("reading config from {}", path.display());
                Self::parse(&text)
            }
            Err(_) => Config::default(),
        }
    }

    /// Parses `key=value` lines. `#` starts a comment line.
    pub fn parse(text: &str) -> Self {
        let mut config = Config::default();
        for line in text.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => {
                    debug!("ignoring config line without `=`: {}", line);
                    continue;
                }
            };
            match key {
                "go_path" if !value.is_empty() => config.go_path = Some(PathBuf::from(value)),
                "lenient" => match value {
                    "true" => config.lenient = Some(true),
                    "false" => config.lenient = Some(false),
                    _ => debug!("ignoring lenient={}, expected true or false", value),
                },
                _ => debug!("ignoring unknown config key `{}`", key),
            }
        }
        config
    }
}

/// XDG Base Directory location: `~/.config/simplec/config` by default.
pub fn config_file_path() -> Option<PathBuf> {
    let config_dir = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;
    Some(config_dir.join("simplec").join("config"))
}

/// Find the Go toolchain. First hit wins:
/// 1. `--go` flag
/// 2. `SIMPLEC_GO` environment variable
/// 3. `go_path` in the config file
/// 4. `go` on `PATH`
pub fn find_go_toolchain(flag: Option<&Path>, config: &Config) -> PathBuf {
    let from_env = env::var(GO_ENV).ok().filter(|v| !v.is_empty()).map(PathBuf::from);
    pick_go_toolchain(flag, from_env, config)
}

fn pick_go_toolchain(flag: Option<&Path>, from_env: Option<PathBuf>, config: &Config) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = from_env {
        return path;
    }
    if let Some(path) = &config.go_path {
        return path.clone();
    }
    PathBuf::from("go")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys_and_comments() {
        let config = Config::parse("# toolchain\ngo_path = /opt/go/bin/go\n\nlenient=true\ncolor=always\n");
        assert_eq!(config.go_path, Some(PathBuf::from("/opt/go/bin/go")));
        assert_eq!(config.lenient, Some(true));
    }

    #[test]
    fn test_parse_ignores_bad_values() {
        let config = Config::parse("lenient=maybe\ngo_path=\nnonsense\n");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "lenient=false\n").unwrap();
        assert_eq!(Config::from_file(&path).lenient, Some(false));
        assert_eq!(Config::from_file(&dir.path().join("missing")), Config::default());
    }

    #[test]
    fn test_resolution_order() {
        let config = Config {
            go_path: Some(PathBuf::from("/config/go")),
            lenient: None,
        };
        let flag = PathBuf::from("/flag/go");
        let from_env = Some(PathBuf::from("/env/go"));

        assert_eq!(pick_go_toolchain(Some(&flag), from_env.clone(), &config), flag);
        assert_eq!(pick_go_toolchain(None, from_env, &config), PathBuf::from("/env/go"));
        assert_eq!(pick_go_toolchain(None, None, &config), PathBuf::from("/config/go"));
        assert_eq!(pick_go_toolchain(None, None, &Config::default()), PathBuf::from("go"));
    }
}

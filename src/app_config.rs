//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// File configuration for comicpull defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    /// Reading list used by `pull` and `reading-volumes`.
    pub todo_file: Option<PathBuf>,
    /// Pull-list database.
    pub pulldb: Option<PathBuf>,
    /// Library catalog document.
    pub catalog: Option<PathBuf>,
    /// Device directory used by `sync`.
    pub sync_dir: Option<PathBuf>,
    /// Number of issues `sync` keeps on the device.
    pub sync_count: Option<u64>,
    /// Spacing above which `sort` logs a stream as sparse.
    pub sparse_interval: Option<f64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Catchup stream specs, added to those given on the command line.
    pub catchup_streams: Vec<String>,
    /// Publisher stream specs, added to those given on the command line.
    pub publishers: Vec<String>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if self.sync_count == Some(0) {
            bail!("Invalid config value for `sync_count`: 0. Expected a positive integer");
        }
        if let Some(interval) = self.sparse_interval
            && !(interval.is_finite() && interval > 0.0)
        {
            bail!(
                "Invalid config value for `sparse_interval`: {interval}. Expected a positive number"
            );
        }
        Ok(())
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/comicpull/config.toml`
/// 2. `$HOME/.config/comicpull/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("comicpull")
                .join("config.toml"),
        );
    }

    let home = home_dir()?;
    Some(home.join(".config").join("comicpull").join("config.toml"))
}

/// `$HOME`, when set and non-empty.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    env_var_non_empty_os("HOME").map(PathBuf::from)
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "todo_file" => {
                cfg.todo_file = Some(parse_path(value).with_context(invalid)?);
            }
            "pulldb" => {
                cfg.pulldb = Some(parse_path(value).with_context(invalid)?);
            }
            "catalog" => {
                cfg.catalog = Some(parse_path(value).with_context(invalid)?);
            }
            "sync_dir" => {
                cfg.sync_dir = Some(parse_path(value).with_context(invalid)?);
            }
            "sync_count" => {
                cfg.sync_count = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "sparse_interval" => {
                cfg.sparse_interval = Some(parse_float(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            "catchup_stream" => {
                cfg.catchup_streams
                    .push(parse_string_literal(value).with_context(invalid)?);
            }
            "publisher" => {
                cfg.publishers
                    .push(parse_string_literal(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

/// Quoted path; a leading `~/` expands to `$HOME`.
fn parse_path(raw_value: &str) -> Result<PathBuf> {
    let value = parse_string_literal(raw_value)?;
    if value.is_empty() {
        bail!("Expected a non-empty path");
    }
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(value))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_float(raw_value: &str) -> Result<f64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected numeric value");
    }
    Ok(token.parse::<f64>()?)
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
sync_count = 30
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.sync_count, Some(30));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.catalog.is_none());
        assert!(cfg.catchup_streams.is_empty());
    }

    #[test]
    fn test_parse_config_paths() {
        let cfg = parse_config_str(
            r#"
todo_file = "/data/todo.txt"
pulldb = "/data/pull.db"
catalog = "/library/catalog.json"
sync_dir = "/media/reader/comics"
"#,
        )
        .expect("paths should parse");
        assert_eq!(cfg.todo_file, Some(PathBuf::from("/data/todo.txt")));
        assert_eq!(cfg.pulldb, Some(PathBuf::from("/data/pull.db")));
        assert_eq!(cfg.catalog, Some(PathBuf::from("/library/catalog.json")));
        assert_eq!(cfg.sync_dir, Some(PathBuf::from("/media/reader/comics")));
    }

    #[test]
    fn test_parse_config_repeatable_stream_keys() {
        let cfg = parse_config_str(
            r#"
catchup_stream = "ss:18436,18519"
catchup_stream = "xm:4000"
publisher = "Marvel,Max"
"#,
        )
        .expect("stream specs should parse");
        assert_eq!(cfg.catchup_streams, vec!["ss:18436,18519", "xm:4000"]);
        assert_eq!(cfg.publishers, vec!["Marvel,Max"]);
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
sparse_interval = 12.5 # lines
publisher = "DC # Comics" # hash inside quotes is kept
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.sparse_interval, Some(12.5));
        assert_eq!(cfg.publishers, vec!["DC # Comics"]);
    }

    #[test]
    fn test_parse_config_rejects_zero_sync_count() {
        let err = parse_config_str("sync_count = 0").expect_err("zero count expected to fail");
        assert!(err.to_string().contains("sync_count"));
    }

    #[test]
    fn test_parse_config_rejects_non_positive_sparse_interval() {
        let err =
            parse_config_str("sparse_interval = -1").expect_err("negative interval should fail");
        assert!(err.to_string().contains("sparse_interval"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err =
            parse_config_str("sync_count = 4 trailing").expect_err("expected trailing token error");
        assert!(err.to_string().contains("sync_count"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_path() {
        let err = parse_config_str("catalog = /library/catalog.json")
            .expect_err("unquoted path should fail");
        assert!(err.to_string().contains("catalog"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("catalog").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_verbosity() {
        let err = parse_config_str(r#"verbosity = "loud""#).expect_err("bad verbosity");
        assert!(err.to_string().contains("verbosity"));
    }

    #[test]
    fn test_verbosity_as_str() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Verbose.as_str(), "verbose");
        assert_eq!(VerbositySetting::Quiet.as_str(), "quiet");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
    }
}

//! Application configuration loading for CLI defaults.
//!
//! The config file is a `key = value` subset of TOML: double-quoted strings,
//! non-negative integers and `#` comments. `license_rule` may repeat; when it
//! appears, the listed rules replace the built-in table in file order.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use harvester_core::config::IdRange;
use harvester_core::{HarvestConfig, LicenseRule};

/// Separator between pattern and name in a `license_rule` value.
const LICENSE_RULE_SEPARATOR: &str = "=>";

/// File-backed overrides for [`HarvestConfig`].
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    pub source_path: Option<PathBuf>,
    pub ledger_path: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    /// Post-document delay in milliseconds.
    pub request_delay_ms: Option<u64>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    pub checkpoint_interval: Option<usize>,
    pub id_range_start: Option<u64>,
    pub id_range_end: Option<u64>,
    pub user_agent: Option<String>,
    pub abs_base_url: Option<String>,
    pub id_column: Option<usize>,
    pub url_column: Option<usize>,
    /// Ordered license rules; empty keeps the built-in table.
    pub license_rules: Vec<LicenseRule>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(delay) = self.request_delay_ms
            && delay > 60_000
        {
            bail!(
                "Invalid config value for `request_delay_ms`: {delay}. Expected range: 0..=60000"
            );
        }
        if let Some(timeout) = self.request_timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!(
                "Invalid config value for `request_timeout_secs`: {timeout}. Expected range: 1..=3600"
            );
        }
        if self.checkpoint_interval == Some(0) {
            bail!("Invalid config value for `checkpoint_interval`: 0. Expected at least 1");
        }
        if let (Some(start), Some(end)) = (self.id_range_start, self.id_range_end)
            && start > end
        {
            bail!(
                "Invalid config range: `id_range_start` {start} is greater than `id_range_end` {end}"
            );
        }
        Ok(())
    }

    /// Applies every value present in the file onto `config`.
    pub fn apply_to(&self, config: &mut HarvestConfig) {
        if let Some(path) = &self.source_path {
            config.source_path.clone_from(path);
        }
        if let Some(path) = &self.ledger_path {
            config.ledger_path.clone_from(path);
        }
        if let Some(path) = &self.archive_dir {
            config.archive_dir.clone_from(path);
        }
        if let Some(ms) = self.request_delay_ms {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(interval) = self.checkpoint_interval {
            config.checkpoint_interval = interval;
        }
        config.id_range = IdRange::new(
            self.id_range_start.unwrap_or(config.id_range.start),
            self.id_range_end.unwrap_or(config.id_range.end),
        );
        if let Some(agent) = &self.user_agent {
            config.user_agent.clone_from(agent);
        }
        if let Some(base) = &self.abs_base_url {
            config.abs_base_url.clone_from(base);
        }
        if let Some(column) = self.id_column {
            config.id_column = column;
        }
        if let Some(column) = self.url_column {
            config.url_column = column;
        }
        if !self.license_rules.is_empty() {
            config.license_rules.clone_from(&self.license_rules);
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path that was consulted, if any.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/arxiv-harvester/config.toml`
/// 2. `$HOME/.config/arxiv-harvester/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("arxiv-harvester")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("arxiv-harvester")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the explicit config file, or the default one if it exists.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
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
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "source_path" => {
                let path = parse_string_literal(value).with_context(invalid)?;
                cfg.source_path = Some(PathBuf::from(path));
            }
            "ledger_path" => {
                let path = parse_string_literal(value).with_context(invalid)?;
                cfg.ledger_path = Some(PathBuf::from(path));
            }
            "archive_dir" => {
                let path = parse_string_literal(value).with_context(invalid)?;
                cfg.archive_dir = Some(PathBuf::from(path));
            }
            "request_delay_ms" => {
                cfg.request_delay_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "checkpoint_interval" => {
                cfg.checkpoint_interval = Some(parse_integer_usize(value).with_context(invalid)?);
            }
            "id_range_start" => {
                cfg.id_range_start = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "id_range_end" => {
                cfg.id_range_end = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "abs_base_url" => {
                cfg.abs_base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "id_column" => {
                cfg.id_column = Some(parse_integer_usize(value).with_context(invalid)?);
            }
            "url_column" => {
                cfg.url_column = Some(parse_integer_usize(value).with_context(invalid)?);
            }
            "license_rule" => {
                let literal = parse_string_literal(value).with_context(invalid)?;
                cfg.license_rules
                    .push(parse_license_rule(&literal).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Parses `"<pattern> => <name>"`.
pub fn parse_license_rule(value: &str) -> Result<LicenseRule> {
    let Some((pattern, name)) = value.split_once(LICENSE_RULE_SEPARATOR) else {
        bail!("Expected '<pattern> {LICENSE_RULE_SEPARATOR} <name>'");
    };
    if pattern.trim().is_empty() || name.trim().is_empty() {
        bail!("License rule pattern and name must both be non-empty");
    }
    Ok(LicenseRule::owned(pattern, name))
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

fn parse_integer_usize(raw_value: &str) -> Result<usize> {
    let value = parse_integer_u64(raw_value)?;
    usize::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for usize"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
checkpoint_interval = 25
ledger_path = "out/ledger.csv"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.checkpoint_interval, Some(25));
        assert_eq!(cfg.ledger_path, Some(PathBuf::from("out/ledger.csv")));
        assert!(cfg.source_path.is_none());
        assert!(cfg.license_rules.is_empty());
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
request_delay_ms = 1000 # be polite
user_agent = "bot/1.0 (#contact)" # hash inside string kept
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.request_delay_ms, Some(1000));
        assert_eq!(cfg.user_agent.as_deref(), Some("bot/1.0 (#contact)"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key expected");
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_zero_checkpoint_interval() {
        let err = parse_config_str("checkpoint_interval = 0").expect_err("zero interval expected");
        assert!(err.to_string().contains("checkpoint_interval"));
    }

    #[test]
    fn test_parse_config_rejects_inverted_range() {
        let err = parse_config_str("id_range_start = 10\nid_range_end = 5")
            .expect_err("inverted range expected");
        assert!(err.to_string().contains("id_range_start"));
    }

    #[test]
    fn test_parse_config_rejects_trailing_tokens_and_unquoted_strings() {
        let err = parse_config_str("request_timeout_secs = 4 trailing")
            .expect_err("trailing token error expected");
        assert!(err.to_string().contains("request_timeout_secs"));

        let err = parse_config_str("source_path = ids.txt").expect_err("quoted string expected");
        assert!(err.to_string().contains("source_path"));
    }

    #[test]
    fn test_license_rules_repeat_in_file_order() {
        let cfg = parse_config_str(
            r#"
license_rule = "example.org/licenses/a => License A"
license_rule = "Example.org/licenses => Example (any)"
"#,
        )
        .expect("license rules should parse");
        assert_eq!(cfg.license_rules.len(), 2);
        assert_eq!(cfg.license_rules[0].name, "License A");
        assert_eq!(cfg.license_rules[1].pattern, "example.org/licenses");
    }

    #[test]
    fn test_license_rule_without_separator_rejected() {
        let err = parse_config_str(r#"license_rule = "just-a-pattern""#)
            .expect_err("separator expected");
        assert!(err.to_string().contains("license_rule"));
    }

    #[test]
    fn test_apply_to_overrides_only_present_values() {
        let cfg = parse_config_str(
            r#"
request_timeout_secs = 30
id_range_end = 70000
license_rule = "example.org => Example"
"#,
        )
        .expect("config should parse");
        let mut config = HarvestConfig::default();
        cfg.apply_to(&mut config);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.id_range, IdRange::new(60_987, 70_000));
        assert_eq!(config.license_rules.len(), 1);
        assert_eq!(config.checkpoint_interval, 50);
    }

    #[test]
    fn test_load_config_explicit_missing_file_is_error() {
        let err = load_config(Some(Path::new("/definitely/not/config.toml")))
            .expect_err("missing explicit config expected");
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

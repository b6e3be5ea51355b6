use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{IdPattern, NormalizeScope, ReinsertMode, Strategy};
use crate::normalize::canonicalize::ID_DIGITS;

/// Root configuration structure, deserialized from `.branch-splitr/config.toml`.
///
/// Every key is optional; a missing file or section yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub detect: DetectConfig,
}

/// How company names (and optionally every field) are rewritten.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub scope: NormalizeScope,
    /// Only consulted by [`Strategy::RelocateLastParenthetical`].
    #[serde(default)]
    pub reinsert: ReinsertMode,
}

/// How a branch ID is recognised after normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectConfig {
    /// `"variable"` or `{ fixed = N }`. Follows the strategy when unset.
    #[serde(default)]
    pub id_pattern: Option<IdPattern>,
}

impl Config {
    /// The effective ID pattern: explicit setting, otherwise the strategy's own.
    ///
    /// The relocate strategy keeps any trailing marker, so it detects IDs of any
    /// length; the canonicalize strategy only ever wraps 5-digit IDs.
    pub fn id_pattern(&self) -> IdPattern {
        self.detect
            .id_pattern
            .unwrap_or(match self.normalize.strategy {
                Strategy::RelocateLastParenthetical => IdPattern::Variable,
                Strategy::CanonicalizeIdParentheses => IdPattern::Fixed(ID_DIGITS),
            })
    }
}

/// Load the run configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<base_path>/.branch-splitr/config.toml`
/// 3. `~/.config/branch-splitr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = base_path.join(".branch-splitr").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("branch-splitr")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.normalize.strategy, Strategy::RelocateLastParenthetical);
        assert_eq!(cfg.normalize.scope, NormalizeScope::CompanyNameOnly);
        assert_eq!(cfg.normalize.reinsert, ReinsertMode::Leading);
        assert_eq!(cfg.id_pattern(), IdPattern::Variable);
    }

    #[test]
    fn test_full_file() {
        let cfg: Config = toml::from_str(
            r#"
[normalize]
strategy = "canonicalize-id-parentheses"
scope = "all-fields"
reinsert = "legacy-offsets"

[detect]
id_pattern = { fixed = 6 }
"#,
        )
        .unwrap();
        assert_eq!(cfg.normalize.strategy, Strategy::CanonicalizeIdParentheses);
        assert_eq!(cfg.normalize.scope, NormalizeScope::AllFields);
        assert_eq!(cfg.normalize.reinsert, ReinsertMode::LegacyOffsets);
        assert_eq!(cfg.id_pattern(), IdPattern::Fixed(6));
    }

    #[test]
    fn test_id_pattern_follows_strategy() {
        let cfg: Config = toml::from_str(
            r#"
[normalize]
strategy = "canonicalize-id-parentheses"
"#,
        )
        .unwrap();
        assert_eq!(cfg.id_pattern(), IdPattern::Fixed(5));

        let cfg: Config = toml::from_str(
            r#"
[normalize]
strategy = "canonicalize-id-parentheses"

[detect]
id_pattern = "variable"
"#,
        )
        .unwrap();
        assert_eq!(cfg.id_pattern(), IdPattern::Variable);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
[normalize]
strategy = "strip-everything"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".branch-splitr");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[normalize]\nscope = \"all-fields\"\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.normalize.scope, NormalizeScope::AllFields);
    }

    #[test]
    fn test_load_config_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".branch-splitr");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[normalize]\nscope = \"all-fields\"\n",
        )
        .unwrap();
        let override_path = dir.path().join("override.toml");
        std::fs::write(&override_path, "[detect]\nid_pattern = { fixed = 5 }\n").unwrap();

        let cfg = load_config(dir.path(), Some(&override_path)).unwrap();
        assert_eq!(cfg.normalize.scope, NormalizeScope::CompanyNameOnly);
        assert_eq!(cfg.id_pattern(), IdPattern::Fixed(5));
    }

    #[test]
    fn test_load_config_missing_override_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(dir.path(), Some(&missing)).is_err());
    }
}

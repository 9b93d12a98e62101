//! Configuration loading and management.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::history::TokenVocabulary;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outcome token spellings.
    pub tokens: TokenVocabulary,
    /// History input settings.
    pub input: InputConfig,
    /// Output configuration.
    pub output: OutputConfig,
    /// Synthetic history generation defaults.
    pub generate: GenerateConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config` flags.
    /// Env vars with `CFP_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::extract(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(Toml::file_exact(path))
                .merge(Env::prefixed("CFP_").split("__")),
        )
    }

    /// Load configuration from directory, looking for cfp.toml or .cfp/cfp.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    /// Env vars with `CFP_` prefix override file/default values.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::extract(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(Toml::file(dir.join("cfp.toml")))
                .merge(Toml::file(dir.join(".cfp/cfp.toml")))
                .merge(Env::prefixed("CFP_").split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make history input ambiguous.
    pub fn validate(&self) -> Result<()> {
        self.tokens.validate()?;
        if !self.input.delimiter.is_ascii() {
            return Err(Error::config(format!(
                "input.delimiter {:?} must be a single ASCII character",
                self.input.delimiter
            )));
        }
        let p = self.generate.probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::config(format!(
                "generate.probability {p} must be between 0 and 1"
            )));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create default config file content.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }
}

/// History input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Field delimiter.
    pub delimiter: char,
    /// First row names the tests.
    pub has_headers: bool,
    /// Strip whitespace around tokens.
    pub trim: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_headers: false,
            trim: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,
    /// Include every execution record in reports.
    pub show_history: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_history: true,
        }
    }
}

/// Defaults for `cfp generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub executions: usize,
    pub tests: usize,
    /// Probability of each test failing in each execution.
    pub probability: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            executions: 20,
            tests: 10,
            probability: 0.1,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// Markdown format.
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tokens.pass, "pass");
        assert_eq!(config.tokens.fail, "fail");
        assert_eq!(config.tokens.not_run, "");
        assert_eq!(config.input.delimiter, ',');
        assert!(!config.input.has_headers);
        assert!(config.output.show_history);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "cfp.toml",
                "[tokens]\npass = \"ok\"\nfail = \"ko\"\n\n[input]\nhas_headers = true",
            )?;
            let config = Config::from_file("cfp.toml").unwrap();
            assert_eq!(config.tokens.pass, "ok");
            assert_eq!(config.tokens.fail, "ko");
            assert_eq!(config.tokens.not_run, "");
            assert!(config.input.has_headers);
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_cfp_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("cfp.toml", "[output]\nformat = \"json\"")?;
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.output.format, OutputFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_dot_cfp() {
        Jail::expect_with(|jail| {
            std::fs::create_dir(jail.directory().join(".cfp")).unwrap();
            jail.create_file(".cfp/cfp.toml", "[input]\ndelimiter = \";\"")?;
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.input.delimiter, ';');
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_no_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.generate.tests, 10);
            Ok(())
        });
    }

    #[test]
    fn test_from_file_errors_on_missing_file() {
        let result = Config::from_file("/nonexistent/path/cfp.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"), "expected 'not found' in: {err}");
    }

    #[test]
    fn test_env_var_overrides_file_value() {
        Jail::expect_with(|jail| {
            jail.create_file("cfp.toml", "[generate]\nexecutions = 50")?;
            jail.set_env("CFP_GENERATE__EXECUTIONS", "5");
            let config = Config::from_file("cfp.toml").unwrap();
            assert_eq!(config.generate.executions, 5);
            Ok(())
        });
    }

    #[test]
    fn test_rejects_clashing_tokens() {
        Jail::expect_with(|jail| {
            jail.create_file("cfp.toml", "[tokens]\npass = \"fail\"")?;
            let err = Config::from_file("cfp.toml").unwrap_err();
            assert!(matches!(err, Error::Config(_)), "got: {err:?}");
            assert!(err.to_string().contains("distinct"));
            Ok(())
        });
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        Jail::expect_with(|jail| {
            jail.create_file("cfp.toml", "[generate]\nprobability = 1.5")?;
            assert!(Config::from_file("cfp.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed: Config = toml::from_str(Config::default_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.tokens, defaults.tokens);
        assert_eq!(parsed.input.delimiter, defaults.input.delimiter);
        assert_eq!(parsed.output.format, defaults.output.format);
        assert_eq!(parsed.generate.executions, defaults.generate.executions);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = Config::default();
        config.input.has_headers = true;
        config.tokens.not_run = "skip".to_string();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert!(parsed.input.has_headers);
        assert_eq!(parsed.tokens.not_run, "skip");
    }

    #[test]
    fn test_config_serialization() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("not_run"));
        assert!(json.contains("show_history"));
    }
}

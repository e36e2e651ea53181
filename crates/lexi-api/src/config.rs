//! Server configuration read from the environment.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lexi_openai::{DEFAULT_BASE_URL, OpenAiConfig};
use lexi_story::config::{ModelSettings, StoryConfig};

use crate::error::AppError;

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    /// When `false`, all user text is accepted without a moderation call.
    pub moderation_enabled: bool,
    /// YAML language table; the built-in table is used when unset.
    pub languages_file: Option<PathBuf>,
    pub story: StoryConfig,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or any
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or any
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY must be set".to_owned()))?;

        let defaults = StoryConfig::default();
        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| defaults.story_model.model.clone());
        let session_ttl_secs: u64 = parse(&lookup, "STORY_SESSION_TTL_SECS", 86_400)?;

        let story = StoryConfig {
            story_model: ModelSettings {
                model: model.clone(),
                max_tokens: parse(&lookup, "OPENAI_MAX_TOKENS", defaults.story_model.max_tokens)?,
                temperature: parse(
                    &lookup,
                    "OPENAI_TEMPERATURE",
                    defaults.story_model.temperature,
                )?,
            },
            vocabulary_model: ModelSettings {
                model,
                ..defaults.vocabulary_model
            },
            conclude_after_turn: parse(
                &lookup,
                "STORY_CONCLUDE_AFTER_TURN",
                defaults.conclude_after_turn,
            )?,
            growth_probability: parse(
                &lookup,
                "STORY_GROWTH_PROBABILITY",
                defaults.growth_probability,
            )?,
            session_ttl: (session_ttl_secs > 0).then(|| Duration::from_secs(session_ttl_secs)),
            vocabulary_ttl: Duration::from_secs(parse(&lookup, "VOCABULARY_TTL_SECS", 3600)?),
            ..defaults
        };
        story.validate().map_err(AppError::Config)?;

        let timeout_secs: u64 = parse(&lookup, "OPENAI_TIMEOUT_SECS", 60)?;
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "OPENAI_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse(&lookup, "PORT", 3000)?,
            openai: OpenAiConfig {
                api_key,
                base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
                timeout: Duration::from_secs(timeout_secs),
            },
            moderation_enabled: parse(&lookup, "MODERATION_ENABLED", true)?,
            languages_file: lookup("LANGUAGES_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            story,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.openai.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.openai.timeout, Duration::from_secs(60));
        assert!(config.moderation_enabled);
        assert!(config.languages_file.is_none());
        assert_eq!(config.story, StoryConfig::default());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("MODERATION_ENABLED", "false"),
            ("STORY_CONCLUDE_AFTER_TURN", "5"),
            ("STORY_SESSION_TTL_SECS", "0"),
            ("LANGUAGES_FILE", "/etc/lexi/languages.yaml"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.story.story_model.model, "gpt-4o");
        assert_eq!(config.story.vocabulary_model.model, "gpt-4o");
        assert_eq!(config.story.vocabulary_model.max_tokens, 150);
        assert!(!config.moderation_enabled);
        assert_eq!(config.story.conclude_after_turn, 5);
        assert!(config.story.session_ttl.is_none());
        assert_eq!(
            config.languages_file,
            Some(PathBuf::from("/etc/lexi/languages.yaml"))
        );
    }

    #[test]
    fn test_unparseable_value_is_config_error() {
        let result = config_from(&[("OPENAI_API_KEY", "sk-test"), ("PORT", "http")]);

        assert!(matches!(result, Err(AppError::Config(message)) if message.contains("PORT")));
    }

    #[test]
    fn test_zero_timeout_is_config_error() {
        let result = config_from(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_TIMEOUT_SECS", "0")]);

        assert!(
            matches!(result, Err(AppError::Config(message)) if message.contains("OPENAI_TIMEOUT_SECS"))
        );
    }

    #[test]
    fn test_out_of_range_probability_is_config_error() {
        let result = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("STORY_GROWTH_PROBABILITY", "2.0"),
        ]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}

//! Story engine tuning.

use std::time::Duration;

/// Model settings for one kind of LLM request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// Provider model name.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Pacing, persistence, and model settings for the story engine.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryConfig {
    /// Settings for story turns (opening, continuation, growth, conclusion).
    pub story_model: ModelSettings,
    /// Settings for vocabulary lookups.
    pub vocabulary_model: ModelSettings,
    /// Once a session's turn counter reaches this value, the next choice
    /// selects the conclusion template.
    pub conclude_after_turn: u32,
    /// Chance that a turn is preceded by a character-growth moment.
    pub growth_probability: f64,
    /// Inclusive lower bound of growth moments granted to a new story.
    pub growth_moments_min: u32,
    /// Inclusive upper bound of growth moments granted to a new story.
    pub growth_moments_max: u32,
    /// TTL of a live story session. `None` keeps sessions until deleted.
    pub session_ttl: Option<Duration>,
    /// TTL of an unfinished onboarding dialog.
    pub dialog_ttl: Option<Duration>,
    /// TTL of cached vocabulary entries.
    pub vocabulary_ttl: Duration,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            story_model: ModelSettings {
                model: "gpt-4o-mini".to_owned(),
                max_tokens: 400,
                temperature: 0.8,
            },
            vocabulary_model: ModelSettings {
                model: "gpt-4o-mini".to_owned(),
                max_tokens: 150,
                temperature: 0.3,
            },
            conclude_after_turn: 8,
            growth_probability: 0.25,
            growth_moments_min: 1,
            growth_moments_max: 2,
            session_ttl: Some(Duration::from_secs(24 * 3600)),
            dialog_ttl: Some(Duration::from_secs(24 * 3600)),
            vocabulary_ttl: Duration::from_secs(3600),
        }
    }
}

impl StoryConfig {
    /// Checks that the settings are internally consistent.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.growth_probability) {
            return Err(format!(
                "growth probability must be within [0, 1], got {}",
                self.growth_probability
            ));
        }
        if self.growth_moments_min > self.growth_moments_max {
            return Err(format!(
                "growth moment range {}..={} is empty",
                self.growth_moments_min, self.growth_moments_max
            ));
        }
        if self.conclude_after_turn == 0 {
            return Err("conclude_after_turn must be at least 1".to_owned());
        }
        for settings in [&self.story_model, &self.vocabulary_model] {
            if settings.model.trim().is_empty() {
                return Err("model name must not be empty".to_owned());
            }
            if settings.max_tokens == 0 {
                return Err("max_tokens must be positive".to_owned());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.conclude_after_turn, 8);
        assert!((config.growth_probability - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.vocabulary_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let config = StoryConfig {
            growth_probability: 1.5,
            ..StoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_growth_range() {
        let config = StoryConfig {
            growth_moments_min: 3,
            growth_moments_max: 1,
            ..StoryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

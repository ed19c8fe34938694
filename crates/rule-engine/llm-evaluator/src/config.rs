//! Per-call configuration passed to the Judge.

/// Generation parameters for a single Judge call. Every schema kind builds
/// one of these from the env-sourced defaults, currently without per-schema
/// overrides.
#[derive(Debug, Clone)]
pub struct JudgeCallConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl JudgeCallConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_clamped() {
        assert_eq!(JudgeCallConfig::new("m").with_temperature(1.5).temperature, 1.0);
        assert_eq!(JudgeCallConfig::new("m").with_temperature(-0.5).temperature, 0.0);
    }
}

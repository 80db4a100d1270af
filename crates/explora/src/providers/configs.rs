use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: i32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    JsonObject,
    Text,
}

/// Model parameters for one provider call. Built once at startup and handed to each
/// request rather than read from globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<i32>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            response_format: ResponseFormat::default(),
        }
    }
}

impl ModelConfig {
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<i32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> Option<f32> {
    Some(DEFAULT_TEMPERATURE)
}

fn default_max_tokens() -> Option<i32> {
    Some(DEFAULT_MAX_TOKENS)
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings. Every field has a default so a partial (or absent)
/// `window.lexiAnnotatorConfig` object is enough.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub namespace_prefix: String,
    pub global_key: String,
    pub context_highlight: String,
    pub expression_highlight: String,
    pub block_selectors: Vec<String>,
    pub restore_delay_ms: u32,
    pub tooltip_offset: Offset,
    pub toast_duration_ms: u32,
    pub log_level: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace_prefix: "gpt-url-data-".to_string(),
            global_key: "gptExpressionPairs".to_string(),
            context_highlight: "gpt-context-highlight".to_string(),
            expression_highlight: "gpt-expression-highlight".to_string(),
            block_selectors: vec![
                "p".to_string(),
                "div".to_string(),
                "yt-formatted-string".to_string(),
            ],
            restore_delay_ms: 3500,
            tooltip_offset: Offset { x: 15.0, y: 20.0 },
            toast_duration_ms: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms.into())
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms.into())
    }

    pub fn block_selector(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .block_selectors
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    pub fn max_level(&self) -> tracing::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{"block_selectors": ["article", " p "], "log_level": "DEBUG"}"#)
                .unwrap();
        assert_eq!(config.global_key, "gptExpressionPairs");
        assert_eq!(config.block_selector().as_deref(), Some("article, p"));
        assert_eq!(config.max_level(), tracing::Level::DEBUG);
        assert_eq!(config.restore_delay(), Duration::from_millis(3500));
    }

    #[test]
    fn empty_selector_list_disables_auto_context() {
        let config = Config {
            block_selectors: vec!["  ".to_string()],
            ..Config::default()
        };
        assert_eq!(config.block_selector(), None);
    }
}

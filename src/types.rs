use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: i64,
    pub was_filtered: bool,
    pub filter_reason: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(new_message_id(), text, true)
    }

    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, text, false)
    }

    pub fn filtered(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            was_filtered: true,
            filter_reason: Some(reason.clone()),
            ..Self::new(new_message_id(), reason, false)
        }
    }

    fn new(id: impl Into<String>, text: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_user,
            timestamp: Utc::now().timestamp_millis(),
            was_filtered: false,
            filter_reason: None,
        }
    }

    /// Same entry with new text. Id and creation time are kept so the
    /// display list can replace it in place.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    #[default]
    Strict,
    Moderate,
    Permissive,
}

impl SafetyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SafetyLevel::Strict => "strict",
            SafetyLevel::Moderate => "moderate",
            SafetyLevel::Permissive => "permissive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(SafetyLevel::Strict),
            "moderate" => Some(SafetyLevel::Moderate),
            "permissive" => Some(SafetyLevel::Permissive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySettings {
    #[serde(default)]
    pub level: SafetyLevel,
    #[serde(default = "enabled")]
    pub block_harassment: bool,
    #[serde(default = "enabled")]
    pub block_hate_speech: bool,
    #[serde(default = "enabled")]
    pub block_sexual_content: bool,
    #[serde(default = "enabled")]
    pub block_dangerous_content: bool,
}

fn enabled() -> bool {
    true
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            level: SafetyLevel::Strict,
            block_harassment: true,
            block_hate_speech: true,
            block_sexual_content: true,
            block_dangerous_content: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDecision {
    pub blocked: bool,
    pub reason: Option<String>,
}

impl FilterDecision {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
        }
    }
}

/// One event of a generation stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum GenerateResult {
    Processing,
    Chunk(String),
    Complete(String),
    Filtered(String),
    Error(String),
}

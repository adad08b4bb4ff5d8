use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
    Tool,
}

impl TurnRole {
    // `system` is filtered out before this point; unknown or missing
    // roles read as the assistant.
    pub fn from_raw(role: Option<&str>) -> Self {
        match role {
            Some("user") => Self::User,
            Some("tool") => Self::Tool,
            _ => Self::Assistant,
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Assistant => write!(f, "Assistant"),
            Self::Tool => write!(f, "Tool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub create_time: Option<f64>,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub share_id: String,
    pub source_url: String,
    pub title: String,
    pub updated_at: Option<f64>,
    pub model_slug: Option<String>,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_tool_turns: bool,
    pub include_internal_actions: bool,
    pub include_reasoning: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Agent => write!(f, "agent"),
        }
    }
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub is_loading: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::User,
            agent_name: None,
            timestamp: Utc::now(),
            images: None,
            is_loading: false,
        }
    }

    pub fn agent(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::Agent,
            agent_name: Some(agent_name.into()),
            timestamp: Utc::now(),
            images: None,
            is_loading: false,
        }
    }

    /// Placeholder shown while a response is outstanding.
    pub fn loading(agent_name: impl Into<String>) -> Self {
        Self {
            is_loading: true,
            ..Self::agent(agent_name, "Thinking...")
        }
    }

    /// Attaches image filenames; an empty list leaves the message without images.
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = if images.is_empty() {
            None
        } else {
            Some(images)
        };
        self
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn image_count(&self) -> usize {
        self.images.as_ref().map(Vec::len).unwrap_or(0)
    }
}

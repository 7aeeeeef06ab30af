use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mention id reserved for notifying every member of a room
pub const MENTION_ALL: &str = "all";
/// Mention id reserved for notifying the members currently online
pub const MENTION_HERE: &str = "here";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub username: String,
}

impl Mention {
    pub fn all() -> Self {
        Self {
            id: MENTION_ALL.to_string(),
            username: MENTION_ALL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub room_id: String,
    pub author: MessageAuthor,
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    /// Creation time; imported messages carry their original timestamp
    pub ts: Option<DateTime<Utc>>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(room_id: String, author: MessageAuthor, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_id,
            author,
            text,
            mentions: Vec::new(),
            ts: Some(Utc::now()),
            edited_at: None,
        }
    }

    pub fn with_mention(mut self, mention: Mention) -> Self {
        self.mentions.push(mention);
        self
    }

    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn mentions_id(&self, id: &str) -> bool {
        self.mentions.iter().any(|m| m.id == id)
    }
}

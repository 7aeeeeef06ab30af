use serde::{Deserialize, Serialize};

pub const ROLE_LIVECHAT_AGENT: &str = "livechat-agent";
pub const ROLE_BOT: &str = "bot";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub language: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            language: None,
            roles: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Human livechat agents; bots carrying the agent role are excluded
    pub fn is_livechat_agent(&self) -> bool {
        self.has_role(ROLE_LIVECHAT_AGENT) && !self.has_role(ROLE_BOT)
    }
}

use serde::{Deserialize, Serialize};

/// Room kind, mirrors the single-letter room type codes of the chat product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Channel,
    Private,
    Direct,
    Omnichannel,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Channel => "c",
            RoomType::Private => "p",
            RoomType::Direct => "d",
            RoomType::Omnichannel => "l",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" => Ok(RoomType::Channel),
            "p" => Ok(RoomType::Private),
            "d" => Ok(RoomType::Direct),
            "l" => Ok(RoomType::Omnichannel),
            _ => Err(format!("Invalid room type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub kind: RoomType,
    /// Department serving the conversation, omnichannel rooms only
    pub department_id: Option<String>,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: RoomType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            department_id: None,
        }
    }

    pub fn is_omnichannel(&self) -> bool {
        self.kind == RoomType::Omnichannel
    }
}

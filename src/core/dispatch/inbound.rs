/// A user as the dispatcher sees them: enough to address, mention and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: u64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bot: bool,
}

impl ChatUser {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar_url: None,
            bot: false,
        }
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A platform message reduced to what routing and the command handlers need.
///
/// `guild_id` decides the routing state: `Some` is a guild message, `None` is a
/// direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub author: ChatUser,
    pub content: String,
    pub mentions: Vec<ChatUser>,
    pub mentioned_roles: Vec<u64>,
}

impl InboundMessage {
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

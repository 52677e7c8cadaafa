// Outbound payloads. A reply is either plain text or a structured response
// that the Discord layer renders into an embed.

pub const DEFAULT_COLOR: u32 = 0x0099ff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

/// Platform-neutral structured response (title, body, color, fields, images).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: u32,
    pub author: Option<EmbedAuthor>,
    pub fields: Vec<EmbedField>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub footer: Option<String>,
    pub timestamp: bool,
}

impl Default for Embed {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            color: DEFAULT_COLOR,
            author: None,
            fields: Vec::new(),
            thumbnail: None,
            image: None,
            footer: None,
            timestamp: false,
        }
    }
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn author(mut self, name: impl Into<String>, icon_url: Option<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            icon_url,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = EmbedField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Embed(Embed),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    /// Flattened text of the reply. Used for logging and assertions.
    pub fn content(&self) -> String {
        match self {
            Reply::Text(text) => text.clone(),
            Reply::Embed(embed) => {
                let mut parts = Vec::new();
                parts.extend(embed.title.clone());
                parts.extend(embed.description.clone());
                for field in &embed.fields {
                    parts.push(format!("{}: {}", field.name, field.value));
                }
                parts.join("\n")
            }
        }
    }
}

impl From<Embed> for Reply {
    fn from(embed: Embed) -> Self {
        Reply::Embed(embed)
    }
}

//! Message templates and their renderings
//!
//! A template is either legacy `&`-coded text or a structured JSON document.
//! Templates without placeholders are rendered once when the catalog is
//! built; templates with `%player%` or `%server%` are rendered per recipient.

use serde_json::Value;
use std::borrow::Cow;

use crate::host::Player;
use crate::text::{legacy, Component};

/// Replaced with the recipient's username
pub const PLAYER_PLACEHOLDER: &str = "%player%";

/// Replaced with the recipient's current backend server
pub const SERVER_PLACEHOLDER: &str = "%server%";

/// Substituted for `%server%` when the recipient is between servers
pub const NO_SERVER: &str = "<none>";

/// Syntactic shape of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// Plain text with `&` color and format codes
    Legacy,
    /// JSON chat component (object or array)
    Structured,
}

impl MessageFormat {
    /// Classify a template
    ///
    /// Only a JSON object or array counts as structured. A bare JSON scalar
    /// such as `"hi"` or `42` is legacy text even though it parses.
    pub fn detect(template: &str) -> Self {
        match serde_json::from_str::<Value>(template) {
            Ok(Value::Object(_)) | Ok(Value::Array(_)) => Self::Structured,
            _ => Self::Legacy,
        }
    }

    /// Render text in this format
    ///
    /// Structured text that does not deserialize into a component falls
    /// back to legacy rendering of the same text.
    pub fn render(&self, text: &str) -> Component {
        match self {
            Self::Legacy => legacy::parse(text, legacy::AMPERSAND),
            Self::Structured => Component::from_json(text).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Structured message did not parse, rendering as legacy text");
                legacy::parse(text, legacy::AMPERSAND)
            }),
        }
    }
}

/// How a message is turned into a component at delivery time
#[derive(Debug, Clone, PartialEq)]
pub enum Rendering {
    /// Same component for every recipient, built once
    Precomputed(Component),
    /// Depends on the recipient; rebuilt from the template on each delivery
    PerRecipient,
}

/// One entry of a group's catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    template: String,
    format: MessageFormat,
    rendering: Rendering,
}

impl Message {
    /// Build a message, rendering it immediately when it has no placeholders
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let format = MessageFormat::detect(&template);
        let rendering = if has_placeholders(&template) {
            Rendering::PerRecipient
        } else {
            Rendering::Precomputed(format.render(&template))
        };

        Self {
            template,
            format,
            rendering,
        }
    }

    /// Raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn format(&self) -> MessageFormat {
        self.format
    }

    pub fn is_structured(&self) -> bool {
        self.format == MessageFormat::Structured
    }

    pub fn rendering(&self) -> &Rendering {
        &self.rendering
    }

    pub fn has_placeholders(&self) -> bool {
        matches!(self.rendering, Rendering::PerRecipient)
    }

    /// Component to deliver to `recipient`
    ///
    /// Precomputed messages are borrowed and ignore the recipient. Without a
    /// recipient, `%player%` becomes empty and `%server%` becomes `<none>`.
    pub fn render(&self, recipient: Option<&dyn Player>) -> Cow<'_, Component> {
        match &self.rendering {
            Rendering::Precomputed(component) => Cow::Borrowed(component),
            Rendering::PerRecipient => {
                let text = substitute(&self.template, recipient);
                Cow::Owned(self.format.render(&text))
            }
        }
    }
}

fn has_placeholders(template: &str) -> bool {
    template.contains(PLAYER_PLACEHOLDER) || template.contains(SERVER_PLACEHOLDER)
}

/// Replace `%player%`, then `%server%`, literally
pub fn substitute(template: &str, recipient: Option<&dyn Player>) -> String {
    let (player, server) = match recipient {
        Some(player) => (
            player.username().to_string(),
            player
                .current_server()
                .unwrap_or_else(|| NO_SERVER.to_string()),
        ),
        None => (String::new(), NO_SERVER.to_string()),
    };

    template
        .replace(PLAYER_PLACEHOLDER, &player)
        .replace(SERVER_PLACEHOLDER, &server)
}

/// Ordered, immutable list of a group's messages
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: Vec<Message>,
}

impl MessageCatalog {
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: templates.into_iter().map(Message::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

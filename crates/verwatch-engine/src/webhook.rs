//! Webhook execution payload

use crate::errors::Result;
use serde::Serialize;
use verwatch_core::errors::WatchError;
use verwatch_core::render::{Component, Embed};

pub const MAX_EMBEDS: usize = 10;
pub const MAX_COMPONENTS: usize = 5;

/// Which mentions in `content` may actually ping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
    pub roles: Vec<String>,
    pub users: Vec<String>,
    pub replied_user: bool,
}

impl AllowedMentions {
    /// Nothing pings
    pub fn none() -> Self {
        Self::default()
    }

    /// Only the listed roles ping
    pub fn roles(roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Webhook {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_mentions: Option<AllowedMentions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<Component>,
}

impl Webhook {
    pub fn builder() -> WebhookBuilder {
        WebhookBuilder::default()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    pub fn allowed_mentions(&self) -> Option<&AllowedMentions> {
        self.allowed_mentions.as_ref()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

#[derive(Debug, Default)]
pub struct WebhookBuilder {
    content: Option<String>,
    username: Option<String>,
    embeds: Vec<Embed>,
    allowed_mentions: Option<AllowedMentions>,
    components: Vec<Component>,
}

impl WebhookBuilder {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn embeds(mut self, embeds: impl IntoIterator<Item = Embed>) -> Self {
        self.embeds.extend(embeds);
        self
    }

    pub fn allowed_mentions(mut self, allowed_mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(allowed_mentions);
        self
    }

    pub fn components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        self.components.extend(components);
        self
    }

    /// # Errors
    ///
    /// - `InvalidInput`: neither content nor embeds
    /// - `LimitExceeded`: more than 10 embeds or 5 components
    pub fn build(self) -> Result<Webhook> {
        if self.content.as_deref().map_or(true, str::is_empty) && self.embeds.is_empty() {
            return Err(WatchError::EmptyPayload.into());
        }
        if self.embeds.len() > MAX_EMBEDS {
            return Err(WatchError::TooManyItems {
                what: "Webhook embeds",
                max: MAX_EMBEDS,
                actual: self.embeds.len(),
            }
            .into());
        }
        if self.components.len() > MAX_COMPONENTS {
            return Err(WatchError::TooManyItems {
                what: "Webhook components",
                max: MAX_COMPONENTS,
                actual: self.components.len(),
            }
            .into());
        }

        Ok(Webhook {
            content: self.content,
            username: self.username,
            embeds: self.embeds,
            allowed_mentions: self.allowed_mentions,
            components: self.components,
        })
    }
}

/// Role pings for the content line, `<@&id>` separated by spaces
pub fn role_mention_content(roles: &[String]) -> Option<String> {
    if roles.is_empty() {
        return None;
    }
    Some(
        roles
            .iter()
            .map(|role| format!("<@&{}>", role))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

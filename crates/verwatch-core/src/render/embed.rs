//! Rich embed model with delivery limits
//!
//! Lengths are counted in characters. The combined content limit
//! ([`MAX_TOTAL_LENGTH`]) is not checked here; the batcher uses
//! [`Embed::total_content_length`] to keep whole messages under it.

use crate::errors::{Result, WatchError};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MAX_TOTAL_LENGTH: usize = 6000;
pub const MAX_TITLE: usize = 256;
pub const MAX_DESCRIPTION: usize = 4096;
pub const MAX_FIELDS: usize = 25;
pub const MAX_FIELD_NAME: usize = 256;
pub const MAX_FIELD_VALUE: usize = 1024;
pub const MAX_FOOTER_TEXT: usize = 2048;
pub const MAX_AUTHOR_NAME: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    colour: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<Footer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<Author>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<Field>,
}

impl Embed {
    pub fn builder() -> EmbedBuilder {
        EmbedBuilder::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn colour(&self) -> Option<u32> {
        self.colour
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Characters counted against the per-message content limit:
    /// title, description, footer, author name, field names and values
    pub fn total_content_length(&self) -> usize {
        let len = |s: &str| s.chars().count();
        self.title.as_deref().map_or(0, len)
            + self.description.as_deref().map_or(0, len)
            + self.footer.as_ref().map_or(0, |f| len(&f.text))
            + self.author.as_ref().map_or(0, |a| len(&a.name))
            + self
                .fields
                .iter()
                .map(|f| len(&f.name) + len(&f.value))
                .sum::<usize>()
    }
}

/// Builder for [`Embed`]; limits are checked in [`EmbedBuilder::build`]
#[derive(Debug, Clone, Default)]
pub struct EmbedBuilder {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    colour: Option<u32>,
    footer: Option<Footer>,
    author: Option<Author>,
    fields: Vec<Field>,
}

impl EmbedBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn colour(mut self, rgb: u32) -> Self {
        self.colour = Some(rgb);
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(Footer { text: text.into() });
        self
    }

    pub fn author(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.author = Some(Author {
            name: name.into(),
            url,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// # Errors
    ///
    /// - `LimitExceeded`: any text or the field count is over its limit
    pub fn build(self) -> Result<Embed> {
        check_text("Title", self.title.as_deref(), MAX_TITLE)?;
        check_text("Description", self.description.as_deref(), MAX_DESCRIPTION)?;
        check_text("Footer text", self.footer.as_ref().map(|f| f.text.as_str()), MAX_FOOTER_TEXT)?;
        check_text("Author name", self.author.as_ref().map(|a| a.name.as_str()), MAX_AUTHOR_NAME)?;
        if self.fields.len() > MAX_FIELDS {
            return Err(WatchError::TooManyItems {
                what: "Embed fields",
                max: MAX_FIELDS,
                actual: self.fields.len(),
            }
            .into());
        }
        for field in &self.fields {
            check_text("Field name", Some(&field.name), MAX_FIELD_NAME)?;
            check_text("Field value", Some(&field.value), MAX_FIELD_VALUE)?;
        }

        Ok(Embed {
            title: self.title,
            description: self.description,
            url: self.url,
            timestamp: self.timestamp,
            colour: self.colour,
            footer: self.footer,
            author: self.author,
            fields: self.fields,
        })
    }
}

fn check_text(what: &'static str, text: Option<&str>, max: usize) -> Result<()> {
    let actual = text.map_or(0, |t| t.chars().count());
    if actual > max {
        return Err(WatchError::TextTooLong { what, max, actual }.into());
    }
    Ok(())
}

//! Interactive message components
//!
//! Only link buttons are useful without an interaction endpoint, but every
//! button style is modelled so validation matches what the API accepts.

use crate::errors::{Result, WatchError};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

pub const MAX_ROW_CHILDREN: usize = 5;
pub const MAX_BUTTON_LABEL: usize = 80;

const TYPE_ACTION_ROW: u8 = 1;
const TYPE_BUTTON: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

impl ButtonStyle {
    pub fn id(self) -> u8 {
        match self {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
            ButtonStyle::Link => 5,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(ButtonStyle::Primary),
            2 => Some(ButtonStyle::Secondary),
            3 => Some(ButtonStyle::Success),
            4 => Some(ButtonStyle::Danger),
            5 => Some(ButtonStyle::Link),
            _ => None,
        }
    }

    /// Link buttons carry a url and no custom id; every other style the reverse
    fn validate(self, button: &Button) -> Result<()> {
        let valid = match self {
            ButtonStyle::Link => button.url.is_some() && button.custom_id.is_none(),
            _ => button.custom_id.is_some() && button.url.is_none(),
        };
        if valid {
            return Ok(());
        }
        let reason = match self {
            ButtonStyle::Link => "Link buttons must have a URL but not a custom id",
            _ => "Non-link buttons must have a custom id but not a URL",
        };
        Err(WatchError::InvalidComponent {
            reason: reason.to_string(),
        }
        .into())
    }
}

impl Serialize for ButtonStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    style: ButtonStyle,
    label: Option<String>,
    custom_id: Option<String>,
    url: Option<String>,
    disabled: bool,
}

impl Button {
    /// # Errors
    ///
    /// - `InvalidComponent`: url/custom id do not match the style
    /// - `LimitExceeded`: label longer than [`MAX_BUTTON_LABEL`]
    pub fn new(
        style: ButtonStyle,
        label: Option<String>,
        custom_id: Option<String>,
        url: Option<String>,
    ) -> Result<Self> {
        let button = Self {
            style,
            label,
            custom_id,
            url,
            disabled: false,
        };
        style.validate(&button)?;
        if let Some(label) = &button.label {
            let actual = label.chars().count();
            if actual > MAX_BUTTON_LABEL {
                return Err(WatchError::TextTooLong {
                    what: "Button label",
                    max: MAX_BUTTON_LABEL,
                    actual,
                }
                .into());
            }
        }
        Ok(button)
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        Self::new(ButtonStyle::Link, Some(label.into()), None, Some(url.into()))
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn style(&self) -> ButtonStyle {
        self.style
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    ActionRow(Vec<Button>),
    Button(Button),
}

impl Component {
    /// # Errors
    ///
    /// - `LimitExceeded`: more than [`MAX_ROW_CHILDREN`] buttons
    pub fn action_row(buttons: Vec<Button>) -> Result<Self> {
        if buttons.len() > MAX_ROW_CHILDREN {
            return Err(WatchError::TooManyItems {
                what: "Action row",
                max: MAX_ROW_CHILDREN,
                actual: buttons.len(),
            }
            .into());
        }
        Ok(Component::ActionRow(buttons))
    }

    /// Pack buttons into full rows, keeping at most `max_rows` rows
    ///
    /// Buttons past the last row are dropped.
    pub fn rows(buttons: Vec<Button>, max_rows: usize) -> Vec<Component> {
        let keep = buttons.len().min(max_rows * MAX_ROW_CHILDREN);
        buttons[..keep]
            .chunks(MAX_ROW_CHILDREN)
            .map(|chunk| Component::ActionRow(chunk.to_vec()))
            .collect()
    }
}

impl Serialize for Button {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &TYPE_BUTTON)?;
        map.serialize_entry("style", &self.style)?;
        if let Some(label) = &self.label {
            map.serialize_entry("label", label)?;
        }
        if let Some(custom_id) = &self.custom_id {
            map.serialize_entry("custom_id", custom_id)?;
        }
        if let Some(url) = &self.url {
            map.serialize_entry("url", url)?;
        }
        if self.disabled {
            map.serialize_entry("disabled", &true)?;
        }
        map.end()
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Component::ActionRow(buttons) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", &TYPE_ACTION_ROW)?;
                map.serialize_entry("components", buttons)?;
                map.end()
            }
            Component::Button(button) => button.serialize(serializer),
        }
    }
}

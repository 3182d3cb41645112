//! Slack Block Kit wire shapes.
//!
//! Only the variants this system emits: markdown sections, images, and
//! button rows. Serialization matches the Block Kit JSON schema exactly;
//! tests pin the output.

use serde::Serialize;

/// One renderable unit of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A markdown-formatted text section.
    Section {
        /// The section body.
        text: Text,
    },
    /// An image with a plain-text title.
    Image {
        /// Title shown above the image.
        title: Text,
        /// Public URL of the image.
        image_url: String,
        /// Alternative text for clients that cannot show the image.
        alt_text: String,
    },
    /// A row of interactive elements.
    Actions {
        /// Elements in render order.
        elements: Vec<Element>,
    },
}

impl Block {
    /// A section block containing markdown text.
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Section {
            text: Text::mrkdwn(text),
        }
    }

    /// An image block whose alt text matches its title.
    pub fn image(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        let title = title.into();
        Self::Image {
            alt_text: title.clone(),
            title: Text::plain(title),
            image_url: image_url.into(),
        }
    }

    /// A row of buttons.
    pub fn actions(elements: Vec<Element>) -> Self {
        Self::Actions { elements }
    }
}

/// A Block Kit text object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Markdown-formatted text.
    Mrkdwn {
        /// The markdown source.
        text: String,
    },
    /// Literal text, optionally with `:emoji:` substitution.
    PlainText {
        /// The literal text.
        text: String,
        /// Whether emoji sequences are substituted. Omitted when unset.
        #[serde(skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
}

impl Text {
    fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: None,
        }
    }
}

/// An interactive element inside an actions block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// A clickable button.
    Button {
        /// Button label.
        text: Text,
        /// Visual weight.
        style: ButtonStyle,
        /// Opaque value posted back when clicked.
        value: String,
    },
}

impl Element {
    /// A styled button with an emoji-enabled plain-text label.
    pub fn button(label: impl Into<String>, style: ButtonStyle, value: impl Into<String>) -> Self {
        Self::Button {
            text: Text::PlainText {
                text: label.into(),
                emoji: Some(true),
            },
            style,
            value: value.into(),
        }
    }
}

/// Visual weight of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    /// Affirmative (rendered green).
    Primary,
    /// Negative (rendered red).
    Danger,
}

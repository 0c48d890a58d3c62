//! A minimal host document: named containers holding list items.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::message::Message;

/// `tag#id` or `#id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Selector {
    pub tag: Option<String>,
    pub id: String,
}

impl Selector {
    pub fn new(tag: Option<&str>, id: &str) -> Selector {
        Selector {
            tag: tag.map(str::to_ascii_lowercase),
            id: id.to_string(),
        }
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FromStr for Selector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSelector(s.to_string());
        let (tag, id) = s.trim().split_once('#').ok_or_else(invalid)?;
        if !is_name(id) || !(tag.is_empty() || is_name(tag)) {
            return Err(invalid());
        }
        Ok(Selector {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            id: id.to_string(),
        })
    }
}

impl TryFrom<String> for Selector {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}#{}", tag, self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

/// A list item with two labeled text children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub username: Option<String>,
    pub message: Option<String>,
}

impl ListItem {
    pub fn text_content(&self) -> String {
        match (&self.username, &self.message) {
            (Some(user), Some(text)) => format!("{}: {}", user, text),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => String::new(),
        }
    }
}

impl From<&Message> for ListItem {
    fn from(message: &Message) -> Self {
        ListItem {
            username: message.username.clone(),
            message: message.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: String,
    children: Vec<ListItem>,
}

impl Element {
    pub fn new(tag: &str, id: &str) -> Element {
        Element {
            tag: tag.to_string(),
            id: id.to_string(),
            children: Vec::new(),
        }
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        self.id == selector.id && selector.tag.as_ref().map_or(true, |tag| *tag == self.tag)
    }

    pub fn append(&mut self, item: ListItem) {
        self.children.push(item);
    }

    pub fn children(&self) -> &[ListItem] {
        &self.children
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Document {
        Document { elements }
    }

    /// The page served at `/`: a single empty `ul#messages`.
    pub fn host() -> Document {
        Document::new(vec![Element::new("ul", "messages")])
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn select(&self, selector: &Selector) -> Option<&Element> {
        self.elements.iter().find(|e| e.matches(selector))
    }

    pub fn select_mut(&mut self, selector: &Selector) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.matches(selector))
    }
}

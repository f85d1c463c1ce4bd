//! Boxes placed on a line.
use crate::docx::enums::HorizontalAlignment;
use serde::{Deserialize, Serialize};

/// What a line item displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemContent {
    /// A single character of text
    Character(char),
    /// An inline picture
    Picture { name: Option<String> },
}

/// A measured box on a line, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub content: ItemContent,
    pub width: f64,
    pub height: f64,
    pub alignment: HorizontalAlignment,
}

impl LineItem {
    pub fn character(c: char, width: f64, height: f64) -> Self {
        Self {
            content: ItemContent::Character(c),
            width,
            height,
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn picture(name: Option<String>, width: f64, height: f64) -> Self {
        Self {
            content: ItemContent::Picture { name },
            width,
            height,
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The character, for text items.
    #[inline]
    pub fn as_char(&self) -> Option<char> {
        match self.content {
            ItemContent::Character(c) => Some(c),
            ItemContent::Picture { .. } => None,
        }
    }

    #[inline]
    pub fn is_picture(&self) -> bool {
        matches!(self.content, ItemContent::Picture { .. })
    }
}

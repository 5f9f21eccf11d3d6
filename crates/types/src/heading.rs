//! Heading candidates produced by font analysis and the leveled headings
//! consumed by hierarchy construction.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// A raw heading guess before any level has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingCandidate {
    pub text: String,
    pub page: u32,
    pub font_size: f32,
    pub font_weight: FontWeight,
}

impl HeadingCandidate {
    pub fn new(text: impl Into<String>, page: u32, font_size: f32, font_weight: FontWeight) -> Self {
        Self {
            text: text.into(),
            page,
            font_size,
            font_weight,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }
}

/// A heading with a level, in document order. Input to tree building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledHeading {
    pub title: String,
    pub page: u32,
    pub level: u8,
}

impl LeveledHeading {
    pub fn new(title: impl Into<String>, page: u32, level: u8) -> Self {
        Self {
            title: title.into(),
            page,
            level,
        }
    }
}

//! Projects, documents and content blocks as they travel over the wire.
//!
//! JSON shapes match the persistence service: blocks are internally tagged
//! by `kind`, optional fields may be `null` or missing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::styles;
use crate::validation::{self, ValidationError, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// A container for documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An ordered sequence of blocks belonging to exactly one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Discriminant of [`Block`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            other => Err(format!("unknown block kind '{}' (expected text or image)", other)),
        }
    }
}

/// How an image sits relative to surrounding text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlignment {
    Inline,
    Left,
    Right,
    /// Full width (default)
    #[default]
    Block,
}

impl ImageAlignment {
    pub const ALL: [ImageAlignment; 4] = [
        ImageAlignment::Block,
        ImageAlignment::Left,
        ImageAlignment::Right,
        ImageAlignment::Inline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageAlignment::Inline => "inline",
            ImageAlignment::Left => "left",
            ImageAlignment::Right => "right",
            ImageAlignment::Block => "block",
        }
    }
}

impl fmt::Display for ImageAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ImageAlignment::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown alignment '{}' (expected block, left, right or inline)",
                    s.trim()
                )
            })
    }
}

/// Plain-text content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub text: String,
}

/// Image content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    /// Raw stored value; read through [`ImageBlock::alignment`]
    #[serde(default, rename = "alignment", skip_serializing_if = "Option::is_none")]
    pub stored_alignment: Option<ImageAlignment>,
}

impl ImageBlock {
    /// Effective alignment: absent reads as [`ImageAlignment::Block`]
    pub fn alignment(&self) -> ImageAlignment {
        self.stored_alignment.unwrap_or_default()
    }
}

/// One unit of document content.
///
/// The kind of a block never changes; turning a text block into an image
/// means removing it and appending a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
}

impl Block {
    /// Template used by "add text block"
    pub fn new_text() -> Self {
        Block::Text(TextBlock {
            role: styles::default_role(BlockKind::Text).to_owned(),
            text: String::new(),
        })
    }

    /// Template used by "add image block"
    pub fn new_image() -> Self {
        Block::Image(ImageBlock {
            role: styles::default_role(BlockKind::Image).to_owned(),
            src: String::new(),
            alt_text: Some(String::new()),
            stored_alignment: Some(ImageAlignment::Block),
        })
    }

    /// Fresh block of the given kind
    pub fn template(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => Self::new_text(),
            BlockKind::Image => Self::new_image(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Text(_) => BlockKind::Text,
            Block::Image(_) => BlockKind::Image,
        }
    }

    pub fn role(&self) -> &str {
        match self {
            Block::Text(b) => &b.role,
            Block::Image(b) => &b.role,
        }
    }

    pub(crate) fn with_role(&self, role: &str) -> Self {
        let mut next = self.clone();
        match &mut next {
            Block::Text(b) => b.role = role.to_owned(),
            Block::Image(b) => b.role = role.to_owned(),
        }
        next
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(b) => Some(b),
            Block::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            Block::Image(b) => Some(b),
            Block::Text(_) => None,
        }
    }

    /// One-line summary for listings
    pub fn summary(&self) -> String {
        match self {
            Block::Text(b) => b.text.lines().next().unwrap_or_default().to_owned(),
            Block::Image(b) => {
                if b.src.is_empty() {
                    "(no source)".to_owned()
                } else {
                    format!("{} [{}]", b.src, b.alignment())
                }
            }
        }
    }
}

/// Trim an optional description; blank collapses to `None`
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}

/// Body of `POST /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProject {
    /// Trim and validate user input
    pub fn new(name: &str, description: Option<&str>) -> Result<Self, ValidationError> {
        let draft = Self {
            name: name.trim().to_owned(),
            description: normalize_description(description),
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("name", &self.name, MAX_NAME_LEN)?;
        if let Some(description) = &self.description {
            validation::limit("description", description, MAX_DESCRIPTION_LEN)?;
        }
        Ok(())
    }
}

/// Body of `POST /projects/{id}/documents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl NewDocument {
    /// Trim and validate user input. New documents always start empty.
    pub fn new(title: &str, description: Option<&str>) -> Result<Self, ValidationError> {
        let draft = Self {
            title: title.trim().to_owned(),
            description: normalize_description(description),
            blocks: Vec::new(),
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("title", &self.title, MAX_NAME_LEN)?;
        if let Some(description) = &self.description {
            validation::limit("description", description, MAX_DESCRIPTION_LEN)?;
        }
        Ok(())
    }
}

/// Body of `PUT /projects/{id}/documents/{id}`: a full replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl DocumentUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("title", &self.title, MAX_NAME_LEN)?;
        if let Some(description) = &self.description {
            validation::limit("description", description, MAX_DESCRIPTION_LEN)?;
        }
        Ok(())
    }
}

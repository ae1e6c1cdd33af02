//! Content types and the values that flow through the pipeline.
//!
//! A [`GenerationRequest`] is what the user submits, a [`GenerationResult`] is
//! what the provider hands back, and a [`SavedEntry`] is what lands in history.

use crate::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of copy to generate.
///
/// Serialized as its display label ("Instagram Caption", ...) so history
/// entries keep the same `type` strings the UI shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    /// Short social caption with hashtags.
    #[default]
    InstagramCaption,

    /// Opening paragraph for a blog post.
    BlogIntro,

    /// Marketing email body.
    EmailCopy,

    /// Any other label; rendered with the generic template.
    Other(String),
}

impl ContentType {
    /// The types a user can pick from.
    pub const SELECTABLE: [ContentType; 3] = [
        ContentType::InstagramCaption,
        ContentType::BlogIntro,
        ContentType::EmailCopy,
    ];

    /// Human readable label.
    pub fn label(&self) -> &str {
        match self {
            ContentType::InstagramCaption => "Instagram Caption",
            ContentType::BlogIntro => "Blog Intro",
            ContentType::EmailCopy => "Email Copy",
            ContentType::Other(label) => label,
        }
    }

    /// Parse a label, keeping unknown labels as [`ContentType::Other`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "Instagram Caption" => ContentType::InstagramCaption,
            "Blog Intro" => ContentType::BlogIntro,
            "Email Copy" => ContentType::EmailCopy,
            other => ContentType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ContentType {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<ContentType> for String {
    fn from(kind: ContentType) -> Self {
        kind.label().to_string()
    }
}

impl FromStr for ContentType {
    type Err = StudioError;

    /// Accepts labels as well as kebab/snake case slugs (`blog-intro`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "instagram-caption" | "instagram" | "caption" => Ok(ContentType::InstagramCaption),
            "blog-intro" | "blog" => Ok(ContentType::BlogIntro),
            "email-copy" | "email" => Ok(ContentType::EmailCopy),
            "" => Err(StudioError::Config("content type must not be empty".to_string())),
            _ => Ok(ContentType::Other(s.trim().to_string())),
        }
    }
}

/// A validated request for generated copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    content_type: ContentType,
}

impl GenerationRequest {
    /// Build a request, rejecting blank topics.
    ///
    /// The topic is stored trimmed.
    ///
    /// ```
    /// use studio_core::{ContentType, GenerationRequest};
    ///
    /// let request = GenerationRequest::new("  Coffee ", ContentType::BlogIntro).unwrap();
    /// assert_eq!(request.topic(), "Coffee");
    /// assert!(GenerationRequest::new(" \t", ContentType::BlogIntro).is_err());
    /// ```
    pub fn new(topic: &str, content_type: ContentType) -> Result<Self> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(StudioError::InvalidInput);
        }
        Ok(Self {
            topic: topic.to_string(),
            content_type,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Prompt text a model provider would receive.
    pub fn prompt(&self) -> String {
        format!("Generate a {} about: {}", self.content_type, self.topic)
    }
}

/// Generated copy, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub full_text: String,
    pub content_type: ContentType,
}

impl GenerationResult {
    pub fn new(full_text: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            full_text: full_text.into(),
            content_type,
        }
    }

    /// Length in characters, the unit the reveal advances by.
    pub fn char_len(&self) -> usize {
        self.full_text.chars().count()
    }
}

/// One saved history item. Field names match the stored JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub content: String,
}

impl From<&GenerationResult> for SavedEntry {
    fn from(result: &GenerationResult) -> Self {
        Self {
            content_type: result.content_type.clone(),
            content: result.full_text.clone(),
        }
    }
}

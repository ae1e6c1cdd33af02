//! Canned copy templates.
//!
//! Every content type has a fixed template with the topic substituted in.
//! Generation is pure: the same topic and type always give the same text.

use crate::ContentType;
use regex::Regex;
use std::sync::OnceLock;

/// Runs of whitespace removed when turning a topic into a hashtag.
const WHITESPACE_PATTERN: &str = r"\s+";

static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX
        .get_or_init(|| Regex::new(WHITESPACE_PATTERN).expect("Invalid whitespace regex"))
}

/// Hashtag for a topic: `#` followed by the topic with all whitespace removed.
///
/// ```
/// assert_eq!(studio_core::template::hashtag("cold brew coffee"), "#coldbrewcoffee");
/// ```
pub fn hashtag(topic: &str) -> String {
    format!("#{}", get_whitespace_regex().replace_all(topic, ""))
}

/// Generate copy for a topic.
///
/// The first line is a lead-in naming the content type and the topic; the
/// body follows after a blank line.
pub fn generate(topic: &str, content_type: &ContentType) -> String {
    match content_type {
        ContentType::InstagramCaption => format!(
            "✨ Here's an engaging caption about {topic}:\n\n\
             \"{topic} 🌟 — Every frame tells a story. Let the colors, smiles, and energy speak louder than words. {tag} #vibes #aesthetic\"",
            tag = hashtag(topic),
        ),
        ContentType::BlogIntro => format!(
            "📝 Blog Intro about {topic}:\n\n\
             Ever wondered what makes {lower} so fascinating? In this post, we’ll uncover its hidden beauty, real-world impact, and why it’s capturing everyone’s attention in 2025. Let’s dive deeper together!",
            lower = topic.to_lowercase(),
        ),
        ContentType::EmailCopy => format!(
            "📧 Email Copy about {topic}:\n\n\
             Hi there 👋,\n\n\
             We’ve got something exciting for you — {topic} that’s built to inspire, simplify, and elevate your day. Check it out and see why so many are talking about it!\n\n\
             Best,\nThe AI Content Studio Team"
        ),
        ContentType::Other(_) => format!(
            "✨ AI generated content about {topic}:\n\n\
             {topic} represents innovation, creativity, and a fresh way to connect. Let's make it shine with your unique voice."
        ),
    }
}

//! Credential handling.
//!
//! Tokens are kept in memory only and never formatted in full.

use std::fmt;

const MASK_PREFIX: &str = "hf_***";

/// Mask a token for diagnostics: `hf_***` plus its last four characters.
///
/// ```
/// use studio_core::secret::mask_token;
///
/// assert_eq!(mask_token("hf_abcdefgh1234"), "hf_***1234");
/// assert_eq!(mask_token(""), "hf_***");
/// ```
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{MASK_PREFIX}{tail}")
}

/// An optional access token whose formatting is always masked.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// Read the first non-empty variable from `names`.
    pub fn from_env_vars(names: &[&str]) -> Option<Self> {
        names
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(Self::new)
            .find(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw token, for handing to a transport. Never log this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_token(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

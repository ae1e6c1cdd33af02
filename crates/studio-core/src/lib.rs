//! # Studio Core
//!
//! Generation-and-reveal pipeline for the AI Content Studio.
//!
//! A topic and a content type go in, canned copy comes out after a simulated
//! provider delay, and the text is revealed one character per tick. Finished
//! results can be saved to a local, newest-first history or copied.
//!
//! ## Features
//!
//! - Template-based copy generation per content type
//! - Cancelable typewriter reveal on an injectable clock
//! - Tolerant JSON history under the `aiHistory` key
//! - Single observable state container for front ends
//!
//! ## Example
//!
//! ```rust,ignore
//! use studio_core::{ContentType, Studio, StudioConfig};
//!
//! let studio = Studio::from_config(&StudioConfig::from_env())?;
//! studio.set_topic("Coffee");
//! studio.set_content_type(ContentType::InstagramCaption);
//!
//! studio.submit().await?;
//! let done = studio.reveal().wait_complete().await;
//! ```

pub mod clipboard;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod provider;
pub mod reveal;
pub mod secret;
pub mod storage;
pub mod studio;
pub mod template;

pub use config::StudioConfig;
pub use content::{ContentType, GenerationRequest, GenerationResult, SavedEntry};
pub use error::{Result, StudioError, GENERATION_FAILURE_MESSAGE, INVALID_INPUT_MESSAGE};
pub use history::{HistoryStore, HISTORY_KEY};
pub use provider::{ContentProvider, TemplateProvider};
pub use reveal::{RevealScheduler, RevealState, RevealTiming};
pub use studio::{CopyTarget, Phase, SaveOutcome, Studio, StudioState, SubmitOutcome};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ContentProvider, ContentType, CopyTarget, GenerationRequest, GenerationResult, Phase,
        Result, SaveOutcome, SavedEntry, Studio, StudioConfig, StudioError, SubmitOutcome,
    };
}

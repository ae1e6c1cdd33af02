//! Content provider trait and the built-in template provider.
//!
//! Defines the interface a generation backend implements. The only backend
//! shipped here renders canned templates behind a simulated network delay.

use crate::clock::{ClockPtr, TokioClock};
use crate::{template, GenerationRequest, GenerationResult, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait that generation backends must implement.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Produce copy for a validated request.
    ///
    /// # Errors
    ///
    /// Any error is reported to the user as a generation failure.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;
}

/// Provider that fills in canned templates after a fixed delay.
pub struct TemplateProvider {
    clock: ClockPtr,
    latency: Duration,
}

impl TemplateProvider {
    /// Create a provider with the given simulated latency on tokio time.
    pub fn new(latency: Duration) -> Self {
        Self::with_clock(Arc::new(TokioClock), latency)
    }

    /// Create a provider that waits on a custom clock.
    pub fn with_clock(clock: ClockPtr, latency: Duration) -> Self {
        Self { clock, latency }
    }
}

#[async_trait]
impl ContentProvider for TemplateProvider {
    fn name(&self) -> &str {
        "template"
    }

    #[instrument(skip(self, request), fields(content_type = %request.content_type()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        debug!("Simulating provider latency of {:?}", self.latency);
        self.clock.sleep(self.latency).await;

        let text = template::generate(request.topic(), request.content_type());
        Ok(GenerationResult::new(text, request.content_type().clone()))
    }
}

use base64::Engine;
use std::sync::Arc;
use tracing::{error, info};

use crate::client::VisionModel;
use crate::error::IdentifyError;
use crate::parser;
use crate::types::IdentificationRecord;

/// Encode image bytes as a `data:<media-type>;base64,<payload>` URI.
pub fn encode_data_uri(image: &[u8], media_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        base64::engine::general_purpose::STANDARD.encode(image)
    )
}

/// Runs one identification: encode, ask the model, parse the reply.
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Clone)]
pub struct SnakeIdentifier {
    model: Arc<dyn VisionModel>,
}

impl SnakeIdentifier {
    pub fn new(model: impl VisionModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_arc(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Identify the snake in `image`.
    ///
    /// # Errors
    ///
    /// Returns one of three user-facing errors:
    /// - [`IdentifyError::ApiKeyNotConfigured`] when no credential is set
    /// - [`IdentifyError::UpstreamUnavailable`] when the endpoint fails
    /// - [`IdentifyError::Failed`] for anything else
    pub async fn identify(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<IdentificationRecord, IdentifyError> {
        let data_uri = encode_data_uri(image, media_type);

        let reply = self.model.complete(&data_uri).await.map_err(|e| {
            error!(error = %e, media_type, bytes = image.len(), "snake identification failed");
            IdentifyError::from(e)
        })?;

        let parsed = parser::classify(&reply);
        info!(
            structured = parsed.is_structured(),
            species = %parsed.record().species,
            "snake identified"
        );
        Ok(parsed.into_record())
    }
}

impl std::fmt::Debug for SnakeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnakeIdentifier").finish_non_exhaustive()
    }
}

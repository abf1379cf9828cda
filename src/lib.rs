//! # snake-identifier
//!
//! Snake species identification from photos using a hosted vision model
//! (OpenRouter chat-completions API).
//!
//! ## Features
//!
//! - **One-call identification**: image bytes in, [`IdentificationRecord`]
//!   out (species, venom status, confidence, description)
//! - **Tolerant parsing**: valid JSON, JSON inside code fences or after
//!   `<think>` blocks, and labeled prose (`Species: ...`) all yield a
//!   complete record with documented defaults
//! - **Short user-facing errors**: every failure collapses to one of three
//!   [`IdentifyError`] messages; details go to `tracing`
//! - **Pluggable model**: implement [`VisionModel`] to swap the endpoint or
//!   use a test double
//! - **HTTP server**: axum router with multipart upload validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snake_identifier::{OpenRouterClient, OpenRouterConfig, SnakeIdentifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenRouterClient::new(OpenRouterConfig::with_api_key("sk-or-..."));
//!     let identifier = SnakeIdentifier::new(client);
//!
//!     let image = std::fs::read("snake.jpg")?;
//!     let record = identifier.identify(&image, "image/jpeg").await?;
//!     println!("{}", record);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Parsing Robustness
//!
//! ```rust
//! use snake_identifier::parse_identification;
//!
//! let record = parse_identification(r#"{"species": "Naja naja", "isVenomous": true}"#);
//! assert_eq!(record.species, "Naja naja");
//! assert_eq!(record.confidence, 0.5);
//!
//! let record = parse_identification("Species: Boa constrictor\nVenomous: no\nConfidence: 0.85");
//! assert_eq!(record.species, "Boa constrictor");
//! assert!(!record.is_venomous);
//!
//! let record = parse_identification("no idea");
//! assert_eq!(record.species, "Unknown Snake Species");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod parser;
pub mod server;
pub mod types;

// Re-export main types at crate root
pub use client::{OpenRouterClient, VisionModel};
pub use config::ServiceConfig;
pub use error::{ConfigError, IdentifyError, InferenceError};
pub use identifier::{encode_data_uri, SnakeIdentifier};
pub use parser::{classify, parse_identification, strip_think_tags, ParsedIdentification};
pub use server::{router, serve, UploadError, MAX_IMAGE_BYTES};
pub use types::{CompletionOptions, ConfidenceLevel, IdentificationRecord, OpenRouterConfig};

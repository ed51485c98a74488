//! External-service clients

pub mod catalog;
pub mod completion;
pub mod recognition;

pub use catalog::{AudiusClient, CatalogError, CatalogSource, Track};
pub use completion::{ChatMessage, CompletionBackend, CompletionError, CompletionRequest, GroqClient};
pub use recognition::{AcoustIdClient, FingerprintLookup, Recognition, RecognitionError};

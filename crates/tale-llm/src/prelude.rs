//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tale_llm::prelude::*;` to import all essential types.

// Errors
pub use crate::{LlmError, LlmResult};

// Provider trait and config
pub use crate::{LlmProvider, ProviderConfig};

// Providers
pub use crate::OpenAiCompatProvider;

// Message and response types
pub use crate::{LlmResponse, Message, MessageRole, StopReason, Usage};

//! Tale LLM - chat completion provider abstraction.
//!
//! This crate provides:
//! - LLM provider trait for abstraction
//! - `OpenAI`-compatible implementation (`OpenAI`, LM Studio, vLLM, etc.)
//!
//! # Example
//!
//! ```rust,no_run
//! use tale_llm::{LlmProvider, Message, OpenAiCompatProvider};
//!
//! # async fn example() -> Result<(), tale_llm::LlmError> {
//! let provider = OpenAiCompatProvider::openai("sk-...", "gpt-3.5-turbo");
//!
//! let messages = vec![
//!     Message::assistant("You stand at a fork in the road. 1) Left 2) Right"),
//!     Message::user("2"),
//! ];
//! let response = provider.complete(&messages, "You write adventure stories.").await?;
//! println!("{}", response.message.content);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod openai_compat;
mod provider;
mod types;

pub use error::{LlmError, LlmResult};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{LlmProvider, ProviderConfig};
pub use types::{LlmResponse, Message, MessageRole, StopReason, Usage};

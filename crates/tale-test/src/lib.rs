//! Tale Test - shared test utilities for the Tale relay.
//!
//! Provides an in-memory page ([`MockPlatform`]), a scripted language
//! model ([`MockLlmProvider`]), webhook payload builders and harness
//! helpers. Use it as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! tale-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tale_test::prelude::*;
//!
//! #[tokio::test]
//! async fn root_comment_gets_part_two() {
//!     let page = Arc::new(MockPlatform::new("page").with_post("page_1", "Intro"));
//!     let llm = MockLlmProvider::new(vec![MockLlmTurn::text("Onward")]);
//!     // ...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mock_llm;
pub mod mock_platform;

pub use fixtures::*;
pub use harness::*;
pub use mock_llm::*;
pub use mock_platform::*;

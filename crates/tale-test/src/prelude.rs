//! Commonly used test types.
//!
//! ```rust,ignore
//! use tale_test::prelude::*;
//! ```

pub use crate::fixtures::*;
pub use crate::harness::*;
pub use crate::mock_llm::*;
pub use crate::mock_platform::*;

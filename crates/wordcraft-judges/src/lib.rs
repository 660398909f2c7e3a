//! wordcraft-judges — assessment judge backends.
//!
//! Implements the `Judge` trait for a remote wordcraft assessment service,
//! Anthropic, OpenAI-compatible APIs, and a deterministic mock.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod openai;
pub mod remote;

pub use config::{create_judge, load_config, load_config_from, JudgeConfig, WordcraftConfig};
pub use error::JudgeError;
pub use mock::MockJudge;

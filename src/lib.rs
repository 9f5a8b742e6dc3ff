// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod policy;
pub mod runtime;
pub mod session;
pub mod sink;
pub mod stats;
pub mod util;

pub use engine::{AnswerOutcome, Phase, SessionEngine};
pub use error::{QuizError, Result};

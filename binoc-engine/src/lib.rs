pub mod browse;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod flash;

pub use browse::BrowseState;
pub use config::EngineConfig;
pub use cursor::{PlayCursor, PresentationPhase};
pub use engine::{EngineEvent, EngineState, PresentationEngine};
pub use error::EngineError;
pub use flash::FlashState;

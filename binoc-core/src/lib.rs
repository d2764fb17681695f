pub mod reference;
pub mod sequence;
pub mod stimulus;

pub use reference::ImageReference;
pub use sequence::{SetFile, StimulusSequence};
pub use stimulus::{StimulusItem, StimulusRecord};

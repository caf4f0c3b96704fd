pub mod queue;
pub mod track;

pub use queue::{PlayQueue, RepeatMode};
pub use track::format_duration;

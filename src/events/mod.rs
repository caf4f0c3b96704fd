pub mod input;
pub mod timer;

pub use input::Action;
pub use timer::TickTimer;

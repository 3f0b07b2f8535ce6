//! Built-in game agents.

pub mod html;
pub mod math;
pub mod memory;
pub mod universal;

pub use math::MathGameAgent;
pub use memory::MemoryGameAgent;
pub use universal::UniversalGameAgent;

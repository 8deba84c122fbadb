pub mod core;
pub mod supply;

// Re-export the main types for convenience
pub use core::Language;
pub use supply::{CyclingWordSupply, RandomWordSupply, WordSupply};

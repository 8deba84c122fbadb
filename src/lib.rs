// Library surface for headless/integration tests and reuse.
// The terminal host in main.rs only wires these together.
pub mod app_dirs;
pub mod config;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod error;
pub mod language;
pub mod logging;
pub mod pager;
pub mod results;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod throttle;
pub mod ui;

pub use controller::{Renderer, TestSettings, TypingTest, WindowView};
pub use error::TypetestError;
pub use session::TestDuration;

//! lectern: a support library for classroom Rust programs.
//!
//! The library wires three things together so student programs can stay
//! small:
//! - A one-time process bootstrap that prepares the GUI subsystem and an
//!   optional graphical console window before the program body runs
//!   ([`Runtime`])
//! - A checked process-exit path that can be disabled so programs learn to
//!   end through normal control flow ([`RuntimeHandle::exit`])
//! - Precondition validators that raise a formatted fatal error when a
//!   caller violates a contract ([`require`])
//!
//! # Thread model
//!
//! The thread that calls [`Runtime::initialize`] becomes the designated GUI
//! main thread. [`Runtime::run`] hands the program body to a background
//! thread and keeps the designated thread in the GUI event loop until the
//! body finishes; console I/O crosses between them over channels.
//!
//! Setting the `NOCONSOLE` environment variable to a value beginning with
//! `t` suppresses the graphical console.

#[cfg(feature = "console")]
pub mod console;
pub mod error;
pub mod font_discovery;
pub mod gui;
pub mod require;
pub mod settings;
pub mod system;

#[cfg(feature = "console")]
pub use console::ConsoleHandle;
pub use system::init::{Runtime, RuntimeHandle};

// Build-time version information
pub const BUILD_DATE: &str = env!("BUILD_DATE");
pub const GIT_HASH: &str = env!("GIT_HASH");

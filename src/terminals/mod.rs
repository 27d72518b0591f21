//! Host-side terminal implementations.
//!
//! This module provides [`Terminal`](crate::Terminal) implementations that do
//! not need hardware:
//!
//! - [`ScriptedTerminal`]: replays a fixed input script and records output,
//!   for exercising the line reader and the ANSI helpers in tests
//!
//! Real peripherals are used through [`Port`](crate::Port), which implements
//! the trait directly.

mod scripted;

pub use scripted::ScriptedTerminal;

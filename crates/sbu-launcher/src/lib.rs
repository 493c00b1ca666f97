//! Library components of the Simple Browser launcher.

pub mod cli;
pub mod logging;
pub mod progress;

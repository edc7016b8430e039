//! Convenience layer over twilight: message and reaction helpers, timed
//! deletion, reaction-driven messages and event hooks.

pub mod config;
pub mod framework;

pub use config::Config;
pub use framework::Framework;

// Public API for integration tests and potential library usage

pub mod catalog;
pub mod config;
pub mod persistence;
pub mod protocol;
pub mod sessions;
pub mod state;
pub mod types;
pub mod ws;

// Re-export broadcast for testing
pub mod broadcast;

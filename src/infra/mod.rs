//! Infrastructure adapters: content loading, output writing and telemetry.

pub mod content;
pub mod error;
pub mod output;
pub mod telemetry;

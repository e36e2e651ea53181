//! Domain model for story sessions.

pub mod aggregates;
pub mod commands;
pub mod dialog;
pub mod outputs;

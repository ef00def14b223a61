//! cmdrelay binary library - exposes modules for integration tests

pub mod commands;
pub mod http;

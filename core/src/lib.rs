//! Core of cmdrelay: run a configured command and stream its output as
//! server-sent events.

pub mod api;
pub mod config;
pub mod error;
pub mod runner;
pub mod stream;
pub mod trigger;

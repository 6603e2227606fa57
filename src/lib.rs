//! Cyber Assistant
//!
//! A terminal chat client for a remote security assistant webhook. Each user
//! message is posted with a per-session id; replies are rendered as a
//! scrolling thread.
//!
//! # Modules
//!
//! - [`session`]: session identifier and its storage scope
//! - [`conversation`]: observable conversation state and the turn controller
//! - [`assistant`]: the outbound call to the assistant endpoint
//! - [`config`]: layered configuration read once at startup
//! - [`terminal`]: line-oriented chat surface over stdin/stdout

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::map_err_ignore)]

pub mod assistant;
pub mod config;
pub mod conversation;
pub mod session;
pub mod terminal;

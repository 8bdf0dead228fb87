//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback client:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - User-visible status slots with timed auto-clear
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the catalog, playback and
//! service crates depend on. It establishes the logging conventions and the
//! event broadcasting mechanism used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod status;

pub use error::{Error, Result};

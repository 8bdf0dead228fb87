//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `surr-workspace`, enable
//! `desktop-shims`, and reach the whole client through the re-exported
//! [`core_service`] façade.

pub use core_service::*;

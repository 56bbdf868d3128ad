//! Campus Desk Core - Shared types library.
//!
//! This crate provides the order types used across all Campus Desk components:
//! - `desk` - The order desk web panel (Xerox dashboard, stationery lookup)
//! - `cli` - Command-line access to the same workflows
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Orders arrive
//! from the backend as loosely shaped JSON ([`RawOrder`]) and are classified
//! exactly once into the tagged [`Order`] variant.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, lookup PINs, orders and sign-in credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

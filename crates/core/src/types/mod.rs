//! Core types for Campus Desk.
//!
//! This module provides type-safe wrappers for the order desk domain.

pub mod credentials;
pub mod id;
pub mod order;
pub mod pin;

pub use credentials::{Credentials, CredentialsError};
pub use id::*;
pub use order::{
    ArcadeOrder, Order, RawOrder, RawStationeryItem, StationeryItem, StationeryOrder,
    XeroxDetails,
};
pub use pin::{Pin, PinError};

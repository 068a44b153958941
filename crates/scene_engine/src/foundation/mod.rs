//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and rotation helpers
//! - Typed handles and append-only arenas
//! - Frame timing
//! - Logging initialisation

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;

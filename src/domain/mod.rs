//! Domain layer modules
//!
//! This module contains the payload-building logic:
//! - `platform`: Static platform registry and audience selector types
//! - `classifier`: Field name classification
//! - `payload`: Builder state, composers and the builder facade

pub mod classifier;
pub mod payload;
pub mod platform;

//! Push payload assembly.
//!
//! This module provides:
//! - `state`: accumulated tokens, selectors, overrides and extras
//! - `audience`: audience composition (single clause or OR list)
//! - `notification`: notification composition with extras injection
//! - `builder`: the facade that owns state and produces the payload

mod audience;
mod builder;
mod notification;
mod state;
mod types;
mod value;

pub use audience::{compose_audience, AudienceExpr, Clause};
pub use builder::PushPayloadBuilder;
pub use notification::{compose_notification, NotificationExpr};
pub use state::{ExplicitFields, PushPayloadState};
pub use types::{EmptyDeviceTypes, PushPayload};
pub use value::{string_of, wrap};

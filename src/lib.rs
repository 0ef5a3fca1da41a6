// Infrastructure (configuration, errors, logging)
pub mod config;
pub mod error;
pub mod telemetry;

// Domain layer (payload building)
pub mod domain;

// Re-export domain modules at the crate root
pub use domain::classifier;
pub use domain::payload;
pub use domain::platform;

pub use domain::payload::{EmptyDeviceTypes, PushPayload, PushPayloadBuilder};
pub use domain::platform::{AudienceType, Platform};
pub use error::{PushError, Result};

//! Shared types for the HubSpot integration workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;

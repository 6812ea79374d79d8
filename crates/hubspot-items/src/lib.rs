//! HubSpot contacts as integration items
//!
//! Reads the first page of CRM contacts with a staged access token and maps
//! each record into the provider-neutral `IntegrationItem` shape.

pub mod contacts;
pub mod error;
pub mod item;

pub use contacts::{API_BASE_URL, CONTACTS_PATH, Contact, PAGE_SIZE, access_token, list_items};
pub use error::{Error, Result};
pub use item::IntegrationItem;

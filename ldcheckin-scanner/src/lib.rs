pub mod action;
pub mod client;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod probe;
pub mod result;

pub use client::{DEFAULT_USER_AGENT, ShopClient};
pub use discovery::{Discoverer, DiscoveryOptions};
pub use error::DiscoveryError;
pub use result::{ActionId, ActionResponse, DiscoveredActionIds, Role, Roles};

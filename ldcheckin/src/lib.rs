pub mod handlers;

pub use handlers::{
    CheckinSettings, load_discovery_cookie, resolve_discover_targets, validate_timeout,
};

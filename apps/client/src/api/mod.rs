//! Typed wrappers over the backend's functional endpoints, one module per
//! service. Each function goes through `ApiClient`, so retry, timeout, and
//! error typing are uniform, and each deserializes into an explicit type.

pub mod analytics;
pub mod ats;
pub mod cv;
pub mod portfolio;
pub mod users;

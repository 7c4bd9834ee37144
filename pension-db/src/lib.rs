pub mod error;
pub mod models;
pub mod store;

pub use serde_json;

pub mod client;
pub mod fields;
pub mod models;
pub mod query;

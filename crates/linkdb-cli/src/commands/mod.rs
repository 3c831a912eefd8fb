pub mod config;
pub mod link;
pub mod query;
pub mod status;

pub mod api;
pub mod core;
pub mod data;
pub mod error;
pub mod export;
pub mod scenario;

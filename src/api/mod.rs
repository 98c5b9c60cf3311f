//! HTTP API Handlers
//!
//! One module per resource; the route table lives in `main.rs`.

pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod images;
pub mod profile;
pub mod reviews;

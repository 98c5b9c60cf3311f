//! Domain Logic
//!
//! Pure computations kept out of the handlers: cart totals and review
//! aggregates.

pub mod cart;
pub mod rating;

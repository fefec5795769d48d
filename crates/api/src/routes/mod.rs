//! Route handlers, grouped by surface.

pub mod admin;
pub mod audit;
pub mod records;

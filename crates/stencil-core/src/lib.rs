//! Stencil Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Stencil parser and
//! pipeline crates. It includes:
//!
//! - **Cells**: Flat attribute cells, section rows and named sections ([`cell`] module)
//! - **Raw shapes**: The page-level shape tree as read from markup ([`raw`] module)
//! - **Connections**: Connection declarations, resolved records and role codes ([`connection`] module)
//! - **Shapes**: Classified 1D ([`shape::LineShape`]) and 2D ([`shape::AreaShape`]) shapes ([`shape`] module)

pub mod cell;
pub mod connection;
pub mod raw;
pub mod shape;

//! Tabular mapping
//!
//! A [`TabularMapper`] converts between [`Table`] rows and records that
//! implement [`Tabular`], matching columns by alias.

pub mod data;
pub mod mapper;
pub mod shape;

pub use data::{Column, Row, Table};
pub use mapper::TabularMapper;
pub use shape::{PropertyAlias, PropertyDef, Tabular};

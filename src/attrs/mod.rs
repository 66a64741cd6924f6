//! Member metadata
//!
//! Types opt in by implementing [`Described`], listing each member and the
//! [`Marker`]s it carries. An [`AttributeCache`] builds the per-type table
//! once and serves lookups afterwards.

pub mod cache;
pub mod marker;

pub use cache::{AttributeCache, CacheSnapshot};
pub use marker::{Alias, Described, Marker, MarkerInstance, MemberDescriptor};

//! Presentation core of a security-map dashboard: renders organizations on a
//! geographic map colored by vulnerability status, scrubs through historical
//! weekly snapshots, and tracks the selected organization's scan report.
//!
//! The centerpiece is the map-layer reconciler ([`map::MapState`]): instead of
//! rebuilding the layer collection on every refresh, a new snapshot is merged
//! into the live set in place (add, remove, restyle), keyed by organization
//! identity.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod debounce;
pub mod map;
pub mod partition;
pub mod timeline;
pub mod types;
pub mod viewstate;

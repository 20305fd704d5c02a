//! Pantry Core - domain library.
//!
//! This crate holds everything about the pantry hierarchy that does not need
//! the network:
//! - `web` - the axum service that talks to the identity and data backends
//! - `integration-tests` - end-to-end tests against in-memory backends
//!
//! # Architecture
//!
//! Only types and pure logic live here - no I/O, no HTTP clients, no session
//! handling. The web crate fetches rows and hands them to these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids and validated input values (names, quantities, dates, emails)
//! - [`models`] - Rows of the location → area → category → item hierarchy
//! - [`patch`] - Item create and partial-update payloads
//! - [`tree`] - A location with its nested contents, plus filtering
//! - [`sync`] - Optimistic pending/committed/rolled-back state over a tree
//! - [`activity`] - Recent-activity rows and their display text
//! - [`stats`] - Dashboard totals and chart data

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod activity;
pub mod models;
pub mod patch;
pub mod stats;
pub mod sync;
pub mod tree;
pub mod types;

pub use activity::{ActivityAction, ActivityEntry, EntityKind, RenderedActivity};
pub use models::{AreaNode, Category, CategoryNode, Item, Location, StorageArea, StorageAreaDetail};
pub use patch::{ItemPatch, ItemPatchInput, NewItem, NewItemInput, PatchError};
pub use stats::{ChartSlice, EntityTotals, LocationItemCount};
pub use sync::{Confirmed, Mutation, OptimisticTree, Phase, SyncConflict, Ticket};
pub use tree::{ItemFilter, LocationTree};
pub use types::*;

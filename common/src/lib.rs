//! Shared core of the site admin.
//!
//! Everything in here is platform-agnostic so it can be compiled for the
//! wasm frontend, reused by the local backend stub, and unit tested natively:
//!
//! - `model`: typed documents for the `aboutContent`, `providers` and
//!   `siteContent` datasets.
//! - `richtext`: the plain-text <-> HTML transform applied to rich fields.
//! - `protocol`: request and response shapes of the single-endpoint backend.
//! - `client`: the remote store client, the only place that talks to the network.
//! - `version_cache`: persisted per-dataset version stamps and public snapshots.
//! - `editor`: form projections the admin UI edits, plus list and image helpers.

pub mod client;
pub mod defaults;
pub mod editor;
pub mod error;
pub mod model;
pub mod protocol;
pub mod richtext;
pub mod storage;
pub mod version_cache;

pub use error::{CmsError, Result};

//! Purpose: Shared core library crate used by the `stocklet` CLI and tests.
//! Exports: `api` (catalog, errors, remote client), `json` (model-output extraction), `notice`.
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod json;
pub mod notice;

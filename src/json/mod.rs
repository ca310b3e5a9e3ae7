//! Purpose: JSON decode boundary for model-produced text.
//! Exports: `extract` for best-effort extraction of a value from raw output.
//! Role: Single seam between untrusted model text and structured values.
//! Invariants: Callers never see decode errors from this module, only `Option`.

mod extract;

pub use extract::extract;

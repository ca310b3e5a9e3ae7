//! Purpose: Define the stable public Rust API boundary for stocklet.
//! Exports: Core types and operations needed by the CLI and embedders.
//! Role: Public, additive-only surface; hides internal storage modules.
//! Invariants: This module is the only public path to storage primitives.

mod message;
mod remote;

pub use crate::core::catalog::{Catalog, Product, validate_name};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::json::extract;
pub use message::{CreateProductRequest, ErrorBody, ProductBody};
pub use remote::RemoteCatalog;

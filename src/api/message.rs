//! Purpose: Define the wire bodies shared by the HTTP server and remote client.
//! Exports: `CreateProductRequest`, `ProductBody`, `ErrorBody`.
//! Role: Stable request/response shapes aligned with the CLI contract.
//! Invariants: Success bodies mirror CLI JSON; error bodies are a flat {"error": string}.

use serde::{Deserialize, Serialize};

use crate::core::catalog::Product;

#[derive(Clone, Debug, Serialize)]
pub struct CreateProductRequest<'a> {
    pub name: &'a str,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProductBody {
    pub id: String,
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&Product> for ProductBody {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            status: product.status.clone(),
        }
    }
}

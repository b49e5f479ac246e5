use serde::{Deserialize, Serialize};

use crate::domain::product::{ProductId, SizeKey};

/// Caller-assigned line identifier, stable across the request/response
/// boundary. Lines are never correlated by array position: one cart may
/// contain the same product at several lines.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: LineId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: SizeKey,
    /// Option selections (e.g. sweetness) carried opaquely; they do not
    /// affect pricing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub promo_code: Option<String>,
    pub lines: Vec<CartLine>,
}

use serde::{Deserialize, Serialize};

use crate::domain::cart::LineId;
use crate::domain::product::{ProductId, SizeKey};
use crate::domain::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    PercentDiscount,
    AmountDiscount,
    PerItemDiscount,
    FreeItem,
    /// Display/charge divergence, not a billed discount. Its amount is the
    /// per-unit price gap between the displayed and the charged size.
    FreeUpsize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotedLine {
    pub line_id: LineId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// What the customer sees. Diverges from `charged_size` only under the
    /// legacy free-upsize promotion.
    pub display_size: SizeKey,
    pub charged_size: SizeKey,
    pub unit_price_before: Money,
    pub unit_price_after: Money,
    pub line_total_before: Money,
    pub line_total_after: Money,
    pub adjustments: Vec<Adjustment>,
    pub missing_price: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal_before: Money,
    pub discount_total: Money,
    pub grand_total: Money,
}

/// Support/debugging signal, not authoritative for billing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDiagnostics {
    pub special_rule_applied: bool,
    pub eligible_quantity: u32,
    /// Discount amount that could not be allocated without driving a line
    /// negative. Reported rather than silently dropped.
    pub unallocated_discount: Money,
    pub warnings: Vec<String>,
}

/// Computed fresh per request and never mutated afterwards. Order creation
/// must re-run the same computation server-side before persisting; a
/// client-submitted quote is never trusted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub lines: Vec<QuotedLine>,
    pub free_items: Vec<QuotedLine>,
    pub totals: OrderTotals,
    pub diagnostics: QuoteDiagnostics,
}

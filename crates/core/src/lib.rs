pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod records;
pub mod validate;

pub use catalog::{CatalogSnapshot, CurrentPrice, Dataset, LegacyPrice, PromotionBundle};
pub use config::{ConfigError, EngineConfig};
pub use domain::cart::{CartLine, LineId, QuoteRequest};
pub use domain::product::{Product, ProductId, SizeKey, Variant, VariantId};
pub use domain::promotion::{
    ActionTarget, Allocation, Promotion, PromotionId, PromotionKind, Rule, RuleAction,
    RuleConditions, ScopeTarget, TargetType,
};
pub use domain::quote::{
    Adjustment, AdjustmentKind, OrderTotals, QuoteDiagnostics, QuoteResult, QuotedLine,
};
pub use domain::Money;
pub use engine::{QuoteEngine, QuoteInput};
pub use errors::{AppError, QuoteRequestError};
pub use records::{RawActionRow, RawRuleRow, RawScopeRow, RecordWarning};
pub use validate::validate_request;

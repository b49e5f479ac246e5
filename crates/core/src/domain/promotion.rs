use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::VariantId;
use crate::domain::Money;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromotionId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionKind {
    /// Flat percentage off every eligible line, no rule records.
    Plain { percent: Decimal },
    /// Discounts come from the promotion's ordered rule records.
    RuleBased,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    #[serde(flatten)]
    pub kind: PromotionKind,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Promotion {
    /// An inactive or out-of-window promotion is treated as absent. It must
    /// never fall back to applying anywhere.
    pub fn admissible_at(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        if self.starts_at.is_some_and(|start| now < start) {
            return false;
        }
        if self.ends_at.is_some_and(|end| now > end) {
            return false;
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Category,
    Subsection,
    Product,
    Variant,
}

/// One scope grant or denial. A promotion with zero `included = true` rows
/// of any type has no eligible lines at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTarget {
    pub target_type: TargetType,
    pub target_id: String,
    pub included: bool,
}

/// Every minimum that is present must be satisfied for the rule to fire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(default)]
    pub min_subtotal: Option<Money>,
    #[serde(default)]
    pub min_total_quantity: Option<u32>,
    #[serde(default)]
    pub min_eligible_quantity: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTarget {
    EligibleLines,
    WholeOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Allocation {
    Proportional,
    EqualSplit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    PercentOff {
        percent: Decimal,
        target: ActionTarget,
    },
    AmountOff {
        amount: Money,
        target: ActionTarget,
        allocation: Allocation,
    },
    AmountOffPerItem {
        amount_per_item: Money,
        #[serde(default)]
        max_items: Option<u32>,
    },
    FreeItem {
        variant_id: VariantId,
        quantity: u32,
        max_per_order: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub order_index: u32,
    #[serde(default)]
    pub conditions: Option<RuleConditions>,
    pub actions: Vec<RuleAction>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use super::{Promotion, PromotionId, PromotionKind};

    fn promotion(active: bool) -> Promotion {
        Promotion {
            id: PromotionId("SPRING10".to_owned()),
            kind: PromotionKind::Plain { percent: Decimal::new(10, 0) },
            starts_at: None,
            ends_at: None,
            active,
        }
    }

    #[test]
    fn inactive_promotion_is_never_admissible() {
        assert!(!promotion(false).admissible_at(Utc::now()));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let mut promo = promotion(true);
        promo.starts_at = Some(now);
        promo.ends_at = Some(now);
        assert!(promo.admissible_at(now));
        assert!(!promo.admissible_at(now + Duration::seconds(1)));
        assert!(!promo.admissible_at(now - Duration::seconds(1)));
    }
}

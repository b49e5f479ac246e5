//! Raw promotion rows as a persistence layer returns them, plus the decode
//! step that turns them into typed scope and rule records.
//!
//! Decoding degrades instead of failing: a row with an unknown target type
//! or action kind, or with its required fields missing, is skipped and
//! surfaced as a warning. One misconfigured promotion row must never block
//! checkout for the whole store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::product::VariantId;
use crate::domain::promotion::{
    ActionTarget, Allocation, PromotionId, Rule, RuleAction, RuleConditions, ScopeTarget,
    TargetType,
};
use crate::domain::Money;
use crate::engine::category::{self, CanonicalCategory};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawScopeRow {
    pub target_type: String,
    pub target_id: String,
    pub included: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActionRow {
    pub kind: String,
    #[serde(default)]
    pub percent: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub allocation: Option<String>,
    #[serde(default)]
    pub amount_per_item: Option<Money>,
    #[serde(default)]
    pub max_items: Option<u32>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub max_per_order: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRuleRow {
    pub order_index: u32,
    #[serde(default)]
    pub conditions: Option<RuleConditions>,
    pub actions: Vec<RawActionRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWarning {
    pub code: &'static str,
    pub detail: String,
}

impl RecordWarning {
    pub fn render(&self) -> String {
        format!("{}: {}", self.code, self.detail)
    }
}

pub fn decode_scopes(
    promotion: &PromotionId,
    rows: &[RawScopeRow],
) -> (Vec<ScopeTarget>, Vec<RecordWarning>) {
    let mut scopes = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();

    for row in rows {
        let target_type = match row.target_type.trim().to_ascii_uppercase().as_str() {
            "CATEGORY" => TargetType::Category,
            "SUBSECTION" => TargetType::Subsection,
            "PRODUCT" => TargetType::Product,
            "VARIANT" => TargetType::Variant,
            other => {
                let warning = RecordWarning {
                    code: "unknown_target_type",
                    detail: format!(
                        "promotion `{}` scope row targets unknown type `{other}`",
                        promotion.0
                    ),
                };
                warn!(promotion = %promotion.0, target_type = other, "skipping scope row");
                warnings.push(warning);
                continue;
            }
        };
        // A category label that normalizes to no canonical category can
        // never name a line; skip it so the typo is diagnosable instead of
        // silently inert.
        if target_type == TargetType::Category
            && category::normalize(Some(&row.target_id)) == CanonicalCategory::Unknown
        {
            let warning = RecordWarning {
                code: "unknown_category_label",
                detail: format!(
                    "promotion `{}` scope row names unrecognized category `{}`",
                    promotion.0, row.target_id
                ),
            };
            warn!(promotion = %promotion.0, category = %row.target_id, "skipping scope row");
            warnings.push(warning);
            continue;
        }
        scopes.push(ScopeTarget {
            target_type,
            target_id: row.target_id.clone(),
            included: row.included,
        });
    }

    (scopes, warnings)
}

pub fn decode_rules(
    promotion: &PromotionId,
    rows: &[RawRuleRow],
) -> (Vec<Rule>, Vec<RecordWarning>) {
    let mut rules = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();

    for row in rows {
        let mut actions = Vec::with_capacity(row.actions.len());
        for raw in &row.actions {
            match decode_action(promotion, row.order_index, raw) {
                Ok(action) => actions.push(action),
                Err(warning) => {
                    warn!(
                        promotion = %promotion.0,
                        rule = row.order_index,
                        code = warning.code,
                        "skipping action row"
                    );
                    warnings.push(warning);
                }
            }
        }
        rules.push(Rule { order_index: row.order_index, conditions: row.conditions.clone(), actions });
    }

    rules.sort_by_key(|rule| rule.order_index);
    (rules, warnings)
}

fn decode_action(
    promotion: &PromotionId,
    order_index: u32,
    raw: &RawActionRow,
) -> Result<RuleAction, RecordWarning> {
    let missing = |field: &str| RecordWarning {
        code: "malformed_action",
        detail: format!(
            "promotion `{}` rule {order_index} action `{}` is missing `{field}`",
            promotion.0, raw.kind
        ),
    };

    match raw.kind.trim().to_ascii_uppercase().as_str() {
        "PERCENT_OFF" => Ok(RuleAction::PercentOff {
            percent: raw.percent.ok_or_else(|| missing("percent"))?,
            target: decode_target(raw.target.as_deref())?,
        }),
        "AMOUNT_OFF" => Ok(RuleAction::AmountOff {
            amount: raw.amount.ok_or_else(|| missing("amount"))?,
            target: decode_target(raw.target.as_deref())?,
            allocation: decode_allocation(raw.allocation.as_deref())?,
        }),
        "AMOUNT_OFF_PER_ITEM" => Ok(RuleAction::AmountOffPerItem {
            amount_per_item: raw.amount_per_item.ok_or_else(|| missing("amount_per_item"))?,
            max_items: raw.max_items,
        }),
        "FREE_ITEM" => Ok(RuleAction::FreeItem {
            variant_id: VariantId(raw.variant_id.clone().ok_or_else(|| missing("variant_id"))?),
            quantity: raw.quantity.ok_or_else(|| missing("quantity"))?,
            max_per_order: raw.max_per_order.ok_or_else(|| missing("max_per_order"))?,
        }),
        other => Err(RecordWarning {
            code: "unknown_action_kind",
            detail: format!(
                "promotion `{}` rule {order_index} uses unknown action kind `{other}`",
                promotion.0
            ),
        }),
    }
}

fn decode_target(raw: Option<&str>) -> Result<ActionTarget, RecordWarning> {
    match raw.map(|value| value.trim().to_ascii_uppercase()) {
        None => Ok(ActionTarget::EligibleLines),
        Some(value) if value == "ELIGIBLE_LINES" => Ok(ActionTarget::EligibleLines),
        Some(value) if value == "WHOLE_ORDER" => Ok(ActionTarget::WholeOrder),
        Some(value) => Err(RecordWarning {
            code: "malformed_action",
            detail: format!("unknown action target `{value}`"),
        }),
    }
}

fn decode_allocation(raw: Option<&str>) -> Result<Allocation, RecordWarning> {
    match raw.map(|value| value.trim().to_ascii_uppercase()) {
        None => Ok(Allocation::Proportional),
        Some(value) if value == "PROPORTIONAL" => Ok(Allocation::Proportional),
        Some(value) if value == "EQUAL_SPLIT" => Ok(Allocation::EqualSplit),
        Some(value) => Err(RecordWarning {
            code: "malformed_action",
            detail: format!("unknown allocation `{value}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{decode_rules, decode_scopes, RawActionRow, RawRuleRow, RawScopeRow};
    use crate::domain::promotion::{PromotionId, RuleAction, TargetType};

    fn promo() -> PromotionId {
        PromotionId("COMBO".to_owned())
    }

    #[test]
    fn unknown_target_type_is_skipped_with_warning() {
        let rows = vec![
            RawScopeRow {
                target_type: "CATEGORY".to_owned(),
                target_id: "DRINK".to_owned(),
                included: true,
            },
            RawScopeRow {
                target_type: "STOREFRONT".to_owned(),
                target_id: "hanoi-1".to_owned(),
                included: true,
            },
        ];

        let (scopes, warnings) = decode_scopes(&promo(), &rows);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].target_type, TargetType::Category);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "unknown_target_type");
    }

    #[test]
    fn unrecognized_category_label_is_skipped_with_warning() {
        let rows = vec![
            RawScopeRow {
                target_type: "CATEGORY".to_owned(),
                target_id: "Đồ uống".to_owned(),
                included: true,
            },
            RawScopeRow {
                target_type: "CATEGORY".to_owned(),
                target_id: "SNACKS".to_owned(),
                included: true,
            },
        ];

        let (scopes, warnings) = decode_scopes(&promo(), &rows);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].target_id, "Đồ uống");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "unknown_category_label");
        assert!(warnings[0].detail.contains("SNACKS"));
    }

    #[test]
    fn malformed_action_is_skipped_but_rule_survives() {
        let rows = vec![RawRuleRow {
            order_index: 1,
            conditions: None,
            actions: vec![
                RawActionRow {
                    kind: "PERCENT_OFF".to_owned(),
                    percent: Some(Decimal::new(10, 0)),
                    ..RawActionRow::default()
                },
                RawActionRow { kind: "PERCENT_OFF".to_owned(), ..RawActionRow::default() },
                RawActionRow { kind: "BOGOF".to_owned(), ..RawActionRow::default() },
            ],
        }];

        let (rules, warnings) = decode_rules(&promo(), &rows);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].actions.len(), 1);
        assert!(matches!(rules[0].actions[0], RuleAction::PercentOff { .. }));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.code == "malformed_action"));
        assert!(warnings.iter().any(|w| w.code == "unknown_action_kind"));
    }

    #[test]
    fn rules_are_ordered_by_order_index() {
        let rows = vec![
            RawRuleRow { order_index: 2, conditions: None, actions: Vec::new() },
            RawRuleRow { order_index: 1, conditions: None, actions: Vec::new() },
        ];

        let (rules, _) = decode_rules(&promo(), &rows);
        assert_eq!(rules[0].order_index, 1);
        assert_eq!(rules[1].order_index, 2);
    }
}

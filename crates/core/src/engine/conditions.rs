use crate::domain::promotion::RuleConditions;
use crate::domain::Money;

/// Aggregate cart facts a rule's conditions are checked against. Facts are
/// recomputed after each fired rule, so later rules see post-discount
/// subtotals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartFacts {
    pub subtotal: Money,
    pub total_quantity: u32,
    pub eligible_quantity: u32,
}

/// A rule with no conditions record always fires; otherwise every minimum
/// that is present must be met. Unmet conditions are a silent no-effect
/// outcome, never an error.
pub fn conditions_met(conditions: Option<&RuleConditions>, facts: &CartFacts) -> bool {
    let Some(conditions) = conditions else {
        return true;
    };

    if conditions.min_subtotal.is_some_and(|min| facts.subtotal < min) {
        return false;
    }
    if conditions.min_total_quantity.is_some_and(|min| facts.total_quantity < min) {
        return false;
    }
    if conditions.min_eligible_quantity.is_some_and(|min| facts.eligible_quantity < min) {
        return false;
    }
    true
}

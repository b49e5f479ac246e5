//! Action application. Actions mutate the working lines' running totals;
//! the running total is authoritative and the per-unit "after" price shown
//! to the customer is derived from it when the quote is folded.
//!
//! Percentage and per-item discounts operate per unit with half-up rounding.
//! Flat-amount discounts operate at line-total granularity, so no rounding
//! is involved there; allocation uses largest-remainder apportionment and
//! clamps every line at zero, reporting the unallocatable remainder instead
//! of dropping it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::CatalogSnapshot;
use crate::domain::cart::LineId;
use crate::domain::product::{ProductId, SizeKey, VariantId};
use crate::domain::promotion::{ActionTarget, Allocation, RuleAction};
use crate::domain::quote::{Adjustment, AdjustmentKind, QuotedLine};
use crate::domain::Money;
use crate::engine::category::CanonicalCategory;
use crate::engine::price::PriceResolver;
use crate::records::RecordWarning;

/// Mutable per-line state while a quote is being computed.
#[derive(Clone, Debug)]
pub(crate) struct WorkingLine {
    pub line_id: LineId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub display_size: SizeKey,
    pub charged_size: SizeKey,
    pub unit_price_before: Money,
    pub line_total_before: Money,
    pub line_total_after: Money,
    pub adjustments: Vec<Adjustment>,
    pub missing_price: bool,
    pub eligible: bool,
    pub category: CanonicalCategory,
}

impl WorkingLine {
    pub(crate) fn into_quoted(self) -> QuotedLine {
        let unit_price_after = if self.line_total_after == self.line_total_before {
            self.unit_price_before
        } else {
            round_half_up(Decimal::from(self.line_total_after) / Decimal::from(self.quantity.max(1)))
        };
        QuotedLine {
            line_id: self.line_id,
            product_id: self.product_id,
            quantity: self.quantity,
            display_size: self.display_size,
            charged_size: self.charged_size,
            unit_price_before: self.unit_price_before,
            unit_price_after,
            line_total_before: self.line_total_before,
            line_total_after: self.line_total_after,
            adjustments: self.adjustments,
            missing_price: self.missing_price,
        }
    }

    fn discount(&mut self, kind: AdjustmentKind, amount: Money) {
        if amount <= 0 {
            return;
        }
        self.line_total_after -= amount;
        self.adjustments.push(Adjustment { kind, amount });
    }
}

/// Side effects of applied actions that are not per-line mutations.
#[derive(Debug, Default)]
pub(crate) struct ActionEffects {
    pub free_lines: Vec<WorkingLine>,
    pub unallocated: Money,
    pub warnings: Vec<RecordWarning>,
}

pub(crate) fn apply_action(
    action: &RuleAction,
    lines: &mut [WorkingLine],
    snapshot: &CatalogSnapshot,
    effects: &mut ActionEffects,
) {
    match action {
        RuleAction::PercentOff { percent, target } => apply_percent_off(*percent, *target, lines),
        RuleAction::AmountOff { amount, target, allocation } => {
            apply_amount_off(*amount, *target, *allocation, lines, effects);
        }
        RuleAction::AmountOffPerItem { amount_per_item, max_items } => {
            apply_per_item(*amount_per_item, *max_items, lines);
        }
        RuleAction::FreeItem { variant_id, quantity, max_per_order } => {
            apply_free_item(variant_id, *quantity, *max_per_order, snapshot, effects);
        }
    }
}

pub(crate) fn round_half_up(value: Decimal) -> Money {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

fn targeted(line: &WorkingLine, target: ActionTarget) -> bool {
    if line.missing_price {
        return false;
    }
    match target {
        ActionTarget::EligibleLines => line.eligible,
        ActionTarget::WholeOrder => true,
    }
}

fn apply_percent_off(percent: Decimal, target: ActionTarget, lines: &mut [WorkingLine]) {
    let factor = (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED;
    for line in lines.iter_mut().filter(|line| targeted(line, target)) {
        let unit = Decimal::from(line.line_total_after) / Decimal::from(line.quantity.max(1));
        let new_unit = round_half_up(unit * factor).max(0);
        let new_total = (new_unit * Money::from(line.quantity)).min(line.line_total_after);
        let amount = line.line_total_after - new_total;
        line.discount(AdjustmentKind::PercentDiscount, amount);
    }
}

fn apply_amount_off(
    amount: Money,
    target: ActionTarget,
    allocation: Allocation,
    lines: &mut [WorkingLine],
    effects: &mut ActionEffects,
) {
    if amount <= 0 {
        return;
    }

    let targets: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| targeted(line, target))
        .map(|(index, _)| index)
        .collect();
    if targets.is_empty() {
        lose(amount, effects, "no line to allocate a flat discount to");
        return;
    }

    let shares = match allocation {
        Allocation::Proportional => {
            let values: Vec<Money> = targets.iter().map(|&i| lines[i].line_total_after).collect();
            proportional_shares(amount, &values)
        }
        Allocation::EqualSplit => equal_shares(amount, targets.len()),
    };

    let Some(shares) = shares else {
        lose(amount, effects, "flat discount over lines with zero remaining value");
        return;
    };

    for (&index, share) in targets.iter().zip(shares) {
        let line = &mut lines[index];
        let applied = share.min(line.line_total_after);
        if applied < share {
            lose(share - applied, effects, "flat discount share exceeded the line value");
        }
        line.discount(AdjustmentKind::AmountDiscount, applied);
    }
}

/// Largest-remainder apportionment: every line gets the floor of its exact
/// share, then the leftover minor units go to the lines with the largest
/// fractional remainders (earliest line wins ties). Returns `None` when the
/// targeted lines have no value left to absorb anything.
fn proportional_shares(amount: Money, values: &[Money]) -> Option<Vec<Money>> {
    let total: i128 = values.iter().map(|&v| i128::from(v)).sum();
    if total <= 0 {
        return None;
    }

    let amount_wide = i128::from(amount);
    let mut shares: Vec<Money> = Vec::with_capacity(values.len());
    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(values.len());
    let mut allocated: i128 = 0;

    for (index, &value) in values.iter().enumerate() {
        let exact = amount_wide * i128::from(value);
        let share = exact / total;
        allocated += share;
        shares.push(share as Money);
        remainders.push((index, exact % total));
    }

    let mut leftover = amount_wide - allocated;
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (index, _) in remainders {
        if leftover == 0 {
            break;
        }
        shares[index] += 1;
        leftover -= 1;
    }

    Some(shares)
}

fn equal_shares(amount: Money, count: usize) -> Option<Vec<Money>> {
    let count_money = count as Money;
    let base = amount / count_money;
    let extras = amount % count_money;
    Some((0..count).map(|i| base + Money::from((i as Money) < extras)).collect())
}

fn apply_per_item(amount_per_item: Money, max_items: Option<u32>, lines: &mut [WorkingLine]) {
    if amount_per_item <= 0 {
        return;
    }
    let mut remaining = max_items.unwrap_or(u32::MAX);
    for line in lines.iter_mut() {
        if remaining == 0 {
            break;
        }
        if !targeted(line, ActionTarget::EligibleLines) {
            continue;
        }
        let units = line.quantity.min(remaining);
        let amount = (amount_per_item * Money::from(units)).min(line.line_total_after);
        line.discount(AdjustmentKind::PerItemDiscount, amount);
        remaining -= units;
    }
}

fn apply_free_item(
    variant_id: &VariantId,
    quantity: u32,
    max_per_order: u32,
    snapshot: &CatalogSnapshot,
    effects: &mut ActionEffects,
) {
    // One firing grants min(quantity, max_per_order) units; the grant does
    // not scale with how far past the threshold the cart went.
    let units = quantity.min(max_per_order);
    if units == 0 {
        return;
    }

    let Some((product_id, size)) = snapshot.variant_owner(variant_id) else {
        effects.warnings.push(RecordWarning {
            code: "unknown_free_item_variant",
            detail: format!("free item variant `{}` is not in the catalog", variant_id.0),
        });
        return;
    };
    let product_id = product_id.clone();

    let resolver = PriceResolver::new(snapshot);
    let Some(unit_price) = resolver.resolve(&product_id, size) else {
        effects.warnings.push(RecordWarning {
            code: "unpriced_free_item",
            detail: format!("free item variant `{}` has no resolvable price", variant_id.0),
        });
        return;
    };

    let total_before = unit_price * Money::from(units);
    let category = snapshot
        .product(&product_id)
        .map(|product| crate::engine::category::normalize(product.category.as_deref()))
        .unwrap_or(CanonicalCategory::Unknown);

    effects.free_lines.push(WorkingLine {
        line_id: LineId(format!("free:{}:{}", variant_id.0, effects.free_lines.len() + 1)),
        product_id,
        quantity: units,
        display_size: size,
        charged_size: size,
        unit_price_before: unit_price,
        line_total_before: total_before,
        line_total_after: 0,
        adjustments: vec![Adjustment { kind: AdjustmentKind::FreeItem, amount: total_before }],
        missing_price: false,
        eligible: false,
        category,
    });
}

fn lose(amount: Money, effects: &mut ActionEffects, detail: &str) {
    if amount <= 0 {
        return;
    }
    effects.unallocated += amount;
    effects.warnings.push(RecordWarning {
        code: "unallocated_discount",
        detail: format!("{detail} ({amount} minor units lost)"),
    });
    tracing::warn!(amount, detail, "discount amount could not be allocated");
}

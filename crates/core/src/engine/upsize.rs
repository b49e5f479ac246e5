//! Legacy free-upsize promotion, kept for backward compatibility.
//!
//! When the active promotion carries the legacy code and the cart holds
//! enough eligible drink units, each eligible drink line ordered at the
//! smaller size is displayed at the larger size while the smaller size's
//! price stays on the bill. It is a display/charge divergence, not a
//! discount: the adjustment records the per-unit price gap for
//! transparency, and no total moves.

use crate::config::EngineConfig;
use crate::domain::quote::{Adjustment, AdjustmentKind};
use crate::engine::actions::WorkingLine;
use crate::engine::category::CanonicalCategory;
use crate::engine::price::PriceResolver;

pub(crate) fn apply_free_upsize(
    config: &EngineConfig,
    lines: &mut [WorkingLine],
    resolver: &PriceResolver<'_>,
) -> bool {
    let eligible_units: u32 = lines
        .iter()
        .filter(|line| upsize_candidate_pool(line))
        .map(|line| line.quantity)
        .sum();
    if eligible_units < config.upsize_minimum_units {
        return false;
    }

    let mut applied = false;
    for line in lines.iter_mut().filter(|line| upsize_candidate_pool(line)) {
        if line.display_size != config.upsize_from {
            continue;
        }
        // Both sizes must have a defined price; the line's own resolved
        // price covers the smaller one.
        let Some(larger_price) = resolver.resolve(&line.product_id, config.upsize_to) else {
            continue;
        };

        line.display_size = config.upsize_to;
        line.adjustments.push(Adjustment {
            kind: AdjustmentKind::FreeUpsize,
            amount: (larger_price - line.unit_price_before).max(0),
        });
        applied = true;
    }
    applied
}

fn upsize_candidate_pool(line: &WorkingLine) -> bool {
    line.eligible && !line.missing_price && line.category == CanonicalCategory::Drink
}

#[cfg(test)]
mod tests {
    use super::apply_free_upsize;
    use crate::catalog::{CatalogSnapshot, CurrentPrice, LegacyPrice};
    use crate::config::EngineConfig;
    use crate::domain::cart::LineId;
    use crate::domain::product::{Product, ProductId, SizeKey, Variant, VariantId};
    use crate::domain::quote::AdjustmentKind;
    use crate::domain::Money;
    use crate::engine::actions::WorkingLine;
    use crate::engine::category::CanonicalCategory;
    use crate::engine::price::PriceResolver;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![Product {
                id: ProductId("latte".to_owned()),
                category: Some("DRINK".to_owned()),
                subsection: None,
                variants: vec![
                    Variant { id: VariantId("latte-m".to_owned()), size: SizeKey::Medium },
                    Variant { id: VariantId("latte-l".to_owned()), size: SizeKey::Large },
                ],
            }],
            vec![
                CurrentPrice { variant_id: VariantId("latte-m".to_owned()), amount: 30_000 },
                CurrentPrice { variant_id: VariantId("latte-l".to_owned()), amount: 38_000 },
            ],
            vec![LegacyPrice {
                product_id: ProductId("espresso".to_owned()),
                size: SizeKey::Medium,
                amount: 20_000,
            }],
        )
    }

    fn drink_line(product: &str, quantity: u32, unit_price: Money) -> WorkingLine {
        WorkingLine {
            line_id: LineId(format!("{product}-1")),
            product_id: ProductId(product.to_owned()),
            quantity,
            display_size: SizeKey::Medium,
            charged_size: SizeKey::Medium,
            unit_price_before: unit_price,
            line_total_before: unit_price * Money::from(quantity),
            line_total_after: unit_price * Money::from(quantity),
            adjustments: Vec::new(),
            missing_price: false,
            eligible: true,
            category: CanonicalCategory::Drink,
        }
    }

    #[test]
    fn upsize_diverges_display_from_charge_without_touching_totals() {
        let snapshot = snapshot();
        let resolver = PriceResolver::new(&snapshot);
        let mut lines = vec![drink_line("latte", 5, 30_000)];

        assert!(apply_free_upsize(&EngineConfig::default(), &mut lines, &resolver));
        let line = &lines[0];
        assert_eq!(line.display_size, SizeKey::Large);
        assert_eq!(line.charged_size, SizeKey::Medium);
        assert_eq!(line.line_total_after, 150_000);
        assert_eq!(line.adjustments[0].kind, AdjustmentKind::FreeUpsize);
        assert_eq!(line.adjustments[0].amount, 8_000);
    }

    #[test]
    fn below_minimum_units_nothing_happens() {
        let snapshot = snapshot();
        let resolver = PriceResolver::new(&snapshot);
        let mut lines = vec![drink_line("latte", 4, 30_000)];

        assert!(!apply_free_upsize(&EngineConfig::default(), &mut lines, &resolver));
        assert_eq!(lines[0].display_size, SizeKey::Medium);
        assert!(lines[0].adjustments.is_empty());
    }

    #[test]
    fn line_without_a_larger_price_keeps_its_size() {
        let snapshot = snapshot();
        let resolver = PriceResolver::new(&snapshot);
        // espresso has a medium legacy price but no large price.
        let mut lines = vec![drink_line("espresso", 5, 20_000)];

        assert!(!apply_free_upsize(&EngineConfig::default(), &mut lines, &resolver));
        assert_eq!(lines[0].display_size, SizeKey::Medium);
    }

    #[test]
    fn ineligible_drink_units_do_not_count_toward_the_minimum() {
        let snapshot = snapshot();
        let resolver = PriceResolver::new(&snapshot);
        let mut eligible = drink_line("latte", 3, 30_000);
        let mut excluded = drink_line("latte", 2, 30_000);
        excluded.eligible = false;
        let mut lines = vec![eligible.clone(), excluded.clone()];

        assert!(!apply_free_upsize(&EngineConfig::default(), &mut lines, &resolver));

        eligible.quantity = 5;
        eligible.line_total_before = 150_000;
        eligible.line_total_after = 150_000;
        let mut lines = vec![eligible, excluded];
        assert!(apply_free_upsize(&EngineConfig::default(), &mut lines, &resolver));
        assert_eq!(lines[0].display_size, SizeKey::Large);
        assert_eq!(lines[1].display_size, SizeKey::Medium);
    }
}

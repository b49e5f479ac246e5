//! Read-only inputs for one pricing request. Everything here is fetched by
//! the calling layer before the engine runs; the engine itself never does
//! I/O and never mutates these.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId, SizeKey, VariantId};
use crate::domain::promotion::{Promotion, Rule, ScopeTarget};
use crate::domain::Money;
use crate::records::{decode_rules, decode_scopes, RawRuleRow, RawScopeRow, RecordWarning};

/// Current price source row, keyed by variant identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub variant_id: VariantId,
    pub amount: Money,
}

/// Legacy price source row, keyed by product and size label. Consulted only
/// when the current source has no price for that (product, size) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPrice {
    pub product_id: ProductId,
    pub size: SizeKey,
    pub amount: Money,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogSnapshot {
    products: BTreeMap<String, Product>,
    current: BTreeMap<String, Money>,
    legacy: BTreeMap<(String, SizeKey), Money>,
    variant_owner: BTreeMap<String, (ProductId, SizeKey)>,
}

impl CatalogSnapshot {
    pub fn new(
        products: Vec<Product>,
        current_prices: Vec<CurrentPrice>,
        legacy_prices: Vec<LegacyPrice>,
    ) -> Self {
        let mut variant_owner = BTreeMap::new();
        for product in &products {
            for variant in &product.variants {
                variant_owner.insert(variant.id.0.clone(), (product.id.clone(), variant.size));
            }
        }

        Self {
            products: products.into_iter().map(|p| (p.id.0.clone(), p)).collect(),
            current: current_prices.into_iter().map(|p| (p.variant_id.0, p.amount)).collect(),
            legacy: legacy_prices
                .into_iter()
                .map(|p| ((p.product_id.0, p.size), p.amount))
                .collect(),
            variant_owner,
        }
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(&id.0)
    }

    pub fn current_price(&self, variant: &VariantId) -> Option<Money> {
        self.current.get(&variant.0).copied()
    }

    pub fn legacy_price(&self, product: &ProductId, size: SizeKey) -> Option<Money> {
        self.legacy.get(&(product.0.clone(), size)).copied()
    }

    pub fn variant_owner(&self, variant: &VariantId) -> Option<(&ProductId, SizeKey)> {
        self.variant_owner.get(&variant.0).map(|(id, size)| (id, *size))
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

/// Promotion definition plus its scope and rule records, decoded from raw
/// rows with malformed ones skipped and surfaced as warnings.
#[derive(Clone, Debug, PartialEq)]
pub struct PromotionBundle {
    pub promotion: Promotion,
    pub scopes: Vec<ScopeTarget>,
    pub rules: Vec<Rule>,
    pub warnings: Vec<RecordWarning>,
}

impl PromotionBundle {
    pub fn from_records(
        promotion: Promotion,
        raw_scopes: &[RawScopeRow],
        raw_rules: &[RawRuleRow],
    ) -> Self {
        let (scopes, mut warnings) = decode_scopes(&promotion.id, raw_scopes);
        let (rules, rule_warnings) = decode_rules(&promotion.id, raw_rules);
        warnings.extend(rule_warnings);
        Self { promotion, scopes, rules, warnings }
    }
}

/// On-disk dataset shape used by the CLI and by seed fixtures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub products: Vec<Product>,
    #[serde(default)]
    pub current_prices: Vec<CurrentPrice>,
    #[serde(default)]
    pub legacy_prices: Vec<LegacyPrice>,
    #[serde(default)]
    pub promotions: Vec<PromotionRecords>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecords {
    pub promotion: Promotion,
    #[serde(default)]
    pub scopes: Vec<RawScopeRow>,
    #[serde(default)]
    pub rules: Vec<RawRuleRow>,
}

impl Dataset {
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::new(
            self.products.clone(),
            self.current_prices.clone(),
            self.legacy_prices.clone(),
        )
    }

    /// Promotion lookup by code, mirroring the promotion-by-code collaborator.
    pub fn bundle_for(&self, code: &str) -> Option<PromotionBundle> {
        self.promotions.iter().find(|record| record.promotion.id.0 == code).map(|record| {
            PromotionBundle::from_records(
                record.promotion.clone(),
                &record.scopes,
                &record.rules,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogSnapshot, CurrentPrice, LegacyPrice};
    use crate::domain::product::{Product, ProductId, SizeKey, Variant, VariantId};

    #[test]
    fn variant_owner_index_covers_every_declared_variant() {
        let snapshot = CatalogSnapshot::new(
            vec![Product {
                id: ProductId("latte".to_owned()),
                category: Some("DRINK".to_owned()),
                subsection: None,
                variants: vec![Variant {
                    id: VariantId("latte-m".to_owned()),
                    size: SizeKey::Medium,
                }],
            }],
            vec![CurrentPrice { variant_id: VariantId("latte-m".to_owned()), amount: 30_000 }],
            vec![LegacyPrice {
                product_id: ProductId("latte".to_owned()),
                size: SizeKey::Large,
                amount: 38_000,
            }],
        );

        let (owner, size) =
            snapshot.variant_owner(&VariantId("latte-m".to_owned())).expect("owner");
        assert_eq!(owner, &ProductId("latte".to_owned()));
        assert_eq!(size, SizeKey::Medium);
        assert_eq!(
            snapshot.legacy_price(&ProductId("latte".to_owned()), SizeKey::Large),
            Some(38_000)
        );
    }
}

//! Scope resolution: which cart lines does a promotion reach.
//!
//! Precedence is most specific first: variant, then product, then
//! subsection, then category. The first level that names the line at all
//! decides with that row's verdict, so a product-level exclude beats a
//! category-level include and a product-level include beats a
//! category-level exclude. A line no level names is not eligible; absence
//! of a grant is never implicit inclusion.

use std::collections::BTreeMap;

use crate::domain::product::{ProductId, VariantId};
use crate::domain::promotion::{ScopeTarget, TargetType};
use crate::engine::category::{self, CanonicalCategory};

/// The identity facets of one line that scope rows can name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIdentity {
    pub variant_id: Option<VariantId>,
    pub product_id: ProductId,
    pub subsection: Option<String>,
    pub category: CanonicalCategory,
}

#[derive(Clone, Debug, Default)]
pub struct ScopeResolver {
    has_includes: bool,
    variants: BTreeMap<String, bool>,
    products: BTreeMap<String, bool>,
    subsections: BTreeMap<String, bool>,
    categories: BTreeMap<CanonicalCategory, bool>,
}

impl ScopeResolver {
    pub fn new(scopes: &[ScopeTarget]) -> Self {
        let mut resolver = Self::default();
        for scope in scopes {
            resolver.has_includes |= scope.included;
            match scope.target_type {
                TargetType::Variant => {
                    insert_verdict(&mut resolver.variants, scope.target_id.clone(), scope.included);
                }
                TargetType::Product => {
                    insert_verdict(&mut resolver.products, scope.target_id.clone(), scope.included);
                }
                TargetType::Subsection => {
                    insert_verdict(
                        &mut resolver.subsections,
                        scope.target_id.clone(),
                        scope.included,
                    );
                }
                TargetType::Category => {
                    let canonical = category::normalize(Some(&scope.target_id));
                    if canonical == CanonicalCategory::Unknown {
                        // An unrecognized category label can never name a line.
                        continue;
                    }
                    insert_verdict(&mut resolver.categories, canonical, scope.included);
                }
            }
        }
        resolver
    }

    /// True when the promotion grants at least one include row of any type.
    /// Without one, no line is eligible regardless of exclude rows.
    pub fn has_includes(&self) -> bool {
        self.has_includes
    }

    pub fn is_eligible(&self, line: &LineIdentity) -> bool {
        if !self.has_includes {
            return false;
        }
        if let Some(verdict) =
            line.variant_id.as_ref().and_then(|variant| self.variants.get(&variant.0))
        {
            return *verdict;
        }
        if let Some(verdict) = self.products.get(&line.product_id.0) {
            return *verdict;
        }
        if let Some(verdict) =
            line.subsection.as_ref().and_then(|subsection| self.subsections.get(subsection))
        {
            return *verdict;
        }
        if line.category != CanonicalCategory::Unknown {
            if let Some(verdict) = self.categories.get(&line.category) {
                return *verdict;
            }
        }
        false
    }
}

/// Within one level, an exclude row beats an include row for the same id.
fn insert_verdict<K: Ord>(map: &mut BTreeMap<K, bool>, key: K, included: bool) {
    map.entry(key).and_modify(|verdict| *verdict &= included).or_insert(included);
}

#[cfg(test)]
mod tests {
    use super::{LineIdentity, ScopeResolver};
    use crate::domain::product::{ProductId, VariantId};
    use crate::domain::promotion::{ScopeTarget, TargetType};
    use crate::engine::category::CanonicalCategory;

    fn scope(target_type: TargetType, target_id: &str, included: bool) -> ScopeTarget {
        ScopeTarget { target_type, target_id: target_id.to_owned(), included }
    }

    fn drink_line(product: &str) -> LineIdentity {
        LineIdentity {
            variant_id: Some(VariantId(format!("{product}-m"))),
            product_id: ProductId(product.to_owned()),
            subsection: None,
            category: CanonicalCategory::Drink,
        }
    }

    #[test]
    fn product_exclude_overrides_category_include() {
        let resolver = ScopeResolver::new(&[
            scope(TargetType::Category, "DRINK", true),
            scope(TargetType::Product, "latte", false),
        ]);

        assert!(!resolver.is_eligible(&drink_line("latte")));
        assert!(resolver.is_eligible(&drink_line("mocha")));
    }

    #[test]
    fn product_include_overrides_category_exclude() {
        let resolver = ScopeResolver::new(&[
            scope(TargetType::Category, "DRINK", false),
            scope(TargetType::Product, "latte", true),
        ]);

        assert!(resolver.is_eligible(&drink_line("latte")));
        assert!(!resolver.is_eligible(&drink_line("mocha")));
    }

    #[test]
    fn variant_level_is_most_specific() {
        let resolver = ScopeResolver::new(&[
            scope(TargetType::Product, "latte", true),
            scope(TargetType::Variant, "latte-m", false),
        ]);

        assert!(!resolver.is_eligible(&drink_line("latte")));

        let large = LineIdentity {
            variant_id: Some(VariantId("latte-l".to_owned())),
            ..drink_line("latte")
        };
        assert!(resolver.is_eligible(&large));
    }

    #[test]
    fn zero_include_rows_means_nothing_is_eligible() {
        let resolver = ScopeResolver::new(&[scope(TargetType::Product, "latte", false)]);
        assert!(!resolver.has_includes());
        assert!(!resolver.is_eligible(&drink_line("mocha")));
    }

    #[test]
    fn unmatched_line_is_not_implicitly_included() {
        let resolver = ScopeResolver::new(&[scope(TargetType::Category, "CAKE", true)]);
        assert!(!resolver.is_eligible(&drink_line("latte")));
    }

    #[test]
    fn unknown_category_never_satisfies_a_category_include() {
        let resolver = ScopeResolver::new(&[scope(TargetType::Category, "DRINK", true)]);
        let line = LineIdentity {
            variant_id: None,
            product_id: ProductId("mystery".to_owned()),
            subsection: None,
            category: CanonicalCategory::Unknown,
        };
        assert!(!resolver.is_eligible(&line));
    }

    #[test]
    fn scope_rows_match_legacy_category_spellings() {
        let resolver = ScopeResolver::new(&[scope(TargetType::Category, "Đồ uống", true)]);
        assert!(resolver.is_eligible(&drink_line("latte")));
    }
}

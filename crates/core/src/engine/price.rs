use crate::catalog::CatalogSnapshot;
use crate::domain::product::{ProductId, SizeKey};
use crate::domain::Money;

/// Resolves a unit price for (product, size). The current variant-price
/// table wins; the legacy product+size table is consulted only when no
/// current price exists for that pair. The two sources are never merged for
/// one key. A double miss is reported as `None`; callers surface it as a
/// missing-price line, never as a zero price and never as a failed quote.
pub struct PriceResolver<'a> {
    snapshot: &'a CatalogSnapshot,
}

impl<'a> PriceResolver<'a> {
    pub fn new(snapshot: &'a CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn resolve(&self, product_id: &ProductId, size: SizeKey) -> Option<Money> {
        let current = self
            .snapshot
            .product(product_id)
            .and_then(|product| product.variant_for(size))
            .and_then(|variant| self.snapshot.current_price(&variant.id));

        current.or_else(|| self.snapshot.legacy_price(product_id, size))
    }
}

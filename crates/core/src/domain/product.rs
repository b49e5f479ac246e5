use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(pub String);

/// Size keys form a closed set: the standard key for products sold in a
/// single size, plus the two comparative sizes used by sized products.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeKey {
    #[serde(rename = "STD")]
    Std,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
}

impl SizeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Std => "STD",
            Self::Medium => "M",
            Self::Large => "L",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub size: SizeKey,
}

/// Read-only catalog entry. The raw category string is kept as stored
/// (possibly null or legacy-spelled); normalization happens in the engine.
/// A product with no variants is priced from the legacy table only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category: Option<String>,
    pub subsection: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    pub fn variant_for(&self, size: SizeKey) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.size == size)
    }
}

#[cfg(test)]
mod tests {
    use super::{Product, ProductId, SizeKey, Variant, VariantId};

    #[test]
    fn variant_lookup_matches_on_size() {
        let product = Product {
            id: ProductId("latte".to_owned()),
            category: Some("DRINK".to_owned()),
            subsection: None,
            variants: vec![
                Variant { id: VariantId("latte-m".to_owned()), size: SizeKey::Medium },
                Variant { id: VariantId("latte-l".to_owned()), size: SizeKey::Large },
            ],
        };

        assert_eq!(
            product.variant_for(SizeKey::Large).map(|v| v.id.clone()),
            Some(VariantId("latte-l".to_owned()))
        );
        assert!(product.variant_for(SizeKey::Std).is_none());
    }

    #[test]
    fn size_keys_round_trip_through_serde_labels() {
        let json = serde_json::to_string(&SizeKey::Medium).expect("serialize");
        assert_eq!(json, "\"M\"");
        let parsed: SizeKey = serde_json::from_str("\"STD\"").expect("deserialize");
        assert_eq!(parsed, SizeKey::Std);
    }
}

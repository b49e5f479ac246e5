use std::fs;
use std::path::Path;

use serde::Serialize;
use tally_core::{engine::price::PriceResolver, Dataset, PromotionBundle, SizeKey};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CheckReport {
    products: usize,
    promotions: usize,
    unpriced: Vec<UnpricedProduct>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct UnpricedProduct {
    product_id: String,
    size: &'static str,
}

pub fn run(dataset_path: &Path) -> CommandResult {
    let raw = match fs::read_to_string(dataset_path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "environment",
                format!("could not read `{}`: {error}", dataset_path.display()),
                1,
            )
        }
    };
    let dataset: Dataset = match serde_json::from_str(&raw) {
        Ok(dataset) => dataset,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "environment",
                format!("could not parse `{}`: {error}", dataset_path.display()),
                1,
            )
        }
    };

    let snapshot = dataset.snapshot();
    let resolver = PriceResolver::new(&snapshot);

    let mut unpriced = Vec::new();
    for product in snapshot.products() {
        // Sized products must price every declared size; variantless ones
        // price at the standard key through the legacy table.
        let sizes: Vec<SizeKey> = if product.variants.is_empty() {
            vec![SizeKey::Std]
        } else {
            product.variants.iter().map(|variant| variant.size).collect()
        };
        for size in sizes {
            if resolver.resolve(&product.id, size).is_none() {
                unpriced.push(UnpricedProduct {
                    product_id: product.id.0.clone(),
                    size: size.as_str(),
                });
            }
        }
    }

    let mut warnings = Vec::new();
    for record in &dataset.promotions {
        let bundle =
            PromotionBundle::from_records(record.promotion.clone(), &record.scopes, &record.rules);
        warnings.extend(bundle.warnings.iter().map(|warning| warning.render()));
    }

    CommandResult::payload(CheckReport {
        products: dataset.products.len(),
        promotions: dataset.promotions.len(),
        unpriced,
        warnings,
    })
}

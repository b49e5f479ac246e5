pub mod cart;
pub mod product;
pub mod promotion;
pub mod quote;

/// Monetary amount in minor currency units. Outputs are never negative.
pub type Money = i64;

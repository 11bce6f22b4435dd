//! Errors

use thiserror::Error;

use crate::amount;

/// Dukan Error
#[derive(Debug, Error)]
pub enum Error {
    /// Product references a variant that does not exist
    #[error("Unknown variant `{variant}` for product `{product}`")]
    UnknownVariant {
        /// Product id
        product: String,
        /// Requested variant name
        variant: String,
    },
    /// Price table does not cover an offered weight
    #[error("Product `{product}` has no price for weight `{weight}`")]
    MissingPrice {
        /// Product id
        product: String,
        /// Offered weight label
        weight: String,
    },
    /// Variant price table does not cover an offered weight
    #[error("Variant `{variant}` of product `{product}` has no price for weight `{weight}`")]
    MissingVariantPrice {
        /// Product id
        product: String,
        /// Variant name
        variant: String,
        /// Offered weight label
        weight: String,
    },
    /// Personalized selection does not fill the product's slots
    #[error("Selection for `{product}` fills {got} of {expected} slots")]
    IncompleteSelection {
        /// Product id
        product: String,
        /// Total slot count
        expected: usize,
        /// Items selected
        got: usize,
    },
    /// Cart line id is not in the ledger
    #[error("Unknown cart line: {0}")]
    UnknownLine(u64),
    /// Amount Error
    #[error(transparent)]
    Amount(#[from] amount::Error),
    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

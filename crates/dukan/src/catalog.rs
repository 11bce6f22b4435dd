//! Product catalog model and price resolution.
//!
//! The catalog is static reference data supplied from outside (a JSON file
//! in practice). Products come in three pricing shapes: a flat
//! weight-to-price table, a set of named variants each with its own table,
//! or a personalizable hamper whose price is fixed at the moment the
//! customer confirms a selection.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Amount;

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// After-meal digestive mixes
    Mukhwas,
    /// Spice blends
    Masala,
    /// Savoury snacks
    Snacks,
    /// Traditional sweets
    #[serde(rename = "Traditional Sweets")]
    TraditionalSweets,
    /// Gift hampers and boxes
    #[serde(rename = "Gifting & Hampers")]
    GiftingHampers,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Mukhwas => write!(f, "Mukhwas"),
            Category::Masala => write!(f, "Masala"),
            Category::Snacks => write!(f, "Snacks"),
            Category::TraditionalSweets => write!(f, "Traditional Sweets"),
            Category::GiftingHampers => write!(f, "Gifting & Hampers"),
        }
    }
}

/// A named alternative formulation of a product with its own price table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Variant name, shown in place of the product name once chosen
    pub name: String,
    /// Weight label to price
    #[serde(default)]
    pub price_by_weight: HashMap<String, Amount>,
}

/// One category slot of a personalizable hamper
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionSlot {
    /// Category the customer picks from
    pub category: Category,
    /// Number of picks required from that category
    pub count: usize,
}

/// How a product is priced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pricing {
    /// Flat weight-to-price table, falling back to the base price
    Simple {
        /// Weight label to price
        #[serde(default)]
        price_by_weight: HashMap<String, Amount>,
    },
    /// Named variants, each with an independent price table
    Variants {
        /// Available variants
        variants: Vec<Variant>,
    },
    /// Hamper whose contents are chosen by the customer; price is fixed
    /// when the selection is confirmed
    Personalizable {
        /// Category slots the selection must fill
        slots: Vec<SelectionSlot>,
    },
}

impl Default for Pricing {
    fn default() -> Self {
        Pricing::Simple {
            price_by_weight: HashMap::new(),
        }
    }
}

/// An immutable catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: Category,
    /// Listing description
    #[serde(default)]
    pub description: String,
    /// Price of the default weight
    pub base_price: Amount,
    /// Default weight label
    pub base_weight: String,
    /// Selectable weight labels
    #[serde(default)]
    pub weight_options: Vec<String>,
    /// Pricing shape
    #[serde(default)]
    pub pricing: Pricing,
    /// Ingredient or content labels; for hampers these are the default
    /// contents a personalized selection replaces
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Listed in the gifting collection
    #[serde(default)]
    pub is_gift: bool,
}

impl Product {
    /// Look up a variant by name
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        match &self.pricing {
            Pricing::Variants { variants } => variants.iter().find(|v| v.name == name),
            _ => None,
        }
    }

    /// Category slots of a personalizable hamper, if any
    pub fn personalization_slots(&self) -> Option<&[SelectionSlot]> {
        match &self.pricing {
            Pricing::Personalizable { slots } => Some(slots),
            _ => None,
        }
    }

    /// Resolve the unit price for a chosen weight and optional variant.
    ///
    /// With a variant chosen the chain is the variant's price for the
    /// weight, then the variant's price for the default weight, then the
    /// product base price. Without variants it is the product's table for
    /// the weight, then the base price. Only an unknown variant name is an
    /// error; a missing weight always falls back.
    pub fn resolve_price(
        &self,
        weight_label: &str,
        variant_name: Option<&str>,
    ) -> Result<Amount, Error> {
        if let (Pricing::Variants { .. }, Some(name)) = (&self.pricing, variant_name) {
            let variant = self.variant(name).ok_or_else(|| Error::UnknownVariant {
                product: self.id.clone(),
                variant: name.to_string(),
            })?;

            return Ok(variant
                .price_by_weight
                .get(weight_label)
                .or_else(|| variant.price_by_weight.get(&self.base_weight))
                .copied()
                .unwrap_or(self.base_price));
        }

        let price = match &self.pricing {
            Pricing::Simple { price_by_weight } => {
                price_by_weight.get(weight_label).copied()
            }
            _ => None,
        };

        Ok(price.unwrap_or(self.base_price))
    }

    /// Check the catalog invariant: every offered weight must be priced,
    /// by every variant when variants exist.
    pub fn validate(&self) -> Result<(), Error> {
        match &self.pricing {
            Pricing::Variants { variants } => {
                for weight in &self.weight_options {
                    for variant in variants {
                        if !variant.price_by_weight.contains_key(weight) {
                            return Err(Error::MissingVariantPrice {
                                product: self.id.clone(),
                                variant: variant.name.clone(),
                                weight: weight.clone(),
                            });
                        }
                    }
                }
            }
            Pricing::Simple { price_by_weight } => {
                for weight in &self.weight_options {
                    if weight != &self.base_weight && !price_by_weight.contains_key(weight) {
                        return Err(Error::MissingPrice {
                            product: self.id.clone(),
                            weight: weight.clone(),
                        });
                    }
                }
            }
            Pricing::Personalizable { .. } => {}
        }

        Ok(())
    }
}

/// Deserialize and validate a catalog from JSON
pub fn from_json(json: &str) -> Result<Vec<Product>, Error> {
    let products: Vec<Product> = serde_json::from_str(json)?;

    for product in &products {
        product.validate()?;
    }

    Ok(products)
}

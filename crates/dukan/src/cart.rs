//! Session-scoped cart ledger.
//!
//! The cart is an owned, in-memory collection of line items. Lines are
//! keyed by product, weight, variant and ingredient snapshot; two
//! additions with the same key merge into one line. Unit prices are
//! resolved once at add time so catalog changes never retroactively alter
//! an in-progress cart. There is no persistence and no concurrent writer.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::Error;
use crate::Amount;

/// Identity of a cart line within the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    /// Product id
    pub product_id: String,
    /// Resolved weight label
    pub weight: String,
    /// Chosen variant, if any
    pub variant: Option<String>,
    /// Ingredient snapshot at add time
    pub ingredients: Vec<String>,
}

/// One entry in the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    id: u64,
    /// Product id
    pub product_id: String,
    /// Display name; the variant name overrides the product name
    pub display_name: String,
    /// Resolved weight label
    pub weight: String,
    /// Chosen variant, if any
    pub variant: Option<String>,
    /// Ingredient snapshot at add time
    pub ingredients: Vec<String>,
    /// Unit price locked in at add time
    pub unit_price: Amount,
    /// Quantity, never below 1
    pub quantity: u32,
    /// Set when the line was created through a personalization flow
    pub personalized: bool,
}

impl CartLine {
    /// Ledger-unique line id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Merge identity of this line
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            weight: self.weight.clone(),
            variant: self.variant.clone(),
            ingredients: self.ingredients.clone(),
        }
    }

    /// Unit price times quantity
    pub fn line_total(&self) -> Result<Amount, Error> {
        self.unit_price
            .checked_mul_quantity(self.quantity)
            .ok_or(Error::Amount(crate::amount::Error::AmountOverflow))
    }
}

/// In-memory ordered cart ledger
#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    next_id: u64,
}

impl Cart {
    /// New empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// True when the ledger has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of a product, resolving weight and price.
    ///
    /// The weight defaults to the product's base weight. An addition with
    /// the same identity key as an existing line increments that line;
    /// otherwise a new line is appended. Returns the affected line id.
    pub fn add(
        &mut self,
        product: &Product,
        weight_label: Option<&str>,
        variant_name: Option<&str>,
    ) -> Result<u64, Error> {
        let weight = weight_label.unwrap_or(&product.base_weight).to_string();
        let unit_price = product.resolve_price(&weight, variant_name)?;

        let display_name = match variant_name.and_then(|name| product.variant(name)) {
            Some(variant) => variant.name.clone(),
            None => product.name.clone(),
        };

        let key = LineKey {
            product_id: product.id.clone(),
            weight,
            variant: variant_name.map(ToString::to_string),
            ingredients: product.ingredients.clone(),
        };

        Ok(self.merge_or_append(key, display_name, unit_price, false))
    }

    /// Add one unit of a personalized hamper with a confirmed ingredient
    /// selection and its selection price.
    ///
    /// When the product declares selection slots the snapshot must fill
    /// all of them. The snapshot is part of the line identity, so two
    /// differently personalized hampers never merge.
    pub fn add_personalized(
        &mut self,
        product: &Product,
        ingredients: Vec<String>,
        price: Amount,
    ) -> Result<u64, Error> {
        if let Some(slots) = product.personalization_slots() {
            let expected: usize = slots.iter().map(|slot| slot.count).sum();
            if expected > 0 && ingredients.len() != expected {
                return Err(Error::IncompleteSelection {
                    product: product.id.clone(),
                    expected,
                    got: ingredients.len(),
                });
            }
        }

        let key = LineKey {
            product_id: product.id.clone(),
            weight: product.base_weight.clone(),
            variant: None,
            ingredients,
        };

        Ok(self.merge_or_append(key, product.name.clone(), price, true))
    }

    fn merge_or_append(
        &mut self,
        key: LineKey,
        display_name: String,
        unit_price: Amount,
        personalized: bool,
    ) -> u64 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.key() == key) {
            line.quantity += 1;
            return line.id;
        }

        let id = self.next_id;
        self.next_id += 1;

        self.lines.push(CartLine {
            id,
            product_id: key.product_id,
            display_name,
            weight: key.weight,
            variant: key.variant,
            ingredients: key.ingredients,
            unit_price,
            quantity: 1,
            personalized,
        });

        id
    }

    /// Adjust a line's quantity by a signed delta, clamped to a floor of 1.
    /// Removal is a separate explicit action, never a side effect of
    /// decrementing.
    pub fn set_quantity_delta(&mut self, line_id: u64, delta: i64) -> Result<u32, Error> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or(Error::UnknownLine(line_id))?;

        let adjusted = i64::from(line.quantity).saturating_add(delta);
        line.quantity = u32::try_from(adjusted.max(1)).unwrap_or(u32::MAX);

        Ok(line.quantity)
    }

    /// Remove a line entirely, regardless of quantity
    pub fn remove(&mut self, line_id: u64) -> Result<(), Error> {
        let position = self
            .lines
            .iter()
            .position(|line| line.id == line_id)
            .ok_or(Error::UnknownLine(line_id))?;

        self.lines.remove(position);
        Ok(())
    }

    /// Sum of unit price times quantity over all lines
    pub fn subtotal(&self) -> Result<Amount, Error> {
        Amount::try_sum(
            self.lines
                .iter()
                .map(CartLine::line_total)
                .collect::<Result<Vec<_>, _>>()?,
        )
        .map_err(Error::from)
    }

    /// Total unit count, for the cart badge
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Drop every line. Called when the customer continues shopping after
    /// a completed order.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

//! Shipment weight and delivery fee derivation.
//!
//! The fee is a pure derivation over the cart lines and the city input;
//! callers re-invoke it whenever either changes. The result is tri-state:
//! no fee until the city validates, a zero fee for the home city, and a
//! weight-tiered fee everywhere else.

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::form::is_valid_place_name;
use crate::Amount;

/// City with free same-city delivery
pub const HOME_CITY: &str = "Ahmedabad";

/// Grams assumed for a weight label nothing else matches
pub const DEFAULT_LABEL_GRAMS: u64 = 250;

const LARGE_HAMPER_GRAMS: u64 = 2500;
const MEDIUM_BOX_GRAMS: u64 = 1200;
const GIFT_BOX_GRAMS: u64 = 800;

/// Derived shipping state for the current cart and city input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingContext {
    /// Total shipment weight over all lines
    pub total_weight_grams: u64,
    /// The validated city, once there is one
    pub city: Option<String>,
    /// `None` until the city validates; zero for the home city. Callers
    /// must render `None` as "enter your city", not as a free delivery.
    pub fee: Option<Amount>,
}

/// Classify a weight label into grams.
///
/// Named hamper sizes map to fixed constants; otherwise a `KG` suffix
/// scales the leading number by 1000 and a `G` suffix takes it as is.
/// Anything unrecognized counts as 250 g.
pub fn label_grams(label: &str) -> u64 {
    let upper = label.trim().to_uppercase();

    if upper.contains("LARGE HAMPER") {
        return LARGE_HAMPER_GRAMS;
    }
    if upper.contains("MEDIUM BOX") {
        return MEDIUM_BOX_GRAMS;
    }
    if upper.contains("GIFT BOX") {
        return GIFT_BOX_GRAMS;
    }

    let leading: String = upper
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let Ok(number) = leading.parse::<f64>() else {
        return DEFAULT_LABEL_GRAMS;
    };

    if upper.contains("KG") {
        (number * 1000.0) as u64
    } else if upper.contains('G') {
        number as u64
    } else {
        DEFAULT_LABEL_GRAMS
    }
}

/// Total shipment weight of the cart
pub fn total_weight_grams(lines: &[CartLine]) -> u64 {
    lines
        .iter()
        .map(|line| label_grams(&line.weight) * u64::from(line.quantity))
        .sum()
}

/// Weight-tiered delivery fee in rupees for shipments outside the home
/// city
pub fn tiered_fee(grams: u64) -> u64 {
    match grams {
        0..=500 => 60,
        501..=1000 => 100,
        1001..=2000 => 150,
        2001..=5000 => 200,
        _ => 250,
    }
}

/// True when the city gets free same-city delivery
pub fn is_home_city(city: &str) -> bool {
    city.trim().eq_ignore_ascii_case(HOME_CITY)
}

/// Derive the shipping context from the cart lines and the raw city
/// input. The city rule is the same one the checkout form applies, so the
/// two can never disagree.
pub fn compute_shipping(lines: &[CartLine], city_input: &str) -> ShippingContext {
    let total_weight_grams = total_weight_grams(lines);

    if !is_valid_place_name(city_input) {
        return ShippingContext {
            total_weight_grams,
            city: None,
            fee: None,
        };
    }

    let city = city_input.trim().to_string();
    let fee = if is_home_city(&city) {
        Amount::ZERO
    } else {
        Amount::from(tiered_fee(total_weight_grams))
    };

    ShippingContext {
        total_weight_grams,
        city: Some(city),
        fee: Some(fee),
    }
}

/// Delivery time estimate shown on the confirmation screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEstimate {
    /// Same-city delivery
    NextWorkingDay,
    /// Everywhere else
    ThreeToFiveDays,
}

impl DeliveryEstimate {
    /// Estimate for a validated city
    pub fn for_city(city: &str) -> Self {
        if is_home_city(city) {
            DeliveryEstimate::NextWorkingDay
        } else {
            DeliveryEstimate::ThreeToFiveDays
        }
    }
}

impl std::fmt::Display for DeliveryEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryEstimate::NextWorkingDay => write!(f, "1 Working Day"),
            DeliveryEstimate::ThreeToFiveDays => write!(f, "3-5 Business Days"),
        }
    }
}

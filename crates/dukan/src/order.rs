//! Order records and seller-facing summaries.
//!
//! An order exists only for the duration of one checkout attempt; there
//! is no durable store. The order id is a human-readable reference label,
//! not a primary key, so a random short code is sufficient.

use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cart::CartLine;
use crate::notification::NotificationPayload;
use crate::shipping::DeliveryEstimate;
use crate::Amount;

/// Prefix of generated order reference codes
pub const ORDER_ID_PREFIX: &str = "AM";

/// Human-readable order reference code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate a fresh reference: the prefix plus a random five-digit
    /// suffix. Not unique; acceptable only because no durable order
    /// ledger exists.
    pub fn generate() -> Self {
        let suffix = rand::rng().random_range(10_000..100_000);
        OrderId(format!("{}-{}", ORDER_ID_PREFIX, suffix))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        OrderId(value)
    }
}

/// Validated delivery details out of the checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name
    pub name: String,
    /// Normalized 10-digit mobile number
    pub phone: String,
    /// Email, when given
    pub email: Option<String>,
    /// Delivery city
    pub city: String,
    /// Full street address
    pub address: String,
}

/// Immutable copy of one cart line at submission time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSnapshot {
    /// Display name
    pub name: String,
    /// Weight label
    pub weight: String,
    /// Quantity
    pub quantity: u32,
    /// Locked-in unit price
    pub unit_price: Amount,
    /// Ingredient or selection labels
    pub ingredients: Vec<String>,
    /// Created through a personalization flow
    pub personalized: bool,
}

impl From<&CartLine> for LineSnapshot {
    fn from(line: &CartLine) -> Self {
        LineSnapshot {
            name: line.display_name.clone(),
            weight: line.weight.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            ingredients: line.ingredients.clone(),
            personalized: line.personalized,
        }
    }
}

/// Everything known about one submitted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderContext {
    /// Reference code
    pub order_id: OrderId,
    /// Customer delivery details
    pub customer: CustomerDetails,
    /// Cart lines frozen at submission time
    pub lines: Vec<LineSnapshot>,
    /// Total shipment weight
    pub total_weight_grams: u64,
    /// Sum of line totals
    pub subtotal: Amount,
    /// Computed delivery fee
    pub shipping_fee: Amount,
    /// Subtotal plus delivery fee
    pub grand_total: Amount,
    /// Payment-intent reference, set once payment succeeded
    pub payment_reference: Option<String>,
}

impl OrderContext {
    /// Itemized one-line-per-item summary, with selection notes indented
    /// under each line
    pub fn items_summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                let mut entry = format!("{}x {} ({})", line.quantity, line.name, line.weight);
                if !line.ingredients.is_empty() {
                    entry.push_str(&format!(
                        "\n   └ Choices: {}",
                        line.ingredients.join(", ")
                    ));
                }
                entry
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn payment_reference_label(&self) -> &str {
        self.payment_reference.as_deref().unwrap_or("PENDING")
    }

    /// The rich seller notification body
    pub fn notification_message(&self) -> String {
        format!(
            "🛍️ NEW ORDER: {}\n\
             ---------------------------\n\
             👤 Customer: {}\n\
             📞 Phone: {}\n\
             🏘️ City: {}\n\
             📍 Address: {}\n\
             📧 Email: {}\n\
             \n\
             ⚖️ Weight: {}g\n\
             📦 ITEMS:\n{}\n\
             \n\
             💰 SUB-TOTAL: ₹{}\n\
             🚚 DELIVERY: ₹{}\n\
             💵 GRAND TOTAL: ₹{}\n\
             💳 METHOD: RAZORPAY\n\
             🆔 PAYMENT ID: {}\n\
             ---------------------------",
            self.order_id,
            self.customer.name,
            self.customer.phone,
            self.customer.city,
            self.customer.address,
            self.customer.email.as_deref().unwrap_or("N/A"),
            self.total_weight_grams,
            self.items_summary(),
            self.subtotal,
            self.shipping_fee,
            self.grand_total,
            self.payment_reference_label(),
        )
    }

    /// Reduced plain-text body used when a channel rejects the rich one
    pub fn fallback_message(&self) -> String {
        format!(
            "NEW ORDER: {}\n\
             Customer: {}\n\
             Phone: {}\n\
             City: {}\n\
             Address: {}\n\
             \n{}\n\
             \n\
             Subtotal: Rs.{} | Delivery: Rs.{} | TOTAL: Rs.{}\n\
             Payment ID: {}",
            self.order_id,
            self.customer.name,
            self.customer.phone,
            self.customer.city,
            self.customer.address,
            self.items_summary(),
            self.subtotal,
            self.shipping_fee,
            self.grand_total,
            self.payment_reference_label(),
        )
    }

    /// Payload handed to the notification channels
    pub fn notification_payload(&self) -> NotificationPayload {
        NotificationPayload {
            title: format!(
                "New Order: {} (Rs. {})",
                self.customer.name, self.grand_total
            ),
            body: self.notification_message(),
            fallback_body: self.fallback_message(),
        }
    }

    /// Pre-filled WhatsApp message link the customer can use to confirm
    /// the order manually with the seller
    pub fn whatsapp_url(&self, seller_number: &str) -> Url {
        let message = format!(
            "*New Order from Amie's Homemade*\n\
             ---------------------------\n\
             *Order ID:* {}\n\
             *Payment ID:* {}\n\
             *Customer:* {}\n\
             *Phone:* {}\n\
             *City:* {}\n\
             *Address:* {}\n\
             \n\
             *Items:*\n{}\n\
             \n\
             *Total Amount:* ₹{}\n\
             *Payment:* ONLINE (RAZORPAY)\n\
             ---------------------------\n\
             _Please confirm my order and share delivery details._",
            self.order_id,
            self.payment_reference_label(),
            self.customer.name,
            self.customer.phone,
            self.customer.city,
            self.customer.address,
            self.items_summary(),
            self.grand_total,
        );

        let base = format!("https://wa.me/{}", seller_number.trim_start_matches('+'));
        Url::parse_with_params(&base, [("text", message.as_str())])
            .unwrap_or_else(|_| Url::parse("https://wa.me/").expect("static url"))
    }

    /// Delivery estimate for the confirmation screen
    pub fn delivery_estimate(&self) -> DeliveryEstimate {
        DeliveryEstimate::for_city(&self.customer.city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::simple_product;
    use crate::shipping::DeliveryEstimate;
    use crate::Cart;

    fn context() -> OrderContext {
        OrderContext {
            order_id: OrderId::from("AM-12345".to_string()),
            customer: CustomerDetails {
                name: "Ami Shah".to_string(),
                phone: "9876543210".to_string(),
                email: None,
                city: "Pune".to_string(),
                address: "12 Heritage Lane".to_string(),
            },
            lines: vec![LineSnapshot {
                name: "Amla Ginger".to_string(),
                weight: "250 G".to_string(),
                quantity: 2,
                unit_price: Amount::from(300),
                ingredients: vec!["Amla".to_string(), "Ginger".to_string()],
                personalized: false,
            }],
            total_weight_grams: 500,
            subtotal: Amount::from(600),
            shipping_fee: Amount::from(60),
            grand_total: Amount::from(660),
            payment_reference: Some("pay_123".to_string()),
        }
    }

    #[test]
    fn test_order_id_shape() {
        let id = OrderId::generate().to_string();
        let (prefix, suffix) = id.split_once('-').unwrap();
        assert_eq!(prefix, ORDER_ID_PREFIX);
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_items_summary() {
        let summary = context().items_summary();
        assert!(summary.starts_with("2x Amla Ginger (250 G)"));
        assert!(summary.contains("└ Choices: Amla, Ginger"));
    }

    #[test]
    fn test_snapshot_keeps_ingredient_notes_for_standard_lines() {
        let product = simple_product("m1", "Amla Ginger", 300);
        let mut cart = Cart::new();
        cart.add(&product, Some("250 G"), None).unwrap();

        let snapshot = LineSnapshot::from(&cart.lines()[0]);
        assert!(!snapshot.personalized);
        assert_eq!(snapshot.ingredients, vec!["Amla", "Ginger"]);

        let ctx = OrderContext {
            lines: vec![snapshot],
            ..context()
        };
        assert!(ctx
            .items_summary()
            .contains("1x Amla Ginger (250 G)\n   └ Choices: Amla, Ginger"));
    }

    #[test]
    fn test_messages_carry_totals_and_reference() {
        let ctx = context();

        let rich = ctx.notification_message();
        assert!(rich.contains("GRAND TOTAL: ₹660"));
        assert!(rich.contains("PAYMENT ID: pay_123"));

        let plain = ctx.fallback_message();
        assert!(plain.contains("TOTAL: Rs.660"));
        assert!(!plain.contains('🛍'));
    }

    #[test]
    fn test_whatsapp_url() {
        let url = context().whatsapp_url("+919157537842");
        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/919157537842");
        assert!(url.query().unwrap().starts_with("text="));
    }

    #[test]
    fn test_delivery_estimate_follows_city() {
        let mut ctx = context();
        assert_eq!(ctx.delivery_estimate(), DeliveryEstimate::ThreeToFiveDays);

        ctx.customer.city = "Ahmedabad".to_string();
        assert_eq!(ctx.delivery_estimate(), DeliveryEstimate::NextWorkingDay);
    }
}

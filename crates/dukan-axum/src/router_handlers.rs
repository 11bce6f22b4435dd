use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dukan::notification::{self, NotificationPayload};
use dukan::payment::{self, IntentRequest, PaymentIntent};
use dukan::Amount;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::StoreState;

/// Body of a payment intent request. The amount is in rupees; the
/// gateway converts to minor units.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: u64,
    pub currency: Option<String>,
    pub receipt: Option<String>,
}

/// Body of the post-payment notification request, mirroring the field
/// names the storefront sends.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyOrderRequest {
    pub order_id: String,
    pub name: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    #[serde(default)]
    pub email: Option<String>,
    pub items_summary: String,
    pub total_weight: u32,
    pub subtotal: u64,
    pub shipping_fee: u64,
    pub grand_total: u64,
    pub payment_id: String,
}

impl NotifyOrderRequest {
    fn payload(&self) -> NotificationPayload {
        let body = format!(
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
            self.name,
            self.phone,
            self.city,
            self.address,
            self.email.as_deref().unwrap_or("N/A"),
            self.total_weight,
            self.items_summary,
            self.subtotal,
            self.shipping_fee,
            self.grand_total,
            self.payment_id,
        );

        let fallback_body = format!(
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
            self.name,
            self.phone,
            self.city,
            self.address,
            self.items_summary,
            self.subtotal,
            self.shipping_fee,
            self.grand_total,
            self.payment_id,
        );

        NotificationPayload {
            title: format!("New Order: {} (Rs. {})", self.name, self.grand_total),
            body,
            fallback_body,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotifyOrderResponse {
    pub ok: bool,
    pub results: std::collections::BTreeMap<String, String>,
}

pub async fn post_create_order(
    State(state): State<StoreState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<PaymentIntent>, Response> {
    let request = IntentRequest {
        amount: Amount::from(payload.amount),
        currency: payload
            .currency
            .unwrap_or_else(|| payment::CURRENCY.to_string()),
        receipt: payload.receipt,
    };

    let intent = state.gateway.create_intent(request).await.map_err(|err| {
        tracing::error!("Could not create payment intent: {}", err);
        into_response(err)
    })?;

    Ok(Json(intent))
}

pub async fn post_notify_order(
    State(state): State<StoreState>,
    Json(payload): Json<NotifyOrderRequest>,
) -> Json<NotifyOrderResponse> {
    let results = notification::dispatch(&state.channels, &payload.payload()).await;

    for result in &results {
        tracing::info!(
            "Notification for {} via {}: {}",
            payload.order_id,
            result.channel,
            result.outcome
        );
    }

    Json(NotifyOrderResponse {
        ok: true,
        results: results
            .into_iter()
            .map(|result| (result.channel, result.outcome.to_string()))
            .collect(),
    })
}

fn into_response(err: payment::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

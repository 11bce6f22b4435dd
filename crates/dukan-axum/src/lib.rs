//! Axum server for the dukan checkout API
//!
//! Exposes the two endpoints the storefront calls at checkout: payment
//! intent creation and the post-payment seller notification fan-out.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use dukan::notification::NotificationChannel;
use dukan::payment::PaymentGateway;
use router_handlers::*;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod router_handlers;

/// Shared store state
#[derive(Clone)]
pub struct StoreState {
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    pub(crate) channels: Vec<Arc<dyn NotificationChannel>>,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("channels", &self.channels.len())
            .finish()
    }
}

/// Create the checkout [`Router`] over a payment gateway and a set of
/// notification channels
pub fn create_store_router(
    gateway: Arc<dyn PaymentGateway>,
    channels: Vec<Arc<dyn NotificationChannel>>,
) -> Router {
    let state = StoreState { gateway, channels };

    Router::new()
        .route("/api/create-order", post(post_create_order))
        .route("/api/notify-order", post(post_notify_order))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

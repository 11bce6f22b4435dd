//! Order submission pipeline.
//!
//! Drives one checkout attempt through its stages: create a payment
//! intent with the gateway, hand it to the payment sheet and wait for the
//! customer, then build the order record and notify the seller. Payment
//! failures abort the attempt back to idle; a dismissed payment sheet is
//! a clean abort; notification failures are recorded and never block the
//! customer from reaching success - by the time notifications run, the
//! customer has already paid.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::amount;
use crate::cart::Cart;
use crate::notification::{self, ChannelResult, NotificationChannel};
use crate::order::{CustomerDetails, OrderContext, OrderId};
use crate::payment::{self, CollectOutcome, IntentRequest, PaymentCollector, PaymentGateway};
use crate::shipping::ShippingContext;
use crate::util::unix_time;

/// Default time allowed for payment-intent creation; expiry counts as a
/// failed attempt
pub const DEFAULT_INTENT_TIMEOUT: Duration = Duration::from_secs(20);

/// Checkout Error
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing in the cart to submit
    #[error("Cart is empty")]
    EmptyCart,
    /// City has not validated, so no delivery fee exists yet
    #[error("Shipping fee has not been computed")]
    ShippingNotReady,
    /// Cart or catalog error
    #[error(transparent)]
    Cart(#[from] crate::error::Error),
    /// Payment Error
    #[error(transparent)]
    Payment(#[from] payment::Error),
    /// Amount Error
    #[error(transparent)]
    Amount(#[from] amount::Error),
}

/// Stage of the current checkout attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No attempt in flight; submit is enabled
    Idle,
    /// Waiting on the gateway to create the payment intent
    AwaitingPaymentIntent,
    /// Waiting on the customer in the payment sheet
    AwaitingPaymentConfirmation,
    /// Payment succeeded; recording the order and notifying the seller
    Submitting,
    /// Order complete
    Success,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::AwaitingPaymentIntent => "awaiting payment intent",
            Stage::AwaitingPaymentConfirmation => "awaiting payment confirmation",
            Stage::Submitting => "submitting",
            Stage::Success => "success",
        };
        write!(f, "{label}")
    }
}

/// A completed order with its notification outcomes
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// The order, payment reference set
    pub order: OrderContext,
    /// Per-channel notification outcomes, for observability only
    pub notifications: Vec<ChannelResult>,
}

/// How one submission attempt ended
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Payment collected and order recorded
    Completed(Box<PlacedOrder>),
    /// Customer dismissed the payment sheet; submit is enabled again
    Dismissed,
}

/// Orchestrates checkout attempts against the external payment and
/// notification collaborators
pub struct OrderPipeline {
    gateway: Arc<dyn PaymentGateway>,
    collector: Arc<dyn PaymentCollector>,
    channels: Vec<Arc<dyn NotificationChannel>>,
    intent_timeout: Duration,
    stage: RwLock<Stage>,
    dismiss: Mutex<CancellationToken>,
}

impl std::fmt::Debug for OrderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPipeline")
            .field("channels", &self.channels.len())
            .field("intent_timeout", &self.intent_timeout)
            .finish()
    }
}

impl OrderPipeline {
    /// New pipeline over a gateway, a payment sheet and a set of
    /// notification channels
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        collector: Arc<dyn PaymentCollector>,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> Self {
        OrderPipeline {
            gateway,
            collector,
            channels,
            intent_timeout: DEFAULT_INTENT_TIMEOUT,
            stage: RwLock::new(Stage::Idle),
            dismiss: Mutex::new(CancellationToken::new()),
        }
    }

    /// Override the payment-intent timeout
    pub fn with_intent_timeout(mut self, intent_timeout: Duration) -> Self {
        self.intent_timeout = intent_timeout;
        self
    }

    /// Stage of the current attempt
    pub async fn stage(&self) -> Stage {
        *self.stage.read().await
    }

    async fn set_stage(&self, stage: Stage) {
        tracing::debug!("Checkout stage: {}", stage);
        *self.stage.write().await = stage;
    }

    /// Dismiss the in-flight payment confirmation, returning the pipeline
    /// cleanly to idle. Safe to call at any time.
    pub async fn dismiss(&self) {
        self.dismiss.lock().await.cancel();
    }

    /// Run one checkout attempt to completion.
    ///
    /// The caller supplies a validated cart, the customer details out of
    /// a successful form submission, and a shipping context whose fee has
    /// been computed. On any payment failure the pipeline returns to idle
    /// with no partial state retained.
    pub async fn submit(
        &self,
        cart: &Cart,
        customer: CustomerDetails,
        shipping: &ShippingContext,
    ) -> Result<SubmitOutcome, Error> {
        if cart.is_empty() {
            return Err(Error::EmptyCart);
        }
        let shipping_fee = shipping.fee.ok_or(Error::ShippingNotReady)?;

        let subtotal = cart.subtotal()?;
        let grand_total = subtotal
            .checked_add(shipping_fee)
            .ok_or(amount::Error::AmountOverflow)?;

        let order_id = OrderId::generate();
        tracing::info!(
            "Submitting order {} for {} ({} items, total ₹{})",
            order_id,
            customer.name,
            cart.count(),
            grand_total
        );

        // fresh dismiss signal for this attempt
        let dismiss = CancellationToken::new();
        *self.dismiss.lock().await = dismiss.clone();

        self.set_stage(Stage::AwaitingPaymentIntent).await;

        let receipt = format!("order_rcptid_{}", unix_time());
        let request = IntentRequest::new(grand_total, Some(receipt));

        let intent = match timeout(self.intent_timeout, self.gateway.create_intent(request)).await
        {
            Err(_) => {
                tracing::error!("Payment intent creation timed out for {}", order_id);
                self.set_stage(Stage::Idle).await;
                return Err(payment::Error::Timeout.into());
            }
            Ok(Err(err)) => {
                tracing::error!("Payment intent creation failed for {}: {}", order_id, err);
                self.set_stage(Stage::Idle).await;
                return Err(err.into());
            }
            Ok(Ok(intent)) => intent,
        };

        self.set_stage(Stage::AwaitingPaymentConfirmation).await;

        // the customer may take arbitrarily long in the payment sheet;
        // only the dismiss signal ends the wait early
        let outcome = tokio::select! {
            _ = dismiss.cancelled() => {
                tracing::info!("Payment sheet dismissed for {}", order_id);
                self.set_stage(Stage::Idle).await;
                return Ok(SubmitOutcome::Dismissed);
            }
            collected = self.collector.collect(&intent, &customer) => match collected {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!("Payment confirmation failed for {}: {}", order_id, err);
                    self.set_stage(Stage::Idle).await;
                    return Err(err.into());
                }
            }
        };

        let reference = match outcome {
            CollectOutcome::Paid { reference } => reference,
            CollectOutcome::Dismissed => {
                tracing::info!("Payment sheet dismissed for {}", order_id);
                self.set_stage(Stage::Idle).await;
                return Ok(SubmitOutcome::Dismissed);
            }
        };

        self.set_stage(Stage::Submitting).await;

        let order = OrderContext {
            order_id,
            customer,
            lines: cart.lines().iter().map(Into::into).collect(),
            total_weight_grams: shipping.total_weight_grams,
            subtotal,
            shipping_fee,
            grand_total,
            payment_reference: Some(reference),
        };

        // the customer has paid; from here nothing is allowed to fail the
        // order, only to degrade observability
        let notifications = notification::dispatch(&self.channels, &order.notification_payload())
            .await;

        for result in &notifications {
            tracing::info!(
                "Order {} notification via {}: {}",
                order.order_id,
                result.channel,
                result.outcome
            );
        }

        self.set_stage(Stage::Success).await;

        Ok(SubmitOutcome::Completed(Box::new(PlacedOrder {
            order,
            notifications,
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::tests::simple_product;
    use crate::notification::{ChannelOutcome, Error as NotifyError, NotificationChannel};
    use crate::payment::PaymentIntent;
    use crate::shipping::compute_shipping;
    use crate::Amount;

    struct FakeGateway {
        fail: bool,
        delay: Option<Duration>,
        charged: AtomicUsize,
    }

    impl FakeGateway {
        fn ok() -> Self {
            FakeGateway {
                fail: false,
                delay: None,
                charged: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            FakeGateway {
                fail: true,
                delay: None,
                charged: AtomicUsize::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            FakeGateway {
                fail: false,
                delay: Some(delay),
                charged: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, payment::Error> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(payment::Error::Provider("upstream 500".to_string()));
            }

            self.charged
                .store(request.amount.to_paise() as usize, Ordering::SeqCst);

            Ok(PaymentIntent {
                id: "order_test".to_string(),
                amount_minor: request.amount.to_paise(),
                currency: request.currency,
            })
        }
    }

    struct FakeCollector {
        outcome: CollectOutcome,
    }

    #[async_trait]
    impl PaymentCollector for FakeCollector {
        async fn collect(
            &self,
            _intent: &PaymentIntent,
            _prefill: &CustomerDetails,
        ) -> Result<CollectOutcome, payment::Error> {
            Ok(self.outcome.clone())
        }
    }

    struct HangingCollector;

    #[async_trait]
    impl PaymentCollector for HangingCollector {
        async fn collect(
            &self,
            _intent: &PaymentIntent,
            _prefill: &CustomerDetails,
        ) -> Result<CollectOutcome, payment::Error> {
            futures::future::pending().await
        }
    }

    struct DeadChannel;

    #[async_trait]
    impl NotificationChannel for DeadChannel {
        fn name(&self) -> &str {
            "ntfy"
        }

        async fn send(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Channel("503".to_string()))
        }
    }

    fn cart_with(quantity: i64) -> Cart {
        let product = simple_product("m1", "Amla Ginger", 300);
        let mut cart = Cart::new();
        let id = cart.add(&product, Some("250 G"), None).unwrap();
        if quantity > 1 {
            cart.set_quantity_delta(id, quantity - 1).unwrap();
        }
        cart
    }

    fn customer(city: &str) -> CustomerDetails {
        CustomerDetails {
            name: "Ami Shah".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            city: city.to_string(),
            address: "12 Heritage Lane".to_string(),
        }
    }

    fn pipeline_with(
        gateway: Arc<FakeGateway>,
        collector: Arc<dyn PaymentCollector>,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> OrderPipeline {
        OrderPipeline::new(gateway, collector, channels)
    }

    #[tokio::test]
    async fn test_home_city_order_completes_with_free_delivery() {
        let gateway = Arc::new(FakeGateway::ok());
        let pipeline = pipeline_with(
            gateway.clone(),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Paid {
                    reference: "pay_1".to_string(),
                },
            }),
            vec![],
        );

        let cart = cart_with(2);
        let shipping = compute_shipping(cart.lines(), "Ahmedabad");

        let outcome = pipeline
            .submit(&cart, customer("Ahmedabad"), &shipping)
            .await
            .unwrap();

        let placed = match outcome {
            SubmitOutcome::Completed(placed) => placed,
            SubmitOutcome::Dismissed => panic!("expected completion"),
        };

        assert_eq!(placed.order.subtotal, Amount::from(600));
        assert_eq!(placed.order.shipping_fee, Amount::ZERO);
        assert_eq!(placed.order.grand_total, Amount::from(600));
        assert_eq!(placed.order.payment_reference.as_deref(), Some("pay_1"));
        // the gateway was charged in paise
        assert_eq!(gateway.charged.load(Ordering::SeqCst), 60_000);
        assert_eq!(pipeline.stage().await, Stage::Success);
    }

    #[tokio::test]
    async fn test_out_of_town_order_adds_tiered_fee() {
        let gateway = Arc::new(FakeGateway::ok());
        let pipeline = pipeline_with(
            gateway.clone(),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Paid {
                    reference: "pay_2".to_string(),
                },
            }),
            vec![],
        );

        let cart = cart_with(2);
        let shipping = compute_shipping(cart.lines(), "Pune");
        assert_eq!(shipping.total_weight_grams, 500);

        let outcome = pipeline
            .submit(&cart, customer("Pune"), &shipping)
            .await
            .unwrap();

        match outcome {
            SubmitOutcome::Completed(placed) => {
                assert_eq!(placed.order.grand_total, Amount::from(660));
                assert_eq!(gateway.charged.load(Ordering::SeqCst), 66_000);
            }
            SubmitOutcome::Dismissed => panic!("expected completion"),
        }
    }

    #[tokio::test]
    async fn test_intent_failure_returns_to_idle() {
        let pipeline = pipeline_with(
            Arc::new(FakeGateway::failing()),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Dismissed,
            }),
            vec![],
        );

        let cart = cart_with(1);
        let shipping = compute_shipping(cart.lines(), "Pune");

        let result = pipeline.submit(&cart, customer("Pune"), &shipping).await;

        assert!(matches!(
            result,
            Err(Error::Payment(payment::Error::Provider(_)))
        ));
        assert_eq!(pipeline.stage().await, Stage::Idle);
    }

    #[tokio::test]
    async fn test_intent_timeout_is_a_failure() {
        let pipeline = pipeline_with(
            Arc::new(FakeGateway::slow(Duration::from_secs(60))),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Dismissed,
            }),
            vec![],
        )
        .with_intent_timeout(Duration::from_millis(20));

        let cart = cart_with(1);
        let shipping = compute_shipping(cart.lines(), "Pune");

        let result = pipeline.submit(&cart, customer("Pune"), &shipping).await;

        assert!(matches!(
            result,
            Err(Error::Payment(payment::Error::Timeout))
        ));
        assert_eq!(pipeline.stage().await, Stage::Idle);
    }

    #[tokio::test]
    async fn test_sheet_dismissal_is_a_clean_abort() {
        let pipeline = pipeline_with(
            Arc::new(FakeGateway::ok()),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Dismissed,
            }),
            vec![],
        );

        let cart = cart_with(1);
        let shipping = compute_shipping(cart.lines(), "Pune");

        let outcome = pipeline
            .submit(&cart, customer("Pune"), &shipping)
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Dismissed));
        assert_eq!(pipeline.stage().await, Stage::Idle);
    }

    #[tokio::test]
    async fn test_dismiss_signal_cancels_unbounded_wait() {
        let pipeline = Arc::new(pipeline_with(
            Arc::new(FakeGateway::ok()),
            Arc::new(HangingCollector),
            vec![],
        ));

        let cart = cart_with(1);
        let shipping = compute_shipping(cart.lines(), "Pune");

        let submit = {
            let pipeline = Arc::clone(&pipeline);
            let shipping = shipping.clone();
            tokio::spawn(async move {
                pipeline.submit(&cart, customer("Pune"), &shipping).await
            })
        };

        // let the attempt reach the confirmation wait, then dismiss it
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pipeline.stage().await, Stage::AwaitingPaymentConfirmation);
        pipeline.dismiss().await;

        let outcome = submit.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Dismissed));
        assert_eq!(pipeline.stage().await, Stage::Idle);
    }

    #[tokio::test]
    async fn test_notification_failure_never_blocks_success() {
        let pipeline = pipeline_with(
            Arc::new(FakeGateway::ok()),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Paid {
                    reference: "pay_3".to_string(),
                },
            }),
            vec![Arc::new(DeadChannel)],
        );

        let cart = cart_with(1);
        let shipping = compute_shipping(cart.lines(), "Pune");

        let outcome = pipeline
            .submit(&cart, customer("Pune"), &shipping)
            .await
            .unwrap();

        match outcome {
            SubmitOutcome::Completed(placed) => {
                assert!(matches!(
                    placed.notifications[0].outcome,
                    ChannelOutcome::Failed(_)
                ));
                assert!(placed.order.payment_reference.is_some());
            }
            SubmitOutcome::Dismissed => panic!("expected completion"),
        }
        assert_eq!(pipeline.stage().await, Stage::Success);
    }

    #[tokio::test]
    async fn test_guards() {
        let pipeline = pipeline_with(
            Arc::new(FakeGateway::ok()),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Dismissed,
            }),
            vec![],
        );

        let empty = Cart::new();
        let shipping = compute_shipping(empty.lines(), "Pune");
        assert!(matches!(
            pipeline.submit(&empty, customer("Pune"), &shipping).await,
            Err(Error::EmptyCart)
        ));

        let cart = cart_with(1);
        // invalid city, fee not computable
        let shipping = compute_shipping(cart.lines(), "");
        assert!(matches!(
            pipeline.submit(&cart, customer("Pune"), &shipping).await,
            Err(Error::ShippingNotReady)
        ));
    }

    #[tokio::test]
    async fn test_subtotal_overflow_surfaces_as_cart_error() {
        let pipeline = pipeline_with(
            Arc::new(FakeGateway::ok()),
            Arc::new(FakeCollector {
                outcome: CollectOutcome::Dismissed,
            }),
            vec![],
        );

        let mut product = simple_product("m1", "Amla Ginger", 300);
        product.base_price = Amount::from(u64::MAX);
        product.pricing = crate::catalog::Pricing::default();

        let mut cart = Cart::new();
        let id = cart.add(&product, None, None).unwrap();
        cart.set_quantity_delta(id, 1).unwrap();
        let shipping = compute_shipping(cart.lines(), "Pune");

        assert!(matches!(
            pipeline.submit(&cart, customer("Pune"), &shipping).await,
            Err(Error::Cart(_))
        ));
        assert_eq!(pipeline.stage().await, Stage::Idle);
    }
}

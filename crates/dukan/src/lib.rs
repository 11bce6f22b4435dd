//! Dukan storefront checkout core.
//!
//! This crate holds the shared types and the order flow used across the
//! dukan crates: the product catalog model and price resolver, the
//! session-scoped cart ledger, the weight-tiered shipping calculator, the
//! delivery-details form validator, and the order submission pipeline that
//! drives the external payment gateway and seller notification channels.
//!
//! Presentation, the product catalog contents and the hosted payment sheet
//! are external collaborators; the traits in [`payment`] and
//! [`notification`] are the boundaries to them.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod amount;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod form;
pub mod notification;
pub mod order;
pub mod payment;
pub mod pipeline;
pub mod shipping;
pub mod util;

pub use self::amount::Amount;
pub use self::cart::{Cart, CartLine};
pub use self::catalog::{Category, Pricing, Product};
pub use self::error::Error;
pub use self::form::CheckoutForm;
pub use self::order::{CustomerDetails, OrderContext, OrderId};
pub use self::pipeline::OrderPipeline;
pub use self::shipping::ShippingContext;

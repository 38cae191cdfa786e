//! Checkout payments through a hosted payment-intent provider.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    to_minor_units, CreatedPaymentIntent, OrderId, OrderRecord, OrderRepository, PaymentGateway,
    PaymentIntentRequest, PaymentRequest,
};
pub use router::payments_router;
pub use service::PaymentService;

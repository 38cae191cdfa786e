use std::sync::Arc;

use tracing::info;

use super::domain::{
    to_minor_units, CreatedPaymentIntent, OrderId, OrderRepository, PaymentGateway,
    PaymentIntentRequest, PaymentRequest,
};
use crate::error::AppError;
use crate::http::required;
use crate::repository::RepositoryError;

pub struct PaymentService<O> {
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<O>,
    currency: String,
    max_amount: f64,
}

impl<O> PaymentService<O>
where
    O: OrderRepository + 'static,
{
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<O>,
        currency: impl Into<String>,
        max_amount: f64,
    ) -> Self {
        Self {
            gateway,
            orders,
            currency: currency.into(),
            max_amount,
        }
    }

    pub fn validate(&self, request: PaymentRequest) -> Result<PaymentIntentRequest, AppError> {
        let order_id = required("orderId", request.order_id.as_deref())?;
        let amount = request
            .amount
            .ok_or_else(|| AppError::validation("amount is required"))?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::validation("amount must be a positive number"));
        }
        if amount > self.max_amount {
            return Err(AppError::validation(format!(
                "amount exceeds the maximum of {:.2}",
                self.max_amount
            )));
        }
        let amount_minor = to_minor_units(amount);
        if amount_minor < 1 {
            return Err(AppError::validation("amount must be at least 0.01"));
        }

        Ok(PaymentIntentRequest {
            amount_minor,
            currency: self.currency.clone(),
            order_id: OrderId(order_id.to_string()),
        })
    }

    /// Create an intent for an existing order and remember its id on the order.
    pub async fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<CreatedPaymentIntent, AppError> {
        if self.orders.fetch(&request.order_id)?.is_none() {
            return Err(RepositoryError::NotFound(format!("order {}", request.order_id.0)).into());
        }

        let intent = self.gateway.create_intent(&request).await?;
        self.orders
            .attach_payment_intent(&request.order_id, &intent.payment_intent_id)?;

        info!(
            order_id = %request.order_id.0,
            payment_intent_id = %intent.payment_intent_id,
            amount_minor = request.amount_minor,
            currency = %request.currency,
            "payment intent created"
        );
        Ok(intent)
    }
}

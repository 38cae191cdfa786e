use std::sync::Arc;

use serde::Deserialize;

use super::dispatcher::EmailDispatcher;
use super::domain::SendOutcome;
use super::templates;
use crate::error::AppError;
use crate::http::required;
use crate::listing::{SubmissionId, SubmissionRepository};
use crate::payments::{OrderId, OrderRecord, OrderRepository};
use crate::repository::RepositoryError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmailRequest {
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEmailRequest {
    #[serde(default)]
    pub submission_id: Option<String>,
}

/// Looks up orders and submissions and renders the matching email.
pub struct EmailNotificationService {
    dispatcher: EmailDispatcher,
    orders: Arc<dyn OrderRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    currency: String,
}

impl EmailNotificationService {
    pub fn new(
        dispatcher: EmailDispatcher,
        orders: Arc<dyn OrderRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            orders,
            submissions,
            currency: currency.into(),
        }
    }

    fn order(&self, request: OrderEmailRequest) -> Result<OrderRecord, AppError> {
        let order_id = OrderId(required("orderId", request.order_id.as_deref())?.to_string());
        let order = self
            .orders
            .fetch(&order_id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("order {}", order_id.0)))?;
        Ok(order)
    }

    pub async fn order_confirmation(
        &self,
        request: OrderEmailRequest,
    ) -> Result<SendOutcome, AppError> {
        let order = self.order(request)?;
        self.dispatcher
            .send(templates::order_confirmation(&order, &self.currency))
            .await
    }

    pub async fn seller_notification(
        &self,
        request: OrderEmailRequest,
    ) -> Result<SendOutcome, AppError> {
        let order = self.order(request)?;
        self.dispatcher
            .send(templates::seller_notification(&order, &self.currency))
            .await
    }

    pub async fn listing_status(
        &self,
        request: ListingEmailRequest,
    ) -> Result<SendOutcome, AppError> {
        let id = SubmissionId(
            required("submissionId", request.submission_id.as_deref())?.to_string(),
        );
        let record = self
            .submissions
            .fetch(&id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("submission {}", id.0)))?;
        let to = record
            .submitter_email
            .clone()
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("email address for submission {}", id.0))
            })?;

        self.dispatcher
            .send(templates::listing_status(&record, &to))
            .await
    }
}

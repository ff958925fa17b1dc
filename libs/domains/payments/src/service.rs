use std::sync::Arc;
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};
use crate::models::{CreatePayment, NewPayment, Payment, PaymentDetails, UpdatePayment};
use crate::repository::PaymentRepository;

/// Service layer for payment methods. Every operation takes the caller so
/// that customers only reach their own methods.
#[derive(Clone)]
pub struct PaymentService<R: PaymentRepository> {
    repository: Arc<R>,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_payment(
        &self,
        input: CreatePayment,
        caller_id: Uuid,
        caller_is_admin: bool,
    ) -> PaymentResult<Payment> {
        if !caller_is_admin && input.user_id != Some(caller_id) {
            return Err(PaymentError::CreateForbidden);
        }
        let (Some(option), Some(user_id)) = (input.payment_option, input.user_id) else {
            return Err(PaymentError::MissingOption);
        };

        let details = PaymentDetails::for_option(option, input.fields)?;
        self.repository
            .create(NewPayment { user_id, details })
            .await
    }

    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        caller_id: Uuid,
        caller_is_admin: bool,
    ) -> PaymentResult<Vec<Payment>> {
        if !caller_is_admin && user_id != caller_id {
            return Err(PaymentError::ListForbidden);
        }
        self.repository.list_by_user(user_id).await
    }

    pub async fn update_payment(
        &self,
        id: Uuid,
        input: UpdatePayment,
        caller_id: Uuid,
        caller_is_admin: bool,
    ) -> PaymentResult<Payment> {
        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(PaymentError::NotFound)?;
        if !caller_is_admin && existing.user_id != caller_id {
            return Err(PaymentError::UpdateForbidden);
        }

        let option = input.payment_option.unwrap_or(existing.payment_option);

        // The option's own fields must come with the request; the rest stay.
        let replaced = PaymentDetails::for_option(option, input.fields)?;
        let details = PaymentDetails {
            payment_option: option,
            iban: replaced.iban.or(existing.iban),
            credit_card_number: replaced.credit_card_number.or(existing.credit_card_number),
            expiry_date: replaced.expiry_date.or(existing.expiry_date),
            cvc: replaced.cvc.or(existing.cvc),
            paypal_email: replaced.paypal_email.or(existing.paypal_email),
        };

        self.repository.update(id, details).await
    }

    pub async fn delete_payment(
        &self,
        id: Uuid,
        caller_id: Uuid,
        caller_is_admin: bool,
    ) -> PaymentResult<()> {
        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(PaymentError::NotFound)?;
        if !caller_is_admin && existing.user_id != caller_id {
            return Err(PaymentError::DeleteForbidden);
        }

        if !self.repository.delete(id).await? {
            return Err(PaymentError::NotFound);
        }

        tracing::info!(payment_id = %id, "Deleted payment");
        Ok(())
    }
}

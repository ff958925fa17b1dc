use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};
use crate::models::{NewPayment, Payment, PaymentDetails};

/// Repository trait for stored payment methods. Order snapshots are never
/// returned or modified.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: NewPayment) -> PaymentResult<Payment>;

    async fn get_by_id(&self, id: Uuid) -> PaymentResult<Option<Payment>>;

    /// Methods of a user, oldest first
    async fn list_by_user(&self, user_id: Uuid) -> PaymentResult<Vec<Payment>>;

    async fn update(&self, id: Uuid, details: PaymentDetails) -> PaymentResult<Payment>;

    async fn delete(&self, id: Uuid) -> PaymentResult<bool>;
}

/// In-memory implementation of PaymentRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an order snapshot; used to check it stays hidden
    pub async fn insert_snapshot(&self, details: PaymentDetails, user_id: Uuid, order_id: Uuid) -> Payment {
        let mut payment = payment_from(NewPayment { user_id, details });
        payment.is_for_order = true;
        payment.order_id = Some(order_id);
        self.payments
            .write()
            .await
            .insert(payment.id, payment.clone());
        payment
    }
}

fn payment_from(input: NewPayment) -> Payment {
    let now = Utc::now();
    let details = input.details;
    Payment {
        id: Uuid::now_v7(),
        payment_option: details.payment_option,
        iban: details.iban,
        credit_card_number: details.credit_card_number,
        expiry_date: details.expiry_date,
        cvc: details.cvc,
        paypal_email: details.paypal_email,
        is_for_order: false,
        user_id: input.user_id,
        order_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create(&self, input: NewPayment) -> PaymentResult<Payment> {
        let payment = payment_from(input);
        self.payments
            .write()
            .await
            .insert(payment.id, payment.clone());

        tracing::info!(payment_id = %payment.id, user_id = %payment.user_id, "Created payment");
        Ok(payment)
    }

    async fn get_by_id(&self, id: Uuid) -> PaymentResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).filter(|p| !p.is_for_order).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> PaymentResult<Vec<Payment>> {
        let payments = self.payments.read().await;
        let mut found: Vec<Payment> = payments
            .values()
            .filter(|p| p.user_id == user_id && !p.is_for_order)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn update(&self, id: Uuid, details: PaymentDetails) -> PaymentResult<Payment> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(&id)
            .filter(|p| !p.is_for_order)
            .ok_or(PaymentError::NotFound)?;

        payment.payment_option = details.payment_option;
        payment.iban = details.iban;
        payment.credit_card_number = details.credit_card_number;
        payment.expiry_date = details.expiry_date;
        payment.cvc = details.cvc;
        payment.paypal_email = details.paypal_email;
        payment.updated_at = Utc::now();

        Ok(payment.clone())
    }

    async fn delete(&self, id: Uuid) -> PaymentResult<bool> {
        let mut payments = self.payments.write().await;
        if payments.get(&id).is_none_or(|p| p.is_for_order) {
            return Ok(false);
        }
        payments.remove(&id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentOption;

    fn paypal(email: &str) -> PaymentDetails {
        PaymentDetails {
            payment_option: PaymentOption::Paypal,
            iban: None,
            credit_card_number: None,
            expiry_date: None,
            cvc: None,
            paypal_email: Some(email.to_string()),
        }
    }

    #[tokio::test]
    async fn test_snapshots_are_invisible() {
        let repo = InMemoryPaymentRepository::new();
        let user_id = Uuid::now_v7();

        let stored = repo
            .create(NewPayment {
                user_id,
                details: paypal("anna@example.com"),
            })
            .await
            .unwrap();
        let snapshot = repo
            .insert_snapshot(paypal("anna@example.com"), user_id, Uuid::now_v7())
            .await;

        let listed = repo.list_by_user(user_id).await.unwrap();
        assert_eq!(listed, vec![stored]);

        assert!(repo.get_by_id(snapshot.id).await.unwrap().is_none());
        assert!(!repo.delete(snapshot.id).await.unwrap());
        assert!(matches!(
            repo.update(snapshot.id, paypal("other@example.com")).await,
            Err(PaymentError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryPaymentRepository::new();
        let payment = repo
            .create(NewPayment {
                user_id: Uuid::now_v7(),
                details: paypal("anna@example.com"),
            })
            .await
            .unwrap();

        let updated = repo
            .update(payment.id, paypal("new@example.com"))
            .await
            .unwrap();
        assert_eq!(updated.paypal_email.as_deref(), Some("new@example.com"));

        assert!(repo.delete(payment.id).await.unwrap());
        assert!(!repo.delete(payment.id).await.unwrap());
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{PaymentError, PaymentResult};

fn digits(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

fn validate_card_number(value: &str) -> Result<(), ValidationError> {
    if !digits(value, 13, 19) {
        return Err(ValidationError::new("invalid_card_number"));
    }
    Ok(())
}

fn validate_cvc(value: &str) -> Result<(), ValidationError> {
    if !digits(value, 3, 4) {
        return Err(ValidationError::new("invalid_cvc"));
    }
    Ok(())
}

/// Supported payment methods
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_option")]
pub enum PaymentOption {
    #[sea_orm(string_value = "credit card")]
    #[serde(rename = "credit card")]
    #[strum(serialize = "credit card")]
    CreditCard,
    #[sea_orm(string_value = "bank transfer")]
    #[serde(rename = "bank transfer")]
    #[strum(serialize = "bank transfer")]
    BankTransfer,
    #[sea_orm(string_value = "paypal")]
    #[serde(rename = "paypal")]
    #[strum(serialize = "paypal")]
    Paypal,
}

/// A payment method, either stored by a customer or snapshotted for an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub payment_option: PaymentOption,
    pub iban: Option<String>,
    pub credit_card_number: Option<String>,
    /// `YYYY-MM-DD`
    pub expiry_date: Option<NaiveDate>,
    pub cvc: Option<String>,
    pub paypal_email: Option<String>,
    /// Snapshot owned by an order
    pub is_for_order: bool,
    pub user_id: Uuid,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn details(&self) -> PaymentDetails {
        PaymentDetails {
            payment_option: self.payment_option,
            iban: self.iban.clone(),
            credit_card_number: self.credit_card_number.clone(),
            expiry_date: self.expiry_date,
            cvc: self.cvc.clone(),
            paypal_email: self.paypal_email.clone(),
        }
    }
}

/// Method specific fields as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFields {
    #[validate(length(min = 15, max = 34))]
    pub iban: Option<String>,
    #[validate(custom(function = "validate_card_number"))]
    pub credit_card_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_cvc"))]
    pub cvc: Option<String>,
    #[validate(email, length(max = 100))]
    pub paypal_email: Option<String>,
}

/// The payment option with exactly the fields it uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub payment_option: PaymentOption,
    pub iban: Option<String>,
    pub credit_card_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub cvc: Option<String>,
    pub paypal_email: Option<String>,
}

impl PaymentDetails {
    /// Keep the fields `option` uses and clear the others
    pub fn only(option: PaymentOption, fields: PaymentFields) -> Self {
        let mut details = PaymentDetails {
            payment_option: option,
            iban: None,
            credit_card_number: None,
            expiry_date: None,
            cvc: None,
            paypal_email: None,
        };

        match option {
            PaymentOption::BankTransfer => details.iban = fields.iban,
            PaymentOption::CreditCard => {
                details.credit_card_number = fields.credit_card_number;
                details.expiry_date = fields.expiry_date;
                details.cvc = fields.cvc;
            }
            PaymentOption::Paypal => details.paypal_email = fields.paypal_email,
        }

        details
    }

    /// Like [`PaymentDetails::only`], failing when a field the option
    /// requires is missing
    pub fn for_option(option: PaymentOption, fields: PaymentFields) -> PaymentResult<Self> {
        let details = Self::only(option, fields);

        match option {
            PaymentOption::BankTransfer if details.iban.is_none() => {
                Err(PaymentError::MissingIban)
            }
            PaymentOption::CreditCard
                if details.credit_card_number.is_none()
                    || details.expiry_date.is_none()
                    || details.cvc.is_none() =>
            {
                Err(PaymentError::MissingCardDetails)
            }
            PaymentOption::Paypal if details.paypal_email.is_none() => {
                Err(PaymentError::MissingPaypalEmail)
            }
            _ => Ok(details),
        }
    }
}

/// Store a payment method for a user
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    pub payment_option: Option<PaymentOption>,
    /// Owner of the method; `user` is accepted as well
    #[serde(alias = "user")]
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: PaymentFields,
}

/// Change a stored payment method. Fields of the (new) option replace the
/// stored ones; fields of other options are kept.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayment {
    pub payment_option: Option<PaymentOption>,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: PaymentFields,
}

/// Row to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub details: PaymentDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn card_fields() -> PaymentFields {
        PaymentFields {
            iban: Some("DE89370400440532013000".to_string()),
            credit_card_number: Some("4111111111111111".to_string()),
            expiry_date: NaiveDate::from_ymd_opt(2027, 12, 31),
            cvc: Some("123".to_string()),
            paypal_email: None,
        }
    }

    #[test]
    fn test_payment_option_wire_names() {
        assert_eq!(
            serde_json::to_value(PaymentOption::BankTransfer).unwrap(),
            "bank transfer"
        );
        assert_eq!(
            PaymentOption::from_str("credit card").unwrap(),
            PaymentOption::CreditCard
        );
        assert!(PaymentOption::from_str("cash").is_err());
    }

    #[test]
    fn test_for_option_keeps_only_its_fields() {
        let details = PaymentDetails::for_option(PaymentOption::CreditCard, card_fields()).unwrap();
        assert_eq!(details.iban, None);
        assert_eq!(details.cvc.as_deref(), Some("123"));
    }

    #[test]
    fn test_for_option_requirements() {
        let missing = PaymentDetails::for_option(PaymentOption::Paypal, card_fields());
        assert!(matches!(missing, Err(PaymentError::MissingPaypalEmail)));

        let missing = PaymentDetails::for_option(PaymentOption::BankTransfer, PaymentFields::default());
        assert!(matches!(missing, Err(PaymentError::MissingIban)));

        let mut fields = card_fields();
        fields.expiry_date = None;
        let missing = PaymentDetails::for_option(PaymentOption::CreditCard, fields);
        assert!(matches!(missing, Err(PaymentError::MissingCardDetails)));
    }

    #[test]
    fn test_field_validation() {
        assert!(card_fields().validate().is_ok());

        let fields = PaymentFields {
            credit_card_number: Some("4111-1111".to_string()),
            cvc: Some("12".to_string()),
            ..Default::default()
        };
        let errors = fields.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_create_payment_accepts_user_alias() {
        let id = Uuid::now_v7();
        let input: CreatePayment = serde_json::from_value(serde_json::json!({
            "paymentOption": "paypal",
            "user": id,
            "paypalEmail": "anna@example.com"
        }))
        .unwrap();

        assert_eq!(input.user_id, Some(id));
        assert_eq!(input.fields.paypal_email.as_deref(), Some("anna@example.com"));
    }
}

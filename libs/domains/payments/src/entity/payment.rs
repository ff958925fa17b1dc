use crate::models::{NewPayment, Payment, PaymentDetails, PaymentOption};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_option: PaymentOption,
    pub iban: Option<String>,
    pub credit_card_number: Option<String>,
    pub expiry_date: Option<Date>,
    pub cvc: Option<String>,
    pub paypal_email: Option<String>,
    pub is_for_order: bool,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            payment_option: model.payment_option,
            iban: model.iban,
            credit_card_number: model.credit_card_number,
            expiry_date: model.expiry_date,
            cvc: model.cvc,
            paypal_email: model.paypal_email,
            is_for_order: model.is_for_order,
            user_id: model.user_id,
            order_id: model.order_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewPayment> for ActiveModel {
    fn from(input: NewPayment) -> Self {
        let now = chrono::Utc::now();
        let mut active = ActiveModel {
            id: Set(Uuid::now_v7()),
            is_for_order: Set(false),
            user_id: Set(input.user_id),
            order_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        active.apply_details(input.details);
        active
    }
}

impl ActiveModel {
    /// Snapshot of `details` owned by `order_id`
    pub fn order_snapshot(details: PaymentDetails, user_id: Uuid, order_id: Uuid) -> Self {
        let mut active = ActiveModel::from(NewPayment { user_id, details });
        active.is_for_order = Set(true);
        active.order_id = Set(Some(order_id));
        active
    }

    /// Overwrite the option and every method field
    pub fn apply_details(&mut self, details: PaymentDetails) {
        self.payment_option = Set(details.payment_option);
        self.iban = Set(details.iban);
        self.credit_card_number = Set(details.credit_card_number);
        self.expiry_date = Set(details.expiry_date);
        self.cvc = Set(details.cvc);
        self.paypal_email = Set(details.paypal_email);
        self.updated_at = Set(chrono::Utc::now().into());
    }
}

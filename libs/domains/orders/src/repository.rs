use async_trait::async_trait;
use chrono::Utc;
use domain_catalog::{Product, price_to_cents};
use domain_payments::{Payment, PaymentDetails};
use domain_users::{Address, User};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entity::shipping::{DEFAULT_CARRIER, ESTIMATED_DELIVERY_DAYS};
use crate::error::OrderResult;
use crate::models::{
    Customer, DeliveryStatus, NewOrder, Order, OrderCustomer, OrderDetail, OrderLine,
    OrderPayment, OrderStatus, OrderSummary, Shipping, ShippingDetail, UpdateDeliveryAddress,
    UpdateShipping,
};
use crate::query::OrderQuery;

/// Repository trait for orders and the rows placed with them
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Price in cents of each listed product that is not deleted
    async fn live_product_prices(&self, ids: Vec<Uuid>) -> OrderResult<HashMap<Uuid, i64>>;

    async fn find_customer(&self, user_id: Uuid) -> OrderResult<Option<Customer>>;

    /// A stored (non snapshot) payment method of `user_id`
    async fn find_stored_payment(
        &self,
        payment_id: Uuid,
        user_id: Uuid,
    ) -> OrderResult<Option<PaymentDetails>>;

    /// Write address, order, shipping, payment snapshot and lines atomically
    async fn place_order(&self, order: NewOrder) -> OrderResult<Order>;

    /// One page of matching orders and the total number of matches
    async fn list(&self, query: OrderQuery) -> OrderResult<(Vec<OrderSummary>, u64)>;

    async fn get(&self, id: Uuid) -> OrderResult<Option<Order>>;

    /// Order with customer (including email), shipping, payment and lines
    async fn get_detail(&self, id: Uuid) -> OrderResult<Option<OrderDetail>>;

    /// Orders of a user with shipping, payment and lines, newest first
    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<OrderDetail>>;

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>>;

    /// Number of orders per status
    async fn status_counts(&self) -> OrderResult<Vec<(OrderStatus, u64)>>;

    async fn update_shipping(
        &self,
        order_id: Uuid,
        update: UpdateShipping,
    ) -> OrderResult<Option<Shipping>>;

    async fn update_delivery_address(
        &self,
        order_id: Uuid,
        update: UpdateDeliveryAddress,
    ) -> OrderResult<Option<Address>>;

    /// Replace the payment snapshot of an order
    async fn update_payment(
        &self,
        order_id: Uuid,
        details: PaymentDetails,
    ) -> OrderResult<Option<Payment>>;
}

#[derive(Debug, Clone)]
struct LineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Default)]
struct Store {
    products: HashMap<Uuid, Product>,
    users: HashMap<Uuid, User>,
    addresses: HashMap<Uuid, Address>,
    payments: HashMap<Uuid, Payment>,
    orders: HashMap<Uuid, Order>,
    shippings: HashMap<Uuid, Shipping>,
    lines: Vec<LineRow>,
}

impl Store {
    fn newest_first(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }

    fn snapshot_of(&self, order_id: Uuid) -> Option<&Payment> {
        self.payments
            .values()
            .find(|p| p.is_for_order && p.order_id == Some(order_id))
    }

    fn shipping_of(&self, order_id: Uuid) -> Option<&Shipping> {
        self.shippings.values().find(|s| s.order_id == order_id)
    }

    fn product_ids_of(&self, order_id: Uuid) -> Vec<Uuid> {
        self.lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .map(|l| l.product_id)
            .collect()
    }

    fn detail(&self, order: &Order, user: Option<OrderCustomer>) -> OrderDetail {
        let shipping = self.shipping_of(order.id).map(|s| {
            ShippingDetail::new(s.clone(), self.addresses.get(&s.address_id).cloned())
        });
        let order_products = self
            .lines
            .iter()
            .filter(|l| l.order_id == order.id)
            .map(|l| OrderLine {
                id: l.id,
                product_id: l.product_id,
                quantity: l.quantity,
                product: self.products.get(&l.product_id).cloned(),
            })
            .collect();

        OrderDetail {
            order: order.clone(),
            user,
            shipping,
            payment: self.snapshot_of(order.id).cloned().map(OrderPayment::from),
            order_products,
        }
    }
}

/// In-memory implementation of OrderRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_product(&self, product: Product) {
        self.store
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Add a user; `address` becomes the address on file
    pub async fn add_customer(&self, mut user: User, address: Option<Address>) {
        let mut store = self.store.write().await;
        user.address_id = address.as_ref().map(|a| a.id);
        if let Some(address) = address {
            store.addresses.insert(address.id, address);
        }
        store.users.insert(user.id, user);
    }

    pub async fn add_payment(&self, payment: Payment) {
        self.store
            .write()
            .await
            .payments
            .insert(payment.id, payment);
    }

    /// Set the creation time of an order, for ordering tests
    pub async fn backdate(&self, order_id: Uuid, created_at: chrono::DateTime<Utc>) {
        if let Some(order) = self.store.write().await.orders.get_mut(&order_id) {
            order.created_at = created_at;
            order.order_date = created_at;
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn live_product_prices(&self, ids: Vec<Uuid>) -> OrderResult<HashMap<Uuid, i64>> {
        let store = self.store.read().await;
        Ok(ids
            .into_iter()
            .filter_map(|id| store.products.get(&id))
            .filter(|p| !p.is_deleted)
            .map(|p| (p.id, price_to_cents(p.price)))
            .collect())
    }

    async fn find_customer(&self, user_id: Uuid) -> OrderResult<Option<Customer>> {
        let store = self.store.read().await;
        Ok(store.users.get(&user_id).map(|user| Customer {
            user: user.clone(),
            address: user
                .address_id
                .and_then(|id| store.addresses.get(&id))
                .cloned(),
        }))
    }

    async fn find_stored_payment(
        &self,
        payment_id: Uuid,
        user_id: Uuid,
    ) -> OrderResult<Option<PaymentDetails>> {
        let store = self.store.read().await;
        Ok(store
            .payments
            .get(&payment_id)
            .filter(|p| p.user_id == user_id && !p.is_for_order)
            .map(Payment::details))
    }

    async fn place_order(&self, input: NewOrder) -> OrderResult<Order> {
        let mut store = self.store.write().await;
        let now = Utc::now();

        let address = Address::from_input(Uuid::now_v7(), input.shipping_address);
        let order = Order {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            total_amount: domain_catalog::cents_to_price(input.total_amount_cents),
            order_date: now,
            order_status: OrderStatus::Open,
            created_at: now,
            updated_at: now,
        };
        let shipping = Shipping {
            id: Uuid::now_v7(),
            order_id: order.id,
            address_id: address.id,
            carrier: DEFAULT_CARRIER.to_string(),
            delivery_status: DeliveryStatus::NotShipped,
            estimated_delivery_date: now + chrono::Duration::days(ESTIMATED_DELIVERY_DAYS),
            shipping_date: Some(now),
        };
        let details = input.payment;
        let snapshot = Payment {
            id: Uuid::now_v7(),
            payment_option: details.payment_option,
            iban: details.iban,
            credit_card_number: details.credit_card_number,
            expiry_date: details.expiry_date,
            cvc: details.cvc,
            paypal_email: details.paypal_email,
            is_for_order: true,
            user_id: input.user_id,
            order_id: Some(order.id),
            created_at: now,
            updated_at: now,
        };

        store.addresses.insert(address.id, address);
        store.shippings.insert(shipping.id, shipping);
        store.payments.insert(snapshot.id, snapshot);
        for (product_id, quantity) in input.lines {
            store.lines.push(LineRow {
                id: Uuid::now_v7(),
                order_id: order.id,
                product_id,
                quantity,
            });
        }
        store.orders.insert(order.id, order.clone());

        tracing::info!(order_id = %order.id, user_id = %order.user_id, "Placed order");
        Ok(order)
    }

    async fn list(&self, query: OrderQuery) -> OrderResult<(Vec<OrderSummary>, u64)> {
        let store = self.store.read().await;

        let matching: Vec<OrderSummary> = store
            .newest_first()
            .into_iter()
            .filter_map(|order| {
                let user = store.users.get(&order.user_id).map(OrderCustomer::name_of);
                let product_ids = store.product_ids_of(order.id);
                query
                    .matches(order, user.as_ref(), &product_ids)
                    .then(|| OrderSummary {
                        order: order.clone(),
                        user,
                    })
            })
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn get(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.store.read().await.orders.get(&id).cloned())
    }

    async fn get_detail(&self, id: Uuid) -> OrderResult<Option<OrderDetail>> {
        let store = self.store.read().await;
        Ok(store.orders.get(&id).map(|order| {
            let user = store.users.get(&order.user_id).map(OrderCustomer::with_email);
            store.detail(order, user)
        }))
    }

    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<OrderDetail>> {
        let store = self.store.read().await;
        Ok(store
            .newest_first()
            .into_iter()
            .filter(|o| o.user_id == user_id)
            .map(|o| store.detail(o, None))
            .collect())
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>> {
        let mut store = self.store.write().await;
        Ok(store.orders.get_mut(&id).map(|order| {
            order.order_status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn status_counts(&self) -> OrderResult<Vec<(OrderStatus, u64)>> {
        let store = self.store.read().await;
        let mut counts: HashMap<OrderStatus, u64> = HashMap::new();
        for order in store.orders.values() {
            *counts.entry(order.order_status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn update_shipping(
        &self,
        order_id: Uuid,
        update: UpdateShipping,
    ) -> OrderResult<Option<Shipping>> {
        let mut store = self.store.write().await;
        let Some(shipping) = store.shippings.values_mut().find(|s| s.order_id == order_id) else {
            return Ok(None);
        };

        if let Some(carrier) = update.carrier {
            shipping.carrier = carrier;
        }
        if let Some(delivery_status) = update.delivery_status {
            shipping.delivery_status = delivery_status;
        }
        if let Some(estimated) = update.estimated_delivery_date {
            shipping.estimated_delivery_date = estimated;
        }
        if let Some(shipping_date) = update.shipping_date {
            shipping.shipping_date = Some(shipping_date);
        }

        Ok(Some(shipping.clone()))
    }

    async fn update_delivery_address(
        &self,
        order_id: Uuid,
        update: UpdateDeliveryAddress,
    ) -> OrderResult<Option<Address>> {
        let mut store = self.store.write().await;
        let Some(address_id) = store.shipping_of(order_id).map(|s| s.address_id) else {
            return Ok(None);
        };
        let Some(current) = store.addresses.get(&address_id) else {
            return Ok(None);
        };

        let address = Address::from_input(address_id, update.apply(current));
        store.addresses.insert(address_id, address.clone());
        Ok(Some(address))
    }

    async fn update_payment(
        &self,
        order_id: Uuid,
        details: PaymentDetails,
    ) -> OrderResult<Option<Payment>> {
        let mut store = self.store.write().await;
        let Some(payment) = store
            .payments
            .values_mut()
            .find(|p| p.is_for_order && p.order_id == Some(order_id))
        else {
            return Ok(None);
        };

        payment.payment_option = details.payment_option;
        payment.iban = details.iban;
        payment.credit_card_number = details.credit_card_number;
        payment.expiry_date = details.expiry_date;
        payment.cvc = details.cvc;
        payment.paypal_email = details.paypal_email;
        payment.updated_at = Utc::now();

        Ok(Some(payment.clone()))
    }
}

/// Distinct ids in first-seen order
pub(crate) fn distinct(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_payments::PaymentOption;
    use domain_users::AddressInput;

    fn product(name: &str, price: f64, is_deleted: bool) -> Product {
        Product {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: String::new(),
            price,
            image: None,
            quantity: 10,
            is_deleted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(first: &str, last: &str) -> User {
        User {
            id: Uuid::now_v7(),
            email_address: format!("{}@example.com", first.to_lowercase()),
            password_hash: "hash".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            is_admin: false,
            address_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn address_input(city: &str) -> AddressInput {
        AddressInput {
            country: "Germany".to_string(),
            state: String::new(),
            city: city.to_string(),
            postal_code: "10115".to_string(),
            street: "Chausseestraße".to_string(),
            house_number: "12".to_string(),
            address_addition: String::new(),
        }
    }

    fn paypal() -> PaymentDetails {
        PaymentDetails {
            payment_option: PaymentOption::Paypal,
            iban: None,
            credit_card_number: None,
            expiry_date: None,
            cvc: None,
            paypal_email: Some("anna@example.com".to_string()),
        }
    }

    fn new_order(user_id: Uuid, lines: Vec<(Uuid, i32)>) -> NewOrder {
        NewOrder {
            user_id,
            total_amount_cents: 1700,
            shipping_address: address_input("Berlin"),
            payment: paypal(),
            lines,
        }
    }

    #[tokio::test]
    async fn test_live_prices_skip_deleted_and_unknown() {
        let repo = InMemoryOrderRepository::new();
        let sencha = product("Sencha", 8.5, false);
        let gone = product("Gone", 3.0, true);
        repo.add_product(sencha.clone()).await;
        repo.add_product(gone.clone()).await;

        let prices = repo
            .live_product_prices(vec![sencha.id, gone.id, Uuid::now_v7()])
            .await
            .unwrap();

        assert_eq!(prices.len(), 1);
        assert_eq!(prices[&sencha.id], 850);
    }

    #[tokio::test]
    async fn test_place_order_writes_everything() {
        let repo = InMemoryOrderRepository::new();
        let anna = user("Anna", "Schmidt");
        let sencha = product("Sencha", 8.5, false);
        repo.add_customer(anna.clone(), None).await;
        repo.add_product(sencha.clone()).await;

        let order = repo
            .place_order(new_order(anna.id, vec![(sencha.id, 2)]))
            .await
            .unwrap();
        assert_eq!(order.order_status, OrderStatus::Open);
        assert_eq!(order.total_amount, 17.0);

        let detail = repo.get_detail(order.id).await.unwrap().unwrap();
        let shipping = detail.shipping.unwrap();
        assert_eq!(shipping.carrier, "Default Carrier");
        assert_eq!(shipping.delivery_status, DeliveryStatus::NotShipped);
        assert_eq!(shipping.address.unwrap().city, "Berlin");
        assert_eq!(
            detail.payment.unwrap().paypal_email.as_deref(),
            Some("anna@example.com")
        );
        assert_eq!(detail.order_products.len(), 1);
        assert_eq!(detail.order_products[0].product.as_ref().unwrap().name, "Sencha");
        assert_eq!(
            detail.user.unwrap().email_address.as_deref(),
            Some("anna@example.com")
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_not_a_stored_payment() {
        let repo = InMemoryOrderRepository::new();
        let anna = user("Anna", "Schmidt");
        repo.add_customer(anna.clone(), None).await;

        let order = repo.place_order(new_order(anna.id, vec![])).await.unwrap();
        let snapshot_id = {
            let store = repo.store.read().await;
            store.snapshot_of(order.id).unwrap().id
        };

        assert!(
            repo.find_stored_payment(snapshot_id, anna.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_pages_newest_first() {
        let repo = InMemoryOrderRepository::new();
        let anna = user("Anna", "Schmidt");
        let ben = user("Ben", "Meyer");
        let sencha = product("Sencha", 8.5, false);
        repo.add_customer(anna.clone(), None).await;
        repo.add_customer(ben.clone(), None).await;

        let first = repo
            .place_order(new_order(anna.id, vec![(sencha.id, 1)]))
            .await
            .unwrap();
        let second = repo.place_order(new_order(ben.id, vec![])).await.unwrap();
        let third = repo.place_order(new_order(anna.id, vec![])).await.unwrap();
        repo.backdate(first.id, Utc::now() - chrono::Duration::days(2))
            .await;
        repo.backdate(second.id, Utc::now() - chrono::Duration::days(1))
            .await;

        let all = OrderQuery {
            limit: 2,
            ..Default::default()
        };
        let (page, total) = repo.list(all).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|o| o.order.id).collect::<Vec<_>>(),
            vec![third.id, second.id]
        );
        assert_eq!(page[1].user.as_ref().unwrap().first_name, "Ben");
        assert!(page[1].user.as_ref().unwrap().email_address.is_none());

        let by_product = OrderQuery {
            product_id: Some(sencha.id),
            limit: 10,
            ..Default::default()
        };
        let (page, total) = repo.list(by_product).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].order.id, first.id);

        let by_name = OrderQuery {
            user_name: Some("anna schmidt".to_string()),
            limit: 10,
            ..Default::default()
        };
        assert_eq!(repo.list(by_name).await.unwrap().1, 2);
    }

    #[tokio::test]
    async fn test_status_counts_and_updates() {
        let repo = InMemoryOrderRepository::new();
        let anna = user("Anna", "Schmidt");
        repo.add_customer(anna.clone(), None).await;
        let order = repo.place_order(new_order(anna.id, vec![])).await.unwrap();
        repo.place_order(new_order(anna.id, vec![])).await.unwrap();

        let updated = repo
            .set_status(order.id, OrderStatus::Successful)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.order_status, OrderStatus::Successful);
        assert!(
            repo.set_status(Uuid::now_v7(), OrderStatus::Failed)
                .await
                .unwrap()
                .is_none()
        );

        let mut counts = repo.status_counts().await.unwrap();
        counts.sort_by_key(|(status, _)| status.to_string());
        assert_eq!(
            counts,
            vec![(OrderStatus::Open, 1), (OrderStatus::Successful, 1)]
        );
    }

    #[tokio::test]
    async fn test_partial_shipping_and_address_updates() {
        let repo = InMemoryOrderRepository::new();
        let anna = user("Anna", "Schmidt");
        repo.add_customer(anna.clone(), None).await;
        let order = repo.place_order(new_order(anna.id, vec![])).await.unwrap();

        let shipping = repo
            .update_shipping(
                order.id,
                UpdateShipping {
                    delivery_status: Some(DeliveryStatus::Shipped),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(shipping.delivery_status, DeliveryStatus::Shipped);
        assert_eq!(shipping.carrier, "Default Carrier");

        let address = repo
            .update_delivery_address(
                order.id,
                UpdateDeliveryAddress {
                    city: Some("Potsdam".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(address.city, "Potsdam");
        assert_eq!(address.postal_code, "10115");

        assert!(
            repo.update_shipping(Uuid::now_v7(), UpdateShipping::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(distinct([a, b, a]), vec![a, b]);
    }
}

use chrono::NaiveDate;
use common::{OrderId, ProductId, UserId};
use domain::Order;

/// Criteria for selecting orders.
///
/// Each backend evaluates these natively; [`OrderFilter::matches`] is the
/// reference semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    /// Every order.
    #[default]
    All,
    /// The order with this id.
    OrderId(OrderId),
    /// Orders owned by this user.
    UserId(UserId),
    /// Orders with at least one line for this product.
    ProductId(ProductId),
    /// Orders placed on this calendar day (UTC).
    OrderDate(NaiveDate),
}

impl OrderFilter {
    /// Returns true if the order satisfies this filter.
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All => true,
            OrderFilter::OrderId(id) => order.order_id() == *id,
            OrderFilter::UserId(id) => order.user_id() == *id,
            OrderFilter::ProductId(id) => order.items().iter().any(|i| i.product_id == *id),
            OrderFilter::OrderDate(date) => order.order_date().date_naive() == *date,
        }
    }
}

//! Explicit mapping between requests, the aggregate, and response views.
//!
//! Each function copies a fixed set of fields. Derived values (line totals, the
//! bill) are never copied from a request; they come from [`Order::new`].

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};

use crate::error::{FieldViolation, ValidationError};
use crate::external::{Product, User};

use super::{
    Order, OrderAddRequest, OrderError, OrderItem, OrderItemRequest, OrderItemResponse,
    OrderResponse, OrderUpdateRequest, Validate,
};

impl From<OrderError> for ValidationError {
    fn from(err: OrderError) -> Self {
        let field = match err {
            OrderError::NoItems => "order_items",
            OrderError::InvalidQuantity { .. } => "quantity",
            OrderError::InvalidPrice { .. } => "unit_price",
            OrderError::TotalOutOfRange => "order_items",
        };
        ValidationError::new(vec![FieldViolation::new(field, err.to_string())])
    }
}

/// Validates an add request and builds an unsaved order (nil ids) with derived totals.
pub fn order_from_add_request(request: &OrderAddRequest) -> Result<Order, ValidationError> {
    request.validate()?;
    build_order(
        OrderId::nil(),
        request.user_id,
        request.order_date,
        &request.order_items,
    )
}

/// Validates an update request and builds the replacement aggregate with derived totals.
pub fn order_from_update_request(request: &OrderUpdateRequest) -> Result<Order, ValidationError> {
    request.validate()?;
    build_order(
        request.order_id.unwrap_or_else(OrderId::nil),
        request.user_id,
        request.order_date,
        &request.order_items,
    )
}

fn build_order(
    order_id: OrderId,
    user_id: Option<UserId>,
    order_date: Option<DateTime<Utc>>,
    items: &[OrderItemRequest],
) -> Result<Order, ValidationError> {
    let (Some(user_id), Some(order_date)) = (user_id, order_date) else {
        return Err(ValidationError::new(vec![FieldViolation::new(
            "order",
            "Order is incomplete",
        )]));
    };
    let lines = items
        .iter()
        .map(order_item_from_request)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Order::new(order_id, user_id, order_date, lines)?)
}

fn order_item_from_request(request: &OrderItemRequest) -> Result<OrderItem, ValidationError> {
    request.validate()?;
    match (request.product_id, request.unit_price, request.quantity) {
        (Some(product_id), Some(unit_price), Some(quantity)) => {
            let quantity = u32::try_from(quantity).map_err(|_| {
                ValidationError::new(vec![FieldViolation::new("quantity", "Quantity is out of range")])
            })?;
            Ok(OrderItem::new(product_id, unit_price, quantity))
        }
        _ => Err(ValidationError::new(vec![FieldViolation::new(
            "order_items",
            "Order item is incomplete",
        )])),
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id(),
            user_id: order.user_id(),
            user_person_name: None,
            email: None,
            total_bill: order.total_bill(),
            order_date: order.order_date(),
            order_items: order.items().iter().map(OrderItemResponse::from).collect(),
        }
    }
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            unit_price: item.unit_price,
            quantity: item.quantity,
            total_price: item.total_price(),
            product_name: None,
            category: None,
        }
    }
}

/// Copies user display fields onto an order view.
///
/// Skips the merge when `user` carries a real id that belongs to someone else,
/// which can only happen if a batch response was keyed incorrectly. Placeholder
/// users with the nil id are always merged. Returns whether the merge happened.
pub fn merge_user(response: &mut OrderResponse, user: &User) -> bool {
    if !user.user_id.is_nil() && user.user_id != response.user_id {
        return false;
    }
    response.user_person_name = user.person_name.clone();
    response.email = user.email.clone();
    true
}

/// Copies product display fields onto a line view. Price and quantity stay as ordered.
pub fn merge_product(item: &mut OrderItemResponse, product: &Product) {
    item.product_name = product.product_name.clone();
    item.category = product.category.clone();
}

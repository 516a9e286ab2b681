//! Request validation as explicit rule tables.
//!
//! Each request type owns an ordered list of (field, message, predicate) rules.
//! Every rule is evaluated, including every rule of every line, so callers get
//! the complete list of violations in one round trip.

use crate::error::{FieldViolation, ValidationError};

use super::{OrderAddRequest, OrderItemRequest, OrderUpdateRequest};

/// A capability for checking request shape before any downstream call is made.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

struct Rule<T> {
    field: &'static str,
    message: &'static str,
    violated: fn(&T) -> bool,
}

const ORDER_ADD_RULES: &[Rule<OrderAddRequest>] = &[
    Rule {
        field: "user_id",
        message: "User ID can't be blank",
        violated: |r| r.user_id.is_none_or(|id| id.is_nil()),
    },
    Rule {
        field: "order_date",
        message: "Order Date can't be blank",
        violated: |r| r.order_date.is_none(),
    },
    Rule {
        field: "order_items",
        message: "Order Items can't be blank",
        violated: |r| r.order_items.is_empty(),
    },
];

const ORDER_UPDATE_RULES: &[Rule<OrderUpdateRequest>] = &[
    Rule {
        field: "order_id",
        message: "Order ID can't be blank",
        violated: |r| r.order_id.is_none_or(|id| id.is_nil()),
    },
    Rule {
        field: "user_id",
        message: "User ID can't be blank",
        violated: |r| r.user_id.is_none_or(|id| id.is_nil()),
    },
    Rule {
        field: "order_date",
        message: "Order Date can't be blank",
        violated: |r| r.order_date.is_none(),
    },
    Rule {
        field: "order_items",
        message: "Order Items can't be blank",
        violated: |r| r.order_items.is_empty(),
    },
];

const ORDER_ITEM_RULES: &[Rule<OrderItemRequest>] = &[
    Rule {
        field: "product_id",
        message: "Product ID can't be blank",
        violated: |i| i.product_id.is_none_or(|id| id.is_nil()),
    },
    Rule {
        field: "unit_price",
        message: "Unit Price can't be blank",
        violated: |i| i.unit_price.is_none(),
    },
    Rule {
        field: "unit_price",
        message: "Unit Price can't be less than or equal to zero",
        violated: |i| i.unit_price.is_some_and(|p| !p.is_positive()),
    },
    Rule {
        field: "quantity",
        message: "Quantity can't be blank",
        violated: |i| i.quantity.is_none(),
    },
    Rule {
        field: "quantity",
        message: "Quantity can't be less than or equal to zero",
        violated: |i| i.quantity.is_some_and(|q| q <= 0),
    },
    Rule {
        field: "quantity",
        message: "Quantity is too large",
        violated: |i| i.quantity.is_some_and(|q| q > i64::from(u32::MAX)),
    },
];

fn check<T>(rules: &[Rule<T>], target: &T, prefix: &str, out: &mut Vec<FieldViolation>) {
    for rule in rules {
        if (rule.violated)(target) {
            out.push(FieldViolation::new(format!("{prefix}{}", rule.field), rule.message));
        }
    }
}

fn check_items(items: &[OrderItemRequest], out: &mut Vec<FieldViolation>) {
    for (index, item) in items.iter().enumerate() {
        check(ORDER_ITEM_RULES, item, &format!("order_items[{index}]."), out);
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

impl Validate for OrderAddRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        check(ORDER_ADD_RULES, self, "", &mut violations);
        check_items(&self.order_items, &mut violations);
        finish(violations)
    }
}

impl Validate for OrderUpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        check(ORDER_UPDATE_RULES, self, "", &mut violations);
        check_items(&self.order_items, &mut violations);
        finish(violations)
    }
}

impl Validate for OrderItemRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        check(ORDER_ITEM_RULES, self, "", &mut violations);
        finish(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Money;
    use chrono::Utc;
    use common::{ProductId, UserId};

    #[test]
    fn valid_add_request_passes() {
        let request = OrderAddRequest::new(
            UserId::new(),
            Utc::now(),
            vec![OrderItemRequest::new(ProductId::new(), Money::from_cents(100), 1)],
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_add_request_reports_every_field() {
        let err = OrderAddRequest::default().validate().unwrap_err();

        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["user_id", "order_date", "order_items"]);
    }

    #[test]
    fn item_violations_are_collected_across_lines() {
        let request = OrderAddRequest::new(
            UserId::new(),
            Utc::now(),
            vec![
                OrderItemRequest {
                    product_id: None,
                    unit_price: Some(Money::from_cents(0)),
                    quantity: Some(1),
                },
                OrderItemRequest::new(ProductId::new(), Money::from_cents(100), 1),
                OrderItemRequest {
                    product_id: Some(ProductId::new()),
                    unit_price: Some(Money::from_cents(100)),
                    quantity: Some(-3),
                },
            ],
        );

        let err = request.validate().unwrap_err();
        let messages: Vec<_> = err.violations().iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "order_items[0].product_id: Product ID can't be blank",
                "order_items[0].unit_price: Unit Price can't be less than or equal to zero",
                "order_items[2].quantity: Quantity can't be less than or equal to zero",
            ]
        );
    }

    #[test]
    fn nil_user_id_counts_as_blank() {
        let request = OrderAddRequest {
            user_id: Some(UserId::nil()),
            order_date: Some(Utc::now()),
            order_items: vec![OrderItemRequest::new(ProductId::new(), Money::from_cents(1), 1)],
        };
        let err = request.validate().unwrap_err();
        assert!(err.has_field("user_id"));
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn update_request_requires_order_id() {
        let request = OrderUpdateRequest {
            order_id: None,
            user_id: Some(UserId::new()),
            order_date: Some(Utc::now()),
            order_items: vec![OrderItemRequest {
                product_id: Some(ProductId::new()),
                unit_price: None,
                quantity: None,
            }],
        };

        let err = request.validate().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["order_id", "order_items[0].unit_price", "order_items[0].quantity"]
        );
    }
}

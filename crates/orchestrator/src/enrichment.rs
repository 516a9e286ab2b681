//! Builds order views decorated with user and product display data.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use common::{ProductId, UserId};
use domain::{Order, OrderResponse, Product, User, mapping};

/// Lookup tables used to decorate order views.
#[derive(Debug, Default)]
pub struct Enrichment {
    users: HashMap<UserId, User>,
    products: HashMap<ProductId, Product>,
}

impl Enrichment {
    /// Tables keyed by each record's own id, as returned by batch lookups.
    pub fn from_lookups(users: Vec<User>, products: Vec<Product>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.user_id, u)).collect(),
            products: products.into_iter().map(|p| (p.product_id, p)).collect(),
        }
    }

    /// Tables for a single write, where the user came from a lookup of
    /// `requested` and may be a placeholder carrying the nil id.
    pub fn for_write(requested: UserId, user: User, products: Vec<Product>) -> Self {
        Self {
            users: HashMap::from([(requested, user)]),
            products: products.into_iter().map(|p| (p.product_id, p)).collect(),
        }
    }

    /// Builds the view for `order`. Entries missing from the tables leave
    /// the corresponding display fields empty.
    pub fn apply(&self, order: &Order) -> OrderResponse {
        let mut response = OrderResponse::from(order);

        if let Some(user) = self.users.get(&order.user_id())
            && !mapping::merge_user(&mut response, user)
        {
            tracing::warn!(
                order_id = %order.order_id(),
                expected = %order.user_id(),
                received = %user.user_id,
                "user lookup returned a different user, skipping merge"
            );
        }

        for item in &mut response.order_items {
            if let Some(product) = self.products.get(&item.product_id) {
                mapping::merge_product(item, product);
            }
        }
        response
    }
}

/// Distinct values in first-seen order.
pub fn distinct<T: Copy + Eq + Hash>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}

//! Shopify notification topics served by the receiver.
//!
//! Each topic has two spellings: the route segment used in
//! `/webhooks/shopify/{site_id}/{segment}` and the value Shopify sends in the
//! `X-Shopify-Topic` header.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    OrderCreate,
    OrderUpdated,
    OrderPaid,
    OrderCancelled,
    OrderFulfilled,
    OrderDelete,
    ProductCreate,
    ProductUpdate,
    ProductDelete,
    CartCreate,
    CartUpdate,
    CollectionCreate,
    CollectionUpdate,
    CollectionDelete,
    CustomerGroupCreate,
    CustomerGroupUpdate,
    CustomerGroupDelete,
    CheckoutCreate,
    CheckoutUpdate,
    CheckoutDelete,
    FulfillmentCreate,
    FulfillmentUpdate,
    CustomerCreate,
    CustomerEnable,
    CustomerDisable,
    CustomerUpdate,
    CustomerDelete,
    ShopUpdate,
    RefundCreate,
}

impl Topic {
    pub const ALL: [Topic; 29] = [
        Topic::OrderCreate,
        Topic::OrderUpdated,
        Topic::OrderPaid,
        Topic::OrderCancelled,
        Topic::OrderFulfilled,
        Topic::OrderDelete,
        Topic::ProductCreate,
        Topic::ProductUpdate,
        Topic::ProductDelete,
        Topic::CartCreate,
        Topic::CartUpdate,
        Topic::CollectionCreate,
        Topic::CollectionUpdate,
        Topic::CollectionDelete,
        Topic::CustomerGroupCreate,
        Topic::CustomerGroupUpdate,
        Topic::CustomerGroupDelete,
        Topic::CheckoutCreate,
        Topic::CheckoutUpdate,
        Topic::CheckoutDelete,
        Topic::FulfillmentCreate,
        Topic::FulfillmentUpdate,
        Topic::CustomerCreate,
        Topic::CustomerEnable,
        Topic::CustomerDisable,
        Topic::CustomerUpdate,
        Topic::CustomerDelete,
        Topic::ShopUpdate,
        Topic::RefundCreate,
    ];

    /// Last path segment of the webhook route.
    pub fn route_segment(self) -> &'static str {
        match self {
            Topic::OrderCreate => "order_create",
            Topic::OrderUpdated => "order_updated",
            Topic::OrderPaid => "order_paid",
            Topic::OrderCancelled => "order_cancelled",
            Topic::OrderFulfilled => "order_fulfilled",
            Topic::OrderDelete => "order_delete",
            Topic::ProductCreate => "product_create",
            Topic::ProductUpdate => "product_update",
            Topic::ProductDelete => "product_delete",
            Topic::CartCreate => "cart_create",
            Topic::CartUpdate => "cart_update",
            Topic::CollectionCreate => "collection_create",
            Topic::CollectionUpdate => "collection_update",
            Topic::CollectionDelete => "collection_delete",
            Topic::CustomerGroupCreate => "customer_group_create",
            Topic::CustomerGroupUpdate => "customer_group_update",
            Topic::CustomerGroupDelete => "customer_group_delete",
            Topic::CheckoutCreate => "checkout_create",
            Topic::CheckoutUpdate => "checkout_update",
            Topic::CheckoutDelete => "checkout_delete",
            Topic::FulfillmentCreate => "fulfillment_create",
            Topic::FulfillmentUpdate => "fulfillment_update",
            Topic::CustomerCreate => "customer_create",
            Topic::CustomerEnable => "customer_enable",
            Topic::CustomerDisable => "customer_disable",
            Topic::CustomerUpdate => "customer_update",
            Topic::CustomerDelete => "customer_delete",
            Topic::ShopUpdate => "shop_update",
            Topic::RefundCreate => "refund_create",
        }
    }

    /// Value of the `X-Shopify-Topic` header for this topic.
    pub fn header_value(self) -> &'static str {
        match self {
            Topic::OrderCreate => "orders/create",
            Topic::OrderUpdated => "orders/updated",
            Topic::OrderPaid => "orders/paid",
            Topic::OrderCancelled => "orders/cancelled",
            Topic::OrderFulfilled => "orders/fulfilled",
            Topic::OrderDelete => "orders/delete",
            Topic::ProductCreate => "products/create",
            Topic::ProductUpdate => "products/update",
            Topic::ProductDelete => "products/delete",
            Topic::CartCreate => "carts/create",
            Topic::CartUpdate => "carts/update",
            Topic::CollectionCreate => "collections/create",
            Topic::CollectionUpdate => "collections/update",
            Topic::CollectionDelete => "collections/delete",
            Topic::CustomerGroupCreate => "customer_groups/create",
            Topic::CustomerGroupUpdate => "customer_groups/update",
            Topic::CustomerGroupDelete => "customer_groups/delete",
            Topic::CheckoutCreate => "checkouts/create",
            Topic::CheckoutUpdate => "checkouts/update",
            Topic::CheckoutDelete => "checkouts/delete",
            Topic::FulfillmentCreate => "fulfillments/create",
            Topic::FulfillmentUpdate => "fulfillments/update",
            Topic::CustomerCreate => "customers/create",
            Topic::CustomerEnable => "customers/enable",
            Topic::CustomerDisable => "customers/disable",
            Topic::CustomerUpdate => "customers/update",
            Topic::CustomerDelete => "customers/delete",
            Topic::ShopUpdate => "shop/update",
            Topic::RefundCreate => "refunds/create",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_route_segments_are_unique() {
        let segments: HashSet<_> = Topic::ALL.iter().map(|t| t.route_segment()).collect();
        assert_eq!(segments.len(), Topic::ALL.len());
    }

    #[test]
    fn test_header_values_are_unique() {
        let headers: HashSet<_> = Topic::ALL.iter().map(|t| t.header_value()).collect();
        assert_eq!(headers.len(), Topic::ALL.len());
    }

    #[test]
    fn test_display_uses_header_value() {
        assert_eq!(Topic::CustomerUpdate.to_string(), "customers/update");
        assert_eq!(Topic::ShopUpdate.to_string(), "shop/update");
    }
}

//! Webhook payload types.
//!
//! Only the fields the receiver stores are declared; everything else in the
//! Shopify JSON is ignored. Every field is optional because Shopify's "send
//! test notification" button posts payloads full of nulls.

use serde::Deserialize;

/// Body of `customers/*` notifications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPayload {
    /// Shopify customer id, null for test notifications
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub accepts_marketing: Option<bool>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub created_at: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub last_order_id: Option<i64>,
    #[serde(default)]
    pub last_order_name: Option<String>,
    #[serde(default)]
    pub multipass_identifier: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub orders_count: Option<i64>,
    /// e.g. "disabled", "enabled", "invited"
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub tax_exempt: Option<bool>,
    /// Decimal amount as a string, e.g. "0.00"
    #[serde(default)]
    pub total_spent: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
    /// Comma separated tag names, e.g. "hello, world"
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub addresses: Option<Vec<AddressPayload>>,
}

/// One entry of a customer's `addresses` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub default: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub province_code: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body of `shop/update` notifications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopPayload {
    /// Shopify shop id, null for test notifications
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub shop_owner: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub province_code: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub primary_locale: Option<String>,
    #[serde(default)]
    pub primary_location_id: Option<i64>,
    /// Display name such as "(GMT+00:00) London"
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub iana_timezone: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub money_format: Option<String>,
    #[serde(default)]
    pub money_with_currency_format: Option<String>,
    #[serde(default)]
    pub money_in_emails_format: Option<String>,
    #[serde(default)]
    pub money_with_currency_in_emails_format: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub plan_display_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub google_apps_domain: Option<String>,
    #[serde(default)]
    pub google_apps_login_enabled: Option<bool>,
    #[serde(default)]
    pub taxes_included: Option<bool>,
    #[serde(default)]
    pub tax_shipping: Option<bool>,
    #[serde(default)]
    pub county_taxes: Option<bool>,
    #[serde(default)]
    pub has_storefront: Option<bool>,
    #[serde(default)]
    pub password_enabled: Option<bool>,
    #[serde(default)]
    pub eligible_for_payments: Option<bool>,
    #[serde(default)]
    pub requires_extra_payments_agreement: Option<bool>,
}

/// Split Shopify's tag string into distinct, trimmed names.
///
/// `"hello, world"` becomes `["hello", "world"]`; an empty string yields no
/// tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

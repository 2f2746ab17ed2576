//! Shop rows keyed by their Shopify id.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;

/// A stored shop. Flat settings bag, no relationships.
#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct Shop {
    pub id: i64,
    pub shopify_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub customer_email: Option<String>,
    pub shop_owner: Option<String>,
    pub domain: Option<String>,
    pub myshopify_domain: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub primary_locale: Option<String>,
    pub primary_location_id: Option<i64>,
    pub timezone: Option<String>,
    pub iana_timezone: Option<String>,
    pub currency: Option<String>,
    pub money_format: Option<String>,
    pub money_with_currency_format: Option<String>,
    pub money_in_emails_format: Option<String>,
    pub money_with_currency_in_emails_format: Option<String>,
    pub plan_name: Option<String>,
    pub plan_display_name: Option<String>,
    pub source: Option<String>,
    pub google_apps_domain: Option<String>,
    pub google_apps_login_enabled: Option<bool>,
    pub taxes_included: Option<bool>,
    pub tax_shipping: Option<bool>,
    pub county_taxes: Option<bool>,
    pub has_storefront: bool,
    pub password_enabled: bool,
    pub eligible_for_payments: bool,
    pub requires_extra_payments_agreement: bool,
}

pub async fn find_by_shopify_id(
    conn: &mut SqliteConnection,
    shopify_id: i64,
) -> Result<Option<Shop>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shops WHERE shopify_id = ?")
        .bind(shopify_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Insert or overwrite the shop row for `shop.shopify_id` and return its
/// surrogate id.
pub async fn save(conn: &mut SqliteConnection, shop: &Shop) -> Result<i64, sqlx::Error> {
    sqlx::query(
        "INSERT INTO shops (
            shopify_id, created_at, name, email, customer_email, shop_owner,
            domain, myshopify_domain, address1, city, province, province_code,
            zip, country, country_code, country_name, phone, latitude,
            longitude, primary_locale, primary_location_id, timezone,
            iana_timezone, currency, money_format, money_with_currency_format,
            money_in_emails_format, money_with_currency_in_emails_format,
            plan_name, plan_display_name, source, google_apps_domain,
            google_apps_login_enabled, taxes_included, tax_shipping,
            county_taxes, has_storefront, password_enabled,
            eligible_for_payments, requires_extra_payments_agreement
        ) VALUES (
            ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
        )
        ON CONFLICT (shopify_id) DO UPDATE SET
            created_at = excluded.created_at,
            name = excluded.name,
            email = excluded.email,
            customer_email = excluded.customer_email,
            shop_owner = excluded.shop_owner,
            domain = excluded.domain,
            myshopify_domain = excluded.myshopify_domain,
            address1 = excluded.address1,
            city = excluded.city,
            province = excluded.province,
            province_code = excluded.province_code,
            zip = excluded.zip,
            country = excluded.country,
            country_code = excluded.country_code,
            country_name = excluded.country_name,
            phone = excluded.phone,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            primary_locale = excluded.primary_locale,
            primary_location_id = excluded.primary_location_id,
            timezone = excluded.timezone,
            iana_timezone = excluded.iana_timezone,
            currency = excluded.currency,
            money_format = excluded.money_format,
            money_with_currency_format = excluded.money_with_currency_format,
            money_in_emails_format = excluded.money_in_emails_format,
            money_with_currency_in_emails_format = excluded.money_with_currency_in_emails_format,
            plan_name = excluded.plan_name,
            plan_display_name = excluded.plan_display_name,
            source = excluded.source,
            google_apps_domain = excluded.google_apps_domain,
            google_apps_login_enabled = excluded.google_apps_login_enabled,
            taxes_included = excluded.taxes_included,
            tax_shipping = excluded.tax_shipping,
            county_taxes = excluded.county_taxes,
            has_storefront = excluded.has_storefront,
            password_enabled = excluded.password_enabled,
            eligible_for_payments = excluded.eligible_for_payments,
            requires_extra_payments_agreement = excluded.requires_extra_payments_agreement",
    )
    .bind(shop.shopify_id)
    .bind(shop.created_at)
    .bind(&shop.name)
    .bind(&shop.email)
    .bind(&shop.customer_email)
    .bind(&shop.shop_owner)
    .bind(&shop.domain)
    .bind(&shop.myshopify_domain)
    .bind(&shop.address1)
    .bind(&shop.city)
    .bind(&shop.province)
    .bind(&shop.province_code)
    .bind(&shop.zip)
    .bind(&shop.country)
    .bind(&shop.country_code)
    .bind(&shop.country_name)
    .bind(&shop.phone)
    .bind(shop.latitude)
    .bind(shop.longitude)
    .bind(&shop.primary_locale)
    .bind(shop.primary_location_id)
    .bind(&shop.timezone)
    .bind(&shop.iana_timezone)
    .bind(&shop.currency)
    .bind(&shop.money_format)
    .bind(&shop.money_with_currency_format)
    .bind(&shop.money_in_emails_format)
    .bind(&shop.money_with_currency_in_emails_format)
    .bind(&shop.plan_name)
    .bind(&shop.plan_display_name)
    .bind(&shop.source)
    .bind(&shop.google_apps_domain)
    .bind(shop.google_apps_login_enabled)
    .bind(shop.taxes_included)
    .bind(shop.tax_shipping)
    .bind(shop.county_taxes)
    .bind(shop.has_storefront)
    .bind(shop.password_enabled)
    .bind(shop.eligible_for_payments)
    .bind(shop.requires_extra_payments_agreement)
    .execute(&mut *conn)
    .await?;

    sqlx::query_scalar("SELECT id FROM shops WHERE shopify_id = ?")
        .bind(shop.shopify_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM shops")
        .fetch_one(&mut *conn)
        .await
}

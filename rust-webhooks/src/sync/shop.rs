//! `shop/update` notifications.

use sqlx::sqlite::SqliteConnection;
use tracing::info;

use crate::store::{shops, Shop};
use crate::sync::payload::ShopPayload;
use crate::sync::{parse_timestamp, SyncError, SyncOutcome};

/// Store the shop's settings, creating the row on first sight.
pub async fn update(
    conn: &mut SqliteConnection,
    payload: &ShopPayload,
) -> Result<SyncOutcome, SyncError> {
    let Some(shopify_id) = payload.id else {
        info!("shopify_shop_test_notification");
        return Ok(SyncOutcome::TestNotification);
    };

    let existing = shops::find_by_shopify_id(conn, shopify_id).await?;
    let outcome = if existing.is_some() {
        SyncOutcome::Updated
    } else {
        SyncOutcome::Created
    };

    let mut shop = existing.unwrap_or_else(|| Shop {
        shopify_id,
        eligible_for_payments: true,
        ..Shop::default()
    });
    apply_fields(&mut shop, payload)?;
    shops::save(conn, &shop).await?;

    info!(shopify_id, outcome = outcome.as_str(), "shopify_shop_synced");

    Ok(outcome)
}

/// Nullable columns mirror the payload. The four non-null flags keep their
/// stored value when the payload omits them.
fn apply_fields(shop: &mut Shop, payload: &ShopPayload) -> Result<(), SyncError> {
    if let Some(created_at) = parse_timestamp("created_at", payload.created_at.as_deref())? {
        shop.created_at = Some(created_at);
    }

    shop.name = payload.name.clone();
    shop.email = payload.email.clone();
    shop.customer_email = payload.customer_email.clone();
    shop.shop_owner = payload.shop_owner.clone();
    shop.domain = payload.domain.clone();
    shop.myshopify_domain = payload.myshopify_domain.clone();
    shop.address1 = payload.address1.clone();
    shop.city = payload.city.clone();
    shop.province = payload.province.clone();
    shop.province_code = payload.province_code.clone();
    shop.zip = payload.zip.clone();
    shop.country = payload.country.clone();
    shop.country_code = payload.country_code.clone();
    shop.country_name = payload.country_name.clone();
    shop.phone = payload.phone.clone();
    shop.latitude = payload.latitude;
    shop.longitude = payload.longitude;
    shop.primary_locale = payload.primary_locale.clone();
    shop.primary_location_id = payload.primary_location_id;
    shop.timezone = payload.timezone.clone();
    shop.iana_timezone = payload.iana_timezone.clone();
    shop.currency = payload.currency.clone();
    shop.money_format = payload.money_format.clone();
    shop.money_with_currency_format = payload.money_with_currency_format.clone();
    shop.money_in_emails_format = payload.money_in_emails_format.clone();
    shop.money_with_currency_in_emails_format =
        payload.money_with_currency_in_emails_format.clone();
    shop.plan_name = payload.plan_name.clone();
    shop.plan_display_name = payload.plan_display_name.clone();
    shop.source = payload.source.clone();
    shop.google_apps_domain = payload.google_apps_domain.clone();
    shop.google_apps_login_enabled = payload.google_apps_login_enabled;
    shop.taxes_included = payload.taxes_included;
    shop.tax_shipping = payload.tax_shipping;
    shop.county_taxes = payload.county_taxes;

    if let Some(v) = payload.has_storefront {
        shop.has_storefront = v;
    }
    if let Some(v) = payload.password_enabled {
        shop.password_enabled = v;
    }
    if let Some(v) = payload.eligible_for_payments {
        shop.eligible_for_payments = v;
    }
    if let Some(v) = payload.requires_extra_payments_agreement {
        shop.requires_extra_payments_agreement = v;
    }

    Ok(())
}

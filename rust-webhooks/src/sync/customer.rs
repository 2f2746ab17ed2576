//! `customers/*` notifications.

use sqlx::sqlite::SqliteConnection;
use tracing::info;

use crate::config::DuplicatePolicy;
use crate::store::{addresses, customers, tags, Customer, CustomerAddress};
use crate::sync::payload::{split_tags, AddressPayload, CustomerPayload};
use crate::sync::{parse_decimal, parse_timestamp, SyncError, SyncOutcome};

/// `customers/create`: store a customer seen for the first time.
pub async fn create(
    conn: &mut SqliteConnection,
    payload: &CustomerPayload,
    policy: DuplicatePolicy,
) -> Result<SyncOutcome, SyncError> {
    let Some(shopify_id) = payload.id else {
        info!("shopify_customer_test_notification");
        return Ok(SyncOutcome::TestNotification);
    };

    match customers::find_by_shopify_id(conn, shopify_id).await? {
        Some(existing) => match policy {
            DuplicatePolicy::Ignore => {
                info!(shopify_id, "shopify_customer_duplicate_ignored");
                Ok(SyncOutcome::Duplicate)
            }
            DuplicatePolicy::Update => {
                write(conn, existing, payload).await?;
                info!(shopify_id, "shopify_customer_updated");
                Ok(SyncOutcome::Updated)
            }
        },
        None => {
            write(conn, Customer::new(shopify_id), payload).await?;
            info!(shopify_id, "shopify_customer_created");
            Ok(SyncOutcome::Created)
        }
    }
}

/// `customers/update` (also `enable` and `disable`): overwrite the stored
/// customer, creating it when it is not stored yet.
pub async fn update(
    conn: &mut SqliteConnection,
    payload: &CustomerPayload,
) -> Result<SyncOutcome, SyncError> {
    let Some(shopify_id) = payload.id else {
        info!("shopify_customer_test_notification");
        return Ok(SyncOutcome::TestNotification);
    };

    match customers::find_by_shopify_id(conn, shopify_id).await? {
        Some(existing) => {
            write(conn, existing, payload).await?;
            info!(shopify_id, "shopify_customer_updated");
            Ok(SyncOutcome::Updated)
        }
        None => {
            write(conn, Customer::new(shopify_id), payload).await?;
            info!(shopify_id, "shopify_customer_created");
            Ok(SyncOutcome::Created)
        }
    }
}

/// `customers/delete`: remove the customer if it is stored.
pub async fn delete(
    conn: &mut SqliteConnection,
    payload: &CustomerPayload,
) -> Result<SyncOutcome, SyncError> {
    let Some(shopify_id) = payload.id else {
        info!("shopify_customer_test_notification");
        return Ok(SyncOutcome::TestNotification);
    };

    if customers::delete_by_shopify_id(conn, shopify_id).await? {
        info!(shopify_id, "shopify_customer_deleted");
        Ok(SyncOutcome::Deleted)
    } else {
        info!(shopify_id, "shopify_customer_delete_absent");
        Ok(SyncOutcome::Absent)
    }
}

/// Copy the payload onto `customer`, save it, then sync its tags and
/// addresses.
async fn write(
    conn: &mut SqliteConnection,
    mut customer: Customer,
    payload: &CustomerPayload,
) -> Result<(), SyncError> {
    apply_fields(&mut customer, payload)?;
    let customer_id = customers::save(conn, &customer).await?;

    if let Some(raw) = payload.tags.as_deref() {
        let names = split_tags(raw);
        tags::replace_for_customer(conn, customer_id, &names).await?;
    }

    if let Some(entries) = payload.addresses.as_deref() {
        let mut address_ids = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(address) = address_from_payload(entry) {
                address_ids.push(addresses::save(conn, &address).await?);
            }
        }
        addresses::replace_for_customer(conn, customer_id, &address_ids).await?;
    }

    Ok(())
}

/// Copy the allow-listed scalar fields.
///
/// Non-nullable columns keep their value when the payload carries null;
/// nullable columns mirror the payload.
fn apply_fields(customer: &mut Customer, payload: &CustomerPayload) -> Result<(), SyncError> {
    if let Some(v) = payload.accepts_marketing {
        customer.accepts_marketing = v;
    }
    if let Some(v) = &payload.email {
        customer.email = v.clone();
    }
    if let Some(v) = &payload.first_name {
        customer.first_name = v.clone();
    }
    if let Some(v) = &payload.last_name {
        customer.last_name = v.clone();
    }
    if let Some(v) = &payload.note {
        customer.note = v.clone();
    }
    if let Some(v) = payload.orders_count {
        customer.orders_count = v;
    }
    if let Some(v) = &payload.state {
        customer.state = v.clone();
    }
    if let Some(v) = payload.tax_exempt {
        customer.tax_exempt = v;
    }
    if let Some(v) = payload.verified_email {
        customer.verified_email = v;
    }
    customer.last_order_id = payload.last_order_id;
    customer.last_order_name = payload.last_order_name.clone();
    customer.multipass_identifier = payload.multipass_identifier.clone();

    if let Some(created_at) = parse_timestamp("created_at", payload.created_at.as_deref())? {
        customer.created_at = Some(created_at);
    }
    if let Some(updated_at) = parse_timestamp("updated_at", payload.updated_at.as_deref())? {
        customer.updated_at = Some(updated_at);
    }
    if let Some(raw) = payload.total_spent.as_deref() {
        customer.total_spent = parse_decimal("total_spent", raw)?;
    }

    Ok(())
}

fn address_from_payload(entry: &AddressPayload) -> Option<CustomerAddress> {
    let shopify_id = entry.id?;
    Some(CustomerAddress {
        id: 0,
        shopify_id,
        is_default: entry.default.unwrap_or(false),
        name: entry.name.clone(),
        first_name: entry.first_name.clone(),
        last_name: entry.last_name.clone(),
        company: entry.company.clone(),
        address1: entry.address1.clone(),
        address2: entry.address2.clone(),
        city: entry.city.clone(),
        country: entry.country.clone(),
        country_code: entry.country_code.clone(),
        country_name: entry.country_name.clone(),
        province: entry.province.clone(),
        province_code: entry.province_code.clone(),
        zip: entry.zip.clone(),
        phone: entry.phone.clone(),
    })
}

//! Customer addresses keyed by their Shopify id.

use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Default, FromRow)]
pub struct CustomerAddress {
    pub id: i64,
    pub shopify_id: i64,
    pub is_default: bool,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

/// Insert or overwrite the address for `address.shopify_id` and return its
/// surrogate id.
pub async fn save(
    conn: &mut SqliteConnection,
    address: &CustomerAddress,
) -> Result<i64, sqlx::Error> {
    sqlx::query(
        "INSERT INTO customer_addresses (
            shopify_id, is_default, name, first_name, last_name, company,
            address1, address2, city, country, country_code, country_name,
            province, province_code, zip, phone
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (shopify_id) DO UPDATE SET
            is_default = excluded.is_default,
            name = excluded.name,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            company = excluded.company,
            address1 = excluded.address1,
            address2 = excluded.address2,
            city = excluded.city,
            country = excluded.country,
            country_code = excluded.country_code,
            country_name = excluded.country_name,
            province = excluded.province,
            province_code = excluded.province_code,
            zip = excluded.zip,
            phone = excluded.phone",
    )
    .bind(address.shopify_id)
    .bind(address.is_default)
    .bind(&address.name)
    .bind(&address.first_name)
    .bind(&address.last_name)
    .bind(&address.company)
    .bind(&address.address1)
    .bind(&address.address2)
    .bind(&address.city)
    .bind(&address.country)
    .bind(&address.country_code)
    .bind(&address.country_name)
    .bind(&address.province)
    .bind(&address.province_code)
    .bind(&address.zip)
    .bind(&address.phone)
    .execute(&mut *conn)
    .await?;

    sqlx::query_scalar("SELECT id FROM customer_addresses WHERE shopify_id = ?")
        .bind(address.shopify_id)
        .fetch_one(&mut *conn)
        .await
}

/// Link exactly `address_ids` to the customer. Addresses that lose their
/// last link are deleted.
pub async fn replace_for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
    address_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM customers_addresses WHERE customer_id = ?")
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;

    for &address_id in address_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO customers_addresses (customer_id, address_id) VALUES (?, ?)",
        )
        .bind(customer_id)
        .bind(address_id)
        .execute(&mut *conn)
        .await?;
    }

    delete_unlinked(conn).await?;

    Ok(())
}

/// Delete every address no customer links to any more.
pub async fn delete_unlinked(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM customer_addresses
         WHERE id NOT IN (SELECT address_id FROM customers_addresses)",
    )
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customer_addresses")
        .fetch_one(&mut *conn)
        .await
}

pub async fn for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> Result<Vec<CustomerAddress>, sqlx::Error> {
    sqlx::query_as(
        "SELECT a.* FROM customer_addresses a
         JOIN customers_addresses ca ON ca.address_id = a.id
         WHERE ca.customer_id = ?
         ORDER BY a.shopify_id",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await
}

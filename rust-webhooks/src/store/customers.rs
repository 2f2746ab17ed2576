//! Customer rows keyed by their Shopify id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{FromRow, Row};

use crate::store::addresses;

/// A stored customer.
///
/// `id` is the local surrogate key; it is `0` for a customer that has not
/// been saved yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    pub id: i64,
    pub shopify_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub email: String,
    pub verified_email: bool,
    pub first_name: String,
    pub last_name: String,
    pub note: String,
    pub last_order_id: Option<i64>,
    pub last_order_name: Option<String>,
    pub orders_count: i64,
    pub total_spent: Decimal,
    pub state: String,
    pub tax_exempt: bool,
    pub accepts_marketing: bool,
    pub multipass_identifier: Option<String>,
}

impl Customer {
    pub fn new(shopify_id: i64) -> Self {
        Self {
            shopify_id,
            ..Default::default()
        }
    }
}

// `total_spent` is stored as text so the decimal survives SQLite untouched.
impl<'r> FromRow<'r, SqliteRow> for Customer {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let total_spent: String = row.try_get("total_spent")?;
        let total_spent = total_spent
            .parse::<Decimal>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "total_spent".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            shopify_id: row.try_get("shopify_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            email: row.try_get("email")?,
            verified_email: row.try_get("verified_email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            note: row.try_get("note")?,
            last_order_id: row.try_get("last_order_id")?,
            last_order_name: row.try_get("last_order_name")?,
            orders_count: row.try_get("orders_count")?,
            total_spent,
            state: row.try_get("state")?,
            tax_exempt: row.try_get("tax_exempt")?,
            accepts_marketing: row.try_get("accepts_marketing")?,
            multipass_identifier: row.try_get("multipass_identifier")?,
        })
    }
}

pub async fn find_by_shopify_id(
    conn: &mut SqliteConnection,
    shopify_id: i64,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customers WHERE shopify_id = ?")
        .bind(shopify_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Insert or overwrite the customer row for `customer.shopify_id` and return
/// its surrogate id.
pub async fn save(conn: &mut SqliteConnection, customer: &Customer) -> Result<i64, sqlx::Error> {
    sqlx::query(
        "INSERT INTO customers (
            shopify_id, created_at, updated_at, email, verified_email,
            first_name, last_name, note, last_order_id, last_order_name,
            orders_count, total_spent, state, tax_exempt, accepts_marketing,
            multipass_identifier
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (shopify_id) DO UPDATE SET
            created_at = excluded.created_at,
            updated_at = excluded.updated_at,
            email = excluded.email,
            verified_email = excluded.verified_email,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            note = excluded.note,
            last_order_id = excluded.last_order_id,
            last_order_name = excluded.last_order_name,
            orders_count = excluded.orders_count,
            total_spent = excluded.total_spent,
            state = excluded.state,
            tax_exempt = excluded.tax_exempt,
            accepts_marketing = excluded.accepts_marketing,
            multipass_identifier = excluded.multipass_identifier",
    )
    .bind(customer.shopify_id)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .bind(&customer.email)
    .bind(customer.verified_email)
    .bind(&customer.first_name)
    .bind(&customer.last_name)
    .bind(&customer.note)
    .bind(customer.last_order_id)
    .bind(&customer.last_order_name)
    .bind(customer.orders_count)
    .bind(customer.total_spent.to_string())
    .bind(&customer.state)
    .bind(customer.tax_exempt)
    .bind(customer.accepts_marketing)
    .bind(&customer.multipass_identifier)
    .execute(&mut *conn)
    .await?;

    sqlx::query_scalar("SELECT id FROM customers WHERE shopify_id = ?")
        .bind(customer.shopify_id)
        .fetch_one(&mut *conn)
        .await
}

/// Delete a customer, its tag links and its addresses. Returns `false` when no
/// customer had that Shopify id.
pub async fn delete_by_shopify_id(
    conn: &mut SqliteConnection,
    shopify_id: i64,
) -> Result<bool, sqlx::Error> {
    let customer_id: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE shopify_id = ?")
        .bind(shopify_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(customer_id) = customer_id else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM customers_tags WHERE customer_id = ?")
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM customers_addresses WHERE customer_id = ?")
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;
    addresses::delete_unlinked(conn).await?;

    Ok(true)
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&mut *conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_database;
    use std::str::FromStr;

    fn sample_customer(shopify_id: i64) -> Customer {
        Customer {
            shopify_id,
            email: "testme@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            state: "disabled".to_string(),
            verified_email: true,
            total_spent: Decimal::from_str("12.50").unwrap(),
            created_at: Some("2015-05-27T18:12:18Z".parse().unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let id = save(&mut conn, &sample_customer(553412611)).await.unwrap();
        let found = find_by_shopify_id(&mut conn, 553412611).await.unwrap().unwrap();

        assert_eq!(found.id, id);
        assert_eq!(found.email, "testme@example.com");
        assert_eq!(found.total_spent, Decimal::from_str("12.50").unwrap());
        assert_eq!(found.created_at, sample_customer(1).created_at);
        assert_eq!(found.last_order_id, None);
    }

    #[tokio::test]
    async fn test_save_overwrites_in_place() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = save(&mut conn, &sample_customer(7)).await.unwrap();
        let mut changed = sample_customer(7);
        changed.first_name = "Changed".to_string();
        let second = save(&mut conn, &changed).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&mut conn).await.unwrap(), 1);
        let found = find_by_shopify_id(&mut conn, 7).await.unwrap().unwrap();
        assert_eq!(found.first_name, "Changed");
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert!(!delete_by_shopify_id(&mut conn, 42).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_existing_customer() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        save(&mut conn, &sample_customer(42)).await.unwrap();
        assert!(delete_by_shopify_id(&mut conn, 42).await.unwrap());
        assert_eq!(count(&mut conn).await.unwrap(), 0);
    }
}

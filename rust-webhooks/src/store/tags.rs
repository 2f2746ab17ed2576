//! Customer tags, shared across customers and unique by name.

use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CustomerTag {
    pub id: i64,
    pub name: String,
}

/// Find the tag called `name`, creating it first if no customer uses it yet.
pub async fn get_or_create(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<CustomerTag, sqlx::Error> {
    sqlx::query("INSERT INTO customer_tags (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    sqlx::query_as("SELECT id, name FROM customer_tags WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
}

/// Replace the customer's tag set with `names`.
pub async fn replace_for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM customers_tags WHERE customer_id = ?")
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;

    for name in names {
        let tag = get_or_create(conn, name).await?;
        sqlx::query("INSERT OR IGNORE INTO customers_tags (customer_id, tag_id) VALUES (?, ?)")
            .bind(customer_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Tag names attached to a customer, sorted.
pub async fn names_for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT t.name FROM customer_tags t
         JOIN customers_tags ct ON ct.tag_id = t.id
         WHERE ct.customer_id = ?
         ORDER BY t.name",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customer_tags")
        .fetch_one(&mut *conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{customers, memory_database, Customer};

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_tag() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = get_or_create(&mut conn, "hello").await.unwrap();
        let second = get_or_create(&mut conn, "hello").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replace_for_customer() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let customer_id = customers::save(&mut conn, &Customer::new(1)).await.unwrap();

        let initial = vec!["hello".to_string(), "world".to_string()];
        replace_for_customer(&mut conn, customer_id, &initial).await.unwrap();
        assert_eq!(
            names_for_customer(&mut conn, customer_id).await.unwrap(),
            vec!["hello", "world"]
        );

        let replacement = vec!["vip".to_string()];
        replace_for_customer(&mut conn, customer_id, &replacement).await.unwrap();
        assert_eq!(
            names_for_customer(&mut conn, customer_id).await.unwrap(),
            vec!["vip"]
        );

        // Unlinked tags stay available for other customers.
        assert_eq!(count(&mut conn).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_tags_shared_between_customers() {
        let db = memory_database().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let alice = customers::save(&mut conn, &Customer::new(1)).await.unwrap();
        let bob = customers::save(&mut conn, &Customer::new(2)).await.unwrap();

        let names = vec!["wholesale".to_string()];
        replace_for_customer(&mut conn, alice, &names).await.unwrap();
        replace_for_customer(&mut conn, bob, &names).await.unwrap();

        assert_eq!(count(&mut conn).await.unwrap(), 1);
        assert_eq!(names_for_customer(&mut conn, bob).await.unwrap(), vec!["wholesale"]);
    }
}

//! Cart and payment persistence.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{CartLine, CompletedOrder, Payment};
use super::repository::CommerceRepository;
use super::Database;

const CART_SELECT: &str = r#"
    SELECT
        ci.id AS item_id,
        ca.user_id,
        ci.course_id,
        c.title,
        c.price,
        ci.created_at AS added_at
    FROM cart_items ci
    JOIN carts ca ON ca.id = ci.cart_id
    JOIN courses c ON c.id = ci.course_id
"#;

const PAYMENT_SELECT: &str = r#"
    SELECT
        p.id,
        p.user_id,
        p.course_id,
        c.title AS course_title,
        p.amount,
        p.payment_method,
        p.payment_status,
        p.merchant_uid,
        p.imp_uid,
        p.refund_reason,
        p.created_at,
        p.updated_at
    FROM payments p
    JOIN courses c ON c.id = p.course_id
"#;

impl Database {
    async fn payments_by_ids(&self, ids: &[i64]) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(&format!(
            "{} WHERE p.id = ANY($1) ORDER BY p.id",
            PAYMENT_SELECT
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl CommerceRepository for Database {
    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLine>(&format!(
            "{} WHERE ca.user_id = $1 ORDER BY ci.id",
            CART_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_cart_line(&self, item_id: i64) -> Result<Option<CartLine>> {
        let row = sqlx::query_as::<_, CartLine>(&format!("{} WHERE ci.id = $1", CART_SELECT))
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn add_cart_item(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // 사용자당 장바구니 하나 (get-or-create)
        let cart_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id
            "#
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let added = sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (cart_id, course_id) DO NOTHING
            "#
        )
        .bind(cart_id)
        .bind(course_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        tx.commit().await?;

        Ok(added)
    }

    async fn remove_cart_item(&self, item_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            USING carts
            WHERE cart_items.cart_id = carts.id AND carts.user_id = $1
            "#
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn record_completed_order(&self, order: &CompletedOrder<'_>) -> Result<Vec<Payment>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(order.lines.len());

        for line in order.lines {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO payments (
                    user_id, course_id, amount, payment_method,
                    payment_status, merchant_uid, imp_uid
                )
                VALUES ($1, $2, $3, $4, 'completed', $5, $6)
                RETURNING id
                "#
            )
            .bind(order.user_id)
            .bind(line.course_id)
            .bind(line.price)
            .bind(order.payment_method)
            .bind(order.merchant_uid)
            .bind(order.imp_uid)
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);

            sqlx::query(
                r#"
                INSERT INTO enrollments (user_id, course_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, course_id) DO NOTHING
                "#
            )
            .bind(order.user_id)
            .bind(line.course_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            DELETE FROM cart_items
            USING carts
            WHERE cart_items.cart_id = carts.id AND carts.user_id = $1
            "#
        )
        .bind(order.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.payments_by_ids(&ids).await
    }

    async fn find_payment(&self, id: i64) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!("{} WHERE p.id = $1", PAYMENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    async fn list_user_payments(&self, user_id: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(&format!(
            "{} WHERE p.user_id = $1 ORDER BY p.created_at DESC, p.id DESC",
            PAYMENT_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn payments_by_merchant_uid(&self, merchant_uid: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(&format!(
            "{} WHERE p.merchant_uid = $1 ORDER BY p.id",
            PAYMENT_SELECT
        ))
        .bind(merchant_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn refund_payment(&self, payment_id: i64, reason: &str, at: DateTime<Utc>) -> Result<Option<Payment>> {
        let mut tx = self.pool.begin().await?;

        let refunded: Option<(Option<i64>, i64)> = sqlx::query_as(
            r#"
            UPDATE payments
            SET payment_status = 'refunded', refund_reason = $2, updated_at = $3
            WHERE id = $1 AND payment_status = 'completed'
            RETURNING user_id, course_id
            "#
        )
        .bind(payment_id)
        .bind(reason)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id, course_id)) = refunded else {
            tx.rollback().await?;
            return Ok(None);
        };

        // 환불된 과정의 수강 권한 회수
        if let Some(user_id) = user_id {
            sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
                .bind(user_id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_payment(payment_id).await
    }
}

use anyhow::Result;
use async_trait::async_trait;
use diesel::{Connection, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::coupons::{CouponEntity, InsertCouponEntity, UpdateCouponEntity},
    repositories::coupons::CouponRepository,
    schema::{coupon_usages, coupons},
};

pub struct CouponPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CouponPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CouponRepository for CouponPostgres {
    async fn find_active_by_code(&self, code: &str) -> Result<Option<CouponEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let coupon = coupons::table
            .filter(coupons::code.eq(code))
            .filter(coupons::is_active.eq(true))
            .select(CouponEntity::as_select())
            .first::<CouponEntity>(&mut conn)
            .optional()?;

        Ok(coupon)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<CouponEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let coupon = coupons::table
            .filter(coupons::code.eq(code))
            .select(CouponEntity::as_select())
            .first::<CouponEntity>(&mut conn)
            .optional()?;

        Ok(coupon)
    }

    async fn find_by_id(&self, coupon_id: Uuid) -> Result<Option<CouponEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let coupon = coupons::table
            .filter(coupons::id.eq(coupon_id))
            .select(CouponEntity::as_select())
            .first::<CouponEntity>(&mut conn)
            .optional()?;

        Ok(coupon)
    }

    async fn count_user_redemptions(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = coupon_usages::table
            .filter(coupon_usages::coupon_id.eq(coupon_id))
            .filter(coupon_usages::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total)
    }

    async fn list(&self) -> Result<Vec<CouponEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = coupons::table
            .order(coupons::created_at.desc())
            .select(CouponEntity::as_select())
            .load::<CouponEntity>(&mut conn)?;

        Ok(results)
    }

    async fn create(&self, coupon: InsertCouponEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let coupon_id = insert_into(coupons::table)
            .values(&coupon)
            .returning(coupons::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(coupon_id)
    }

    async fn update(&self, coupon_id: Uuid, changes: UpdateCouponEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(coupons::table)
            .filter(coupons::id.eq(coupon_id))
            .set((
                coupons::description.eq(changes.description),
                coupons::discount_type.eq(changes.discount_type),
                coupons::discount_value.eq(changes.discount_value),
                coupons::min_amount.eq(changes.min_amount),
                coupons::max_discount.eq(changes.max_discount),
                coupons::usage_limit.eq(changes.usage_limit),
                coupons::user_limit.eq(changes.user_limit),
                coupons::is_active.eq(changes.is_active),
                coupons::valid_until.eq(changes.valid_until),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, coupon_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), anyhow::Error, _>(|conn| {
            delete(coupon_usages::table.filter(coupon_usages::coupon_id.eq(coupon_id)))
                .execute(conn)?;
            delete(coupons::table.filter(coupons::id.eq(coupon_id))).execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }

    async fn set_active(&self, coupon_id: Uuid, is_active: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(coupons::table)
            .filter(coupons::id.eq(coupon_id))
            .set(coupons::is_active.eq(is_active))
            .execute(&mut conn)?;

        Ok(())
    }
}

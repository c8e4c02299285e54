use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::{
        applications::{ApplicationEntity, InsertApplicationEntity},
        coupon_usages::InsertCouponUsageEntity,
    },
    repositories::applications::ApplicationRepository,
    schema::{applications, coupon_usages, coupons},
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        payments::{PaymentCommit, PricingSnapshot},
    },
};

pub struct ApplicationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ApplicationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ApplicationRepository for ApplicationPostgres {
    async fn create(&self, application: InsertApplicationEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let application_id = insert_into(applications::table)
            .values(&application)
            .returning(applications::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(application_id)
    }

    async fn find_by_id(&self, application_id: Uuid) -> Result<Option<ApplicationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let application = applications::table
            .filter(applications::id.eq(application_id))
            .select(ApplicationEntity::as_select())
            .first::<ApplicationEntity>(&mut conn)
            .optional()?;

        Ok(application)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<ApplicationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let application = applications::table
            .filter(applications::payment_reference.eq(reference))
            .select(ApplicationEntity::as_select())
            .first::<ApplicationEntity>(&mut conn)
            .optional()?;

        Ok(application)
    }

    async fn find_awaiting_payment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<ApplicationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let application = applications::table
            .filter(applications::user_id.eq(user_id))
            .filter(applications::course_id.eq(course_id))
            .filter(applications::payment_status.eq(PaymentStatus::Pending.to_string()))
            .order(applications::applied_at.desc())
            .select(ApplicationEntity::as_select())
            .first::<ApplicationEntity>(&mut conn)
            .optional()?;

        Ok(application)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ApplicationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = applications::table
            .filter(applications::user_id.eq(user_id))
            .order(applications::applied_at.desc())
            .select(ApplicationEntity::as_select())
            .load::<ApplicationEntity>(&mut conn)?;

        Ok(results)
    }

    async fn write_pricing_snapshot(
        &self,
        application_id: Uuid,
        snapshot: PricingSnapshot,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(applications::table)
            .filter(applications::id.eq(application_id))
            .set((
                applications::original_price.eq(snapshot.original_price),
                applications::discount_amount.eq(snapshot.discount_amount),
                applications::final_price.eq(snapshot.final_price),
                applications::coupon_id.eq(snapshot.coupon_id),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn attach_payment_reference(&self, application_id: Uuid, reference: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(applications::table)
            .filter(applications::id.eq(application_id))
            .set((
                applications::payment_reference.eq(Some(reference.to_string())),
                applications::payment_status.eq(PaymentStatus::Pending.to_string()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn complete_payment(
        &self,
        application_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<PaymentCommit> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let commit = conn.transaction::<PaymentCommit, anyhow::Error, _>(|conn| {
            // Guarded transition: a second verify of the same reference
            // matches zero rows and must not touch the coupon either.
            let transitioned = update(applications::table)
                .filter(applications::id.eq(application_id))
                .filter(applications::payment_status.ne(PaymentStatus::Completed.to_string()))
                .set((
                    applications::payment_status.eq(PaymentStatus::Completed.to_string()),
                    applications::paid_at.eq(Some(paid_at)),
                ))
                .execute(conn)?;

            if transitioned == 0 {
                return Ok(PaymentCommit {
                    newly_completed: false,
                    coupon_redeemed: false,
                });
            }

            let application = applications::table
                .filter(applications::id.eq(application_id))
                .select(ApplicationEntity::as_select())
                .first::<ApplicationEntity>(conn)?;

            let Some(coupon_id) = application.coupon_id else {
                return Ok(PaymentCommit {
                    newly_completed: true,
                    coupon_redeemed: false,
                });
            };

            // used_count may only grow while under usage_limit.
            let incremented = update(coupons::table)
                .filter(coupons::id.eq(coupon_id))
                .filter(
                    coupons::usage_limit
                        .is_null()
                        .or(coupons::used_count.lt(coupons::usage_limit.assume_not_null())),
                )
                .set(coupons::used_count.eq(coupons::used_count + 1))
                .execute(conn)?;

            if incremented == 0 {
                return Ok(PaymentCommit {
                    newly_completed: true,
                    coupon_redeemed: false,
                });
            }

            insert_into(coupon_usages::table)
                .values(&InsertCouponUsageEntity {
                    coupon_id,
                    user_id: application.user_id,
                    application_id,
                    discount_amount: application.discount_amount,
                })
                .execute(conn)?;

            Ok(PaymentCommit {
                newly_completed: true,
                coupon_redeemed: true,
            })
        })?;

        Ok(commit)
    }

    async fn mark_payment_failed(&self, application_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(applications::table)
            .filter(applications::id.eq(application_id))
            .filter(applications::payment_status.ne(PaymentStatus::Completed.to_string()))
            .set(applications::payment_status.eq(PaymentStatus::Failed.to_string()))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), anyhow::Error, _>(|conn| {
            delete(coupon_usages::table.filter(coupon_usages::user_id.eq(user_id)))
                .execute(conn)?;
            delete(applications::table.filter(applications::user_id.eq(user_id)))
                .execute(conn)?;
            Ok(())
        })?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = applications::table.count().get_result::<i64>(&mut conn)?;

        Ok(total)
    }
}

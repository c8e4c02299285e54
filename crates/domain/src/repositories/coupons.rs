use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::coupons::{CouponEntity, InsertCouponEntity, UpdateCouponEntity};

#[async_trait]
#[automock]
pub trait CouponRepository {
    /// Lookup by upper-cased code, restricted to active coupons.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<CouponEntity>>;

    /// Lookup by upper-cased code regardless of active flag. Used for
    /// uniqueness checks when issuing new coupons.
    async fn find_by_code(&self, code: &str) -> Result<Option<CouponEntity>>;

    async fn find_by_id(&self, coupon_id: Uuid) -> Result<Option<CouponEntity>>;

    /// Number of recorded redemptions of this coupon by this user.
    async fn count_user_redemptions(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64>;

    async fn list(&self) -> Result<Vec<CouponEntity>>;

    async fn create(&self, coupon: InsertCouponEntity) -> Result<Uuid>;

    async fn update(&self, coupon_id: Uuid, changes: UpdateCouponEntity) -> Result<()>;

    async fn delete(&self, coupon_id: Uuid) -> Result<()>;

    async fn set_active(&self, coupon_id: Uuid, is_active: bool) -> Result<()>;
}

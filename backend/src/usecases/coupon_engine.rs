use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use domain::{
    entities::{coupons::CouponEntity, courses::CourseEntity},
    repositories::{coupons::CouponRepository, courses::CourseRepository},
    value_objects::{coupons::DiscountResult, enums::discount_types::DiscountType},
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("invalid coupon code")]
    InvalidCode,
    #[error("coupon is not yet valid")]
    NotYetValid,
    #[error("coupon has expired")]
    Expired,
    #[error("minimum order amount of {min_amount} required")]
    BelowMinimum { min_amount: Decimal },
    #[error("coupon usage limit reached")]
    GlobalLimitReached,
    #[error("you have already used this coupon")]
    UserLimitReached,
    #[error("course not found")]
    CourseNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CouponError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CouponError::CourseNotFound => StatusCode::NOT_FOUND,
            CouponError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

pub type CouponResult<T> = std::result::Result<T, CouponError>;

/// Validates coupon codes and computes discounted prices. Evaluation is a
/// pure read: `used_count` and the usage history only change when a payment
/// is confirmed.
pub struct CouponEngine<C, Co>
where
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
{
    coupon_repo: Arc<C>,
    course_repo: Arc<Co>,
}

impl<C, Co> CouponEngine<C, Co>
where
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
{
    pub fn new(coupon_repo: Arc<C>, course_repo: Arc<Co>) -> Self {
        Self {
            coupon_repo,
            course_repo,
        }
    }

    /// Looks up the course and evaluates the coupon against it. Backs the
    /// preview endpoint; redemption never happens here.
    pub async fn preview(
        &self,
        code: &str,
        course_id: Uuid,
        user_id: Uuid,
    ) -> CouponResult<DiscountResult> {
        let course = self
            .course_repo
            .find_by_id(course_id)
            .await
            .map_err(|err| {
                error!(%course_id, db_error = ?err, "coupon: failed to load course for preview");
                CouponError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CouponError::CourseNotFound;
                warn!(
                    %course_id,
                    status = err.status_code().as_u16(),
                    "coupon: preview requested for unknown course"
                );
                err
            })?;

        self.evaluate(code, &course, user_id).await
    }

    /// Checks, in order: code exists and is active, validity window, minimum
    /// amount, global usage cap, per-user cap. The first failing check wins.
    pub async fn evaluate(
        &self,
        code: &str,
        course: &CourseEntity,
        user_id: Uuid,
    ) -> CouponResult<DiscountResult> {
        let normalized = code.trim().to_uppercase();

        let coupon = self
            .coupon_repo
            .find_active_by_code(&normalized)
            .await
            .map_err(|err| {
                error!(code = %normalized, db_error = ?err, "coupon: failed to look up code");
                CouponError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CouponError::InvalidCode;
                warn!(
                    code = %normalized,
                    %user_id,
                    status = err.status_code().as_u16(),
                    "coupon: unknown or inactive code"
                );
                err
            })?;

        let now = Utc::now();
        if coupon.valid_from > now {
            let err = CouponError::NotYetValid;
            warn!(
                code = %coupon.code,
                valid_from = %coupon.valid_from,
                status = err.status_code().as_u16(),
                "coupon: not yet valid"
            );
            return Err(err);
        }
        if let Some(valid_until) = coupon.valid_until {
            if valid_until < now {
                let err = CouponError::Expired;
                warn!(
                    code = %coupon.code,
                    valid_until = %valid_until,
                    status = err.status_code().as_u16(),
                    "coupon: expired"
                );
                return Err(err);
            }
        }

        if course.price < coupon.min_amount {
            let err = CouponError::BelowMinimum {
                min_amount: coupon.min_amount,
            };
            warn!(
                code = %coupon.code,
                course_price = %course.price,
                min_amount = %coupon.min_amount,
                status = err.status_code().as_u16(),
                "coupon: course price below minimum"
            );
            return Err(err);
        }

        if let Some(usage_limit) = coupon.usage_limit {
            if coupon.used_count >= usage_limit {
                let err = CouponError::GlobalLimitReached;
                warn!(
                    code = %coupon.code,
                    used_count = coupon.used_count,
                    usage_limit,
                    status = err.status_code().as_u16(),
                    "coupon: global usage limit reached"
                );
                return Err(err);
            }
        }

        let user_redemptions = self
            .coupon_repo
            .count_user_redemptions(coupon.id, user_id)
            .await
            .map_err(|err| {
                error!(
                    code = %coupon.code,
                    %user_id,
                    db_error = ?err,
                    "coupon: failed to count user redemptions"
                );
                CouponError::Internal(err)
            })?;
        if user_redemptions >= i64::from(coupon.user_limit) {
            let err = CouponError::UserLimitReached;
            warn!(
                code = %coupon.code,
                %user_id,
                user_redemptions,
                user_limit = coupon.user_limit,
                status = err.status_code().as_u16(),
                "coupon: per-user limit reached"
            );
            return Err(err);
        }

        let discount_amount = compute_discount(&coupon, course.price)?;
        let final_price = course.price - discount_amount;

        info!(
            code = %coupon.code,
            %user_id,
            original_price = %course.price,
            discount_amount = %discount_amount,
            final_price = %final_price,
            "coupon: evaluation succeeded"
        );

        Ok(DiscountResult {
            coupon_id: coupon.id,
            code: coupon.code,
            description: coupon.description,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            original_price: course.price,
            discount_amount,
            final_price,
        })
    }
}

/// Percentage discounts are capped by `max_discount` when set; fixed
/// discounts are capped by the price itself so the final price stays >= 0.
fn compute_discount(coupon: &CouponEntity, price: Decimal) -> CouponResult<Decimal> {
    let discount = match DiscountType::from_str(&coupon.discount_type) {
        Some(DiscountType::Percentage) => {
            let mut discount = price * coupon.discount_value / Decimal::from(100);
            if let Some(max_discount) = coupon.max_discount {
                discount = discount.min(max_discount);
            }
            discount
        }
        Some(DiscountType::Fixed) => coupon.discount_value.min(price),
        None => {
            return Err(CouponError::Internal(anyhow!(
                "unknown discount type: {}",
                coupon.discount_type
            )));
        }
    };

    Ok(discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::repositories::{coupons::MockCouponRepository, courses::MockCourseRepository};
    use rust_decimal_macros::dec;

    fn sample_course(price: Decimal) -> CourseEntity {
        CourseEntity {
            id: Uuid::new_v4(),
            title: "Networking Basics".to_string(),
            description: "Switches, routers, subnets".to_string(),
            duration: "8 weeks".to_string(),
            price,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn sample_coupon() -> CouponEntity {
        let now = Utc::now();
        CouponEntity {
            id: Uuid::new_v4(),
            code: "CODE10".to_string(),
            description: "10% off".to_string(),
            discount_type: "percentage".to_string(),
            discount_value: dec!(10),
            min_amount: dec!(0),
            max_discount: None,
            usage_limit: Some(100),
            used_count: 0,
            user_limit: 1,
            is_active: true,
            valid_from: now - Duration::days(1),
            valid_until: Some(now + Duration::days(30)),
            created_at: now,
            created_by: Uuid::new_v4(),
        }
    }

    fn engine_with(
        coupon_repo: MockCouponRepository,
    ) -> CouponEngine<MockCouponRepository, MockCourseRepository> {
        CouponEngine::new(Arc::new(coupon_repo), Arc::new(MockCourseRepository::new()))
    }

    #[tokio::test]
    async fn rejects_unknown_code() {
        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo
            .expect_find_active_by_code()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));

        let result = engine.evaluate("NOPE", &course, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CouponError::InvalidCode)));
    }

    #[tokio::test]
    async fn normalizes_code_before_lookup() {
        let coupon = sample_coupon();
        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo
            .expect_find_active_by_code()
            .withf(|code| code == "CODE10")
            .returning(move |_| {
                let coupon = coupon.clone();
                Box::pin(async move { Ok(Some(coupon)) })
            });
        coupon_repo
            .expect_count_user_redemptions()
            .returning(|_, _| Box::pin(async move { Ok(0) }));

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));

        let result = engine.evaluate("  code10 ", &course, Uuid::new_v4()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejects_coupon_that_is_not_yet_valid() {
        let mut coupon = sample_coupon();
        coupon.valid_from = Utc::now() + Duration::days(1);

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));

        let result = engine.evaluate("CODE10", &course, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CouponError::NotYetValid)));
    }

    #[tokio::test]
    async fn rejects_expired_coupon() {
        let mut coupon = sample_coupon();
        coupon.valid_until = Some(Utc::now() - Duration::days(1));

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));

        let result = engine.evaluate("CODE10", &course, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CouponError::Expired)));
    }

    #[tokio::test]
    async fn rejects_price_below_minimum() {
        let mut coupon = sample_coupon();
        coupon.min_amount = dec!(10000);

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(5000));

        let result = engine.evaluate("CODE10", &course, Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(CouponError::BelowMinimum { min_amount }) if min_amount == dec!(10000)
        ));
    }

    #[tokio::test]
    async fn rejects_when_global_limit_is_reached() {
        let mut coupon = sample_coupon();
        coupon.usage_limit = Some(5);
        coupon.used_count = 5;

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));

        let result = engine.evaluate("CODE10", &course, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CouponError::GlobalLimitReached)));
    }

    #[tokio::test]
    async fn rejects_when_user_limit_is_reached() {
        let coupon = sample_coupon();

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });
        coupon_repo
            .expect_count_user_redemptions()
            .returning(|_, _| Box::pin(async move { Ok(1) }));

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));

        let result = engine.evaluate("CODE10", &course, Uuid::new_v4()).await;
        assert!(matches!(result, Err(CouponError::UserLimitReached)));
    }

    #[tokio::test]
    async fn percentage_discount_is_capped_by_max_discount() {
        let mut coupon = sample_coupon();
        coupon.discount_value = dec!(50);
        coupon.max_discount = Some(dec!(2000));

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });
        coupon_repo
            .expect_count_user_redemptions()
            .returning(|_, _| Box::pin(async move { Ok(0) }));

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(10000));

        let result = engine
            .evaluate("CODE10", &course, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(result.discount_amount, dec!(2000));
        assert_eq!(result.final_price, dec!(8000));
    }

    #[tokio::test]
    async fn fixed_discount_never_exceeds_the_price() {
        let mut coupon = sample_coupon();
        coupon.discount_type = "fixed".to_string();
        coupon.discount_value = dec!(5000);

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });
        coupon_repo
            .expect_count_user_redemptions()
            .returning(|_, _| Box::pin(async move { Ok(0) }));

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(1000));

        let result = engine
            .evaluate("CODE10", &course, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(result.discount_amount, dec!(1000));
        assert_eq!(result.final_price, dec!(0));
    }

    #[tokio::test]
    async fn evaluation_is_repeatable_and_never_writes() {
        // Only read expectations are registered: any write would panic.
        let coupon = sample_coupon();
        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo
            .expect_find_active_by_code()
            .times(2)
            .returning(move |_| {
                let coupon = coupon.clone();
                Box::pin(async move { Ok(Some(coupon)) })
            });
        coupon_repo
            .expect_count_user_redemptions()
            .times(2)
            .returning(|_, _| Box::pin(async move { Ok(0) }));

        let engine = engine_with(coupon_repo);
        let course = sample_course(dec!(50000));
        let user_id = Uuid::new_v4();

        let first = engine.evaluate("CODE10", &course, user_id).await.unwrap();
        let second = engine.evaluate("CODE10", &course, user_id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.discount_amount, dec!(5000));
        assert_eq!(first.final_price, dec!(45000));
    }

    #[tokio::test]
    async fn preview_rejects_unknown_course() {
        let mut course_repo = MockCourseRepository::new();
        course_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let engine = CouponEngine::new(
            Arc::new(MockCouponRepository::new()),
            Arc::new(course_repo),
        );

        let result = engine
            .preview("CODE10", Uuid::new_v4(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(CouponError::CourseNotFound)));
    }
}

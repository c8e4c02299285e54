use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{
    entities::coupons::{CouponEntity, InsertCouponEntity, UpdateCouponEntity},
    repositories::coupons::CouponRepository,
    value_objects::enums::discount_types::DiscountType,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CouponAdminError {
    #[error("coupon code already exists")]
    CodeExists,
    #[error("unknown discount type")]
    UnknownDiscountType,
    #[error("percentage discount must be between 0 and 100")]
    PercentageOutOfRange,
    #[error("fixed discount must be a positive amount")]
    NegativeFixedDiscount,
    #[error("coupon not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CouponAdminError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CouponAdminError::CodeExists => StatusCode::CONFLICT,
            CouponAdminError::UnknownDiscountType
            | CouponAdminError::PercentageOutOfRange
            | CouponAdminError::NegativeFixedDiscount => StatusCode::BAD_REQUEST,
            CouponAdminError::NotFound => StatusCode::NOT_FOUND,
            CouponAdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type CouponAdminResult<T> = std::result::Result<T, CouponAdminError>;

#[derive(Debug, Clone)]
pub struct CouponTerms {
    pub description: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub user_limit: i32,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}

pub struct CouponAdminUseCase<C>
where
    C: CouponRepository + Send + Sync + 'static,
{
    coupon_repo: Arc<C>,
}

impl<C> CouponAdminUseCase<C>
where
    C: CouponRepository + Send + Sync + 'static,
{
    pub fn new(coupon_repo: Arc<C>) -> Self {
        Self { coupon_repo }
    }

    pub async fn list(&self) -> CouponAdminResult<Vec<CouponEntity>> {
        let coupons = self.coupon_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "admin coupons: failed to list coupons");
            CouponAdminError::Internal(err)
        })?;

        Ok(coupons)
    }

    pub async fn create(
        &self,
        created_by: Uuid,
        code: &str,
        terms: CouponTerms,
    ) -> CouponAdminResult<Uuid> {
        validate_terms(&terms)?;

        let code = code.trim().to_uppercase();
        if self
            .coupon_repo
            .find_by_code(&code)
            .await
            .map_err(CouponAdminError::Internal)?
            .is_some()
        {
            let err = CouponAdminError::CodeExists;
            warn!(
                code = %code,
                status = err.status_code().as_u16(),
                "admin coupons: duplicate code"
            );
            return Err(err);
        }

        let coupon_id = self
            .coupon_repo
            .create(InsertCouponEntity {
                code: code.clone(),
                description: terms.description,
                discount_type: terms.discount_type,
                discount_value: terms.discount_value,
                min_amount: terms.min_amount,
                max_discount: terms.max_discount,
                usage_limit: terms.usage_limit,
                user_limit: terms.user_limit,
                is_active: terms.is_active,
                valid_from: Utc::now(),
                valid_until: terms.valid_until,
                created_by,
            })
            .await
            .map_err(|err| {
                error!(code = %code, db_error = ?err, "admin coupons: failed to create coupon");
                CouponAdminError::Internal(err)
            })?;

        info!(%coupon_id, code = %code, "admin coupons: coupon created");

        Ok(coupon_id)
    }

    pub async fn update(&self, coupon_id: Uuid, terms: CouponTerms) -> CouponAdminResult<()> {
        validate_terms(&terms)?;
        self.get(coupon_id).await?;

        self.coupon_repo
            .update(
                coupon_id,
                UpdateCouponEntity {
                    description: terms.description,
                    discount_type: terms.discount_type,
                    discount_value: terms.discount_value,
                    min_amount: terms.min_amount,
                    max_discount: terms.max_discount,
                    usage_limit: terms.usage_limit,
                    user_limit: terms.user_limit,
                    is_active: terms.is_active,
                    valid_until: terms.valid_until,
                },
            )
            .await
            .map_err(|err| {
                error!(%coupon_id, db_error = ?err, "admin coupons: failed to update coupon");
                CouponAdminError::Internal(err)
            })?;

        info!(%coupon_id, "admin coupons: coupon updated");

        Ok(())
    }

    pub async fn delete(&self, coupon_id: Uuid) -> CouponAdminResult<()> {
        self.get(coupon_id).await?;

        self.coupon_repo.delete(coupon_id).await.map_err(|err| {
            error!(%coupon_id, db_error = ?err, "admin coupons: failed to delete coupon");
            CouponAdminError::Internal(err)
        })?;

        info!(%coupon_id, "admin coupons: coupon deleted");

        Ok(())
    }

    pub async fn toggle(&self, coupon_id: Uuid) -> CouponAdminResult<bool> {
        let coupon = self.get(coupon_id).await?;
        let is_active = !coupon.is_active;

        self.coupon_repo
            .set_active(coupon_id, is_active)
            .await
            .map_err(|err| {
                error!(%coupon_id, db_error = ?err, "admin coupons: failed to toggle coupon");
                CouponAdminError::Internal(err)
            })?;

        info!(%coupon_id, is_active, "admin coupons: coupon toggled");

        Ok(is_active)
    }

    async fn get(&self, coupon_id: Uuid) -> CouponAdminResult<CouponEntity> {
        self.coupon_repo
            .find_by_id(coupon_id)
            .await
            .map_err(CouponAdminError::Internal)?
            .ok_or_else(|| {
                let err = CouponAdminError::NotFound;
                warn!(
                    %coupon_id,
                    status = err.status_code().as_u16(),
                    "admin coupons: unknown coupon"
                );
                err
            })
    }
}

fn validate_terms(terms: &CouponTerms) -> CouponAdminResult<()> {
    match DiscountType::from_str(&terms.discount_type) {
        Some(DiscountType::Percentage) => {
            if terms.discount_value < Decimal::ZERO || terms.discount_value > Decimal::from(100) {
                return Err(CouponAdminError::PercentageOutOfRange);
            }
        }
        Some(DiscountType::Fixed) => {
            if terms.discount_value < Decimal::ZERO {
                return Err(CouponAdminError::NegativeFixedDiscount);
            }
        }
        None => return Err(CouponAdminError::UnknownDiscountType),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::repositories::coupons::MockCouponRepository;
    use rust_decimal_macros::dec;

    fn terms(discount_type: &str, discount_value: Decimal) -> CouponTerms {
        CouponTerms {
            description: "promo".to_string(),
            discount_type: discount_type.to_string(),
            discount_value,
            min_amount: dec!(0),
            max_discount: None,
            usage_limit: None,
            user_limit: 1,
            is_active: true,
            valid_until: None,
        }
    }

    fn sample_coupon(id: Uuid) -> CouponEntity {
        let now = Utc::now();
        CouponEntity {
            id,
            code: "CODE10".to_string(),
            description: "promo".to_string(),
            discount_type: "percentage".to_string(),
            discount_value: dec!(10),
            min_amount: dec!(0),
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            user_limit: 1,
            is_active: true,
            valid_from: now - Duration::days(1),
            valid_until: None,
            created_at: now,
            created_by: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_codes() {
        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_by_code().returning(|_| {
            Box::pin(async move { Ok(Some(sample_coupon(Uuid::new_v4()))) })
        });

        let usecase = CouponAdminUseCase::new(Arc::new(coupon_repo));

        let result = usecase
            .create(Uuid::new_v4(), "code10", terms("percentage", dec!(10)))
            .await;

        assert!(matches!(result, Err(CouponAdminError::CodeExists)));
    }

    #[tokio::test]
    async fn create_uppercases_the_code() {
        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo
            .expect_find_by_code()
            .withf(|code| code == "CODE10")
            .returning(|_| Box::pin(async move { Ok(None) }));
        coupon_repo
            .expect_create()
            .withf(|insert| insert.code == "CODE10")
            .times(1)
            .returning(|_| Box::pin(async move { Ok(Uuid::new_v4()) }));

        let usecase = CouponAdminUseCase::new(Arc::new(coupon_repo));

        let result = usecase
            .create(Uuid::new_v4(), "  code10 ", terms("percentage", dec!(10)))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn create_rejects_percentage_above_100() {
        let usecase = CouponAdminUseCase::new(Arc::new(MockCouponRepository::new()));

        let result = usecase
            .create(Uuid::new_v4(), "BIG", terms("percentage", dec!(150)))
            .await;

        assert!(matches!(result, Err(CouponAdminError::PercentageOutOfRange)));
    }

    #[tokio::test]
    async fn create_rejects_negative_fixed_discount() {
        let usecase = CouponAdminUseCase::new(Arc::new(MockCouponRepository::new()));

        let result = usecase
            .create(Uuid::new_v4(), "NEG", terms("fixed", dec!(-5)))
            .await;

        assert!(matches!(
            result,
            Err(CouponAdminError::NegativeFixedDiscount)
        ));
    }

    #[tokio::test]
    async fn toggle_flips_the_active_flag() {
        let coupon_id = Uuid::new_v4();
        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_by_id().returning(move |id| {
            let coupon = sample_coupon(id);
            Box::pin(async move { Ok(Some(coupon)) })
        });
        coupon_repo
            .expect_set_active()
            .withf(|_, is_active| !is_active)
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let usecase = CouponAdminUseCase::new(Arc::new(coupon_repo));

        let is_active = usecase.toggle(coupon_id).await.unwrap();
        assert!(!is_active);
    }
}

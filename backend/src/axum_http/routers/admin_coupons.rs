use crate::{
    auth::AdminUser, axum_http::error_responses::error_response,
    usecases::admin_coupons::{CouponAdminUseCase, CouponTerms},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use domain::repositories::coupons::CouponRepository;
use infra::db::{
    postgres::postgres_connection::PgPoolSquad, repositories::coupons::CouponPostgres,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let coupon_repository = CouponPostgres::new(Arc::clone(&db_pool));
    let coupon_admin_usecase = CouponAdminUseCase::new(Arc::new(coupon_repository));

    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/:coupon_id", put(edit_coupon).delete(delete_coupon))
        .route("/:coupon_id/toggle", post(toggle_coupon))
        .with_state(Arc::new(coupon_admin_usecase))
}

fn default_user_limit() -> i32 {
    1
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub description: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    #[serde(default = "default_user_limit")]
    pub user_limit: i32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCouponBody {
    pub code: String,
    #[serde(flatten)]
    pub terms: CouponForm,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub is_active: bool,
}

impl From<CouponForm> for CouponTerms {
    fn from(form: CouponForm) -> Self {
        Self {
            description: form.description,
            discount_type: form.discount_type,
            discount_value: form.discount_value,
            min_amount: form.min_amount,
            max_discount: form.max_discount,
            usage_limit: form.usage_limit,
            user_limit: form.user_limit,
            is_active: form.is_active,
            valid_until: form.valid_until,
        }
    }
}

pub async fn list_coupons<C>(
    State(usecase): State<Arc<CouponAdminUseCase<C>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    match usecase.list().await {
        Ok(coupons) => Json(coupons).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn create_coupon<C>(
    State(usecase): State<Arc<CouponAdminUseCase<C>>>,
    AdminUser(admin): AdminUser,
    Json(body): Json<CreateCouponBody>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    match usecase
        .create(admin.user_id, &body.code, body.terms.into())
        .await
    {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn edit_coupon<C>(
    State(usecase): State<Arc<CouponAdminUseCase<C>>>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
    Json(body): Json<CouponForm>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    match usecase.update(coupon_id, body.into()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn delete_coupon<C>(
    State(usecase): State<Arc<CouponAdminUseCase<C>>>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    match usecase.delete(coupon_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn toggle_coupon<C>(
    State(usecase): State<Arc<CouponAdminUseCase<C>>>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
{
    match usecase.toggle(coupon_id).await {
        Ok(is_active) => Json(ToggleResponse { is_active }).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

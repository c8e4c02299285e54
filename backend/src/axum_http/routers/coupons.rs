use crate::{auth::AuthUser, axum_http::error_responses::error_response, usecases::coupon_engine::CouponEngine};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use domain::repositories::{coupons::CouponRepository, courses::CourseRepository};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::{coupons::CouponPostgres, courses::CoursePostgres},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let coupon_repository = CouponPostgres::new(Arc::clone(&db_pool));
    let course_repository = CoursePostgres::new(Arc::clone(&db_pool));
    let coupon_engine = CouponEngine::new(Arc::new(coupon_repository), Arc::new(course_repository));

    Router::new()
        .route("/validate", post(validate_coupon))
        .with_state(Arc::new(coupon_engine))
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub course_id: Uuid,
}

/// Side-effect-free preview: a coupon can be validated any number of times
/// without being consumed.
pub async fn validate_coupon<C, Co>(
    State(engine): State<Arc<CouponEngine<C, Co>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<ValidateCouponRequest>,
) -> impl IntoResponse
where
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
{
    match engine.preview(&body.code, body.course_id, user_id).await {
        Ok(discount) => Json(discount).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

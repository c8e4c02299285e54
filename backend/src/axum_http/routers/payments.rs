use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    usecases::{
        coupon_engine::CouponEngine,
        payment_reconciler::{PaymentGateway, PaymentReconciler, VerifyOutcome},
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use domain::{
    repositories::{
        applications::ApplicationRepository, coupons::CouponRepository,
        courses::CourseRepository, users::UserRepository,
    },
    value_objects::enums::payment_statuses::PaymentStatus,
};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::{
        applications::ApplicationPostgres, coupons::CouponPostgres, courses::CoursePostgres,
        users::UserPostgres,
    },
};
use notifications::notifier::EmailNotifier;
use payments::paystack_client::PaystackClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    gateway: Arc<PaystackClient>,
    notifier: EmailNotifier,
) -> Router {
    let application_repository = ApplicationPostgres::new(Arc::clone(&db_pool));
    let coupon_repository = CouponPostgres::new(Arc::clone(&db_pool));
    let course_repository = Arc::new(CoursePostgres::new(Arc::clone(&db_pool)));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));

    let coupon_engine = CouponEngine::new(
        Arc::new(coupon_repository),
        Arc::clone(&course_repository),
    );
    let payment_reconciler = PaymentReconciler::new(
        Arc::new(application_repository),
        course_repository,
        Arc::new(user_repository),
        Arc::new(coupon_engine),
        gateway,
        notifier,
    );

    Router::new()
        .route("/initialize", post(initialize_payment))
        .route("/verify/:reference", get(verify_payment))
        .route("/callback", get(payment_callback))
        .with_state(Arc::new(payment_reconciler))
}

#[derive(Debug, Deserialize)]
pub struct InitializePaymentRequest {
    pub application_id: Uuid,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub payment_status: String,
    pub raw_status: Option<String>,
    pub coupon_redeemed: bool,
}

impl VerifyResponse {
    fn from_outcome(outcome: VerifyOutcome) -> Self {
        match outcome {
            VerifyOutcome::Completed {
                coupon_redeemed, ..
            } => Self {
                payment_status: PaymentStatus::Completed.to_string(),
                raw_status: None,
                coupon_redeemed,
            },
            VerifyOutcome::Failed { raw_status } => Self {
                payment_status: PaymentStatus::Failed.to_string(),
                raw_status: Some(raw_status),
                coupon_redeemed: false,
            },
        }
    }
}

pub async fn initialize_payment<A, C, Co, U, G>(
    State(reconciler): State<Arc<PaymentReconciler<A, C, Co, U, G>>>,
    AuthUser { user_id, email, .. }: AuthUser,
    Json(body): Json<InitializePaymentRequest>,
) -> impl IntoResponse
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match reconciler
        .initialize(body.application_id, user_id, &email, body.coupon_code)
        .await
    {
        Ok(checkout) => Json(checkout).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn verify_payment<A, C, Co, U, G>(
    State(reconciler): State<Arc<PaymentReconciler<A, C, Co, U, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(reference): Path<String>,
) -> impl IntoResponse
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match reconciler.verify(&reference, Some(user_id)).await {
        Ok(outcome) => Json(VerifyResponse::from_outcome(outcome)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

/// Gateway redirect target. Unauthenticated: the reference alone correlates
/// the transaction, and the commit is idempotent if the user-driven verify
/// races it.
pub async fn payment_callback<A, C, Co, U, G>(
    State(reconciler): State<Arc<PaymentReconciler<A, C, Co, U, G>>>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match reconciler.verify(&query.reference, None).await {
        Ok(outcome) => Json(VerifyResponse::from_outcome(outcome)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

use crate::{
    axum_http::error_responses::error_response,
    config::{config_loader, config_model::DotEnvyConfig},
    usecases::accounts::{AccountUseCase, RegisterRequest},
};
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use domain::repositories::users::UserRepository;
use infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres};
use notifications::notifier::EmailNotifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    notifier: EmailNotifier,
) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let auth_secret = config_loader::get_auth_secret().expect("JWT secret is not configured");
    let account_usecase = AccountUseCase::new(
        Arc::new(user_repository),
        notifier,
        auth_secret,
        config.base_url.clone(),
    );

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .with_state(Arc::new(account_usecase))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register<U>(
    State(usecase): State<Arc<AccountUseCase<U>>>,
    Json(body): Json<RegisterBody>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    let request = RegisterRequest {
        name: body.name,
        email: body.email,
        password: body.password,
        role: body.role,
    };

    match usecase.register(request).await {
        Ok(user_id) => (StatusCode::CREATED, Json(RegisterResponse { user_id })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn login<U>(
    State(usecase): State<Arc<AccountUseCase<U>>>,
    Json(body): Json<LoginBody>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.login(&body.email, &body.password).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn forgot_password<U>(
    State(usecase): State<Arc<AccountUseCase<U>>>,
    Json(body): Json<ForgotPasswordBody>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.forgot_password(&body.email).await {
        // Same response either way; the endpoint never reveals whether the
        // email exists.
        Ok(()) => Json(MessageResponse {
            message: "If an account with that email exists, a password reset link has been sent."
                .to_string(),
        })
        .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn reset_password<U>(
    State(usecase): State<Arc<AccountUseCase<U>>>,
    Json(body): Json<ResetPasswordBody>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match usecase
        .reset_password(&body.token, &body.password, &body.confirm_password)
        .await
    {
        Ok(()) => Json(MessageResponse {
            message: "Your password has been reset successfully.".to_string(),
        })
        .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

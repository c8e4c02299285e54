use crate::{
    auth::AdminUser, axum_http::error_responses::error_response,
    usecases::admin_users::UserAdminUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use domain::repositories::{applications::ApplicationRepository, users::UserRepository};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::{applications::ApplicationPostgres, users::UserPostgres},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let application_repository = ApplicationPostgres::new(Arc::clone(&db_pool));
    let user_admin_usecase =
        UserAdminUseCase::new(Arc::new(user_repository), Arc::new(application_repository));

    Router::new()
        .route("/", get(list_users))
        .route("/pending-admins", get(list_pending_admins))
        .route("/:user_id", put(edit_user).delete(delete_user))
        .route("/:user_id/toggle-status", post(toggle_user_status))
        .route("/:user_id/approve-admin", post(approve_admin))
        .route("/:user_id/reject-admin", post(reject_admin))
        .with_state(Arc::new(user_admin_usecase))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub name: String,
    pub email: String,
    pub role: String,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleStatusResponse {
    pub role: String,
}

pub async fn list_users<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase.list().await {
        Ok(users) => Json(
            users
                .into_iter()
                .map(UserSummary::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

/// What the back-office sees; password hashes and reset tokens stay private.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub admin_approved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<domain::entities::users::UserEntity> for UserSummary {
    fn from(user: domain::entities::users::UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            admin_approved: user.admin_approved,
            created_at: user.created_at,
        }
    }
}

pub async fn edit_user<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserBody>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase
        .update(user_id, body.name, body.email, body.role, body.password)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn delete_user<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase.delete(admin.user_id, user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn toggle_user_status<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase.toggle_active(admin.user_id, user_id).await {
        Ok(role) => Json(ToggleStatusResponse { role }).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn list_pending_admins<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase.list_pending_admins().await {
        Ok(pending) => Json(
            pending
                .into_iter()
                .map(UserSummary::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn approve_admin<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase.approve_admin(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn reject_admin<U, A>(
    State(usecase): State<Arc<UserAdminUseCase<U, A>>>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
{
    match usecase.reject_admin(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

use crate::{
    auth::AdminUser, axum_http::error_responses::error_response,
    usecases::admin_dashboard::DashboardUseCase,
};
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use domain::repositories::{
    applications::ApplicationRepository, contact_messages::ContactMessageRepository,
    courses::CourseRepository, users::UserRepository,
};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::{
        applications::ApplicationPostgres, contact_messages::ContactMessagePostgres,
        courses::CoursePostgres, users::UserPostgres,
    },
};
use std::sync::Arc;
use tracing::error;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let course_repository = CoursePostgres::new(Arc::clone(&db_pool));
    let application_repository = ApplicationPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let message_repository = ContactMessagePostgres::new(Arc::clone(&db_pool));

    let dashboard_usecase = DashboardUseCase::new(
        Arc::new(course_repository),
        Arc::new(application_repository),
        Arc::new(user_repository),
        Arc::new(message_repository),
    );

    Router::new()
        .route("/", get(dashboard_summary))
        .with_state(Arc::new(dashboard_usecase))
}

pub async fn dashboard_summary<Co, A, U, M>(
    State(usecase): State<Arc<DashboardUseCase<Co, A, U, M>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    M: ContactMessageRepository + Send + Sync + 'static,
{
    match usecase.summary().await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => {
            error!(error = ?err, "admin dashboard: failed to load summary");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

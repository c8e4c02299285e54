use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    usecases::applications::ApplicationUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use domain::repositories::{
    applications::ApplicationRepository, courses::CourseRepository, users::UserRepository,
};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::{
        applications::ApplicationPostgres, courses::CoursePostgres, users::UserPostgres,
    },
};
use notifications::notifier::EmailNotifier;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>, notifier: EmailNotifier) -> Router {
    let application_repository = ApplicationPostgres::new(Arc::clone(&db_pool));
    let course_repository = CoursePostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));

    let application_usecase = ApplicationUseCase::new(
        Arc::new(application_repository),
        Arc::new(course_repository),
        Arc::new(user_repository),
        notifier,
    );

    Router::new()
        .route("/", post(apply))
        .route("/mine", get(list_my_applications))
        .with_state(Arc::new(application_usecase))
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub course_id: Uuid,
}

pub async fn apply<A, Co, U>(
    State(usecase): State<Arc<ApplicationUseCase<A, Co, U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<ApplyRequest>,
) -> impl IntoResponse
where
    A: ApplicationRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.apply(user_id, body.course_id).await {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn list_my_applications<A, Co, U>(
    State(usecase): State<Arc<ApplicationUseCase<A, Co, U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    A: ApplicationRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.list_mine(user_id).await {
        Ok(applications) => Json(applications).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

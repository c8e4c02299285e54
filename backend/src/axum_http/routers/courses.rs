use crate::{axum_http::error_responses::error_response, usecases::courses::CourseUseCase};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use domain::repositories::courses::CourseRepository;
use infra::db::{
    postgres::postgres_connection::PgPoolSquad, repositories::courses::CoursePostgres,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let course_repository = CoursePostgres::new(Arc::clone(&db_pool));
    let course_usecase = CourseUseCase::new(Arc::new(course_repository));

    Router::new()
        .route("/", get(list_courses))
        .route("/:course_id", get(get_course))
        .with_state(Arc::new(course_usecase))
}

pub async fn list_courses<Co>(State(usecase): State<Arc<CourseUseCase<Co>>>) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
{
    match usecase.list().await {
        Ok(courses) => Json(courses).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn get_course<Co>(
    State(usecase): State<Arc<CourseUseCase<Co>>>,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
{
    match usecase.get(course_id).await {
        Ok(course) => Json(course).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

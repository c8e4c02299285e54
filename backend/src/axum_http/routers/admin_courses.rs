use crate::{
    auth::AdminUser, axum_http::error_responses::error_response, usecases::courses::CourseUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use domain::{
    entities::courses::{InsertCourseEntity, UpdateCourseEntity},
    repositories::courses::CourseRepository,
};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad, repositories::courses::CoursePostgres,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let course_repository = CoursePostgres::new(Arc::clone(&db_pool));
    let course_usecase = CourseUseCase::new(Arc::new(course_repository));

    Router::new()
        .route("/", get(list_courses).post(add_course))
        .route("/:course_id", put(edit_course).delete(delete_course))
        .with_state(Arc::new(course_usecase))
}

#[derive(Debug, Deserialize)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

pub async fn list_courses<Co>(
    State(usecase): State<Arc<CourseUseCase<Co>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
{
    match usecase.list().await {
        Ok(courses) => Json(courses).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn add_course<Co>(
    State(usecase): State<Arc<CourseUseCase<Co>>>,
    _admin: AdminUser,
    Json(body): Json<CourseForm>,
) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
{
    let course = InsertCourseEntity {
        title: body.title,
        description: body.description,
        duration: body.duration,
        price: body.price,
        image_url: body.image_url,
    };

    match usecase.create(course).await {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn edit_course<Co>(
    State(usecase): State<Arc<CourseUseCase<Co>>>,
    _admin: AdminUser,
    Path(course_id): Path<Uuid>,
    Json(body): Json<CourseForm>,
) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
{
    let changes = UpdateCourseEntity {
        title: body.title,
        description: body.description,
        duration: body.duration,
        price: body.price,
        image_url: body.image_url,
    };

    match usecase.update(course_id, changes).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn delete_course<Co>(
    State(usecase): State<Arc<CourseUseCase<Co>>>,
    _admin: AdminUser,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse
where
    Co: CourseRepository + Send + Sync + 'static,
{
    match usecase.delete(course_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

use std::sync::Arc;

use domain::{
    entities::courses::{CourseEntity, InsertCourseEntity, UpdateCourseEntity},
    repositories::courses::CourseRepository,
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("course not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CourseError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CourseError::NotFound => StatusCode::NOT_FOUND,
            CourseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type CourseResult<T> = std::result::Result<T, CourseError>;

/// Catalog reads plus the admin-side writes.
pub struct CourseUseCase<Co>
where
    Co: CourseRepository + Send + Sync + 'static,
{
    course_repo: Arc<Co>,
}

impl<Co> CourseUseCase<Co>
where
    Co: CourseRepository + Send + Sync + 'static,
{
    pub fn new(course_repo: Arc<Co>) -> Self {
        Self { course_repo }
    }

    pub async fn list(&self) -> CourseResult<Vec<CourseEntity>> {
        let courses = self.course_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "courses: failed to list courses");
            CourseError::Internal(err)
        })?;

        Ok(courses)
    }

    pub async fn get(&self, course_id: Uuid) -> CourseResult<CourseEntity> {
        self.course_repo
            .find_by_id(course_id)
            .await
            .map_err(|err| {
                error!(%course_id, db_error = ?err, "courses: failed to load course");
                CourseError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CourseError::NotFound;
                warn!(
                    %course_id,
                    status = err.status_code().as_u16(),
                    "courses: unknown course requested"
                );
                err
            })
    }

    pub async fn create(&self, course: InsertCourseEntity) -> CourseResult<Uuid> {
        let course_id = self.course_repo.create(course).await.map_err(|err| {
            error!(db_error = ?err, "courses: failed to create course");
            CourseError::Internal(err)
        })?;

        info!(%course_id, "courses: course created");

        Ok(course_id)
    }

    pub async fn update(&self, course_id: Uuid, changes: UpdateCourseEntity) -> CourseResult<()> {
        self.get(course_id).await?;

        self.course_repo
            .update(course_id, changes)
            .await
            .map_err(|err| {
                error!(%course_id, db_error = ?err, "courses: failed to update course");
                CourseError::Internal(err)
            })?;

        info!(%course_id, "courses: course updated");

        Ok(())
    }

    pub async fn delete(&self, course_id: Uuid) -> CourseResult<()> {
        self.get(course_id).await?;

        self.course_repo.delete(course_id).await.map_err(|err| {
            error!(%course_id, db_error = ?err, "courses: failed to delete course");
            CourseError::Internal(err)
        })?;

        info!(%course_id, "courses: course deleted");

        Ok(())
    }
}

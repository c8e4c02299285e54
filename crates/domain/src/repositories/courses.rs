use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::courses::{CourseEntity, InsertCourseEntity, UpdateCourseEntity};

#[async_trait]
#[automock]
pub trait CourseRepository {
    async fn list(&self) -> Result<Vec<CourseEntity>>;

    async fn find_by_id(&self, course_id: Uuid) -> Result<Option<CourseEntity>>;

    async fn create(&self, course: InsertCourseEntity) -> Result<Uuid>;

    async fn update(&self, course_id: Uuid, changes: UpdateCourseEntity) -> Result<()>;

    async fn delete(&self, course_id: Uuid) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::courses::{CourseEntity, InsertCourseEntity, UpdateCourseEntity},
    repositories::courses::CourseRepository,
    schema::courses,
};

pub struct CoursePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CoursePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CourseRepository for CoursePostgres {
    async fn list(&self) -> Result<Vec<CourseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = courses::table
            .order(courses::created_at.desc())
            .select(CourseEntity::as_select())
            .load::<CourseEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_id(&self, course_id: Uuid) -> Result<Option<CourseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let course = courses::table
            .filter(courses::id.eq(course_id))
            .select(CourseEntity::as_select())
            .first::<CourseEntity>(&mut conn)
            .optional()?;

        Ok(course)
    }

    async fn create(&self, course: InsertCourseEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let course_id = insert_into(courses::table)
            .values(&course)
            .returning(courses::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(course_id)
    }

    async fn update(&self, course_id: Uuid, changes: UpdateCourseEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(courses::table)
            .filter(courses::id.eq(course_id))
            .set((
                courses::title.eq(changes.title),
                courses::description.eq(changes.description),
                courses::duration.eq(changes.duration),
                courses::price.eq(changes.price),
                courses::image_url.eq(changes.image_url),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, course_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(courses::table.filter(courses::id.eq(course_id))).execute(&mut conn)?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = courses::table.count().get_result::<i64>(&mut conn)?;

        Ok(total)
    }
}

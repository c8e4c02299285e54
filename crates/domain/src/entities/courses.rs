use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::courses;

#[derive(Debug, Clone, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = courses)]
pub struct CourseEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub struct InsertCourseEntity {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// Full replacement of the editable course fields, applied by admin edits.
#[derive(Debug, Clone)]
pub struct UpdateCourseEntity {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

use std::sync::Arc;

use anyhow::Result;
use domain::repositories::{
    applications::ApplicationRepository, contact_messages::ContactMessageRepository,
    courses::CourseRepository, users::UserRepository,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub courses: i64,
    pub applications: i64,
    pub users: i64,
    pub unread_messages: i64,
}

pub struct DashboardUseCase<Co, A, U, M>
where
    Co: CourseRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    M: ContactMessageRepository + Send + Sync + 'static,
{
    course_repo: Arc<Co>,
    application_repo: Arc<A>,
    user_repo: Arc<U>,
    message_repo: Arc<M>,
}

impl<Co, A, U, M> DashboardUseCase<Co, A, U, M>
where
    Co: CourseRepository + Send + Sync + 'static,
    A: ApplicationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    M: ContactMessageRepository + Send + Sync + 'static,
{
    pub fn new(
        course_repo: Arc<Co>,
        application_repo: Arc<A>,
        user_repo: Arc<U>,
        message_repo: Arc<M>,
    ) -> Self {
        Self {
            course_repo,
            application_repo,
            user_repo,
            message_repo,
        }
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        Ok(DashboardSummary {
            courses: self.course_repo.count().await?,
            applications: self.application_repo.count().await?,
            users: self.user_repo.count().await?,
            unread_messages: self.message_repo.count_unread().await?,
        })
    }
}

use std::sync::Arc;

use domain::{
    entities::applications::{ApplicationEntity, InsertApplicationEntity},
    repositories::{
        applications::ApplicationRepository, courses::CourseRepository, users::UserRepository,
    },
    value_objects::enums::{
        application_statuses::ApplicationStatus, payment_statuses::PaymentStatus,
    },
};
use notifications::{events::EmailEvent, notifier::EmailNotifier};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("course not found")]
    CourseNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApplicationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ApplicationError::CourseNotFound => StatusCode::NOT_FOUND,
            ApplicationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

pub struct ApplicationUseCase<A, Co, U>
where
    A: ApplicationRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    application_repo: Arc<A>,
    course_repo: Arc<Co>,
    user_repo: Arc<U>,
    notifier: EmailNotifier,
}

impl<A, Co, U> ApplicationUseCase<A, Co, U>
where
    A: ApplicationRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(
        application_repo: Arc<A>,
        course_repo: Arc<Co>,
        user_repo: Arc<U>,
        notifier: EmailNotifier,
    ) -> Self {
        Self {
            application_repo,
            course_repo,
            user_repo,
            notifier,
        }
    }

    /// Creates an application priced at the full course price. If the user
    /// already has one awaiting payment for this course, that one is
    /// returned instead of creating a duplicate.
    pub async fn apply(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> ApplicationResult<ApplicationEntity> {
        let course = self
            .course_repo
            .find_by_id(course_id)
            .await
            .map_err(|err| {
                error!(%course_id, db_error = ?err, "applications: failed to load course");
                ApplicationError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = ApplicationError::CourseNotFound;
                warn!(
                    %course_id,
                    status = err.status_code().as_u16(),
                    "applications: apply requested for unknown course"
                );
                err
            })?;

        if let Some(existing) = self
            .application_repo
            .find_awaiting_payment(user_id, course_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %course_id,
                    db_error = ?err,
                    "applications: failed to check for existing application"
                );
                ApplicationError::Internal(err)
            })?
        {
            info!(
                %user_id,
                %course_id,
                application_id = %existing.id,
                "applications: reusing application awaiting payment"
            );
            return Ok(existing);
        }

        let application_id = self
            .application_repo
            .create(InsertApplicationEntity {
                user_id,
                course_id,
                status: ApplicationStatus::Pending.to_string(),
                payment_status: PaymentStatus::Pending.to_string(),
                original_price: course.price,
                discount_amount: Decimal::ZERO,
                final_price: course.price,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %course_id,
                    db_error = ?err,
                    "applications: failed to create application"
                );
                ApplicationError::Internal(err)
            })?;

        let application = self
            .application_repo
            .find_by_id(application_id)
            .await
            .map_err(ApplicationError::Internal)?
            .ok_or_else(|| {
                ApplicationError::Internal(anyhow::anyhow!(
                    "application {} vanished right after insert",
                    application_id
                ))
            })?;

        info!(
            %user_id,
            %course_id,
            %application_id,
            "applications: application created"
        );

        self.notify_application_created(&application, &course.title)
            .await;

        Ok(application)
    }

    pub async fn list_mine(&self, user_id: Uuid) -> ApplicationResult<Vec<ApplicationEntity>> {
        let applications = self
            .application_repo
            .list_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "applications: failed to list applications");
                ApplicationError::Internal(err)
            })?;

        Ok(applications)
    }

    /// Confirmation to the applicant plus an alert to every approved admin.
    /// All best-effort.
    async fn notify_application_created(
        &self,
        application: &ApplicationEntity,
        course_title: &str,
    ) {
        let user = match self.user_repo.find_by_id(application.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(
                    user_id = %application.user_id,
                    "applications: user missing, skipping confirmation email"
                );
                return;
            }
            Err(err) => {
                warn!(
                    user_id = %application.user_id,
                    db_error = ?err,
                    "applications: failed to load user for confirmation email"
                );
                return;
            }
        };

        self.notifier.try_notify(EmailEvent::ApplicationReceived {
            recipient: user.email.clone(),
            user_name: user.name.clone(),
            course_title: course_title.to_string(),
            applied_at: application.applied_at,
        });

        match self.user_repo.list_approved_admins().await {
            Ok(admins) => {
                for admin in admins {
                    self.notifier.try_notify(EmailEvent::AdminApplicationAlert {
                        recipient: admin.email,
                        user_name: user.name.clone(),
                        user_email: user.email.clone(),
                        course_title: course_title.to_string(),
                        applied_at: application.applied_at,
                    });
                }
            }
            Err(err) => {
                warn!(
                    db_error = ?err,
                    "applications: failed to list admins for alert email"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{
        entities::courses::CourseEntity,
        repositories::{
            applications::MockApplicationRepository, courses::MockCourseRepository,
            users::MockUserRepository,
        },
    };
    use rust_decimal_macros::dec;

    fn sample_course(id: Uuid) -> CourseEntity {
        CourseEntity {
            id,
            title: "Networking Basics".to_string(),
            description: "Switches, routers, subnets".to_string(),
            duration: "8 weeks".to_string(),
            price: dec!(50000),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn sample_application(user_id: Uuid, course_id: Uuid) -> ApplicationEntity {
        ApplicationEntity {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: "pending".to_string(),
            applied_at: Utc::now(),
            payment_status: "pending".to_string(),
            payment_reference: None,
            paid_at: None,
            coupon_id: None,
            original_price: dec!(50000),
            discount_amount: dec!(0),
            final_price: dec!(50000),
        }
    }

    #[tokio::test]
    async fn apply_rejects_unknown_course() {
        let mut course_repo = MockCourseRepository::new();
        course_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let usecase = ApplicationUseCase::new(
            Arc::new(MockApplicationRepository::new()),
            Arc::new(course_repo),
            Arc::new(MockUserRepository::new()),
            EmailNotifier::new(vec![]),
        );

        let result = usecase.apply(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApplicationError::CourseNotFound)));
    }

    #[tokio::test]
    async fn apply_reuses_application_awaiting_payment() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let existing = sample_application(user_id, course_id);
        let existing_id = existing.id;

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id);
            Box::pin(async move { Ok(Some(course)) })
        });

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_awaiting_payment()
            .returning(move |_, _| {
                let existing = existing.clone();
                Box::pin(async move { Ok(Some(existing)) })
            });
        // No create expectation: reusing must not insert a second row.

        let usecase = ApplicationUseCase::new(
            Arc::new(application_repo),
            Arc::new(course_repo),
            Arc::new(MockUserRepository::new()),
            EmailNotifier::new(vec![]),
        );

        let application = usecase.apply(user_id, course_id).await.unwrap();
        assert_eq!(application.id, existing_id);
    }

    #[tokio::test]
    async fn apply_snapshots_full_course_price() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let created = sample_application(user_id, course_id);
        let created_id = created.id;

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id);
            Box::pin(async move { Ok(Some(course)) })
        });

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_awaiting_payment()
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        application_repo
            .expect_create()
            .withf(|insert| {
                insert.original_price == dec!(50000)
                    && insert.discount_amount == dec!(0)
                    && insert.final_price == dec!(50000)
            })
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(created_id) }));
        application_repo.expect_find_by_id().returning(move |_| {
            let created = created.clone();
            Box::pin(async move { Ok(Some(created)) })
        });

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |id| {
            Box::pin(async move {
                Ok(Some(domain::entities::users::UserEntity {
                    id,
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    password_hash: "hash".to_string(),
                    role: "student".to_string(),
                    admin_approved: true,
                    reset_token: None,
                    reset_token_expires: None,
                    created_at: Utc::now(),
                }))
            })
        });
        user_repo
            .expect_list_approved_admins()
            .returning(|| Box::pin(async move { Ok(vec![]) }));

        let usecase = ApplicationUseCase::new(
            Arc::new(application_repo),
            Arc::new(course_repo),
            Arc::new(user_repo),
            EmailNotifier::new(vec![]),
        );

        let application = usecase.apply(user_id, course_id).await.unwrap();
        assert_eq!(application.id, created_id);
        assert_eq!(application.final_price, dec!(50000));
    }
}

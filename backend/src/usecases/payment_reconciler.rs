use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    entities::applications::ApplicationEntity,
    repositories::{
        applications::ApplicationRepository, coupons::CouponRepository,
        courses::CourseRepository, users::UserRepository,
    },
    value_objects::{enums::payment_statuses::PaymentStatus, payments::PricingSnapshot},
};
use notifications::{events::EmailEvent, notifier::EmailNotifier};
use payments::paystack_client::{PaystackClient, PaystackConfirmation, PaystackSession};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::coupon_engine::{CouponEngine, CouponError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        email: &str,
        amount: Decimal,
        reference: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<PaystackSession>;

    async fn confirm_transaction(&self, reference: &str) -> AnyResult<PaystackConfirmation>;
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn create_session(
        &self,
        email: &str,
        amount: Decimal,
        reference: &str,
        metadata: HashMap<String, String>,
    ) -> AnyResult<PaystackSession> {
        self.initialize_transaction(email, amount, reference, metadata)
            .await
    }

    async fn confirm_transaction(&self, reference: &str) -> AnyResult<PaystackConfirmation> {
        self.verify_transaction(reference).await
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("application not found")]
    ApplicationNotFound,
    #[error("you do not have access to this application")]
    Forbidden,
    #[error("payment already completed")]
    AlreadyCompleted,
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::ApplicationNotFound => StatusCode::NOT_FOUND,
            PaymentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentError::AlreadyCompleted => StatusCode::CONFLICT,
            PaymentError::Coupon(err) => err.status_code(),
            PaymentError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutInitiated {
    pub authorization_url: String,
    pub reference: String,
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Completed {
        newly_completed: bool,
        coupon_redeemed: bool,
    },
    Failed {
        raw_status: String,
    },
}

/// Drives an application's payment through pending -> completed/failed
/// against the gateway, and commits coupon usage exactly once per confirmed
/// payment.
pub struct PaymentReconciler<A, C, Co, U, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    application_repo: Arc<A>,
    course_repo: Arc<Co>,
    user_repo: Arc<U>,
    coupon_engine: Arc<CouponEngine<C, Co>>,
    gateway: Arc<G>,
    notifier: EmailNotifier,
}

impl<A, C, Co, U, G> PaymentReconciler<A, C, Co, U, G>
where
    A: ApplicationRepository + Send + Sync + 'static,
    C: CouponRepository + Send + Sync + 'static,
    Co: CourseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        application_repo: Arc<A>,
        course_repo: Arc<Co>,
        user_repo: Arc<U>,
        coupon_engine: Arc<CouponEngine<C, Co>>,
        gateway: Arc<G>,
        notifier: EmailNotifier,
    ) -> Self {
        Self {
            application_repo,
            course_repo,
            user_repo,
            coupon_engine,
            gateway,
            notifier,
        }
    }

    /// Re-validates the coupon, snapshots the pricing onto the application
    /// and opens a hosted checkout session. Completed applications are
    /// rejected; pending and failed ones restart the workflow in place.
    pub async fn initialize(
        &self,
        application_id: Uuid,
        user_id: Uuid,
        user_email: &str,
        coupon_code: Option<String>,
    ) -> PaymentResult<CheckoutInitiated> {
        let application = self
            .application_repo
            .find_by_id(application_id)
            .await
            .map_err(|err| {
                error!(%application_id, db_error = ?err, "payments: failed to load application");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = PaymentError::ApplicationNotFound;
                warn!(
                    %application_id,
                    status = err.status_code().as_u16(),
                    "payments: initialize requested for unknown application"
                );
                err
            })?;

        if application.user_id != user_id {
            let err = PaymentError::Forbidden;
            warn!(
                %application_id,
                %user_id,
                owner_id = %application.user_id,
                status = err.status_code().as_u16(),
                "payments: initialize requested by non-owner"
            );
            return Err(err);
        }

        if PaymentStatus::from_str(&application.payment_status) == Some(PaymentStatus::Completed) {
            let err = PaymentError::AlreadyCompleted;
            warn!(
                %application_id,
                status = err.status_code().as_u16(),
                "payments: initialize rejected, payment already completed"
            );
            return Err(err);
        }

        let course = self
            .course_repo
            .find_by_id(application.course_id)
            .await
            .map_err(|err| {
                error!(
                    %application_id,
                    course_id = %application.course_id,
                    db_error = ?err,
                    "payments: failed to load course for checkout"
                );
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                PaymentError::Internal(anyhow::anyhow!(
                    "course {} referenced by application {} is missing",
                    application.course_id,
                    application_id
                ))
            })?;

        let coupon_code = coupon_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        let snapshot = match coupon_code {
            Some(code) => {
                let discount = self.coupon_engine.evaluate(&code, &course, user_id).await?;
                PricingSnapshot {
                    original_price: discount.original_price,
                    discount_amount: discount.discount_amount,
                    final_price: discount.final_price,
                    coupon_id: Some(discount.coupon_id),
                }
            }
            None => PricingSnapshot {
                original_price: course.price,
                discount_amount: Decimal::ZERO,
                final_price: course.price,
                coupon_id: None,
            },
        };

        self.application_repo
            .write_pricing_snapshot(application_id, snapshot.clone())
            .await
            .map_err(|err| {
                error!(
                    %application_id,
                    db_error = ?err,
                    "payments: failed to write pricing snapshot"
                );
                PaymentError::Internal(err)
            })?;

        let reference = Self::generate_reference();
        let metadata = HashMap::from([
            ("application_id".to_string(), application_id.to_string()),
            ("course_id".to_string(), application.course_id.to_string()),
            ("user_id".to_string(), user_id.to_string()),
            ("course_title".to_string(), course.title.clone()),
        ]);

        info!(
            %application_id,
            %user_id,
            reference = %reference,
            final_price = %snapshot.final_price,
            "payments: creating checkout session"
        );

        let session = match self
            .gateway
            .create_session(user_email, snapshot.final_price, &reference, metadata)
            .await
        {
            Ok(session) => session,
            Err(err) => {
                // The snapshot stays committed; no reference is stored, so
                // the caller can simply retry initialization.
                warn!(
                    %application_id,
                    reference = %reference,
                    error = ?err,
                    "payments: gateway failed to create checkout session"
                );
                return Err(PaymentError::GatewayUnavailable(err.to_string()));
            }
        };

        self.application_repo
            .attach_payment_reference(application_id, &reference)
            .await
            .map_err(|err| {
                error!(
                    %application_id,
                    reference = %reference,
                    db_error = ?err,
                    "payments: failed to store payment reference"
                );
                PaymentError::Internal(err)
            })?;

        info!(
            %application_id,
            reference = %reference,
            "payments: checkout session created"
        );

        Ok(CheckoutInitiated {
            authorization_url: session.authorization_url,
            reference,
            original_price: snapshot.original_price,
            discount_amount: snapshot.discount_amount,
            final_price: snapshot.final_price,
        })
    }

    /// Confirms a transaction with the gateway and commits the outcome.
    /// Safe to call repeatedly for the same reference: the completion commit
    /// is conditional, so the coupon is redeemed at most once.
    pub async fn verify(
        &self,
        reference: &str,
        expected_user: Option<Uuid>,
    ) -> PaymentResult<VerifyOutcome> {
        let application = self
            .application_repo
            .find_by_reference(reference)
            .await
            .map_err(|err| {
                error!(reference, db_error = ?err, "payments: failed to look up reference");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = PaymentError::ApplicationNotFound;
                warn!(
                    reference,
                    status = err.status_code().as_u16(),
                    "payments: verify requested for unknown reference"
                );
                err
            })?;

        if let Some(user_id) = expected_user {
            if application.user_id != user_id {
                let err = PaymentError::Forbidden;
                warn!(
                    reference,
                    %user_id,
                    owner_id = %application.user_id,
                    status = err.status_code().as_u16(),
                    "payments: verify requested by non-owner"
                );
                return Err(err);
            }
        }

        let confirmation = match self.gateway.confirm_transaction(reference).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                // Transport failure: leave the application untouched and let
                // the caller retry.
                warn!(
                    reference,
                    error = ?err,
                    "payments: gateway verification failed"
                );
                return Err(PaymentError::GatewayUnavailable(err.to_string()));
            }
        };

        if !confirmation.succeeded {
            self.application_repo
                .mark_payment_failed(application.id)
                .await
                .map_err(|err| {
                    error!(
                        reference,
                        db_error = ?err,
                        "payments: failed to mark payment failed"
                    );
                    PaymentError::Internal(err)
                })?;

            info!(
                reference,
                raw_status = %confirmation.raw_status,
                "payments: transaction not successful"
            );

            return Ok(VerifyOutcome::Failed {
                raw_status: confirmation.raw_status,
            });
        }

        let paid_at = Utc::now();
        let commit = self
            .application_repo
            .complete_payment(application.id, paid_at)
            .await
            .map_err(|err| {
                error!(
                    reference,
                    db_error = ?err,
                    "payments: failed to commit payment completion"
                );
                PaymentError::Internal(err)
            })?;

        if commit.newly_completed {
            if application.coupon_id.is_some() && !commit.coupon_redeemed {
                warn!(
                    reference,
                    coupon_id = ?application.coupon_id,
                    "payments: coupon usage cap was exhausted before verification; \
                     payment completed without redemption"
                );
            }

            self.notify_payment_confirmed(&application, reference, paid_at)
                .await;

            info!(
                reference,
                coupon_redeemed = commit.coupon_redeemed,
                "payments: payment completed"
            );
        } else {
            info!(reference, "payments: verify repeated for completed payment");
        }

        Ok(VerifyOutcome::Completed {
            newly_completed: commit.newly_completed,
            coupon_redeemed: commit.coupon_redeemed,
        })
    }

    /// Email failures are logged and dropped; they never affect the payment.
    async fn notify_payment_confirmed(
        &self,
        application: &ApplicationEntity,
        reference: &str,
        paid_at: DateTime<Utc>,
    ) {
        let user = match self.user_repo.find_by_id(application.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(
                    user_id = %application.user_id,
                    "payments: user missing, skipping payment confirmation email"
                );
                return;
            }
            Err(err) => {
                warn!(
                    user_id = %application.user_id,
                    db_error = ?err,
                    "payments: failed to load user for confirmation email"
                );
                return;
            }
        };

        let course_title = match self.course_repo.find_by_id(application.course_id).await {
            Ok(Some(course)) => course.title,
            Ok(None) | Err(_) => {
                warn!(
                    course_id = %application.course_id,
                    "payments: course missing, skipping payment confirmation email"
                );
                return;
            }
        };

        self.notifier.try_notify(EmailEvent::PaymentConfirmed {
            recipient: user.email,
            user_name: user.name,
            course_title,
            amount: application.final_price,
            reference: reference.to_string(),
            paid_at,
        });
    }

    fn generate_reference() -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!("PAY_{}", token[..10].to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::{
        entities::{coupons::CouponEntity, courses::CourseEntity, users::UserEntity},
        repositories::{
            applications::MockApplicationRepository, coupons::MockCouponRepository,
            courses::MockCourseRepository, users::MockUserRepository,
        },
        value_objects::payments::PaymentCommit,
    };
    use rust_decimal_macros::dec;

    fn sample_course(id: Uuid, price: Decimal) -> CourseEntity {
        CourseEntity {
            id,
            title: "Networking Basics".to_string(),
            description: "Switches, routers, subnets".to_string(),
            duration: "8 weeks".to_string(),
            price,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn sample_coupon(code: &str) -> CouponEntity {
        let now = Utc::now();
        CouponEntity {
            id: Uuid::new_v4(),
            code: code.to_string(),
            description: "10% off".to_string(),
            discount_type: "percentage".to_string(),
            discount_value: dec!(10),
            min_amount: dec!(0),
            max_discount: None,
            usage_limit: Some(100),
            used_count: 0,
            user_limit: 1,
            is_active: true,
            valid_from: now - Duration::days(1),
            valid_until: None,
            created_at: now,
            created_by: Uuid::new_v4(),
        }
    }

    fn sample_application(
        user_id: Uuid,
        course_id: Uuid,
        payment_status: &str,
    ) -> ApplicationEntity {
        ApplicationEntity {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: "pending".to_string(),
            applied_at: Utc::now(),
            payment_status: payment_status.to_string(),
            payment_reference: None,
            paid_at: None,
            coupon_id: None,
            original_price: dec!(50000),
            discount_amount: dec!(0),
            final_price: dec!(50000),
        }
    }

    fn sample_user(user_id: Uuid) -> UserEntity {
        UserEntity {
            id: user_id,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "student".to_string(),
            admin_approved: true,
            reset_token: None,
            reset_token_expires: None,
            created_at: Utc::now(),
        }
    }

    fn sample_session(reference: &str) -> PaystackSession {
        PaystackSession {
            authorization_url: "https://checkout.paystack.com/abc123".to_string(),
            access_code: Some("abc123".to_string()),
            reference: reference.to_string(),
        }
    }

    #[allow(clippy::type_complexity)]
    fn reconciler(
        application_repo: MockApplicationRepository,
        coupon_repo: MockCouponRepository,
        course_repo: MockCourseRepository,
        user_repo: MockUserRepository,
        gateway: MockPaymentGateway,
    ) -> PaymentReconciler<
        MockApplicationRepository,
        MockCouponRepository,
        MockCourseRepository,
        MockUserRepository,
        MockPaymentGateway,
    > {
        let course_repo = Arc::new(course_repo);
        let coupon_engine = Arc::new(CouponEngine::new(
            Arc::new(coupon_repo),
            Arc::clone(&course_repo),
        ));

        PaymentReconciler::new(
            Arc::new(application_repo),
            course_repo,
            Arc::new(user_repo),
            coupon_engine,
            Arc::new(gateway),
            EmailNotifier::new(vec![]),
        )
    }

    #[tokio::test]
    async fn initialize_applies_coupon_and_stores_reference() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let application = sample_application(user_id, course_id, "pending");
        let application_id = application.id;
        let coupon = sample_coupon("CODE10");

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_find_by_id().returning(move |_| {
            let application = application.clone();
            Box::pin(async move { Ok(Some(application)) })
        });
        application_repo
            .expect_write_pricing_snapshot()
            .withf(move |id, snapshot| {
                *id == application_id
                    && snapshot.original_price == dec!(50000)
                    && snapshot.discount_amount == dec!(5000)
                    && snapshot.final_price == dec!(45000)
                    && snapshot.coupon_id.is_some()
            })
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));
        application_repo
            .expect_attach_payment_reference()
            .withf(|_, reference| reference.starts_with("PAY_"))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo.expect_find_active_by_code().returning(move |_| {
            let coupon = coupon.clone();
            Box::pin(async move { Ok(Some(coupon)) })
        });
        coupon_repo
            .expect_count_user_redemptions()
            .returning(|_, _| Box::pin(async move { Ok(0) }));

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id, dec!(50000));
            Box::pin(async move { Ok(Some(course)) })
        });

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_session()
            .withf(|email, amount, reference, _| {
                email == "ada@example.com" && *amount == dec!(45000) && reference.starts_with("PAY_")
            })
            .times(1)
            .returning(|_, _, reference, _| Ok(sample_session(reference)));

        let reconciler = reconciler(
            application_repo,
            coupon_repo,
            course_repo,
            MockUserRepository::new(),
            gateway,
        );

        let checkout = reconciler
            .initialize(
                application_id,
                user_id,
                "ada@example.com",
                Some("CODE10".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(checkout.final_price, dec!(45000));
        assert_eq!(checkout.discount_amount, dec!(5000));
        assert!(checkout.reference.starts_with("PAY_"));
        assert_eq!(
            checkout.authorization_url,
            "https://checkout.paystack.com/abc123"
        );
    }

    #[tokio::test]
    async fn initialize_rejects_completed_application() {
        let user_id = Uuid::new_v4();
        let application = sample_application(user_id, Uuid::new_v4(), "completed");
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_find_by_id().returning(move |_| {
            let application = application.clone();
            Box::pin(async move { Ok(Some(application)) })
        });

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            MockPaymentGateway::new(),
        );

        let result = reconciler
            .initialize(application_id, user_id, "ada@example.com", None)
            .await;

        assert!(matches!(result, Err(PaymentError::AlreadyCompleted)));
    }

    #[tokio::test]
    async fn initialize_allows_retry_after_failure() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let application = sample_application(user_id, course_id, "failed");
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_find_by_id().returning(move |_| {
            let application = application.clone();
            Box::pin(async move { Ok(Some(application)) })
        });
        application_repo
            .expect_write_pricing_snapshot()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));
        application_repo
            .expect_attach_payment_reference()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id, dec!(50000));
            Box::pin(async move { Ok(Some(course)) })
        });

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_session()
            .returning(|_, _, reference, _| Ok(sample_session(reference)));

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            course_repo,
            MockUserRepository::new(),
            gateway,
        );

        let checkout = reconciler
            .initialize(application_id, user_id, "ada@example.com", None)
            .await
            .unwrap();

        assert_eq!(checkout.final_price, dec!(50000));
        assert_eq!(checkout.discount_amount, dec!(0));
    }

    #[tokio::test]
    async fn initialize_rejects_non_owner() {
        let application = sample_application(Uuid::new_v4(), Uuid::new_v4(), "pending");
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_find_by_id().returning(move |_| {
            let application = application.clone();
            Box::pin(async move { Ok(Some(application)) })
        });

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            MockPaymentGateway::new(),
        );

        let result = reconciler
            .initialize(application_id, Uuid::new_v4(), "other@example.com", None)
            .await;

        assert!(matches!(result, Err(PaymentError::Forbidden)));
    }

    #[tokio::test]
    async fn initialize_rejects_whole_operation_on_bad_coupon() {
        let user_id = Uuid::new_v4();
        let application = sample_application(user_id, Uuid::new_v4(), "pending");
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_find_by_id().returning(move |_| {
            let application = application.clone();
            Box::pin(async move { Ok(Some(application)) })
        });
        // No snapshot write expectation: a coupon failure must not persist
        // anything.

        let mut coupon_repo = MockCouponRepository::new();
        coupon_repo
            .expect_find_active_by_code()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id, dec!(50000));
            Box::pin(async move { Ok(Some(course)) })
        });

        let reconciler = reconciler(
            application_repo,
            coupon_repo,
            course_repo,
            MockUserRepository::new(),
            MockPaymentGateway::new(),
        );

        let result = reconciler
            .initialize(
                application_id,
                user_id,
                "ada@example.com",
                Some("BOGUS".to_string()),
            )
            .await;

        assert!(matches!(
            result,
            Err(PaymentError::Coupon(CouponError::InvalidCode))
        ));
    }

    #[tokio::test]
    async fn initialize_keeps_snapshot_but_no_reference_on_gateway_outage() {
        let user_id = Uuid::new_v4();
        let application = sample_application(user_id, Uuid::new_v4(), "pending");
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo.expect_find_by_id().returning(move |_| {
            let application = application.clone();
            Box::pin(async move { Ok(Some(application)) })
        });
        application_repo
            .expect_write_pricing_snapshot()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));
        // expect_attach_payment_reference is intentionally absent: storing a
        // reference after a gateway failure would be a bug.

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id, dec!(50000));
            Box::pin(async move { Ok(Some(course)) })
        });

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_session()
            .returning(|_, _, _, _| Err(anyhow::anyhow!("connection reset by peer")));

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            course_repo,
            MockUserRepository::new(),
            gateway,
        );

        let result = reconciler
            .initialize(application_id, user_id, "ada@example.com", None)
            .await;

        assert!(matches!(result, Err(PaymentError::GatewayUnavailable(_))));
    }

    #[tokio::test]
    async fn verify_completes_and_redeems_once() {
        let user_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let mut application = sample_application(user_id, course_id, "pending");
        application.coupon_id = Some(Uuid::new_v4());
        application.discount_amount = dec!(5000);
        application.final_price = dec!(45000);
        application.payment_reference = Some("PAY_ABCDEF1234".to_string());
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let application = application.clone();
                Box::pin(async move { Ok(Some(application)) })
            });
        application_repo
            .expect_complete_payment()
            .withf(move |id, _| *id == application_id)
            .times(1)
            .returning(|_, _| {
                Box::pin(async move {
                    Ok(PaymentCommit {
                        newly_completed: true,
                        coupon_redeemed: true,
                    })
                })
            });

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |id| {
            let user = sample_user(id);
            Box::pin(async move { Ok(Some(user)) })
        });

        let mut course_repo = MockCourseRepository::new();
        course_repo.expect_find_by_id().returning(move |id| {
            let course = sample_course(id, dec!(50000));
            Box::pin(async move { Ok(Some(course)) })
        });

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_confirm_transaction().times(1).returning(|_| {
            Ok(PaystackConfirmation {
                succeeded: true,
                raw_status: "success".to_string(),
                amount_minor: Some(4_500_000),
            })
        });

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            course_repo,
            user_repo,
            gateway,
        );

        let outcome = reconciler
            .verify("PAY_ABCDEF1234", Some(user_id))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            VerifyOutcome::Completed {
                newly_completed: true,
                coupon_redeemed: true,
            }
        );
    }

    #[tokio::test]
    async fn verify_is_idempotent_for_completed_references() {
        let user_id = Uuid::new_v4();
        let mut application = sample_application(user_id, Uuid::new_v4(), "completed");
        application.payment_reference = Some("PAY_ABCDEF1234".to_string());

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let application = application.clone();
                Box::pin(async move { Ok(Some(application)) })
            });
        application_repo
            .expect_complete_payment()
            .times(1)
            .returning(|_, _| {
                Box::pin(async move {
                    Ok(PaymentCommit {
                        newly_completed: false,
                        coupon_redeemed: false,
                    })
                })
            });
        // No user/course expectations: a repeated verify must not send a
        // second confirmation email.

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_confirm_transaction().returning(|_| {
            Ok(PaystackConfirmation {
                succeeded: true,
                raw_status: "success".to_string(),
                amount_minor: None,
            })
        });

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            gateway,
        );

        let outcome = reconciler
            .verify("PAY_ABCDEF1234", Some(user_id))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            VerifyOutcome::Completed {
                newly_completed: false,
                coupon_redeemed: false,
            }
        );
    }

    #[tokio::test]
    async fn verify_marks_failed_on_declined_transaction() {
        let user_id = Uuid::new_v4();
        let mut application = sample_application(user_id, Uuid::new_v4(), "pending");
        application.payment_reference = Some("PAY_ABCDEF1234".to_string());
        let application_id = application.id;

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let application = application.clone();
                Box::pin(async move { Ok(Some(application)) })
            });
        application_repo
            .expect_mark_payment_failed()
            .withf(move |id| *id == application_id)
            .times(1)
            .returning(|_| Box::pin(async move { Ok(()) }));

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_confirm_transaction().returning(|_| {
            Ok(PaystackConfirmation {
                succeeded: false,
                raw_status: "abandoned".to_string(),
                amount_minor: None,
            })
        });

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            gateway,
        );

        let outcome = reconciler
            .verify("PAY_ABCDEF1234", Some(user_id))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            VerifyOutcome::Failed {
                raw_status: "abandoned".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn verify_leaves_state_untouched_on_transport_error() {
        let user_id = Uuid::new_v4();
        let mut application = sample_application(user_id, Uuid::new_v4(), "pending");
        application.payment_reference = Some("PAY_ABCDEF1234".to_string());

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let application = application.clone();
                Box::pin(async move { Ok(Some(application)) })
            });
        // No complete_payment/mark_payment_failed expectations: a transport
        // error must not mutate the application.

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_confirm_transaction()
            .returning(|_| Err(anyhow::anyhow!("request timed out")));

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            gateway,
        );

        let result = reconciler.verify("PAY_ABCDEF1234", Some(user_id)).await;

        assert!(matches!(result, Err(PaymentError::GatewayUnavailable(_))));
    }

    #[tokio::test]
    async fn verify_rejects_unknown_reference() {
        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_reference()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            MockPaymentGateway::new(),
        );

        let result = reconciler.verify("PAY_UNKNOWN123", None).await;

        assert!(matches!(result, Err(PaymentError::ApplicationNotFound)));
    }

    #[tokio::test]
    async fn verify_enforces_ownership_when_caller_is_known() {
        let mut application = sample_application(Uuid::new_v4(), Uuid::new_v4(), "pending");
        application.payment_reference = Some("PAY_ABCDEF1234".to_string());

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_find_by_reference()
            .returning(move |_| {
                let application = application.clone();
                Box::pin(async move { Ok(Some(application)) })
            });

        let reconciler = reconciler(
            application_repo,
            MockCouponRepository::new(),
            MockCourseRepository::new(),
            MockUserRepository::new(),
            MockPaymentGateway::new(),
        );

        let result = reconciler
            .verify("PAY_ABCDEF1234", Some(Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(PaymentError::Forbidden)));
    }

    #[test]
    fn references_are_opaque_and_prefixed() {
        let reference = PaymentReconciler::<
            MockApplicationRepository,
            MockCouponRepository,
            MockCourseRepository,
            MockUserRepository,
            MockPaymentGateway,
        >::generate_reference();

        assert!(reference.starts_with("PAY_"));
        assert_eq!(reference.len(), 14);
        assert!(
            reference[4..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }
}

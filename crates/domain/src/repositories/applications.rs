use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::entities::applications::{ApplicationEntity, InsertApplicationEntity};
use crate::value_objects::payments::{PaymentCommit, PricingSnapshot};

#[async_trait]
#[automock]
pub trait ApplicationRepository {
    async fn create(&self, application: InsertApplicationEntity) -> Result<Uuid>;

    async fn find_by_id(&self, application_id: Uuid) -> Result<Option<ApplicationEntity>>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<ApplicationEntity>>;

    /// Latest application of this user for this course that still awaits
    /// payment, if any. Used to avoid piling up duplicate applications.
    async fn find_awaiting_payment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<ApplicationEntity>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ApplicationEntity>>;

    async fn write_pricing_snapshot(
        &self,
        application_id: Uuid,
        snapshot: PricingSnapshot,
    ) -> Result<()>;

    /// Stores the gateway reference and resets the payment status to pending,
    /// arming the application for verification.
    async fn attach_payment_reference(&self, application_id: Uuid, reference: &str) -> Result<()>;

    /// Atomically flips the application to `completed` (only if it is not
    /// already completed) and, when a coupon is attached, increments the
    /// coupon's `used_count` (only while under `usage_limit`) and records a
    /// single usage row. All of it commits in one transaction.
    async fn complete_payment(
        &self,
        application_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<PaymentCommit>;

    /// Marks the payment failed unless it already completed.
    async fn mark_payment_failed(&self, application_id: Uuid) -> Result<()>;

    async fn delete_for_user(&self, user_id: Uuid) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

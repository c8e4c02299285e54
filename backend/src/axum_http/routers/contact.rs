use crate::{
    axum_http::error_responses::error_response,
    config::config_model::DotEnvyConfig,
    usecases::contact::ContactUseCase,
};
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use domain::{
    entities::contact_messages::InsertContactMessageEntity,
    repositories::contact_messages::ContactMessageRepository,
};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::contact_messages::ContactMessagePostgres,
};
use notifications::notifier::EmailNotifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    notifier: EmailNotifier,
) -> Router {
    let message_repository = ContactMessagePostgres::new(Arc::clone(&db_pool));
    let contact_usecase = ContactUseCase::new(
        Arc::new(message_repository),
        notifier,
        config.mail.contact_email.clone(),
    );

    Router::new()
        .route("/", post(submit_message))
        .with_state(Arc::new(contact_usecase))
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: Uuid,
}

pub async fn submit_message<M>(
    State(usecase): State<Arc<ContactUseCase<M>>>,
    Json(body): Json<ContactRequest>,
) -> impl IntoResponse
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    let message = InsertContactMessageEntity {
        name: body.name,
        email: body.email,
        subject: body.subject,
        message: body.message,
    };

    match usecase.submit(message).await {
        Ok(id) => (StatusCode::CREATED, Json(ContactResponse { id })).into_response(),
        Err(err) => {
            error!(error = ?err, "contact: failed to store message");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

use crate::{
    auth::AdminUser, axum_http::error_responses::error_response,
    usecases::admin_messages::MessageAdminUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use domain::repositories::contact_messages::ContactMessageRepository;
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::contact_messages::ContactMessagePostgres,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let message_repository = ContactMessagePostgres::new(Arc::clone(&db_pool));
    let message_admin_usecase = MessageAdminUseCase::new(Arc::new(message_repository));

    Router::new()
        .route("/", get(list_messages))
        .route("/:message_id", delete(delete_message))
        .route("/:message_id/mark-read", post(mark_message_read))
        .with_state(Arc::new(message_admin_usecase))
}

pub async fn list_messages<M>(
    State(usecase): State<Arc<MessageAdminUseCase<M>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    match usecase.list().await {
        Ok(messages) => Json(messages).into_response(),
        Err(err) => {
            error!(error = ?err, "admin messages: failed to list messages");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn mark_message_read<M>(
    State(usecase): State<Arc<MessageAdminUseCase<M>>>,
    _admin: AdminUser,
    Path(message_id): Path<Uuid>,
) -> impl IntoResponse
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    match usecase.mark_read(message_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%message_id, error = ?err, "admin messages: failed to mark read");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn delete_message<M>(
    State(usecase): State<Arc<MessageAdminUseCase<M>>>,
    _admin: AdminUser,
    Path(message_id): Path<Uuid>,
) -> impl IntoResponse
where
    M: ContactMessageRepository + Send + Sync + 'static,
{
    match usecase.delete(message_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(%message_id, error = ?err, "admin messages: failed to delete");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use infra::db::postgres::postgres_connection::PgPoolSquad;
use notifications::{notifier::EmailNotifier, smtp::SmtpMailProvider};
use payments::paystack_client::PaystackClient;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let mail_provider = SmtpMailProvider::new(
        &config.mail.server,
        config.mail.port,
        config.mail.username.clone(),
        config.mail.password.clone(),
        &config.mail.from_address,
    )?;
    let notifier = EmailNotifier::new(vec![Arc::new(mail_provider)]);

    let callback_url = format!("{}/api/v1/payments/callback", config.base_url);
    let paystack_client = Arc::new(PaystackClient::new(
        config.paystack.secret_key.clone(),
        callback_url,
    )?);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/courses",
            routers::courses::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/applications",
            routers::applications::routes(Arc::clone(&db_pool), notifier.clone()),
        )
        .nest(
            "/api/v1/coupons",
            routers::coupons::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/payments",
            routers::payments::routes(
                Arc::clone(&db_pool),
                Arc::clone(&paystack_client),
                notifier.clone(),
            ),
        )
        .nest(
            "/api/v1/contact",
            routers::contact::routes(Arc::clone(&db_pool), Arc::clone(&config), notifier.clone()),
        )
        .nest(
            "/api/v1/accounts",
            routers::accounts::routes(Arc::clone(&db_pool), Arc::clone(&config), notifier.clone()),
        )
        .nest(
            "/api/v1/admin/courses",
            routers::admin_courses::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin/users",
            routers::admin_users::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin/messages",
            routers::admin_messages::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin/coupons",
            routers::admin_coupons::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin/dashboard",
            routers::admin_dashboard::routes(Arc::clone(&db_pool)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

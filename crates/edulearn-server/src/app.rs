use crate::permissions::extract;
use crate::{AppConfig, routes};
use axum::routing::get;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayerBuilder;
use http::{Method, header};
use protect_axum::GrantsLayer;
use sea_orm::DatabaseConnection;
use sentry_tower::NewSentryLayer;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub fn create_app(
    app_config: AppConfig,
    origins: &[String],
    media_url: &str,
    seaorm_pool: DatabaseConnection,
) -> anyhow::Result<Router> {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayerBuilder::new()
        .with_prefix("api")
        .with_default_metrics()
        .build_pair();

    let app = create_router(app_config, origins, media_url, seaorm_pool)?
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(
            // ServiceBuilder layers are called top to bottom
            ServiceBuilder::new()
                .layer(NewSentryLayer::new_from_top())
                .layer(sentry_tower::SentryHttpLayer::with_transaction())
                .layer(prometheus_layer),
        );
    Ok(app)
}

/// All routes with their extensions, without the process wide metrics recorder.
pub(crate) fn create_router(
    app_config: AppConfig,
    origins: &[String],
    media_url: &str,
    seaorm_pool: DatabaseConnection,
) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(origins.iter().map(|origin| origin.parse()).collect::<Result<Vec<_>, _>>()?)
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(3600));

    let mut app = Router::new()
        .merge(routes::swagger::create_router())
        .merge(routes::global::create_router())
        .nest(
            "/api/v1",
            Router::new()
                .nest("/status", routes::api::v1::status::create_router())
                .nest("/users", routes::api::v1::users::create_router())
                .nest("/courses", routes::api::v1::courses::create_router())
                .nest("/ai", routes::api::v1::ai::create_router())
                .layer(cors),
        );

    // absolute media urls point to a separate file server
    let media_path = media_url.trim_end_matches('/');
    if media_path.starts_with('/') {
        tracing::info!(path = media_path, root = ?app_config.media().base_path(), "serving media files");
        app = app.nest_service(media_path, ServeDir::new(app_config.media().base_path()));
    }

    let app = app
        .layer(
            // Router layers are called bottom to top
            // ServiceBuilder layers are called top to bottom
            ServiceBuilder::new()
                .layer(Extension(app_config))
                .layer(Extension(seaorm_pool))
                .layer(GrantsLayer::with_extractor(extract)),
        )
        .with_state(());
    Ok(app)
}

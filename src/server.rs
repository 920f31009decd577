//! Router assembly and server startup.

use std::sync::Arc;

use axum::{
    middleware,
    response::Redirect,
    routing::{any, get},
    Router,
};
use console_auth::{
    session_gate_middleware, HttpSessionResolver, Session, SessionGate, SessionResolver,
    StaticSessionResolver, User,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use url::Url;

use crate::{
    config::ConsoleConfig,
    middleware::{edge_interceptor_middleware, EdgeInterceptor},
    routes::{pages, proxy_upload, UploadProxy},
};

/// Build the console router.
///
/// Layering, outermost first: request id, tracing, edge interceptor, routing. The
/// session gate wraps only the protected sections. The configuration is validated
/// first, so route patterns or colliding paths come back as errors.
pub fn build_app(
    config: &ConsoleConfig,
    resolver: Arc<dyn SessionResolver>,
) -> anyhow::Result<Router> {
    config.validate()?;
    let edge = config.edge_config()?;
    let gate = SessionGate::new(resolver, config.gate_config());

    let backend = config
        .upload_backend_url
        .as_deref()
        .map(Url::parse)
        .transpose()?;
    let proxy = UploadProxy::new(backend, edge.prefix(), config.upload_timeout)?;

    let protected = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/users", get(pages::users))
        .route("/lenders", get(pages::lenders))
        .route("/bookings", get(pages::bookings))
        .route("/disputes", get(pages::disputes))
        .route_layer(middleware::from_fn_with_state(gate, session_gate_middleware));

    let upload = Router::new()
        .route(edge.prefix(), any(proxy_upload))
        .route(&format!("{}/{{*path}}", edge.prefix()), any(proxy_upload))
        .with_state(proxy);

    let app = Router::new()
        .route("/", get(|| async { Redirect::temporary("/dashboard") }))
        .route(&config.sign_in_path, get(pages::sign_in_page))
        .route("/health", get(pages::health))
        .merge(protected)
        .merge(upload)
        .layer(middleware::from_fn_with_state(
            EdgeInterceptor::new(edge),
            edge_interceptor_middleware,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    Ok(app)
}

/// Pick the session source: the auth provider when configured, otherwise the
/// fixed development session.
pub fn session_resolver(config: &ConsoleConfig) -> anyhow::Result<Arc<dyn SessionResolver>> {
    match &config.auth_url {
        Some(auth_url) => Ok(Arc::new(HttpSessionResolver::new(
            auth_url,
            config.session_timeout,
        )?)),
        None => Ok(Arc::new(StaticSessionResolver::new(Some(dev_session())))),
    }
}

fn dev_session() -> Session {
    Session::for_user(User {
        id: Some("dev".to_string()),
        name: Some("Developer".to_string()),
        email: Some("dev@localhost".to_string()),
        image: None,
    })
}

pub async fn startup(config: ConsoleConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = config.bind_addr()?;

    let resolver = session_resolver(&config)?;
    let app = build_app(&config, resolver)?;

    if config.dev_session && config.auth_url.is_none() {
        warn!("Dev session enabled, every request is signed in as the development user");
    }
    info!(
        %addr,
        upload_prefix = %config.upload_prefix,
        sign_in_path = %config.sign_in_path,
        upload_backend = config.upload_backend_url.as_deref().unwrap_or("none"),
        "Starting admin console"
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Admin console stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

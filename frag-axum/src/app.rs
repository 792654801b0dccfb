use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;
use crate::FragmentsState;

/// Upstream request-size limit (5 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 5 * 1024 * 1024;

pub struct FragmentsApp {
    pub state: FragmentsState,
    pub router: Router<()>,
}

impl FragmentsApp {
    pub fn new(state: FragmentsState) -> Self {
        Self::with_body_limit(state, DEFAULT_BODY_LIMIT)
    }

    pub fn with_body_limit(state: FragmentsState, max_body_bytes: usize) -> Self {
        let router = Router::new()
            .route("/", get(routes::health))
            .nest("/v1", routes::v1_router())
            .fallback(routes::not_found)
            .layer(DefaultBodyLimit::max(max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
            .with_state(state.clone());

        Self { state, router }
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "fragments listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

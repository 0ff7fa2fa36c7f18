//! Axum http server factory. Axum provides routing capability on top of Hyper HTTP.
use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQLRequest;
use async_graphql_axum::GraphQLResponse;
use axum::extract::State;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use futures::channel::oneshot;
use futures::prelude::*;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::configuration::check_route_path;
use crate::configuration::Configuration;
use crate::configuration::ConfigurationError;
use crate::error::ContactsError;
use crate::graphql::build_schema;
use crate::graphql::ContactsSchema;
use crate::http_server_factory::HttpServerHandle;
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum HealthStatus {
    Up,
}

#[derive(Debug, Serialize)]
struct Health {
    status: HealthStatus,
}

pub(crate) fn make_axum_router(
    schema: ContactsSchema,
    configuration: &Configuration,
) -> Result<Router, ContactsError> {
    // builders skip `validate_configuration`, and axum panics on capture syntax
    let graphql_path = configuration.server.graphql_path.as_str();
    check_route_path("invalid 'server.graphql_path' configuration", graphql_path)?;
    let graphql_route = if configuration.server.landing_page {
        let landing_page = GraphiQLSource::build().endpoint(graphql_path).finish();
        get(move || future::ready(Html(landing_page))).post(handle_post)
    } else {
        post(handle_post)
    };

    let mut router = Router::new().route(graphql_path, graphql_route);

    if configuration.health_check.enabled {
        check_route_path(
            "invalid 'health_check.path' configuration",
            &configuration.health_check.path,
        )?;
        router = router.route(
            &configuration.health_check.path,
            get(|| async {
                Json(Health {
                    status: HealthStatus::Up,
                })
            }),
        );
    }

    let cors = configuration.cors.clone().into_layer().map_err(|error| {
        ConfigurationError::InvalidConfiguration {
            message: "invalid 'cors' configuration",
            error: error.to_string(),
        }
    })?;

    Ok(router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(schema))
}

async fn handle_post(
    State(schema): State<ContactsSchema>,
    request: GraphQLRequest,
) -> impl IntoResponse {
    GraphQLResponse::from(schema.execute(request.into_inner()).await)
}

/// Binds the configured address and serves the contacts API on it.
///
/// The returned handle carries the address actually bound, which differs from the
/// configured one when port 0 was asked for.
pub async fn serve(
    configuration: Arc<Configuration>,
    store: RecordStore,
) -> Result<HttpServerHandle, ContactsError> {
    let schema = build_schema(store, &configuration);
    let router = make_axum_router(schema, &configuration)?;

    let listener = TcpListener::bind(configuration.listen().socket_addr())
        .await
        .map_err(ContactsError::ServerCreationError)?;
    let actual_listen_address = listener
        .local_addr()
        .map_err(ContactsError::ServerCreationError)?;

    let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        // a dropped sender also means shutdown
        let _ = shutdown_receiver.await;
    });
    let server_future = tokio::spawn(async move { server.await })
        .map(|result| match result {
            Ok(served) => served.map_err(ContactsError::HttpServerError),
            Err(err) => {
                tracing::error!("http server task failed: {}", err);
                Err(ContactsError::HttpServerLifecycleError)
            }
        })
        .boxed();

    tracing::debug!(
        address = %actual_listen_address,
        graphql_path = %configuration.graphql_path(),
        "http server listening"
    );
    Ok(HttpServerHandle::new(
        shutdown_sender,
        server_future,
        actual_listen_address.into(),
    ))
}

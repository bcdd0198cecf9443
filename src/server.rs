//! HTTP endpoint polled by the map front-end.
//!
//! `GET /bus_data.geojson?bus=<id>` always answers `200 OK` with a GeoJSON
//! `FeatureCollection`; upstream trouble shows up as an empty collection.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::fetch::{FeedFetcher, HttpClient};
use crate::geojson::FeatureCollection;
use crate::snapshot::SnapshotWriter;

pub const BUS_DATA_PATH: &str = "/bus_data.geojson";

/// Query string of the bus data endpoint.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BusQuery {
    /// Vehicle id or route id to keep.
    pub bus: Option<String>,
}

impl BusQuery {
    /// The filter criterion. `?bus=` is a criterion that matches nothing.
    pub fn filter(&self) -> Option<&str> {
        self.bus.as_deref()
    }
}

/// Builds the query from raw key/value pairs; the first `bus` wins.
impl FromIterator<(String, String)> for BusQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let bus = iter
            .into_iter()
            .find_map(|(key, value)| (key == "bus").then_some(value));
        Self { bus }
    }
}

/// Shared handler state: the fetcher and the snapshot writer.
pub struct AppState<C> {
    fetcher: Arc<FeedFetcher<C>>,
    snapshot: Arc<SnapshotWriter>,
}

// Manual impl so `C` itself does not need to be `Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<C: HttpClient> AppState<C> {
    pub fn new(fetcher: FeedFetcher<C>, snapshot: SnapshotWriter) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            snapshot: Arc::new(snapshot),
        }
    }

    /// One full cycle: fetch, transform, save the snapshot.
    ///
    /// A snapshot failure is logged and does not affect the returned
    /// collection.
    pub async fn refresh(&self, filter: Option<&str>) -> FeatureCollection {
        let collection = self.fetcher.fetch_and_transform(filter).await;

        let snapshot = Arc::clone(&self.snapshot);
        let saved = collection.clone();
        let write = tokio::task::spawn_blocking(move || snapshot.persist_or_log(&saved));
        if let Err(e) = write.await {
            error!(error = %e, kind = "persistence_failure", "Snapshot task failed");
        }
        collection
    }

    pub fn snapshot(&self) -> &SnapshotWriter {
        &self.snapshot
    }
}

pub fn router<C: HttpClient + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route(BUS_DATA_PATH, get(bus_data::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `listener` until Ctrl+C.
pub async fn serve<C: HttpClient + 'static>(
    listener: TcpListener,
    state: AppState<C>,
) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr().ok(), "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn bus_data<C: HttpClient + 'static>(
    State(state): State<AppState<C>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> (StatusCode, Json<FeatureCollection>) {
    let query: BusQuery = match query {
        Ok(Query(pairs)) => pairs.into_iter().collect(),
        Err(rejection) => {
            warn!(error = %rejection, "Undecodable query string, serving unfiltered data");
            BusQuery::default()
        }
    };

    let collection = state.refresh(query.filter()).await;
    (StatusCode::OK, Json(collection))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

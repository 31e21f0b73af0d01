//! HTTP surface over the presence cache.
//!
//! Every route is a thin read of the snapshot API; the only write path is
//! the debug control routes, which are registered only in debug mode.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use common::{Error, PresenceSnapshot};
use presence::{BusinessHours, PollerControls, PresenceCache};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<PresenceCache>,
    pub hours: Arc<BusinessHours>,
    pub controls: Arc<PollerControls>,
}

impl AppState {
    async fn snapshot(&self) -> PresenceSnapshot {
        self.cache
            .snapshot(Utc::now(), &self.hours, &self.controls)
            .await
    }
}

/// Build the router; debug control routes exist only when `debug` is set.
pub fn router(state: AppState, debug: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/presence", get(presence))
        .route("/healthz", get(healthz));

    if debug {
        router = router
            .route("/debug/pause", get(debug_pause))
            .route("/debug/resume", get(debug_resume))
            .route("/debug/fail-next", get(debug_fail_next))
            .route("/debug/force-open", get(debug_force_open))
            .route("/debug/force-closed", get(debug_force_closed))
            .route("/debug/clear-overrides", get(debug_clear_overrides));
    }

    router.with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(bind_addr: &str, router: Router) -> Result<(), Error> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| Error::Config(format!("invalid bind_addr '{}': {}", bind_addr, e)))?;

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn index(State(state): State<AppState>) -> Json<PresenceSnapshot> {
    Json(state.snapshot().await)
}

async fn presence(State(state): State<AppState>) -> Response {
    if state.controls.take_fail_next() {
        warn!("Returning 503 for /presence (debug flag)");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(state.snapshot().await).into_response()
}

async fn healthz() -> &'static str {
    "ok\n"
}

async fn debug_pause(State(state): State<AppState>) -> &'static str {
    state.controls.pause();
    info!("Debug: poller paused");
    "Poller paused. Reset with /debug/resume\n"
}

async fn debug_resume(State(state): State<AppState>) -> &'static str {
    state.controls.resume();
    info!("Debug: poller resumed");
    "Poller resumed.\n"
}

async fn debug_fail_next(State(state): State<AppState>) -> &'static str {
    state.controls.arm_fail_next();
    info!("Debug: next /presence request will return 503");
    "Next /presence request will return 503.\n"
}

async fn debug_force_open(State(state): State<AppState>) -> &'static str {
    state.controls.force_open();
    info!("Debug: schedule forced open");
    "Schedule forced open. Reset with /debug/clear-overrides\n"
}

async fn debug_force_closed(State(state): State<AppState>) -> &'static str {
    state.controls.force_closed();
    info!("Debug: schedule forced closed");
    "Schedule forced closed. Reset with /debug/clear-overrides\n"
}

async fn debug_clear_overrides(State(state): State<AppState>) -> &'static str {
    state.controls.clear_override();
    info!("Debug: schedule overrides cleared");
    "Schedule overrides cleared.\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use common::config::ScheduleConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            cache: Arc::new(PresenceCache::new(120)),
            hours: Arc::new(BusinessHours::from_config(&ScheduleConfig::default()).unwrap()),
            controls: Arc::new(PollerControls::new()),
        }
    }

    async fn get_status(router: &Router, uri: &str) -> StatusCode {
        let resp = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        resp.status()
    }

    async fn get_snapshot(router: &Router, uri: &str) -> PresenceSnapshot {
        let resp = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_presence_serves_snapshot_json() {
        let router = router(state(), false);

        let snap = get_snapshot(&router, "/presence").await;
        assert!(!snap.ready);
        assert!(!snap.is_stale);
        assert!(snap.employees.is_empty());

        assert_eq!(get_status(&router, "/healthz").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fail_next_503_exactly_once() {
        let router = router(state(), true);

        assert_eq!(get_status(&router, "/debug/fail-next").await, StatusCode::OK);
        assert_eq!(
            get_status(&router, "/presence").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(get_status(&router, "/presence").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_debug_routes_absent_without_debug_mode() {
        let router = router(state(), false);
        assert_eq!(
            get_status(&router, "/debug/pause").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(&router, "/debug/fail-next").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_force_closed_reflected_in_snapshot() {
        let router = router(state(), true);

        assert_eq!(
            get_status(&router, "/debug/force-closed").await,
            StatusCode::OK
        );
        let snap = get_snapshot(&router, "/presence").await;
        assert!(!snap.is_open);

        assert_eq!(
            get_status(&router, "/debug/force-open").await,
            StatusCode::OK
        );
        let snap = get_snapshot(&router, "/presence").await;
        assert!(snap.is_open);

        assert_eq!(
            get_status(&router, "/debug/clear-overrides").await,
            StatusCode::OK
        );
    }
}

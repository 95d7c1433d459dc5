use std::time::Instant;
use warp::filters::BoxedFilter;
use warp::http::{Method, StatusCode};
use warp::reply::Response;
use warp::Filter;

/// Wraps `routes` so every request is logged on arrival and on completion
/// with its status and duration.
pub fn with_request_logging(routes: BoxedFilter<(Response,)>) -> BoxedFilter<(Response,)> {
    warp::any()
        .and(warp::path::full())
        .and(warp::method())
        .map(|path: warp::path::FullPath, method: Method| {
            tracing::debug!(path = %path.as_str(), method = %method, "incoming request");
            (path.as_str().to_string(), method, Instant::now())
        })
        .and(routes)
        .map(|(path, method, start): (String, Method, Instant), response: Response| {
            let duration_ms = start.elapsed().as_millis();
            log_response(response.status(), &path, method.as_str(), duration_ms);
            response
        })
        .boxed()
}

/// Logs a finished request at a level matching its status class.
pub fn log_response(status: StatusCode, path: &str, method: &str, duration_ms: u128) {
    if status.is_server_error() {
        tracing::error!(
            status = status.as_u16(),
            path,
            method,
            duration_ms,
            "request completed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            status = status.as_u16(),
            path,
            method,
            duration_ms,
            "request completed"
        );
    } else {
        tracing::info!(
            status = status.as_u16(),
            path,
            method,
            duration_ms,
            "request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TestLogSubscriber;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;
    use warp::Reply;

    fn routes() -> BoxedFilter<(Response,)> {
        let ok = warp::path!("ok")
            .and(warp::get())
            .map(|| warp::reply::json(&"fine").into_response());
        let missing = warp::path!("missing").map(|| {
            warp::reply::with_status("gone", StatusCode::NOT_FOUND).into_response()
        });
        ok.or(missing).unify().boxed()
    }

    #[tokio::test]
    async fn logs_arrival_and_completion() {
        let subscriber = TestLogSubscriber::new();
        let registry = Registry::default().with(subscriber.clone().into_layer::<Registry>());
        let _guard = tracing::subscriber::set_default(registry);

        let response = warp::test::request()
            .method("GET")
            .path("/ok")
            .reply(&with_request_logging(routes()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let entries = subscriber.entries();
        assert!(entries
            .iter()
            .any(|e| e.level == Level::DEBUG && e.message.contains("incoming request")));
        let done = entries
            .iter()
            .find(|e| e.message.contains("request completed"))
            .expect("completion logged");
        assert_eq!(done.level, Level::INFO);
        assert_eq!(done.field("status"), Some("200"));
        assert_eq!(done.field("path"), Some("/ok"));
    }

    #[tokio::test]
    async fn client_errors_log_as_warnings() {
        let subscriber = TestLogSubscriber::new();
        let registry = Registry::default().with(subscriber.clone().into_layer::<Registry>());
        let _guard = tracing::subscriber::set_default(registry);

        let response = warp::test::request()
            .path("/missing")
            .reply(&with_request_logging(routes()))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert!(subscriber
            .entries()
            .iter()
            .any(|e| e.level == Level::WARN && e.field("status") == Some("404")));
    }

    #[test]
    fn server_errors_log_as_errors() {
        let subscriber = TestLogSubscriber::new();
        let registry = Registry::default().with(subscriber.clone().into_layer::<Registry>());
        tracing::subscriber::with_default(registry, || {
            log_response(StatusCode::INTERNAL_SERVER_ERROR, "/api/hands", "GET", 3);
        });

        let entries = subscriber.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::ERROR);
        assert_eq!(entries[0].field("method"), Some("GET"));
    }
}

use axum::{
    extract::Query,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use error::ServiceError;
use fetch::fetch_data;
use request_context::RequestContext;
use reqwest::{
    header::{self, HeaderName},
    StatusCode,
};
use serde_json::json;
use std::{env, net::SocketAddr};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod error;
mod fetch;
mod optimize;
mod request_context;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = SocketAddr::new(
        "0.0.0.0".parse().unwrap(),
        env::var("PORT").unwrap_or("3080".into()).parse().unwrap(),
    );
    tracing::info!("Image Optimizer starting on {addr}");
    axum::Server::bind(&addr)
        .serve(router().into_make_service())
        .await
        .unwrap();
}

fn router() -> Router {
    Router::new()
        // anything other than GET on the route is a 404, not a 405
        .route("/optimize-image", get(handle).fallback(not_found))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response()
}

#[axum_macros::debug_handler]
async fn handle(Query(ctx): Query<RequestContext>) -> Result<Response, ServiceError> {
    let params = ctx.validate()?;

    // download image
    let bytes = fetch_data(&params.url).await?;

    // decode image and determine the output format
    let image = optimize::inspect(&bytes)?;
    let format = optimize::detect_format(&bytes)?;

    // resize, each directive judged against the native dimensions
    let plan = optimize::plan_resizes(
        image.width(),
        image.height(),
        params.width,
        params.height,
    );
    let image = optimize::apply(image, &plan);

    let encoded = optimize::encode(&image, format, params.quality)?;

    Ok((
        [
            (header::CONTENT_TYPE, optimize::content_type_for(format)),
            (
                HeaderName::from_static("content-transfer-encoding"),
                "base64".to_string(),
            ),
        ],
        BASE64.encode(encoded),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let request = Request::builder()
            .uri("/something-else")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Not found" }));
    }

    #[tokio::test]
    async fn wrong_method_is_not_found() {
        let request = Request::builder()
            .method("POST")
            .uri("/optimize-image?url=http%3A%2F%2Fexample.com%2Fa.jpg&w=10&h=10")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Not found" }));
    }

    #[tokio::test]
    async fn absent_query_is_a_bad_request() {
        let request = Request::builder()
            .uri("/optimize-image")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Required Query Parameters Missing" }));
    }

    #[tokio::test]
    async fn partial_query_is_a_bad_request() {
        let request = Request::builder()
            .uri("/optimize-image?url=http%3A%2F%2Fexample.com%2Fa.jpg&w=10")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Required Query Parameters Missing" }));
    }
}

//! Drop-in replacements for axum's `Json`, `Query` and `Path` whose
//! rejections render the standard error envelope with a 400 status.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON with the wrong shape.
            JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
            other => AppError::bad_request(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Login {
        username: String,
    }

    async fn extract_json(content_type: Option<&str>, body: &'static str) -> Result<Json<Login>, AppError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        Json::<Login>::from_request(builder.body(Body::from(body)).unwrap(), &()).await
    }

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let Json(login) = extract_json(Some("application/json"), r#"{"username":"root"}"#)
            .await
            .unwrap();
        assert_eq!(login.username, "root");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let err = extract_json(Some("application/json"), "{not json").await.unwrap_err();
        let (status, value) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E0006");
    }

    #[tokio::test]
    async fn wrong_field_type_is_validation_error() {
        let err = extract_json(Some("application/json"), r#"{"username":5}"#).await.unwrap_err();
        let (status, value) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"]["code"], "E0002");
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let err = extract_json(None, r#"{"username":"root"}"#).await.unwrap_err();
        let (status, value) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"]["code"], "E0006");
    }

    #[tokio::test]
    async fn bad_query_is_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Params {
            #[allow(dead_code)]
            size: u32,
        }

        let request = Request::builder().uri("/?size=huge").body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let err = Query::<Params>::from_request_parts(&mut parts, &()).await.unwrap_err();
        let (status, value) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"]["code"], "E0006");
    }
}

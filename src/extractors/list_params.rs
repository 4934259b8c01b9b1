//! Grid parameters merged from the query string and a form or JSON body.

use crate::error::AppError;
use async_trait::async_trait;
use axum::extract::{FromRequest, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// All request parameters by name. Query string values win over body values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListParams(pub HashMap<String, Value>);

#[derive(Clone, Copy, Debug, PartialEq)]
enum BodyKind {
    Json,
    Form,
    None,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type.starts_with("application/json") {
        BodyKind::Json
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else {
        BodyKind::None
    }
}

#[async_trait]
impl<S> FromRequest<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query: HashMap<String, String> = match req.uri().query() {
            Some(_) => Query::try_from_uri(req.uri())
                .map(|Query(q)| q)
                .map_err(|e| AppError::BadRequest(e.body_text()))?,
            None => HashMap::new(),
        };

        let mut params: HashMap<String, Value> = match body_kind(&req) {
            BodyKind::Json => {
                let Json(body) = Json::<Map<String, Value>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                body.into_iter().collect()
            }
            BodyKind::Form => {
                let Form(body) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                body.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
            }
            BodyKind::None => HashMap::new(),
        };
        params.extend(query.into_iter().map(|(k, v)| (k, Value::String(v))));
        Ok(ListParams(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;
    use serde_json::json;

    async fn extract(req: Request) -> Result<ListParams, AppError> {
        ListParams::from_request(req, &()).await
    }

    #[tokio::test]
    async fn form_body_and_query_are_merged() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/settings/glossary?xaction=create")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("data=%7B%22text%22%3A%22a%22%7D&xaction=update"))
            .unwrap();
        let ListParams(params) = extract(req).await.unwrap();
        assert_eq!(params["data"], json!(r#"{"text":"a"}"#));
        assert_eq!(params["xaction"], json!("create"));
    }

    #[tokio::test]
    async fn json_body_keeps_structured_values() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/settings/glossary")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"xaction":"create","data":{"text":"a"}}"#))
            .unwrap();
        let ListParams(params) = extract(req).await.unwrap();
        assert_eq!(params["data"], json!({"text": "a"}));
    }

    #[tokio::test]
    async fn broken_json_body_is_a_bad_request() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/settings/glossary")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .unwrap();
        assert!(matches!(extract(req).await, Err(AppError::BadRequest(_))));
    }
}

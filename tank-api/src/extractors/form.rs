//! Form-value extractor for the image cache endpoints.
//!
//! The endpoints accept their parameters the way an HTML form submits them:
//! in the query string, and on POST also in an
//! `application/x-www-form-urlencoded` body. `FormParams<T>` merges both.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts, Method},
    Form,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Parameters from the query string and, on POST, a urlencoded body.
///
/// Body values win over query values, and the first occurrence of a
/// repeated key wins. Fields of `T` must deserialize from strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormParams<T>(pub T);

type Pairs = Vec<(String, String)>;

fn has_form_body(parts: &Parts) -> bool {
    parts.method != Method::GET
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| {
                ct.trim_start()
                    .to_ascii_lowercase()
                    .starts_with("application/x-www-form-urlencoded")
            })
}

fn insert_first(values: &mut Map<String, Value>, pairs: Pairs) {
    for (key, value) in pairs {
        values.entry(key).or_insert(Value::String(value));
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for FormParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Query(query) = Query::<Pairs>::from_request_parts(&mut parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(e.body_text()))?;

        let mut values = Map::new();
        if has_form_body(&parts) {
            let req = Request::from_parts(parts, body);
            let Form(form) = Form::<Pairs>::from_request(req, state)
                .await
                .map_err(|e| ApiError::invalid_input(e.body_text()))?;
            insert_first(&mut values, form);
        }
        insert_first(&mut values, query);

        serde_json::from_value(Value::Object(values))
            .map(FormParams)
            .map_err(|e| ApiError::invalid_input(format!("Invalid form values: {}", e)))
    }
}

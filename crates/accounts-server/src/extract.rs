use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Request body accepted as JSON or as `application/x-www-form-urlencoded`.
///
/// The content type picks the parser. Anything that is not form-encoded goes
/// through the JSON extractor and gets its rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Login {
        username: Option<String>,
        password: Option<String>,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_parses_json() {
        let req = request("application/json", r#"{"username":"alice"}"#);
        let Payload(login) = Payload::<Login>::from_request(req, &()).await.unwrap();
        assert_eq!(login.username.as_deref(), Some("alice"));
        assert!(login.password.is_none());
    }

    #[tokio::test]
    async fn test_parses_form() {
        let req = request(
            "application/x-www-form-urlencoded; charset=utf-8",
            "username=alice&password=secret1",
        );
        let Payload(login) = Payload::<Login>::from_request(req, &()).await.unwrap();
        assert_eq!(login.username.as_deref(), Some("alice"));
        assert_eq!(login.password.as_deref(), Some("secret1"));
    }

    #[tokio::test]
    async fn test_rejects_other_content_types() {
        let req = request("text/plain", "username=alice");
        let err = Payload::<Login>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Body {
                status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ..
            }
        ));
    }
}

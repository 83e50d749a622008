//! Request extractors shared by the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::Actor;
use crate::error::EngineError;

/// Header carrying the authenticated operator identity.
pub const ACTOR_HEADER: &str = "x-actor";

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = EngineError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| EngineError::InvalidRequest(format!("missing {ACTOR_HEADER} header")))?;
        let value = value.to_str().map_err(|_| {
            EngineError::InvalidRequest(format!("{ACTOR_HEADER} header must be visible ASCII"))
        })?;
        Self::new(value)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(req: Request<()>) -> Result<Actor, EngineError> {
        let (mut parts, ()) = req.into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_actor_header() {
        let Ok(req) = Request::builder().header(ACTOR_HEADER, " ops-1 ").body(()) else {
            panic!("request build failed");
        };
        let Ok(actor) = extract(req).await else {
            panic!("expected actor");
        };
        assert_eq!(actor.as_str(), "ops-1");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let Ok(req) = Request::builder().body(()) else {
            panic!("request build failed");
        };
        let Err(err) = extract(req).await else {
            panic!("expected rejection");
        };
        assert_eq!(err.error_code(), 1002);
    }

    #[tokio::test]
    async fn blank_header_is_rejected() {
        let Ok(req) = Request::builder().header(ACTOR_HEADER, "   ").body(()) else {
            panic!("request build failed");
        };
        assert!(extract(req).await.is_err());
    }
}

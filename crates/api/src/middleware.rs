use axum::{body::Body, http::Request, middleware::Next, response::Response};

use atlas_domain::error::DomainError;

use crate::error::ApiError;

/// Who performed the action. Authentication lives in front of this service;
/// the caller only supplies a non-empty identity for audit stamping.
pub const ACTOR_HEADER: &str = "x-actor";

#[derive(Clone, Debug)]
pub struct ActorContext {
    pub actor: Option<String>,
}

impl ActorContext {
    pub fn require(&self) -> Result<&str, ApiError> {
        self.actor
            .as_deref()
            .ok_or_else(|| ApiError::from(DomainError::EmptyActor))
    }
}

pub async fn actor_context(mut req: Request<Body>, next: Next) -> Response {
    let actor = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    req.extensions_mut().insert(ActorContext { actor });
    next.run(req).await
}

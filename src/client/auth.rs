// File: ./src/client/auth.rs
// Attaches the signed-in user's token to outgoing requests.
use crate::session::SharedSession;
use http::header::{AUTHORIZATION, HeaderValue};
use http::Request;
use std::task::{Context, Poll};
use tower_service::Service;

/// Reads the session on every call so sign-in and sign-out take effect
/// without rebuilding the client.
#[derive(Clone, Debug)]
pub struct BearerAuthLayer {
    session: SharedSession,
}

impl BearerAuthLayer {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl<S> tower_layer::Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            session: self.session.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BearerAuthService<S> {
    inner: S,
    session: SharedSession,
}

impl<S, ReqBody> Service<Request<ReqBody>> for BearerAuthService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if let Some(session) = self.session.get()
            && let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", session.token))
        {
            req.headers_mut().insert(AUTHORIZATION, val);
        }
        self.inner.call(req)
    }
}

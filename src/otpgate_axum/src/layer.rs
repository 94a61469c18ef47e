//! The gate as a tower layer.
//!
//! ```ignore
//! let state = GateState::new(principals, sessions, SystemClock, TotpRsVerifier::default(), TracingEventSink, handle);
//! let app = Router::new()
//!     .route("/billing", get(billing))
//!     .layer(OtpGateLayer::new(state.clone()))
//!     .layer(auth_layer); // inserts the `Principal` extension
//! ```

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Bytes,
    extract::Request,
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use otpgate_adapters::{config::REPLAY_KEY_HEADER, render_outcome};
use otpgate_application::CheckOtpRequest;
use otpgate_core::{
    Clock, EventSink, GateRequest, OtpVerifier, PrincipalProvider, ReplayKey, SessionStore,
    SessionUpdate,
};
use tower::{Layer, Service};

use crate::{
    adapters::{AxumRequest, response_builder},
    body,
    otp_input::{extract_otp, may_carry_otp},
    routes::GateApiError,
    state::GateState,
};

/// Largest JSON or form body the gate reads to look for the code.
pub const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// Where the gate keeps its state between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Pass state lives in the session named by the session cookie.
    Session,
    /// Every request carries its own code. The last accepted replay key is
    /// round-tripped through the `x-otp-replay-key` header.
    Stateless,
}

pub struct OtpGateLayer<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    state: GateState<P, S, C, V, E>,
    mode: GateMode,
}

impl<P, S, C, V, E> OtpGateLayer<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    pub fn new(state: GateState<P, S, C, V, E>) -> Self {
        Self {
            state,
            mode: GateMode::Session,
        }
    }

    pub fn stateless(state: GateState<P, S, C, V, E>) -> Self {
        Self {
            state,
            mode: GateMode::Stateless,
        }
    }
}

impl<P, S, C, V, E> Clone for OtpGateLayer<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            mode: self.mode,
        }
    }
}

impl<I, P, S, C, V, E> Layer<I> for OtpGateLayer<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    type Service = OtpGateService<I, P, S, C, V, E>;

    fn layer(&self, inner: I) -> Self::Service {
        OtpGateService {
            inner,
            state: self.state.clone(),
            mode: self.mode,
        }
    }
}

pub struct OtpGateService<I, P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    inner: I,
    state: GateState<P, S, C, V, E>,
    mode: GateMode,
}

impl<I, P, S, C, V, E> Clone for OtpGateService<I, P, S, C, V, E>
where
    I: Clone,
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            state: self.state.clone(),
            mode: self.mode,
        }
    }
}

impl<I, P, S, C, V, E> Service<Request> for OtpGateService<I, P, S, C, V, E>
where
    I: Service<Request> + Clone + Send + 'static,
    I::Response: IntoResponse,
    I::Future: Send + 'static,
    P: PrincipalProvider<RequestParts = Parts> + 'static,
    S: SessionStore + 'static,
    C: Clock + 'static,
    V: OtpVerifier + 'static,
    E: EventSink + 'static,
{
    type Response = Response;
    type Error = I::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Keep the instance that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let state = self.state.clone();
        let mode = self.mode;

        Box::pin(async move {
            match guard(&state, mode, request).await {
                Guarded::Pass {
                    request,
                    set_cookie,
                    replay_key,
                } => {
                    let mut response = inner.call(request).await?.into_response();
                    if let Some(cookie) = set_cookie {
                        response.headers_mut().append(header::SET_COOKIE, cookie);
                    }
                    if let Some(key) = replay_key
                        .and_then(|key| HeaderValue::from_str(&key.to_string()).ok())
                    {
                        response.headers_mut().insert(REPLAY_KEY_HEADER, key);
                    }
                    Ok(response)
                }
                Guarded::Block(response) => Ok(response),
            }
        })
    }
}

enum Guarded {
    Pass {
        request: Request,
        set_cookie: Option<HeaderValue>,
        replay_key: Option<ReplayKey>,
    },
    Block(Response),
}

#[tracing::instrument(name = "OtpGate", skip_all, fields(path = %request.uri().path(), mode = ?mode))]
async fn guard<P, S, C, V, E>(
    state: &GateState<P, S, C, V, E>,
    mode: GateMode,
    request: Request,
) -> Guarded
where
    P: PrincipalProvider<RequestParts = Parts>,
    S: SessionStore,
    C: Clock,
    V: OtpVerifier,
    E: EventSink,
{
    let mut config = state.config();
    if mode == GateMode::Stateless && !config.stateless {
        config = Arc::new(config.as_ref().clone().into_stateless());
    }

    if !config.enabled {
        return Guarded::Pass {
            request,
            set_cookie: None,
            replay_key: None,
        };
    }

    let mut request = AxumRequest(request);
    let (session_id, new_session) = if config.stateless {
        (None, false)
    } else {
        match request.cookie(state.cookie_name()) {
            Some(id) if !id.is_empty() => (Some(id), false),
            _ => (Some(uuid::Uuid::new_v4().to_string()), true),
        }
    };
    let replay_key = if config.stateless {
        request
            .header(REPLAY_KEY_HEADER)
            .and_then(|value| value.trim().parse::<ReplayKey>().ok())
    } else {
        None
    };

    // Oversized bodies are forwarded as they are; the code then has to come
    // from the query string
    let bytes = if request.header("content-type").is_some_and(may_carry_otp) {
        let peeked = body::peek(std::mem::take(request.0.body_mut()), MAX_BUFFERED_BODY).await;
        *request.0.body_mut() = peeked.body;
        peeked.bytes.unwrap_or_default()
    } else {
        Bytes::new()
    };

    let otp = extract_otp(&request, &bytes, &config.otp_input);
    let (parts, body) = request.0.into_parts();
    let result = state
        .check_otp()
        .execute(
            &parts,
            CheckOtpRequest {
                session_id: session_id.as_deref(),
                otp,
                replay_key,
            },
            &config,
        )
        .await;
    let request = AxumRequest(Request::from_parts(parts, body));

    let decision = match result {
        Ok(decision) => decision,
        Err(e) => return Guarded::Block(GateApiError::from(e).into_response()),
    };

    // A new session only needs to reach the client if something hangs off it
    let set_cookie = session_id
        .filter(|_| new_session)
        .filter(|_| !decision.outcome.is_allowed() || decision.update != SessionUpdate::Unchanged)
        .and_then(|id| session_cookie(state.cookie_name(), id));

    match render_outcome(
        &request,
        &decision.outcome,
        &config.error_messages,
        response_builder(),
    ) {
        None => Guarded::Pass {
            request: request.0,
            set_cookie,
            replay_key: decision.accepted_key.filter(|_| config.stateless),
        },
        Some(mut response) => {
            if let Some(cookie) = set_cookie {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Guarded::Block(response)
        }
    }
}

fn session_cookie(name: &str, id: String) -> Option<HeaderValue> {
    let cookie = Cookie::build((name.to_string(), id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

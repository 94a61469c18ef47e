use std::sync::Arc;

use otpgate_adapters::{
    ConfigHandle, SystemClock, TotpRsVerifier, TracingEventSink, config::SESSION_COOKIE_NAME,
};
use otpgate_application::{CheckOtpUseCase, GateEngine, LoginUseCase, LogoutUseCase};
use otpgate_core::{
    Clock, EventSink, GateConfig, OtpVerifier, PrincipalProvider, SecretStore, SessionStore,
};

use crate::principal::ExtensionPrincipalProvider;

/// Gate wiring with the stock adapters: principal from a request extension,
/// `totp-rs` verification, wall clock and tracing events.
pub type DefaultGateState<St, S> =
    GateState<ExtensionPrincipalProvider<St>, S, SystemClock, TotpRsVerifier, TracingEventSink>;

struct GateInner<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    check: CheckOtpUseCase<P, S, C, V, E>,
    login: LoginUseCase<P, S, C, E>,
    logout: LogoutUseCase<S, E>,
    config: ConfigHandle,
}

/// Shared state behind the gate layers and routes.
pub struct GateState<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    inner: Arc<GateInner<P, S, C, V, E>>,
    cookie_name: Arc<str>,
}

impl<P, S, C, V, E> Clone for GateState<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cookie_name: Arc::clone(&self.cookie_name),
        }
    }
}

impl<P, S, C, V, E> GateState<P, S, C, V, E>
where
    P: PrincipalProvider + Clone,
    S: SessionStore + Clone,
    C: Clock + Clone,
    V: OtpVerifier,
    E: EventSink + Clone,
{
    pub fn new(
        principals: P,
        sessions: S,
        clock: C,
        verifier: V,
        events: E,
        config: ConfigHandle,
    ) -> Self {
        let engine = GateEngine::new(verifier, events.clone());
        let inner = GateInner {
            check: CheckOtpUseCase::new(
                principals.clone(),
                sessions.clone(),
                clock.clone(),
                engine,
            ),
            login: LoginUseCase::new(principals, sessions.clone(), clock, events.clone()),
            logout: LogoutUseCase::new(sessions, events),
            config,
        };
        Self {
            inner: Arc::new(inner),
            cookie_name: Arc::from(SESSION_COOKIE_NAME),
        }
    }
}

impl<St, S> DefaultGateState<St, S>
where
    St: SecretStore + Clone,
    S: SessionStore + Clone,
{
    pub fn with_defaults(secrets: St, sessions: S, config: ConfigHandle) -> Self {
        Self::new(
            ExtensionPrincipalProvider::new(secrets),
            sessions,
            SystemClock,
            TotpRsVerifier::default(),
            TracingEventSink,
            config,
        )
    }
}

impl<P, S, C, V, E> GateState<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    V: OtpVerifier,
    E: EventSink,
{
    /// Name of the cookie carrying the session id.
    pub fn with_cookie_name(mut self, name: &str) -> Self {
        self.cookie_name = Arc::from(name);
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Configuration snapshot for one request.
    pub fn config(&self) -> Arc<GateConfig> {
        self.inner.config.load()
    }

    pub fn config_handle(&self) -> &ConfigHandle {
        &self.inner.config
    }

    pub fn check_otp(&self) -> &CheckOtpUseCase<P, S, C, V, E> {
        &self.inner.check
    }

    /// Forced login, e.g. after a remember-me authentication.
    pub fn login(&self) -> &LoginUseCase<P, S, C, E> {
        &self.inner.login
    }

    pub fn logout(&self) -> &LogoutUseCase<S, E> {
        &self.inner.logout
    }
}

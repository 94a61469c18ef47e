use super::principal::Principal;

/// What happened during a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateEventKind {
    LoginSucceeded,
    LoginFailed,
    OneTimePasswordRequested,
    OneTimePasswordExpired,
    EmptyOneTimePasswordReceived,
    LoggedOut,
}

impl GateEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GateEventKind::LoginSucceeded => "login_succeeded",
            GateEventKind::LoginFailed => "login_failed",
            GateEventKind::OneTimePasswordRequested => "one_time_password_requested",
            GateEventKind::OneTimePasswordExpired => "one_time_password_expired",
            GateEventKind::EmptyOneTimePasswordReceived => "empty_one_time_password_received",
            GateEventKind::LoggedOut => "logged_out",
        }
    }
}

/// An event broadcast to the host application, tagged with the principal it
/// concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateEvent {
    pub kind: GateEventKind,
    pub principal: Principal,
}

impl GateEvent {
    pub fn new(kind: GateEventKind, principal: Principal) -> Self {
        Self { kind, principal }
    }
}

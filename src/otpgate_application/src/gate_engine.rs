use chrono::{DateTime, Utc};
use otpgate_core::{
    EventSink, ExpiryPolicy, GateConfig, GateDecision, GateEvent, GateEventKind, GateOutcome,
    OneTimePassword, OtpInput, OtpSecret, OtpVerifier, Principal, RejectReason, ReplayGuard,
    ReplayKey, SessionSnapshot, SessionUpdate, VerificationError, VerificationRequest,
};

/// Everything the engine needs to know about one request.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    /// The authenticated principal, if any.
    pub principal: Option<&'a Principal>,
    /// The principal's enrolled secret; `None` means 2FA is not activated.
    pub secret: Option<&'a OtpSecret>,
    /// Current session state. Ignored when the gate runs stateless.
    pub snapshot: &'a SessionSnapshot,
    pub otp: &'a OtpInput,
    /// Replay key managed by a stateless caller itself.
    pub external_replay_key: Option<ReplayKey>,
}

/// The OTP decision state machine.
///
/// Given a request's inputs it decides whether to allow, challenge or
/// reject, and proposes the session update. It persists nothing; the only
/// side effects are the verifier call and emitted events.
pub struct GateEngine<V, E> {
    verifier: V,
    events: E,
}

impl<V, E> GateEngine<V, E>
where
    V: OtpVerifier,
    E: EventSink,
{
    pub fn new(verifier: V, events: E) -> Self {
        Self { verifier, events }
    }

    /// Evaluate one request.
    ///
    /// Checks run in a fixed order: master switch, principal, enrolment,
    /// still-valid pass (stateful only), then the submitted code.
    #[tracing::instrument(
        name = "GateEngine::evaluate",
        skip_all,
        fields(principal = input.principal.map(Principal::as_str))
    )]
    pub fn evaluate(
        &self,
        input: GateInput<'_>,
        config: &GateConfig,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if !config.enabled {
            return GateDecision::allow();
        }

        let Some(principal) = input.principal else {
            return GateDecision::allow();
        };

        let Some(secret) = input.secret else {
            tracing::debug!("2FA not activated for principal, bypassing");
            return GateDecision::allow();
        };

        if config.stateless {
            let forbidden_key =
                ReplayGuard::forbidden_external_key(input.external_replay_key, config);
            let outcome = self.check_code(principal, secret, input.otp, forbidden_key, config, now);
            return match outcome {
                Ok(accepted) => GateDecision {
                    accepted_key: ReplayGuard::to_remember(accepted, config),
                    ..GateDecision::allow()
                },
                Err(outcome) => GateDecision::new(outcome, SessionUpdate::Unchanged),
            };
        }

        let snapshot = input.snapshot;
        if snapshot.is_passed_by(principal) && ExpiryPolicy::is_still_valid(snapshot, config, now) {
            let update = if config.keep_alive {
                SessionUpdate::Put(snapshot.clone().touched(now))
            } else {
                SessionUpdate::Unchanged
            };
            return GateDecision::new(GateOutcome::Allow, update);
        }

        // Anything that did not hold above is dropped before a code is checked:
        // another principal's state, or an own pass that expired.
        let foreign = match &snapshot.principal {
            Some(owner) => owner != principal,
            None => snapshot.passed,
        };
        let expired = snapshot.passed && !foreign;
        if foreign {
            tracing::warn!("Session gate state belongs to another principal, discarding it");
            let owner = snapshot.principal.as_ref().unwrap_or(principal);
            self.emit(GateEventKind::LoggedOut, owner);
        } else if expired {
            tracing::info!("One time password expired");
            self.emit(GateEventKind::OneTimePasswordExpired, principal);
            self.emit(GateEventKind::LoggedOut, principal);
        }
        let reset = foreign || expired;
        let current = if reset {
            SessionSnapshot::default()
        } else {
            snapshot.clone()
        };

        let forbidden_key = ReplayGuard::forbidden_key_for(&current, config);
        match self.check_code(principal, secret, input.otp, forbidden_key, config, now) {
            Ok(accepted) => {
                let mut next = SessionSnapshot::passed_at(principal, now);
                ReplayGuard::record(&mut next, accepted, config);
                GateDecision::new(GateOutcome::Allow, SessionUpdate::Put(next))
                    .with_accepted_key(accepted)
            }
            Err(outcome) => {
                let update = if reset {
                    SessionUpdate::Clear
                } else {
                    SessionUpdate::Unchanged
                };
                GateDecision::new(outcome, update)
            }
        }
    }

    /// Step five: a code is required. Returns the accepted key, or the
    /// outcome to answer with.
    fn check_code(
        &self,
        principal: &Principal,
        secret: &OtpSecret,
        otp: &OtpInput,
        forbidden_key: Option<ReplayKey>,
        config: &GateConfig,
        now: DateTime<Utc>,
    ) -> Result<ReplayKey, GateOutcome> {
        let code = match otp {
            OtpInput::Absent => {
                self.emit(GateEventKind::OneTimePasswordRequested, principal);
                return Err(GateOutcome::Challenge);
            }
            OtpInput::Empty => {
                self.emit(GateEventKind::EmptyOneTimePasswordReceived, principal);
                return Err(GateOutcome::RejectEmpty);
            }
            OtpInput::Provided(code) => code,
        };

        match self.verify(secret, code, forbidden_key, config, now) {
            Ok(accepted) => {
                tracing::info!(replay_key = %accepted, "One time password accepted");
                self.emit(GateEventKind::LoginSucceeded, principal);
                Ok(accepted)
            }
            Err(VerificationError::SecretInvalid(reason)) => {
                tracing::warn!(%reason, "Enrolled secret could not be used");
                self.emit(GateEventKind::LoginFailed, principal);
                Err(GateOutcome::RejectInvalid(RejectReason::SecretInvalid))
            }
            Err(e) => {
                tracing::info!(error = %e, "One time password rejected");
                self.emit(GateEventKind::LoginFailed, principal);
                Err(GateOutcome::RejectInvalid(RejectReason::WrongCode))
            }
        }
    }

    fn verify(
        &self,
        secret: &OtpSecret,
        code: &OneTimePassword,
        forbidden_key: Option<ReplayKey>,
        config: &GateConfig,
        now: DateTime<Utc>,
    ) -> Result<ReplayKey, VerificationError> {
        let request = VerificationRequest {
            secret: secret.clone(),
            code: code.clone(),
            window: config.window,
            forbidden_key,
            timestamp: now,
        };
        self.verifier.verify(&request)
    }

    fn emit(&self, kind: GateEventKind, principal: &Principal) {
        self.events.emit(GateEvent::new(kind, principal.clone()));
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use otpgate_core::Lifetime;
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::test_support::{BAD_SECRET, GOOD_CODE, RecordingEventSink, StepVerifier, secret};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn passed_at(at: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot::passed_at(&Principal::new("alice"), at)
    }

    fn engine() -> (GateEngine<StepVerifier, RecordingEventSink>, RecordingEventSink) {
        let events = RecordingEventSink::default();
        (GateEngine::new(StepVerifier, events.clone()), events)
    }

    fn code(raw: &str) -> OtpInput {
        OtpInput::from_submission(Some(raw))
    }

    fn evaluate(
        engine: &GateEngine<StepVerifier, RecordingEventSink>,
        snapshot: &SessionSnapshot,
        otp: &OtpInput,
        config: &GateConfig,
        at: DateTime<Utc>,
    ) -> GateDecision {
        let principal = Principal::new("alice");
        let secret = secret();
        engine.evaluate(
            GateInput {
                principal: Some(&principal),
                secret: Some(&secret),
                snapshot,
                otp,
                external_replay_key: None,
            },
            config,
            at,
        )
    }

    #[test]
    fn disabled_gate_allows_without_touching_session() {
        let (engine, events) = engine();
        let config = GateConfig {
            enabled: false,
            ..GateConfig::default()
        };

        let decision = evaluate(&engine, &SessionSnapshot::default(), &code(""), &config, now());

        assert_eq!(decision, GateDecision::allow());
        assert!(events.kinds().is_empty());
    }

    #[test]
    fn anonymous_request_is_allowed() {
        let (engine, _) = engine();
        let decision = engine.evaluate(
            GateInput {
                principal: None,
                secret: None,
                snapshot: &SessionSnapshot::default(),
                otp: &OtpInput::Absent,
                external_replay_key: None,
            },
            &GateConfig::default(),
            now(),
        );
        assert_eq!(decision, GateDecision::allow());
    }

    #[test]
    fn principal_without_secret_bypasses() {
        let (engine, events) = engine();
        let principal = Principal::new("bob");
        let decision = engine.evaluate(
            GateInput {
                principal: Some(&principal),
                secret: None,
                snapshot: &SessionSnapshot::default(),
                otp: &OtpInput::Absent,
                external_replay_key: None,
            },
            &GateConfig::default(),
            now(),
        );
        assert_eq!(decision, GateDecision::allow());
        assert!(events.kinds().is_empty());
    }

    #[test]
    fn absent_code_is_challenged() {
        let (engine, events) = engine();
        let decision = evaluate(
            &engine,
            &SessionSnapshot::default(),
            &OtpInput::Absent,
            &GateConfig::default(),
            now(),
        );
        assert_eq!(decision.outcome, GateOutcome::Challenge);
        assert_eq!(decision.update, SessionUpdate::Unchanged);
        assert_eq!(events.kinds(), vec![GateEventKind::OneTimePasswordRequested]);
    }

    #[test]
    fn empty_code_is_rejected_as_empty() {
        let (engine, events) = engine();
        let decision = evaluate(
            &engine,
            &SessionSnapshot::default(),
            &code(""),
            &GateConfig::default(),
            now(),
        );
        assert_eq!(decision.outcome, GateOutcome::RejectEmpty);
        assert_eq!(
            events.kinds(),
            vec![GateEventKind::EmptyOneTimePasswordReceived]
        );
    }

    #[test]
    fn wrong_code_is_rejected_and_not_passed() {
        let (engine, events) = engine();
        let decision = evaluate(
            &engine,
            &SessionSnapshot::default(),
            &code("000000"),
            &GateConfig::default(),
            now(),
        );
        assert_eq!(
            decision.outcome,
            GateOutcome::RejectInvalid(RejectReason::WrongCode)
        );
        assert_eq!(decision.update, SessionUpdate::Unchanged);
        assert_eq!(events.kinds(), vec![GateEventKind::LoginFailed]);
    }

    #[test]
    fn correct_code_passes_and_records_activity() {
        let (engine, events) = engine();
        let decision = evaluate(
            &engine,
            &SessionSnapshot::default(),
            &code(GOOD_CODE),
            &GateConfig::default(),
            now(),
        );
        assert_eq!(decision.outcome, GateOutcome::Allow);
        assert_eq!(
            decision.update,
            SessionUpdate::Put(passed_at(now()))
        );
        assert_eq!(events.kinds(), vec![GateEventKind::LoginSucceeded]);
    }

    #[test]
    fn fresh_pass_refreshes_activity_only_with_keep_alive() {
        let (engine, _) = engine();
        let passed = passed_at(now());
        let later = now() + Duration::minutes(3);

        let decision = evaluate(&engine, &passed, &OtpInput::Absent, &GateConfig::default(), later);
        assert_eq!(decision.outcome, GateOutcome::Allow);
        assert_eq!(
            decision.update,
            SessionUpdate::Put(passed_at(later))
        );

        let no_keep_alive = GateConfig {
            keep_alive: false,
            ..GateConfig::default()
        };
        let decision = evaluate(&engine, &passed, &OtpInput::Absent, &no_keep_alive, later);
        assert_eq!(decision, GateDecision::allow());
    }

    #[test]
    fn expired_pass_logs_out_then_challenges() {
        let (engine, events) = engine();
        let config = GateConfig {
            lifetime: Lifetime::from(5),
            ..GateConfig::default()
        };
        let passed = passed_at(now());

        let decision = evaluate(
            &engine,
            &passed,
            &OtpInput::Absent,
            &config,
            now() + Duration::minutes(6),
        );

        assert_eq!(decision.outcome, GateOutcome::Challenge);
        assert_eq!(decision.update, SessionUpdate::Clear);
        assert_eq!(
            events.kinds(),
            vec![
                GateEventKind::OneTimePasswordExpired,
                GateEventKind::LoggedOut,
                GateEventKind::OneTimePasswordRequested,
            ]
        );
    }

    #[test]
    fn expired_pass_can_be_renewed_with_a_code() {
        let (engine, _) = engine();
        let config = GateConfig {
            lifetime: Lifetime::from(5),
            ..GateConfig::default()
        };
        let later = now() + Duration::minutes(10);

        let decision = evaluate(
            &engine,
            &passed_at(now()),
            &code(GOOD_CODE),
            &config,
            later,
        );

        assert_eq!(decision.outcome, GateOutcome::Allow);
        assert_eq!(
            decision.update,
            SessionUpdate::Put(passed_at(later))
        );
    }

    #[test]
    fn accepted_key_is_stored_only_when_forbidding_old_passwords() {
        let (engine, _) = engine();
        let strict = GateConfig {
            forbid_old_passwords: true,
            ..GateConfig::default()
        };

        let decision = evaluate(
            &engine,
            &SessionSnapshot::default(),
            &code(GOOD_CODE),
            &strict,
            now(),
        );

        let SessionUpdate::Put(snapshot) = decision.update else {
            panic!("expected a session update");
        };
        assert_eq!(
            snapshot.last_accepted_replay_key,
            Some(StepVerifier::key_at(now()))
        );
    }

    #[test]
    fn replayed_code_is_rejected() {
        let (engine, events) = engine();
        let strict = GateConfig {
            forbid_old_passwords: true,
            ..GateConfig::default()
        };
        // Not passed, but the last accepted step is still remembered
        let snapshot = SessionSnapshot {
            passed: false,
            principal: None,
            last_activity_at: None,
            last_accepted_replay_key: Some(StepVerifier::key_at(now())),
        };

        let decision = evaluate(&engine, &snapshot, &code(GOOD_CODE), &strict, now());

        assert_eq!(
            decision.outcome,
            GateOutcome::RejectInvalid(RejectReason::WrongCode)
        );
        assert_eq!(events.kinds(), vec![GateEventKind::LoginFailed]);

        // With replay protection off the same snapshot lets the code through
        let relaxed = GateConfig::default();
        let decision = evaluate(&engine, &snapshot, &code(GOOD_CODE), &relaxed, now());
        assert_eq!(decision.outcome, GateOutcome::Allow);
    }

    #[test]
    fn pass_of_another_principal_is_discarded() {
        let (engine, events) = engine();
        let carols_pass = SessionSnapshot::passed_at(&Principal::new("carol"), now());

        let decision = evaluate(
            &engine,
            &carols_pass,
            &OtpInput::Absent,
            &GateConfig::default(),
            now(),
        );

        assert_eq!(decision.outcome, GateOutcome::Challenge);
        assert_eq!(decision.update, SessionUpdate::Clear);
        assert_eq!(
            events.kinds(),
            vec![
                GateEventKind::LoggedOut,
                GateEventKind::OneTimePasswordRequested,
            ]
        );
        assert_eq!(events.principals()[0], Principal::new("carol"));
    }

    #[test]
    fn ownerless_pass_is_not_honoured() {
        let (engine, _) = engine();
        let ownerless = SessionSnapshot {
            principal: None,
            ..passed_at(now())
        };

        let decision = evaluate(
            &engine,
            &ownerless,
            &OtpInput::Absent,
            &GateConfig::default(),
            now(),
        );
        assert_eq!(decision.outcome, GateOutcome::Challenge);
        assert_eq!(decision.update, SessionUpdate::Clear);
    }

    #[test]
    fn foreign_replay_key_is_not_applied_to_the_next_principal() {
        let (engine, _) = engine();
        let strict = GateConfig {
            forbid_old_passwords: true,
            ..GateConfig::default()
        };
        let mut carols_pass = SessionSnapshot::passed_at(&Principal::new("carol"), now());
        carols_pass.last_accepted_replay_key = Some(StepVerifier::key_at(now()));

        let decision = evaluate(&engine, &carols_pass, &code(GOOD_CODE), &strict, now());

        assert_eq!(decision.outcome, GateOutcome::Allow);
        let SessionUpdate::Put(snapshot) = decision.update else {
            panic!("expected a session update");
        };
        assert!(snapshot.is_passed_by(&Principal::new("alice")));
    }

    #[test]
    fn unusable_secret_is_reported_separately() {
        let (engine, events) = engine();
        let principal = Principal::new("carol");
        let bad = OtpSecret::from_optional(Some(BAD_SECRET.to_string())).unwrap();

        let decision = engine.evaluate(
            GateInput {
                principal: Some(&principal),
                secret: Some(&bad),
                snapshot: &SessionSnapshot::default(),
                otp: &code(GOOD_CODE),
                external_replay_key: None,
            },
            &GateConfig::default(),
            now(),
        );

        assert_eq!(
            decision.outcome,
            GateOutcome::RejectInvalid(RejectReason::SecretInvalid)
        );
        assert_eq!(events.kinds(), vec![GateEventKind::LoginFailed]);
    }

    #[test]
    fn stateless_ignores_snapshot_and_never_updates() {
        let (engine, _) = engine();
        let config = GateConfig::default().into_stateless();
        let passed = passed_at(now());

        // A passed snapshot does not count in stateless mode
        let decision = evaluate(&engine, &passed, &OtpInput::Absent, &config, now());
        assert_eq!(decision.outcome, GateOutcome::Challenge);
        assert_eq!(decision.update, SessionUpdate::Unchanged);

        for _ in 0..2 {
            let decision = evaluate(
                &engine,
                &SessionSnapshot::default(),
                &code(GOOD_CODE),
                &config,
                now(),
            );
            assert_eq!(decision.outcome, GateOutcome::Allow);
            assert_eq!(decision.update, SessionUpdate::Unchanged);
        }
    }

    #[test]
    fn stateless_honours_external_replay_key() {
        let (engine, _) = engine();
        let config = GateConfig {
            forbid_old_passwords: true,
            ..GateConfig::default()
        }
        .into_stateless();
        let principal = Principal::new("api-client");
        let secret = secret();
        let otp = code(GOOD_CODE);

        let decision = engine.evaluate(
            GateInput {
                principal: Some(&principal),
                secret: Some(&secret),
                snapshot: &SessionSnapshot::default(),
                otp: &otp,
                external_replay_key: Some(StepVerifier::key_at(now())),
            },
            &config,
            now(),
        );

        assert_eq!(
            decision.outcome,
            GateOutcome::RejectInvalid(RejectReason::WrongCode)
        );

        // The client hands back the key it was given; a later step passes
        let decision = engine.evaluate(
            GateInput {
                principal: Some(&principal),
                secret: Some(&secret),
                snapshot: &SessionSnapshot::default(),
                otp: &otp,
                external_replay_key: Some(StepVerifier::key_at(now())),
            },
            &config,
            now() + Duration::seconds(30),
        );
        assert_eq!(decision.outcome, GateOutcome::Allow);
        assert_eq!(
            decision.accepted_key,
            Some(StepVerifier::key_at(now() + Duration::seconds(30)))
        );
    }

    #[test]
    fn stateless_ignores_external_key_unless_forbidding_old_passwords() {
        let (engine, _) = engine();
        let config = GateConfig::default().into_stateless();
        let principal = Principal::new("api-client");
        let secret = secret();
        let otp = code(GOOD_CODE);

        let decision = engine.evaluate(
            GateInput {
                principal: Some(&principal),
                secret: Some(&secret),
                snapshot: &SessionSnapshot::default(),
                otp: &otp,
                external_replay_key: Some(StepVerifier::key_at(now())),
            },
            &config,
            now(),
        );

        assert_eq!(decision.outcome, GateOutcome::Allow);
        assert_eq!(decision.accepted_key, None);
    }

    #[quickcheck]
    fn disabled_gate_always_allows(passed: bool, raw_code: Option<String>, stateless: bool) -> bool {
        let (engine, _) = engine();
        let config = GateConfig {
            enabled: false,
            stateless,
            ..GateConfig::default()
        };
        let snapshot = SessionSnapshot {
            passed,
            principal: Some(Principal::new("alice")),
            ..SessionSnapshot::default()
        };
        let otp = OtpInput::from_optional(raw_code.as_deref());

        evaluate(&engine, &snapshot, &otp, &config, now()) == GateDecision::allow()
    }

    #[quickcheck]
    fn still_fresh_pass_is_idempotent(keep_alive: bool, minutes: u8) -> bool {
        let (engine, _) = engine();
        let config = GateConfig {
            keep_alive,
            ..GateConfig::default()
        };
        let snapshot = passed_at(now());
        let later = now() + Duration::minutes(i64::from(minutes));

        let first = evaluate(&engine, &snapshot, &OtpInput::Absent, &config, later);
        let after_first = first.resulting_snapshot(&snapshot);
        let second = evaluate(&engine, &after_first, &OtpInput::Absent, &config, later);

        let expected_activity = if keep_alive { later } else { now() };
        first.outcome == GateOutcome::Allow
            && second.outcome == GateOutcome::Allow
            && second.resulting_snapshot(&after_first).last_activity_at == Some(expected_activity)
    }
}

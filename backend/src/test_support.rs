//! Test utilities for the backend crate.
//!
//! Shared by unit tests under `src/` and integration tests under `tests/`.
//! Compiled only for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    FixtureIdentityVerifier, HeuristicReportValidator, NoOpModerationMetrics,
};
use crate::domain::{Member, MemberId, Principal, Role, TrustStatus};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::wiring::{Collaborators, Policy, Repositories, build_http_state};

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.lock_clock() += TimeDelta::minutes(minutes);
    }

    pub fn advance_hours(&self, hours: i64) {
        *self.lock_clock() += TimeDelta::hours(hours);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used as "now" across suites.
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single() {
        Some(now) => now,
        None => panic!("fixture timestamp"),
    }
}

/// Active principal with a fresh id.
pub fn principal(role: Role) -> Principal {
    Principal {
        member_id: MemberId::random(),
        role,
        is_active: true,
    }
}

/// Active member record matching `principal`.
pub fn member_for(principal: Principal, trust: TrustStatus) -> Member {
    Member {
        id: principal.member_id,
        display_name: format!("{} {}", principal.role, principal.member_id),
        role: principal.role,
        is_active: principal.is_active,
        help_count: 0,
        trust,
        created_at: fixture_now(),
    }
}

/// In-memory marketplace wired exactly like the server, over a
/// [`MutableClock`] pinned to [`fixture_now`].
pub struct MemoryMarketplace {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<MutableClock>,
    pub state: HttpState,
}

impl MemoryMarketplace {
    pub fn new() -> Self {
        Self::with_policy(Policy::default())
    }

    pub fn with_policy(policy: Policy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let state = build_http_state(
            Repositories::shared(store.clone()),
            Collaborators {
                verifier: Arc::new(FixtureIdentityVerifier),
                validator: Arc::new(HeuristicReportValidator),
                metrics: Arc::new(NoOpModerationMetrics),
                clock: clock.clone(),
            },
            policy,
        );
        Self {
            store,
            clock,
            state,
        }
    }
}

impl Default for MemoryMarketplace {
    fn default() -> Self {
        Self::new()
    }
}

/// Token accepted by [`FixtureIdentityVerifier`] for a fresh member.
pub fn identity_token(role: Role) -> (String, MemberId) {
    let id = MemberId::random();
    (format!("{role}:{id}"), id)
}

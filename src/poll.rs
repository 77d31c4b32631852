//! Fixed-period polling with last-good retention.
//!
//! Each dataset is re-fetched on its own fixed period. A successful fetch
//! replaces the held snapshot; a failed fetch keeps the previous snapshot
//! in place so the dashboard degrades to slightly-old data instead of
//! going blank. There are no retries and no backoff: a failed slot simply
//! waits for the next one.
//!
//! # Clock injection
//! All decision functions accept a `now: DateTime<Utc>` parameter rather
//! than calling `Utc::now()` internally. This makes the schedule purely
//! deterministic in tests without mocking or time manipulation. Only
//! [`watch`] reads the real clock.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::model::IngestError;

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Polling state for one dataset.
#[derive(Debug)]
pub struct Poller<T> {
    period_secs: u64,
    last_attempt: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    snapshot: Option<T>,
    consecutive_failures: u32,
}

/// What a tick produced.
#[derive(Debug)]
pub enum PollOutcome<'a, T> {
    /// A fetch ran and succeeded; this is the new snapshot.
    Fresh(&'a T),
    /// The last good snapshot, either because the period has not elapsed
    /// yet (`error` is `None`) or because a fetch ran and failed
    /// (`error` carries the failure).
    Cached {
        snapshot: &'a T,
        age_secs: u64,
        /// Set once the snapshot's age exceeds twice the poll period.
        stale: bool,
        error: Option<IngestError>,
    },
    /// Nothing to show: no fetch has ever succeeded.
    Unavailable {
        /// The failure, when a fetch ran this tick.
        error: Option<IngestError>,
        consecutive_failures: u32,
    },
}

impl<T> Poller<T> {
    /// Creates a poller that re-fetches every `period_secs` seconds.
    pub fn new(period_secs: u64) -> Poller<T> {
        Poller {
            // A zero period would spin; clamp to one second.
            period_secs: period_secs.max(1),
            last_attempt: None,
            last_success: None,
            snapshot: None,
            consecutive_failures: 0,
        }
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// Failed fetches since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether a fetch slot is open at `now`.
    ///
    /// Due-ness is measured from the last *attempt*, successful or not, so
    /// a failing dataset is still polled exactly once per period.
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_attempt {
            Some(at) => (now - at).num_seconds() >= self.period_secs as i64,
            None => true,
        }
    }

    /// Seconds until the next fetch slot opens, zero if already open.
    pub fn secs_until_due_at(&self, now: DateTime<Utc>) -> u64 {
        match self.last_attempt {
            Some(at) => {
                let elapsed = (now - at).num_seconds();
                if elapsed < 0 {
                    return self.period_secs;
                }
                self.period_secs.saturating_sub(elapsed as u64)
            }
            None => 0,
        }
    }

    /// Age of the held snapshot in seconds, if one exists.
    pub fn age_secs_at(&self, now: DateTime<Utc>) -> Option<u64> {
        self.last_success
            .map(|at| (now - at).num_seconds().max(0) as u64)
    }

    /// Whether the held snapshot is too old to trust.
    ///
    /// Staleness is strictly greater than twice the period:
    ///   age >  2 × period  →  stale
    ///   age == 2 × period  →  not stale
    /// One whole missed cycle is tolerated before flagging. A poller that
    /// has never succeeded is stale.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match self.age_secs_at(now) {
            Some(age) => age > self.period_secs.saturating_mul(2),
            None => true,
        }
    }

    /// Advances the poller: runs `fetch` if a slot is open, and reports
    /// what the caller should display.
    pub fn tick_at<F>(&mut self, now: DateTime<Utc>, fetch: F) -> PollOutcome<'_, T>
    where
        F: FnOnce() -> Result<T, IngestError>,
    {
        if self.is_due_at(now) {
            self.last_attempt = Some(now);
            match fetch() {
                Ok(value) => {
                    self.last_success = Some(now);
                    self.consecutive_failures = 0;
                    return PollOutcome::Fresh(self.snapshot.insert(value));
                }
                Err(e) => {
                    self.consecutive_failures += 1;
                    let age_secs = self.age_secs_at(now).unwrap_or(0);
                    let stale = self.is_stale_at(now);
                    return match self.snapshot.as_ref() {
                        Some(snapshot) => PollOutcome::Cached {
                            snapshot,
                            age_secs,
                            stale,
                            error: Some(e),
                        },
                        None => PollOutcome::Unavailable {
                            error: Some(e),
                            consecutive_failures: self.consecutive_failures,
                        },
                    };
                }
            }
        }

        let age_secs = self.age_secs_at(now).unwrap_or(0);
        let stale = self.is_stale_at(now);
        match self.snapshot.as_ref() {
            Some(snapshot) => PollOutcome::Cached {
                snapshot,
                age_secs,
                stale,
                error: None,
            },
            None => PollOutcome::Unavailable {
                error: None,
                consecutive_failures: self.consecutive_failures,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Watch loop
// ---------------------------------------------------------------------------

/// Drives a poller forever: one tick per period slot, rendering every
/// outcome, sleeping until the next slot opens.
///
/// The sleep is computed after rendering, so a slow fetch shortens the
/// sleep rather than pushing the schedule; cycles never queue up.
pub fn watch<T, FetchF, RenderF>(mut poller: Poller<T>, mut fetch: FetchF, mut render: RenderF) -> !
where
    FetchF: FnMut() -> Result<T, IngestError>,
    RenderF: FnMut(&PollOutcome<'_, T>),
{
    loop {
        let outcome = poller.tick_at(Utc::now(), &mut fetch);
        render(&outcome);

        let wait = poller.secs_until_due_at(Utc::now());
        if wait > 0 {
            std::thread::sleep(Duration::from_secs(wait));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

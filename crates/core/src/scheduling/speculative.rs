//! Speculative multi-calendar writes
//!
//! [`run_speculative`] runs a body that issues tentative writes against any
//! number of [`Calendar`]s. Every write starts as soon as the body issues it
//! and runs concurrently with the others; the transaction then joins on all
//! of them and hands back a [`TransactionWorld`] holding each outcome.
//!
//! Calendar services offer no cross-service transactions. The guarantee is
//! therefore one-sided: [`TransactionWorld::commit`] never reports success
//! unless every participant confirmed, and reports failure whenever any
//! participant did not. A participant that confirmed while a sibling failed
//! keeps the event; nothing is retracted.

use std::sync::Arc;

use futures::future::join_all;
use rendezvous_domain::{Event, RendezvousError, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::calendar::Calendar;

/// Reference to a value resolved inside a [`TransactionWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultHandle {
    /// Outcome of one participant write.
    Write(usize),
    /// Logical AND over a set of writes.
    All(usize),
}

/// Final state of one participant write.
#[derive(Debug, Clone)]
pub struct ParticipantOutcome {
    pub participant: String,
    pub confirmed: bool,
    /// Set when the write failed with an error rather than a refusal.
    pub error: Option<RendezvousError>,
}

struct PendingWrite {
    participant: String,
    task: JoinHandle<Result<bool>>,
}

/// Handle passed to the transaction body for issuing writes.
#[derive(Default)]
pub struct Speculation {
    writes: Vec<PendingWrite>,
    aggregates: Vec<Vec<usize>>,
}

impl Speculation {
    /// Buffer `event` on `calendar` and start writing it now. The write
    /// proceeds concurrently with any other write issued by the body.
    ///
    /// The event is in the calendar's buffer when this returns, whatever
    /// later happens to the write.
    pub fn schedule(&mut self, calendar: &Arc<Calendar>, event: Event) -> ResultHandle {
        let calendar = Arc::clone(calendar);
        let participant = calendar.owner().to_string();
        debug!(%participant, title = %event.title, "issuing speculative write");

        calendar.buffer_event(event.clone());
        let task = tokio::spawn(async move { calendar.write_remote(event).await });
        self.writes.push(PendingWrite { participant, task });
        ResultHandle::Write(self.writes.len() - 1)
    }

    /// Logical AND over the given handles, resolved at the join point.
    pub fn all(&mut self, handles: &[ResultHandle]) -> ResultHandle {
        let mut members = Vec::new();
        for handle in handles {
            match *handle {
                ResultHandle::Write(idx) => members.push(idx),
                ResultHandle::All(agg) => {
                    members.extend(self.aggregates.get(agg).into_iter().flatten().copied());
                }
            }
        }
        self.aggregates.push(members);
        ResultHandle::All(self.aggregates.len() - 1)
    }

    fn abandon(self) {
        for write in self.writes {
            warn!(
                participant = %write.participant,
                "abandoning speculative write; the backend may already have received it"
            );
            write.task.abort();
        }
    }

    async fn join(self) -> (Vec<ParticipantOutcome>, Vec<Vec<usize>>) {
        let participants: Vec<String> =
            self.writes.iter().map(|write| write.participant.clone()).collect();
        let results = join_all(self.writes.into_iter().map(|write| write.task)).await;

        let outcomes = participants
            .into_iter()
            .zip(results)
            .map(|(participant, joined)| {
                let (confirmed, error) = match joined {
                    Ok(Ok(accepted)) => (accepted, None),
                    Ok(Err(err)) => {
                        warn!(%participant, error = %err, "speculative write failed");
                        (false, Some(err))
                    }
                    Err(join_err) => {
                        warn!(%participant, error = %join_err, "speculative write task died");
                        (false, Some(RendezvousError::Internal(join_err.to_string())))
                    }
                };
                ParticipantOutcome { participant, confirmed, error }
            })
            .collect();

        (outcomes, self.aggregates)
    }
}

/// Outcomes of one speculative scheduling attempt.
pub struct TransactionWorld<R> {
    output: R,
    outcomes: Vec<ParticipantOutcome>,
    aggregates: Vec<Vec<usize>>,
}

impl<R> TransactionWorld<R> {
    /// Resolved value of `handle`. Unknown handles resolve to `false`.
    pub fn get(&self, handle: &ResultHandle) -> bool {
        match *handle {
            ResultHandle::Write(idx) => self.outcomes.get(idx).is_some_and(|o| o.confirmed),
            ResultHandle::All(agg) => self.aggregates.get(agg).is_some_and(|members| {
                members.iter().all(|&idx| self.get(&ResultHandle::Write(idx)))
            }),
        }
    }

    /// Whatever the body returned.
    pub fn output(&self) -> &R {
        &self.output
    }

    pub fn outcomes(&self) -> &[ParticipantOutcome] {
        &self.outcomes
    }

    /// Logical AND over every participant.
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.confirmed)
    }

    /// Finalize the attempt.
    ///
    /// Returns the body's output only when every write was confirmed.
    /// Otherwise returns `PartialScheduleFailure` (some confirmed) or
    /// `TotalScheduleFailure` (none confirmed). Confirmed participants of a
    /// failed attempt still hold the event.
    pub fn commit(self) -> Result<R> {
        let (confirmed, failed): (Vec<_>, Vec<_>) =
            self.outcomes.iter().partition(|outcome| outcome.confirmed);
        let confirmed: Vec<String> = confirmed.into_iter().map(|o| o.participant.clone()).collect();
        let failed: Vec<String> = failed.into_iter().map(|o| o.participant.clone()).collect();

        if failed.is_empty() {
            info!(participants = ?confirmed, "speculative writes committed");
            return Ok(self.output);
        }

        if confirmed.is_empty() {
            warn!(participants = ?failed, "no participant confirmed the write");
            return Err(RendezvousError::TotalScheduleFailure { failed });
        }

        warn!(
            confirmed = ?confirmed,
            failed = ?failed,
            "partial commit: confirmed participants keep the tentative event"
        );
        Err(RendezvousError::PartialScheduleFailure { confirmed, failed })
    }
}

/// Run `body`, join on every write it issued and return the resulting
/// world.
///
/// An error returned by `body` aborts the transaction: writes it already
/// issued are abandoned and the error is returned as is. Events those writes
/// buffered stay buffered. Errors from
/// individual writes never abort the join; they count as `false` for that
/// participant.
pub async fn run_speculative<R, F>(body: F) -> Result<TransactionWorld<R>>
where
    F: FnOnce(&mut Speculation) -> Result<R>,
{
    let mut speculation = Speculation::default();
    let output = match body(&mut speculation) {
        Ok(output) => output,
        Err(err) => {
            speculation.abandon();
            return Err(err);
        }
    };

    let (outcomes, aggregates) = speculation.join().await;
    Ok(TransactionWorld { output, outcomes, aggregates })
}

//! Detection and monitoring sessions
use hifitime::Duration;
use log::{info, warn};

use crate::{
    engine::{Engine, MergeReport},
    error::Error,
    source::SnapshotSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// One-shot detection run: the table restarts empty.
    Detection,
    /// Continuous monitoring: accumulated records are preserved until
    /// the session is explicitly stopped.
    Monitoring,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Detection => write!(f, "detection"),
            Self::Monitoring => write!(f, "monitoring"),
        }
    }
}

/// Owns the snapshot producer and the bounded-wait policy around it.
/// The [Engine] holds the shared table; the session decides when it is
/// cleared, polled and closed. Timeouts live here, never in the engine:
/// they are driven by the producer's elapsed markers, not wall-clock
/// reads.
pub struct Session<S: SnapshotSource> {
    kind: SessionKind,
    source: S,
    settle: Duration,
    timeout: Duration,
}

impl<S: SnapshotSource> Session<S> {
    /// Opens a detection session. The table restarts empty.
    /// Fails fast with [Error::ReceiverUnavailable] when no receiver
    /// can deliver snapshots.
    pub fn detection(engine: &Engine, source: S) -> Result<Self, Error> {
        Self::open(engine, source, SessionKind::Detection)
    }

    /// Opens a continuous monitoring session over the accumulated table.
    pub fn monitoring(engine: &Engine, source: S) -> Result<Self, Error> {
        Self::open(engine, source, SessionKind::Monitoring)
    }

    fn open(engine: &Engine, source: S, kind: SessionKind) -> Result<Self, Error> {
        engine.open_session(kind == SessionKind::Detection)?;
        info!("{} session opened ({})", kind, engine.receiver_info());
        Ok(Self {
            kind,
            source,
            settle: engine.cfg.settle_time,
            timeout: engine.cfg.first_data_timeout,
        })
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Polls the producer once and merges the result.
    pub fn tick(&mut self, engine: &Engine) -> Result<MergeReport, Error> {
        engine.poll(&mut self.source)
    }

    /// Bounded wait for first observations: keeps polling until the
    /// table holds data and the producer's elapsed marker passes the
    /// settle window. Gives up with [Error::NoDataYet] once the marker
    /// passes the timeout.
    pub fn await_first(&mut self, engine: &Engine) -> Result<MergeReport, Error> {
        loop {
            let report = self.tick(engine)?;

            if engine.total_satellites() > 0 && report.elapsed >= self.settle {
                return Ok(report);
            }

            if report.elapsed >= self.timeout {
                warn!(
                    "no satellites within {} ({} session)",
                    self.timeout, self.kind
                );
                return Err(Error::NoDataYet);
            }
        }
    }

    /// Stops the session. Synchronizes with an in-flight merge: once
    /// this returns, no further merge lands in the table until a new
    /// session opens.
    pub fn stop(self, engine: &Engine) {
        engine.close_session();
        info!("{} session stopped", self.kind);
    }
}

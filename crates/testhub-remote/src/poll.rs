//! Report poll session.
//!
//! A session is `POLLING` until one observation settles it: `FOUND`, `MALFORMED`,
//! `UNEXPECTED_STATUS`, `TRANSPORT_ERROR`, `CANCELLED`, or `TIMED_OUT` once every tick answered 404
//! or the deadline passed.
//!
//! The deadline is wall-clock: time spent inside requests counts against it, and no wait ever
//! extends past it.

use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use tokio::time::Instant;

use crate::error::ReportError;

/// What a single poll response means for the session.
#[derive(Debug)]
pub(crate) enum Observation {
    /// Report text extracted from the archive.
    Found(String),
    /// The report does not exist yet.
    Pending,
}

/// Mutable bookkeeping for one lookup.
#[derive(Debug)]
pub(crate) struct PollSession {
    filename: String,
    ticks: u32,
    tick: u32,
    started: Instant,
    deadline: Instant,
}

impl PollSession {
    pub(crate) fn new(filename: &str, ticks: u32, window: Duration) -> Self {
        let started = Instant::now();
        Self {
            filename: filename.to_string(),
            ticks: ticks.max(1),
            tick: 0,
            started,
            deadline: started + window,
        }
    }

    pub(crate) fn filename(&self) -> &str {
        &self.filename
    }

    /// Ticks consumed so far.
    pub(crate) const fn tick(&self) -> u32 {
        self.tick
    }

    pub(crate) const fn ticks(&self) -> u32 {
        self.ticks
    }

    pub(crate) const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether another request may be issued. The first request always goes out.
    pub(crate) fn has_ticks_left(&self) -> bool {
        self.tick == 0 || (self.tick < self.ticks && Instant::now() < self.deadline)
    }

    /// When the next request should go out: one interval from now, capped at the deadline.
    pub(crate) fn next_wake(&self, interval: Duration) -> Instant {
        (Instant::now() + interval).min(self.deadline)
    }

    /// Record a pending observation.
    pub(crate) const fn advance(&mut self) {
        self.tick += 1;
    }

    pub(crate) fn timed_out(&self) -> ReportError {
        ReportError::TimedOut {
            filename: self.filename.clone(),
            waited: round_to_tenth(self.started.elapsed()),
        }
    }

    pub(crate) fn cancelled(&self) -> ReportError {
        ReportError::Cancelled {
            filename: self.filename.clone(),
        }
    }

    /// Interpret one response from the report endpoint.
    pub(crate) fn observe(&self, status: StatusCode, body: &Bytes) -> Result<Observation, ReportError> {
        match status {
            StatusCode::OK => self.extract(body).map(Observation::Found),
            StatusCode::NOT_FOUND => Ok(Observation::Pending),
            other => Err(ReportError::UnexpectedStatus {
                status: other.as_u16(),
                body: String::from_utf8_lossy(body).into_owned(),
            }),
        }
    }

    fn extract(&self, body: &Bytes) -> Result<String, ReportError> {
        let contents = testhub_archive::extract_entry(body, &self.filename)
            .map_err(|err| ReportError::malformed(&self.filename, &err))?;
        String::from_utf8(contents).map_err(|_| ReportError::Malformed {
            filename: self.filename.clone(),
            detail: "report is not valid utf-8".to_string(),
        })
    }
}

fn round_to_tenth(elapsed: Duration) -> Duration {
    let tenths = (elapsed.as_millis() + 50) / 100;
    Duration::from_millis(u64::try_from(tenths * 100).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn session() -> PollSession {
        PollSession::new("Crowdfunding-report.md", 3, Duration::from_secs(3))
    }

    #[test]
    fn ok_with_archive_is_found() -> Result<()> {
        let blob = testhub_archive::pack(b"# report\n", "Crowdfunding-report.md")?;
        let observed = session().observe(StatusCode::OK, &blob)?;
        assert!(matches!(observed, Observation::Found(text) if text == "# report\n"));
        Ok(())
    }

    #[test]
    fn not_found_keeps_polling() -> Result<()> {
        let observed = session().observe(StatusCode::NOT_FOUND, &Bytes::new())?;
        assert!(matches!(observed, Observation::Pending));
        Ok(())
    }

    #[test]
    fn ok_with_garbage_is_malformed() {
        let observed = session().observe(StatusCode::OK, &Bytes::from_static(b"<html>oops</html>"));
        assert!(matches!(observed, Err(ReportError::Malformed { .. })));
    }

    #[test]
    fn ok_with_binary_report_is_malformed() -> Result<()> {
        let blob = testhub_archive::pack(&[0xff, 0xfe, 0x00], "Crowdfunding-report.md")?;
        let observed = session().observe(StatusCode::OK, &blob);
        assert!(matches!(
            observed,
            Err(ReportError::Malformed { ref detail, .. }) if detail == "report is not valid utf-8"
        ));
        Ok(())
    }

    #[test]
    fn other_statuses_surface_body() {
        let observed = session().observe(
            StatusCode::INTERNAL_SERVER_ERROR,
            &Bytes::from_static(b"container not running"),
        );
        assert!(matches!(
            observed,
            Err(ReportError::UnexpectedStatus { status: 500, ref body }) if body == "container not running"
        ));
    }

    #[test]
    fn ticks_run_out() {
        let mut session = session();
        while session.has_ticks_left() {
            session.advance();
        }
        assert_eq!(session.tick(), session.ticks());
        assert_eq!(
            session.timed_out().to_string(),
            "File 'Crowdfunding-report.md' not available after 0s."
        );
    }

    #[test]
    fn zero_window_polls_once_then_stops() {
        let mut session = PollSession::new("x-report.md", 0, Duration::ZERO);
        assert!(session.has_ticks_left());
        session.advance();
        assert!(!session.has_ticks_left());
    }

    #[test]
    fn waits_never_pass_the_deadline() {
        let session = PollSession::new("x-report.md", 10, Duration::from_millis(50));
        assert!(session.next_wake(Duration::from_secs(5)) <= session.deadline());
        assert!(session.next_wake(Duration::ZERO) <= session.deadline());
    }

    #[test]
    fn waited_time_rounds_to_tenths() {
        assert_eq!(round_to_tenth(Duration::from_millis(83)), Duration::from_millis(100));
        assert_eq!(round_to_tenth(Duration::from_millis(60_020)), Duration::from_secs(60));
        assert_eq!(round_to_tenth(Duration::from_millis(1_260)), Duration::from_millis(1_300));
    }
}

//! Request wall-clock timing

use chrono::{DateTime, Utc};

/// Wall-clock timer pinned to the request's arrival instant.
///
/// One timer per request lifecycle; the start instant doubles as the
/// record's `requested_at` field.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    started_at: DateTime<Utc>,
}

impl RequestTimer {
    /// Start timing now.
    pub fn start() -> Self {
        Self::start_at(Utc::now())
    }

    /// Start timing at an explicit instant.
    pub fn start_at(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole milliseconds between the start and `now`, rounded to the
    /// nearest millisecond. Never negative: a `now` that precedes the
    /// start yields 0.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = now.signed_duration_since(self.started_at);
        let millis = match elapsed.num_microseconds() {
            Some(us) => (us + 500) / 1000,
            None => elapsed.num_milliseconds(),
        };
        millis.max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 12, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_elapsed_whole_millis() {
        let timer = RequestTimer::start_at(instant());
        let now = instant() + Duration::milliseconds(1234);
        assert_eq!(timer.elapsed_ms(now), 1234);
    }

    #[test]
    fn test_elapsed_rounds_to_nearest() {
        let timer = RequestTimer::start_at(instant());

        assert_eq!(timer.elapsed_ms(instant() + Duration::microseconds(499)), 0);
        assert_eq!(timer.elapsed_ms(instant() + Duration::microseconds(500)), 1);
        assert_eq!(
            timer.elapsed_ms(instant() + Duration::microseconds(1_000_600)),
            1001
        );
    }

    #[test]
    fn test_negative_elapsed_clamps_to_zero() {
        let timer = RequestTimer::start_at(instant() + Duration::seconds(10));
        assert_eq!(timer.elapsed_ms(instant()), 0);
    }

    #[test]
    fn test_started_at_is_kept() {
        let timer = RequestTimer::start_at(instant());
        assert_eq!(timer.started_at(), instant());
    }
}

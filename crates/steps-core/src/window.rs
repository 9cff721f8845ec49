//! Time windows over engagement creation times.
//!
//! User input is a calendar date with an optional time of day, read as
//! wall-clock time in a named IANA zone. The resulting window is half-open:
//! the lower bound (`--after`) is inclusive, the upper bound (`--before`)
//! is exclusive.

use crate::error::{Result, StepsError};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Accepted input layouts, tried in order.
const DATE_ONLY: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Resolve an IANA zone name such as `America/New_York` or `UTC`.
/// Exact spellings win; otherwise the name is matched ignoring case.
pub fn resolve_time_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .or_else(|_| Tz::from_str_insensitive(name))
        .map_err(|_| StepsError::UnknownTimeZone(name.to_string()))
}

/// Parse `yyyy-mm-dd [HH:MM[:SS]]` and attach `tz` to the wall-clock value.
/// Missing time components default to zero.
pub fn parse_instant(input: &str, tz: Tz) -> Result<DateTime<Tz>> {
    parse_naive(input)
        .and_then(|naive| localize(naive, tz))
        .ok_or_else(|| StepsError::InvalidDateTime(input.to_string()))
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_ONLY) {
        return date.and_hms_opt(0, 0, 0);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

/// Bind a wall-clock value to `tz` without shifting it.
///
/// A repeated hour (DST fall-back) resolves to the later, standard-time
/// instant. A skipped wall-clock time (spring-forward, or a whole skipped
/// day) is read with the offset in force a day earlier, before the gap.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(_, latest) => Some(latest),
        LocalResult::None => {
            let prior = tz.offset_from_utc_datetime(&(naive - Duration::days(1)));
            let offset = Duration::seconds(i64::from(prior.fix().local_minus_utc()));
            Some(tz.from_utc_datetime(&(naive - offset)))
        }
    }
}

/// True when `instant` lies in `[after, before)`. Absent bounds do not constrain.
pub fn in_range<Z, B>(
    instant: &DateTime<Z>,
    after: Option<&DateTime<B>>,
    before: Option<&DateTime<B>>,
) -> bool
where
    Z: TimeZone,
    B: TimeZone,
{
    let at = instant.with_timezone(&Utc);
    if let Some(after) = after {
        if at < after.with_timezone(&Utc) {
            return false;
        }
    }
    if let Some(before) = before {
        if at >= before.with_timezone(&Utc) {
            return false;
        }
    }
    true
}

/// An immutable `[after, before)` window in a single zone.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    after: Option<DateTime<Tz>>,
    before: Option<DateTime<Tz>>,
}

impl TimeWindow {
    /// A window that matches every instant.
    pub fn unbounded() -> Self {
        Self {
            after: None,
            before: None,
        }
    }

    /// Build a window from already-localized bounds, rejecting `after > before`.
    pub fn new(after: Option<DateTime<Tz>>, before: Option<DateTime<Tz>>) -> Result<Self> {
        if let (Some(a), Some(b)) = (&after, &before) {
            if a > b {
                return Err(StepsError::InvertedRange);
            }
        }
        Ok(Self { after, before })
    }

    /// Resolve `tz_name`, then parse each supplied bound in that zone.
    ///
    /// The zone is checked first so a bad name is reported even when no
    /// bounds are given. Empty strings count as absent bounds.
    pub fn parse(tz_name: &str, after: Option<&str>, before: Option<&str>) -> Result<Self> {
        let tz = resolve_time_zone(tz_name)?;
        let after = parse_bound(after, tz)?;
        let before = parse_bound(before, tz)?;
        Self::new(after, before)
    }

    pub fn after(&self) -> Option<&DateTime<Tz>> {
        self.after.as_ref()
    }

    pub fn before(&self) -> Option<&DateTime<Tz>> {
        self.before.as_ref()
    }

    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }

    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        in_range(instant, self.after.as_ref(), self.before.as_ref())
    }
}

fn parse_bound(input: Option<&str>, tz: Tz) -> Result<Option<DateTime<Tz>>> {
    match input {
        Some(s) if !s.is_empty() => parse_instant(s, tz).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn resolves_known_zones() {
        assert_eq!(resolve_time_zone("UTC").unwrap(), Tz::UTC);
        assert_eq!(
            resolve_time_zone("America/New_York").unwrap(),
            Tz::America__New_York
        );
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let err = resolve_time_zone("Nowhere/Imaginary").unwrap_err();
        assert!(matches!(err, StepsError::UnknownTimeZone(ref n) if n == "Nowhere/Imaginary"));
    }

    #[test]
    fn zone_names_match_any_case() {
        assert_eq!(resolve_time_zone("utc").unwrap(), Tz::UTC);
        assert_eq!(
            resolve_time_zone("america/new_york").unwrap(),
            Tz::America__New_York
        );
        assert_eq!(
            resolve_time_zone("EUROPE/LONDON").unwrap(),
            Tz::Europe__London
        );
    }

    #[test]
    fn unknown_zone_reported_without_bounds() {
        let err = TimeWindow::parse("Nowhere/Imaginary", None, None).unwrap_err();
        assert!(matches!(err, StepsError::UnknownTimeZone(_)));
    }

    #[test]
    fn date_only_is_midnight() {
        let dt = parse_instant("2023-06-01", Tz::UTC).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2023-06-01T00:00:00Z"));
    }

    #[test]
    fn hour_minute_defaults_seconds() {
        let dt = parse_instant("2023-06-01 14:30", Tz::UTC).unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 0));
    }

    #[test]
    fn full_time_is_kept() {
        let dt = parse_instant("2023-06-01 14:30:45", Tz::UTC).unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 45));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = parse_instant("not-a-date", Tz::UTC).unwrap_err();
        assert!(matches!(err, StepsError::InvalidDateTime(ref s) if s == "not-a-date"));
    }

    #[test]
    fn out_of_range_fields_are_invalid() {
        assert!(parse_instant("2023-13-01", Tz::UTC).is_err());
        assert!(parse_instant("2023-06-01 25:00", Tz::UTC).is_err());
    }

    #[test]
    fn zone_is_attached_not_converted() {
        let tz = resolve_time_zone("America/New_York").unwrap();
        let dt = parse_instant("2023-06-01 09:00", tz).unwrap();
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.with_timezone(&Utc), utc("2023-06-01T13:00:00Z"));
    }

    #[test]
    fn repeated_hour_picks_standard_time() {
        let tz = resolve_time_zone("America/New_York").unwrap();
        let dt = parse_instant("2023-11-05 01:30", tz).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2023-11-05T06:30:00Z"));
    }

    #[test]
    fn skipped_hour_uses_prior_offset() {
        let tz = resolve_time_zone("America/New_York").unwrap();
        let dt = parse_instant("2023-03-12 02:30", tz).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2023-03-12T07:30:00Z"));
    }

    #[test]
    fn skipped_day_uses_prior_offset() {
        // Samoa jumped from UTC-10 to UTC+14, skipping 2011-12-30 entirely.
        let tz = resolve_time_zone("Pacific/Apia").unwrap();
        let dt = parse_instant("2011-12-30 12:00", tz).unwrap();
        assert_eq!(dt.with_timezone(&Utc), utc("2011-12-30T22:00:00Z"));
    }

    #[test]
    fn unbounded_matches_everything() {
        let x = utc("1999-12-31T23:59:59Z");
        assert!(in_range::<Utc, Utc>(&x, None, None));
        assert!(TimeWindow::unbounded().contains(&x));
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let lower = parse_instant("2023-06-01", Tz::UTC).unwrap();
        assert!(in_range(&lower, Some(&lower), None));
        let earlier = lower - Duration::seconds(1);
        assert!(!in_range(&earlier, Some(&lower), None));
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let upper = parse_instant("2023-06-02", Tz::UTC).unwrap();
        assert!(!in_range(&upper, None, Some(&upper)));
        let earlier = upper - Duration::seconds(1);
        assert!(in_range(&earlier, None, Some(&upper)));
    }

    #[test]
    fn compares_across_zones() {
        let window = TimeWindow::parse("America/New_York", Some("2023-06-01"), None).unwrap();
        // 03:59Z is still May 31 in New York.
        assert!(!window.contains(&utc("2023-06-01T03:59:00Z")));
        assert!(window.contains(&utc("2023-06-01T04:00:00Z")));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TimeWindow::parse("UTC", Some("2023-06-02"), Some("2023-06-01")).unwrap_err();
        assert!(matches!(err, StepsError::InvertedRange));
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let window = TimeWindow::parse("UTC", Some("2023-06-01"), Some("2023-06-01")).unwrap();
        assert!(!window.contains(&utc("2023-06-01T00:00:00Z")));
    }

    #[test]
    fn empty_bounds_are_absent() {
        let window = TimeWindow::parse("UTC", Some(""), None).unwrap();
        assert!(window.is_unbounded());
    }

    #[test]
    fn invalid_after_reported_before_before() {
        let err = TimeWindow::parse("UTC", Some("bogus"), Some("also bogus")).unwrap_err();
        assert!(matches!(err, StepsError::InvalidDateTime(ref s) if s == "bogus"));
    }
}

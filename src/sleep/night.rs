//! Night aggregation
//!
//! Groups asleep intervals into nightly totals. An interval belongs to the
//! night keyed by its start: starts before the cutoff hour (noon) are the
//! tail of the previous evening's sleep and count toward the previous
//! calendar date. Intervals are never split across midnight.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chart::{ChartKind, ChartSeries};
use crate::config::SleepConfig;
use crate::records::{normalize_records, HealthRecord, RecordsResult, ReportZone};

/// Most recent nights kept in a series
pub const DEFAULT_MAX_NIGHTS: usize = 30;

/// Starts before this local hour belong to the previous night
pub const DEFAULT_CUTOFF_HOUR: u32 = 12;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Total sleep attributed to one night
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightlySleep {
    /// Calendar date of the evening the night started
    pub date: NaiveDate,
    /// Accumulated asleep duration in hours
    pub hours: f64,
}

impl NightlySleep {
    pub fn new(date: NaiveDate, hours: f64) -> Self {
        Self { date, hours }
    }

    /// Copy with `hours` rounded to `places` decimals, for display
    pub fn rounded(&self, places: i32) -> Self {
        let factor = 10f64.powi(places);
        Self {
            date: self.date,
            hours: (self.hours * factor).round() / factor,
        }
    }

    /// `YYYY-MM-DD` key
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Aggregates sleep records into a capped, date-ordered nightly series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NightAggregator {
    max_nights: usize,
    cutoff_hour: u32,
    zone: ReportZone,
}

impl Default for NightAggregator {
    fn default() -> Self {
        Self {
            max_nights: DEFAULT_MAX_NIGHTS,
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            zone: ReportZone::Local,
        }
    }
}

impl NightAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[sleep]` config section
    pub fn from_config(config: &SleepConfig) -> RecordsResult<Self> {
        Ok(Self::new()
            .with_max_nights(config.max_nights)
            .with_cutoff_hour(config.cutoff_hour)
            .with_zone(config.zone()?))
    }

    /// Builder: cap on the number of nights returned
    pub fn with_max_nights(mut self, max_nights: usize) -> Self {
        self.max_nights = max_nights;
        self
    }

    /// Builder: local hour before which a start counts toward the previous night
    pub fn with_cutoff_hour(mut self, hour: u32) -> Self {
        self.cutoff_hour = hour.min(23);
        self
    }

    /// Builder: zone that defines "local" dates and hours
    pub fn with_zone(mut self, zone: ReportZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn max_nights(&self) -> usize {
        self.max_nights
    }

    pub fn zone(&self) -> ReportZone {
        self.zone
    }

    /// Night an interval starting at `start` belongs to
    pub fn night_key(&self, start: DateTime<Utc>) -> NaiveDate {
        let local = self.zone.to_local(start);
        let date = local.date();
        if local.hour() < self.cutoff_hour {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }

    /// Parsed `(start, end)` of a record, or `None` if malformed
    fn interval(&self, record: &HealthRecord) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = record.start_time(self.zone)?;
        let end = record.end_time(self.zone)?;
        (end > start).then_some((start, end))
    }

    /// Aggregate records into nightly totals
    ///
    /// Only asleep `SleepAnalysis` records count. Records with unparsable
    /// dates or a non-positive duration are skipped. The result is sorted by
    /// date and keeps only the most recent `max_nights` nights. Hours are not
    /// rounded.
    pub fn aggregate<'a, I>(&self, records: I) -> Vec<NightlySleep>
    where
        I: IntoIterator<Item = &'a HealthRecord>,
    {
        let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut retained = 0usize;
        let mut skipped = 0usize;

        for record in records {
            if !record.is_asleep() {
                continue;
            }

            let Some((start, end)) = self.interval(record) else {
                skipped += 1;
                continue;
            };

            let hours = duration_hours(end - start);
            *buckets.entry(self.night_key(start)).or_insert(0.0) += hours;
            retained += 1;
        }

        tracing::debug!(
            retained,
            skipped,
            nights = buckets.len(),
            "Aggregated sleep intervals"
        );

        let excess = buckets.len().saturating_sub(self.max_nights);
        buckets
            .into_iter()
            .skip(excess)
            .map(|(date, hours)| NightlySleep { date, hours })
            .collect()
    }

    /// Normalize a JSON record payload and aggregate it
    ///
    /// Fails only when the payload is not a record collection.
    pub fn aggregate_json(&self, payload: serde_json::Value) -> RecordsResult<Vec<NightlySleep>> {
        let records = normalize_records(payload)?;
        Ok(self.aggregate(&records))
    }
}

/// Aggregate with default settings in the system local zone
pub fn aggregate_nights<'a, I>(records: I) -> Vec<NightlySleep>
where
    I: IntoIterator<Item = &'a HealthRecord>,
{
    NightAggregator::default().aggregate(records)
}

/// Chart series of nightly hours, `x` as `YYYY-MM-DD`
pub fn to_chart_series(nights: &[NightlySleep]) -> ChartSeries {
    nights.iter().fold(
        ChartSeries::new("Sleep per night", ChartKind::Bar, "hours"),
        |series, night| series.point(night.date_key(), night.hours),
    )
}

fn duration_hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RecordsError, SLEEP_ANALYSIS};
    use chrono::FixedOffset;
    use serde_json::json;

    fn utc_aggregator() -> NightAggregator {
        NightAggregator::new().with_zone(ReportZone::Utc)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn asleep(start: &str, end: &str) -> HealthRecord {
        HealthRecord::sleep("Asleep", start, end)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_evening_start_keeps_same_date() {
        let nights = utc_aggregator().aggregate(&[asleep(
            "2024-01-02T23:00:00Z",
            "2024-01-03T07:00:00Z",
        )]);

        assert_eq!(nights, vec![NightlySleep::new(date("2024-01-02"), 8.0)]);
    }

    #[test]
    fn test_early_morning_start_goes_to_previous_date() {
        let nights = utc_aggregator().aggregate(&[asleep(
            "2024-01-03T01:00:00Z",
            "2024-01-03T06:30:00Z",
        )]);

        assert_eq!(nights, vec![NightlySleep::new(date("2024-01-02"), 5.5)]);
    }

    #[test]
    fn test_intervals_on_same_night_are_summed() {
        let nights = utc_aggregator().aggregate(&[
            asleep("2024-01-05T22:00:00Z", "2024-01-06T01:00:00Z"),
            asleep("2024-01-06T02:00:00Z", "2024-01-06T06:15:00Z"),
        ]);

        assert_eq!(nights.len(), 1);
        assert_eq!(nights[0].date, date("2024-01-05"));
        assert!(approx(nights[0].hours, 7.25));
    }

    #[test]
    fn test_awake_records_are_excluded() {
        let nights = utc_aggregator().aggregate(&[HealthRecord::sleep(
            "Awake",
            "2024-01-02T23:00:00Z",
            "2024-01-03T07:00:00Z",
        )]);
        assert!(nights.is_empty());
    }

    #[test]
    fn test_keeps_thirty_most_recent_nights() {
        let first = date("2024-01-01");
        let records: Vec<HealthRecord> = (0..40)
            .map(|i| {
                let night = first + Duration::days(i);
                asleep(
                    &format!("{}T22:00:00Z", night),
                    &format!("{}T23:00:00Z", night),
                )
            })
            .collect();

        let nights = utc_aggregator().aggregate(&records);

        assert_eq!(nights.len(), 30);
        assert_eq!(nights.first().unwrap().date, first + Duration::days(10));
        assert_eq!(nights.last().unwrap().date, first + Duration::days(39));
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<HealthRecord> = Vec::new();
        assert!(utc_aggregator().aggregate(&records).is_empty());
    }

    #[test]
    fn test_cutoff_boundary() {
        let aggregator = utc_aggregator();

        let noon = aggregator.aggregate(&[asleep("2024-03-10T12:00:00Z", "2024-03-10T13:00:00Z")]);
        assert_eq!(noon[0].date, date("2024-03-10"));

        let before_noon =
            aggregator.aggregate(&[asleep("2024-03-10T11:59:59Z", "2024-03-10T13:00:00Z")]);
        assert_eq!(before_noon[0].date, date("2024-03-09"));

        let midnight =
            aggregator.aggregate(&[asleep("2024-03-01T00:00:00Z", "2024-03-01T05:00:00Z")]);
        assert_eq!(midnight[0].date, date("2024-02-29"));
    }

    #[test]
    fn test_permissive_asleep_variants() {
        let records = vec![
            HealthRecord::sleep("AsleepCore", "2024-01-02T22:00:00Z", "2024-01-02T23:00:00Z"),
            HealthRecord::sleep("asleepDeep", "2024-01-02T23:00:00Z", "2024-01-03T00:00:00Z"),
            HealthRecord::sleep(
                "HKCategoryValueSleepAnalysisAsleepREM",
                "2024-01-03T00:00:00Z",
                "2024-01-03T01:00:00Z",
            ),
            HealthRecord::sleep("InBed", "2024-01-02T21:00:00Z", "2024-01-03T07:00:00Z"),
        ];

        let nights = utc_aggregator().aggregate(&records);
        assert_eq!(nights, vec![NightlySleep::new(date("2024-01-02"), 3.0)]);
    }

    #[test]
    fn test_other_record_types_are_ignored() {
        let records = vec![
            HealthRecord::new("HeartRate")
                .value("Asleep")
                .interval("2024-01-02T22:00:00Z", "2024-01-03T06:00:00Z"),
            HealthRecord::new("sleepanalysis")
                .value("Asleep")
                .interval("2024-01-02T22:00:00Z", "2024-01-03T06:00:00Z"),
            HealthRecord::new(SLEEP_ANALYSIS)
                .value(1.0)
                .interval("2024-01-02T22:00:00Z", "2024-01-03T06:00:00Z"),
        ];

        assert!(utc_aggregator().aggregate(&records).is_empty());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let records = vec![
            asleep("2024-01-03T07:00:00Z", "2024-01-02T23:00:00Z"),
            asleep("2024-01-02T23:00:00Z", "2024-01-02T23:00:00Z"),
            asleep("yesterday", "2024-01-03T07:00:00Z"),
            HealthRecord::new(SLEEP_ANALYSIS).value("Asleep"),
            asleep("2024-01-04T23:00:00Z", "2024-01-05T06:00:00Z"),
        ];

        let nights = utc_aggregator().aggregate(&records);
        assert_eq!(nights, vec![NightlySleep::new(date("2024-01-04"), 7.0)]);
    }

    #[test]
    fn test_night_key_follows_zone() {
        // 01:00 UTC is 20:00 the previous evening at UTC-5
        let record = asleep("2024-01-03T01:00:00Z", "2024-01-03T07:00:00Z");
        let eastern = ReportZone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());

        let utc_nights = utc_aggregator().aggregate(std::slice::from_ref(&record));
        let local_nights = NightAggregator::new()
            .with_zone(eastern)
            .aggregate(std::slice::from_ref(&record));

        assert_eq!(utc_nights[0].date, date("2024-01-02"));
        assert_eq!(local_nights[0].date, date("2024-01-02"));

        // 13:00 UTC is 08:00 at UTC-5: morning, so previous date there
        let record = asleep("2024-01-03T13:00:00Z", "2024-01-03T14:00:00Z");
        let utc_nights = utc_aggregator().aggregate(std::slice::from_ref(&record));
        let local_nights = NightAggregator::new()
            .with_zone(eastern)
            .aggregate(std::slice::from_ref(&record));

        assert_eq!(utc_nights[0].date, date("2024-01-03"));
        assert_eq!(local_nights[0].date, date("2024-01-02"));
    }

    #[test]
    fn test_default_aggregation_uses_local_zone() {
        let starts = [
            "2024-03-05T01:00:00Z",
            "2024-03-06T09:30:00Z",
            "2024-03-07T15:00:00Z",
            "2024-03-08T23:45:00Z",
        ];

        for start in starts {
            let begin = DateTime::parse_from_rfc3339(start).unwrap().with_timezone(&Utc);
            let end = begin + Duration::hours(2);
            let record = asleep(start, &end.to_rfc3339());

            let local = begin.with_timezone(&chrono::Local);
            let expected = if local.hour() < 12 {
                local.date_naive().pred_opt().unwrap()
            } else {
                local.date_naive()
            };

            let nights = aggregate_nights(&[record]);
            assert_eq!(nights.len(), 1, "start {}", start);
            assert_eq!(nights[0].date, expected, "start {}", start);
            assert!(approx(nights[0].hours, 2.0));
            assert_eq!(NightAggregator::default().night_key(begin), expected);
        }
    }

    #[test]
    fn test_totals_are_preserved_and_ordered() {
        let records = vec![
            asleep("2024-02-10T23:10:00Z", "2024-02-11T06:47:00Z"),
            asleep("2024-02-08T21:33:00Z", "2024-02-09T02:01:00Z"),
            asleep("2024-02-09T03:00:00Z", "2024-02-09T05:20:00Z"),
            asleep("2024-02-12T13:00:00Z", "2024-02-12T14:05:00Z"),
            asleep("2024-02-09T22:00:00Z", "2024-02-10T07:59:00Z"),
        ];

        let nights = utc_aggregator().aggregate(&records);

        let expected: f64 = records
            .iter()
            .map(|r| {
                duration_hours(r.end_time(ReportZone::Utc).unwrap() - r.start_time(ReportZone::Utc).unwrap())
            })
            .sum();
        let total: f64 = nights.iter().map(|n| n.hours).sum();
        assert!(approx(total, expected));

        for pair in nights.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_reaggregation_is_stable() {
        let aggregator = utc_aggregator();
        let nights = aggregator.aggregate(&[
            asleep("2024-01-02T23:00:00Z", "2024-01-03T07:00:00Z"),
            asleep("2024-01-04T02:00:00Z", "2024-01-04T05:45:00Z"),
        ]);

        // One evening interval per night with the night's total duration
        let rebuilt: Vec<HealthRecord> = nights
            .iter()
            .map(|night| {
                let start = night.date.and_hms_opt(22, 0, 0).unwrap().and_utc();
                let end = start + Duration::milliseconds((night.hours * MILLIS_PER_HOUR) as i64);
                asleep(&start.to_rfc3339(), &end.to_rfc3339())
            })
            .collect();

        assert_eq!(aggregator.aggregate(&rebuilt), nights);
    }

    #[test]
    fn test_hours_stay_unrounded() {
        let nights = utc_aggregator().aggregate(&[asleep(
            "2024-01-02T23:00:00Z",
            "2024-01-02T23:20:00Z",
        )]);

        assert!(approx(nights[0].hours, 1.0 / 3.0));
        assert_eq!(nights[0].rounded(2).hours, 0.33);
    }

    #[test]
    fn test_max_nights_override() {
        let records = vec![
            asleep("2024-01-01T22:00:00Z", "2024-01-01T23:00:00Z"),
            asleep("2024-01-02T22:00:00Z", "2024-01-02T23:00:00Z"),
            asleep("2024-01-03T22:00:00Z", "2024-01-03T23:00:00Z"),
        ];

        let nights = utc_aggregator().with_max_nights(2).aggregate(&records);
        assert_eq!(
            nights.iter().map(|n| n.date_key()).collect::<Vec<_>>(),
            vec!["2024-01-02", "2024-01-03"]
        );
    }

    #[test]
    fn test_aggregate_json() {
        let aggregator = utc_aggregator();

        let nights = aggregator
            .aggregate_json(json!({"records": [{
                "type": "SleepAnalysis",
                "value": "Asleep",
                "startDate": "2024-01-02T23:00:00Z",
                "endDate": "2024-01-03T07:00:00Z"
            }]}))
            .unwrap();
        assert_eq!(nights.len(), 1);

        let err = aggregator.aggregate_json(json!(7)).unwrap_err();
        assert!(matches!(err, RecordsError::InvalidCollection(_)));
    }

    #[test]
    fn test_chart_series() {
        let series = to_chart_series(&[
            NightlySleep::new(date("2024-01-01"), 7.5),
            NightlySleep::new(date("2024-01-02"), 6.0),
        ]);

        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].x, "2024-01-01");
        assert_eq!(series.points[1].y, 6.0);
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(NightlySleep::new(date("2024-01-02"), 8.0)).unwrap();
        assert_eq!(json, json!({"date": "2024-01-02", "hours": 8.0}));
    }
}

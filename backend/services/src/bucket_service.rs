//! Aggregation of raw status history into fixed-width buckets for uptime bars
//! and latency charts.

use chrono::{DateTime, Duration, Utc};
use statusboard_shared::{DisplayStatus, ProbeStatus, StatusRecord, TimeBucket};

/// The window ends this many minutes before `now`, so the newest bucket is
/// likely to hold data instead of waiting on the next probe.
pub const ANCHOR_OFFSET_MINUTES: i64 = 10;

/// Window end for a given wall-clock instant.
pub fn anchor_for(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(ANCHOR_OFFSET_MINUTES)
}

/// Buckets `records` over the `window_days` ending at `now - ANCHOR_OFFSET_MINUTES`.
pub fn bucketize(records: &[StatusRecord], window_days: u32, bucket_count: usize) -> Vec<TimeBucket> {
    bucketize_at(records, window_days, bucket_count, Utc::now())
}

/// Splits `[anchor - window_days, anchor)` into `bucket_count` contiguous half-open
/// buckets, oldest first, and folds each record into the bucket holding its
/// timestamp. Records outside the window are ignored. A bucket with any down
/// record is down; otherwise it is up if it holds records and unknown if not.
///
/// A `bucket_count` of zero is treated as one.
pub fn bucketize_at(
    records: &[StatusRecord],
    window_days: u32,
    bucket_count: usize,
    now: DateTime<Utc>,
) -> Vec<TimeBucket> {
    let bucket_count = bucket_count.max(1);
    let anchor = anchor_for(now);
    let requested_ms = i64::from(window_days) * 24 * 60 * 60 * 1000;
    // Windows reaching past the representable range start at the earliest instant.
    let window_start = anchor
        .checked_sub_signed(Duration::milliseconds(requested_ms))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let window_ms = (anchor - window_start).num_milliseconds();

    // boundaries[i] is the start of bucket i, boundaries[bucket_count] == anchor.
    // Integer division keeps the buckets contiguous when the window does not
    // divide evenly.
    let boundaries: Vec<DateTime<Utc>> = (0..=bucket_count)
        .map(|i| {
            if i == bucket_count {
                return anchor;
            }
            let offset = (i128::from(window_ms) * i as i128 / bucket_count as i128) as i64;
            window_start + Duration::milliseconds(offset)
        })
        .collect();

    let mut accumulators = vec![Accumulator::default(); bucket_count];

    for record in records {
        if let Some(index) = bucket_index(&boundaries, record.timestamp) {
            accumulators[index].add(record);
        }
    }

    accumulators
        .into_iter()
        .enumerate()
        .map(|(i, acc)| acc.finish(boundaries[i], boundaries[i + 1]))
        .collect()
}

/// Share of buckets that are up among the buckets holding data, as a percentage.
pub fn uptime_percentage(buckets: &[TimeBucket]) -> Option<f64> {
    let known = buckets
        .iter()
        .filter(|b| b.status != DisplayStatus::Unknown)
        .count();
    if known == 0 {
        return None;
    }
    let up = buckets
        .iter()
        .filter(|b| b.status == DisplayStatus::Up)
        .count();
    Some(up as f64 * 100.0 / known as f64)
}

fn bucket_index(boundaries: &[DateTime<Utc>], timestamp: DateTime<Utc>) -> Option<usize> {
    let (first, last) = (boundaries.first()?, boundaries.last()?);
    if timestamp < *first || timestamp >= *last {
        return None;
    }
    // Number of boundaries <= timestamp, minus one, is the bucket whose start
    // precedes it. Zero-width buckets are skipped this way.
    let index = boundaries.partition_point(|b| *b <= timestamp) - 1;
    Some(index)
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    status: DisplayStatus,
    total_response_time_ms: u64,
    count: u32,
}

impl Accumulator {
    fn add(&mut self, record: &StatusRecord) {
        self.status = match (self.status, record.status) {
            (_, ProbeStatus::Down) => DisplayStatus::Down,
            (DisplayStatus::Unknown, ProbeStatus::Up) => DisplayStatus::Up,
            (current, ProbeStatus::Up) => current,
        };
        self.total_response_time_ms = self
            .total_response_time_ms
            .saturating_add(record.response_time_ms);
        self.count += 1;
    }

    fn finish(self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> TimeBucket {
        let mean_response_time_ms = if self.count > 0 {
            self.total_response_time_ms as f64 / self.count as f64
        } else {
            0.0
        };

        TimeBucket {
            start_time,
            end_time,
            status: self.status,
            mean_response_time_ms,
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn record_at(timestamp: DateTime<Utc>, status: ProbeStatus, response_time_ms: u64) -> StatusRecord {
        StatusRecord {
            id: Uuid::new_v4(),
            service_id: Uuid::nil(),
            status,
            response_time_ms,
            timestamp,
        }
    }

    #[test]
    fn buckets_are_contiguous_and_cover_the_window() {
        for (days, count) in [(1, 24), (7, 140), (30, 97), (1, 7), (3, 1)] {
            let buckets = bucketize_at(&[], days, count, now());
            let anchor = anchor_for(now());

            assert_eq!(buckets.len(), count);
            assert_eq!(buckets[0].start_time, anchor - Duration::days(days as i64));
            assert_eq!(buckets[count - 1].end_time, anchor);
            for pair in buckets.windows(2) {
                assert_eq!(pair[0].end_time, pair[1].start_time);
                assert!(pair[0].start_time < pair[0].end_time);
            }
        }
    }

    #[test]
    fn oversized_window_is_clamped_to_the_earliest_instant() {
        let records = vec![record_at(now() - Duration::hours(1), ProbeStatus::Up, 5)];
        let buckets = bucketize_at(&records, u32::MAX, 4, now());

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].start_time, DateTime::<Utc>::MIN_UTC);
        assert_eq!(buckets[3].end_time, anchor_for(now()));
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
        assert_eq!(buckets[3].status, DisplayStatus::Up);
    }

    #[test]
    fn empty_history_is_all_unknown() {
        let buckets = bucketize_at(&[], 7, 140, now());
        assert!(buckets.iter().all(|b| b.status == DisplayStatus::Unknown));
        assert!(buckets.iter().all(|b| b.mean_response_time_ms == 0.0 && b.count == 0));
        assert_eq!(uptime_percentage(&buckets), None);
    }

    #[test]
    fn wall_clock_window_ends_before_now() {
        let before = Utc::now();
        let buckets = bucketize(&[record_at(before - Duration::minutes(20), ProbeStatus::Up, 5)], 1, 24);

        let end = buckets[23].end_time;
        assert!(end <= Utc::now() - Duration::minutes(ANCHOR_OFFSET_MINUTES));
        assert!(end >= before - Duration::minutes(ANCHOR_OFFSET_MINUTES));
        assert_eq!(buckets[23].status, DisplayStatus::Up);
    }

    #[test]
    fn zero_bucket_count_degenerates_to_whole_window() {
        let buckets = bucketize_at(&[], 1, 0, now());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].end_time - buckets[0].start_time, Duration::days(1));
    }

    #[test]
    fn down_record_lands_in_its_hour() {
        let anchor = anchor_for(now());
        let window_start = anchor - Duration::days(1);
        let at_hour_five = window_start + Duration::hours(5) + Duration::minutes(30);
        let records = vec![record_at(at_hour_five, ProbeStatus::Down, 812)];

        let buckets = bucketize_at(&records, 1, 24, now());

        assert_eq!(buckets.len(), 24);
        for (i, bucket) in buckets.iter().enumerate() {
            if i == 5 {
                assert_eq!(bucket.status, DisplayStatus::Down);
                assert_eq!(bucket.mean_response_time_ms, 812.0);
            } else {
                assert_eq!(bucket.status, DisplayStatus::Unknown, "bucket {}", i);
            }
        }
    }

    #[test]
    fn down_dominates_up_in_either_order() {
        let anchor = anchor_for(now());
        let t = anchor - Duration::minutes(30);
        let up = record_at(t, ProbeStatus::Up, 100);
        let down = record_at(t + Duration::minutes(1), ProbeStatus::Down, 300);

        for records in [vec![up.clone(), down.clone()], vec![down.clone(), up.clone()]] {
            let buckets = bucketize_at(&records, 1, 24, now());
            let last = buckets.last().unwrap();
            assert_eq!(last.status, DisplayStatus::Down);
            assert_eq!(last.count, 2);
            assert_eq!(last.mean_response_time_ms, 200.0);
        }
    }

    #[test]
    fn boundaries_are_half_open() {
        let anchor = anchor_for(now());
        let window_start = anchor - Duration::days(1);
        let records = vec![
            record_at(window_start, ProbeStatus::Up, 10),
            record_at(window_start + Duration::hours(1), ProbeStatus::Down, 20),
            record_at(anchor, ProbeStatus::Down, 30),
            record_at(window_start - Duration::milliseconds(1), ProbeStatus::Down, 40),
        ];

        let buckets = bucketize_at(&records, 1, 24, now());

        assert_eq!(buckets[0].status, DisplayStatus::Up);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].status, DisplayStatus::Down);
        assert_eq!(buckets[23].status, DisplayStatus::Unknown);
        let total: u32 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn output_order_does_not_depend_on_input_order() {
        let anchor = anchor_for(now());
        let mut records: Vec<StatusRecord> = (0..48)
            .map(|i| {
                let status = if i % 5 == 0 { ProbeStatus::Down } else { ProbeStatus::Up };
                record_at(anchor - Duration::minutes(30 * i + 1), status, i as u64)
            })
            .collect();

        let oldest_first = bucketize_at(&records, 1, 24, now());
        records.reverse();
        let newest_first = bucketize_at(&records, 1, 24, now());

        assert_eq!(oldest_first, newest_first);
    }

    #[test]
    fn uptime_counts_only_buckets_with_data() {
        let anchor = anchor_for(now());
        let records = vec![
            record_at(anchor - Duration::minutes(30), ProbeStatus::Up, 10),
            record_at(anchor - Duration::minutes(90), ProbeStatus::Up, 10),
            record_at(anchor - Duration::minutes(150), ProbeStatus::Up, 10),
            record_at(anchor - Duration::minutes(210), ProbeStatus::Down, 10),
        ];

        let buckets = bucketize_at(&records, 1, 24, now());
        assert_eq!(uptime_percentage(&buckets), Some(75.0));
    }
}

use statusboard_services::MonitorError;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const DEFAULT_HISTORY_LIMIT: u64 = 500;
pub const DEFAULT_UPTIME_DAYS: u32 = 7;
pub const DEFAULT_UPTIME_BUCKETS: usize = 140;

/// Validate and normalize history and uptime query parameters
#[derive(Debug, Clone)]
pub struct HistoryQueryValidator {
    max_range_days: u32,
    max_results: u64,
    max_buckets: usize,
}

impl HistoryQueryValidator {
    pub fn new(max_range_days: u32, max_results: u64, max_buckets: usize) -> Self {
        Self {
            max_range_days,
            max_results,
            max_buckets,
        }
    }

    /// Returns `(days, limit)`. Limits above the maximum are clamped.
    pub fn validate_history(
        &self,
        days: Option<u32>,
        limit: Option<u64>,
    ) -> Result<(u32, u64), MonitorError> {
        let days = self.validate_days(days.unwrap_or(DEFAULT_HISTORY_DAYS))?;

        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if limit == 0 {
            return Err(MonitorError::validation("'limit' must be at least 1"));
        }

        Ok((days, limit.min(self.max_results)))
    }

    /// Returns `(days, buckets)`. Bucket counts above the maximum are clamped.
    pub fn validate_uptime(
        &self,
        days: Option<u32>,
        buckets: Option<usize>,
    ) -> Result<(u32, usize), MonitorError> {
        let days = self.validate_days(days.unwrap_or(DEFAULT_UPTIME_DAYS))?;

        let buckets = buckets.unwrap_or(DEFAULT_UPTIME_BUCKETS);
        if buckets == 0 {
            return Err(MonitorError::validation("'buckets' must be at least 1"));
        }

        Ok((days, buckets.min(self.max_buckets)))
    }

    fn validate_days(&self, days: u32) -> Result<u32, MonitorError> {
        if days == 0 {
            return Err(MonitorError::validation("'days' must be at least 1"));
        }
        if days > self.max_range_days {
            return Err(MonitorError::validation(format!(
                "Query range exceeds maximum of {} days",
                self.max_range_days
            )));
        }
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> HistoryQueryValidator {
        HistoryQueryValidator::new(90, 1000, 500)
    }

    #[test]
    fn history_defaults_to_thirty_days_and_five_hundred_records() {
        assert_eq!(validator().validate_history(None, None).unwrap(), (30, 500));
    }

    #[test]
    fn oversized_limits_are_clamped() {
        assert_eq!(validator().validate_history(Some(1), Some(50_000)).unwrap(), (1, 1000));
        assert_eq!(validator().validate_uptime(Some(7), Some(10_000)).unwrap(), (7, 500));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(validator().validate_history(Some(0), None).is_err());
        assert!(validator().validate_history(Some(91), None).is_err());
        assert!(validator().validate_history(None, Some(0)).is_err());
        assert!(validator().validate_uptime(None, Some(0)).is_err());
    }

    #[test]
    fn uptime_defaults_to_a_week_of_bars() {
        assert_eq!(validator().validate_uptime(None, None).unwrap(), (7, 140));
    }
}

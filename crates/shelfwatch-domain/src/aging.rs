//! Aging module - classification of stock by time spent in inventory
//!
//! Bucket boundaries and the needs-attention threshold live together here.
//! `NEEDS_ATTENTION_DAYS` must equal `OBSOLETE_START_DAY`; the const assertion
//! below fails the build if they drift apart.

use std::fmt;

/// Seconds in one day, used for whole-day arithmetic on Unix timestamps
pub const SECONDS_PER_DAY: u64 = 86_400;

/// First elapsed day classified as [`AgingBucket::Idle`]
pub const IDLE_START_DAY: u64 = 31;

/// First elapsed day classified as [`AgingBucket::Obsolete`]
pub const OBSOLETE_START_DAY: u64 = 45;

/// First elapsed day classified as [`AgingBucket::Surplus`]
pub const SURPLUS_START_DAY: u64 = 90;

/// Items at or beyond this many days need attention
pub const NEEDS_ATTENTION_DAYS: u64 = 45;

const _: () = assert!(NEEDS_ATTENTION_DAYS == OBSOLETE_START_DAY);
const _: () = assert!(IDLE_START_DAY < OBSOLETE_START_DAY && OBSOLETE_START_DAY < SURPLUS_START_DAY);

/// Aging bucket for an item in stock
///
/// Buckets partition elapsed days with no gaps or overlaps:
/// - Active: 0-30 days
/// - Idle: 31-44 days
/// - Obsolete: 45-89 days
/// - Surplus: 90 days and beyond
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgingBucket {
    /// Recently received stock
    Active,

    /// Stock that has stopped moving
    Idle,

    /// Stock past the attention threshold
    Obsolete,

    /// Long-standing excess stock
    Surplus,
}

impl AgingBucket {
    /// All buckets, in order of increasing age
    pub const ALL: [AgingBucket; 4] = [
        AgingBucket::Active,
        AgingBucket::Idle,
        AgingBucket::Obsolete,
        AgingBucket::Surplus,
    ];

    /// Select the bucket containing the given number of elapsed days
    ///
    /// Total over all `u64` values.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfwatch_domain::AgingBucket;
    ///
    /// assert_eq!(AgingBucket::from_elapsed_days(30), AgingBucket::Active);
    /// assert_eq!(AgingBucket::from_elapsed_days(31), AgingBucket::Idle);
    /// assert_eq!(AgingBucket::from_elapsed_days(45), AgingBucket::Obsolete);
    /// assert_eq!(AgingBucket::from_elapsed_days(90), AgingBucket::Surplus);
    /// ```
    pub fn from_elapsed_days(days: u64) -> Self {
        if days >= SURPLUS_START_DAY {
            AgingBucket::Surplus
        } else if days >= OBSOLETE_START_DAY {
            AgingBucket::Obsolete
        } else if days >= IDLE_START_DAY {
            AgingBucket::Idle
        } else {
            AgingBucket::Active
        }
    }

    /// First elapsed day belonging to this bucket
    pub fn start_day(&self) -> u64 {
        match self {
            AgingBucket::Active => 0,
            AgingBucket::Idle => IDLE_START_DAY,
            AgingBucket::Obsolete => OBSOLETE_START_DAY,
            AgingBucket::Surplus => SURPLUS_START_DAY,
        }
    }

    /// Check whether this bucket contains the given elapsed day count
    pub fn contains(&self, days: u64) -> bool {
        let above_start = days >= self.start_day();
        let below_next = self.next().map_or(true, |next| days < next.start_day());
        above_start && below_next
    }

    /// Whether items in this bucket are past the attention threshold
    pub fn is_severe(&self) -> bool {
        self.start_day() >= NEEDS_ATTENTION_DAYS
    }

    /// Get the bucket name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AgingBucket::Active => "active",
            AgingBucket::Idle => "idle",
            AgingBucket::Obsolete => "obsolete",
            AgingBucket::Surplus => "surplus",
        }
    }

    /// Parse a bucket from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(AgingBucket::Active),
            "idle" => Some(AgingBucket::Idle),
            "obsolete" => Some(AgingBucket::Obsolete),
            "surplus" => Some(AgingBucket::Surplus),
            _ => None,
        }
    }

    /// Get the next (older) bucket
    pub fn next(&self) -> Option<Self> {
        match self {
            AgingBucket::Active => Some(AgingBucket::Idle),
            AgingBucket::Idle => Some(AgingBucket::Obsolete),
            AgingBucket::Obsolete => Some(AgingBucket::Surplus),
            AgingBucket::Surplus => None,
        }
    }

    /// Get the previous (younger) bucket
    pub fn previous(&self) -> Option<Self> {
        match self {
            AgingBucket::Active => None,
            AgingBucket::Idle => Some(AgingBucket::Active),
            AgingBucket::Obsolete => Some(AgingBucket::Idle),
            AgingBucket::Surplus => Some(AgingBucket::Obsolete),
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgingBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid aging bucket: {}", s))
    }
}

/// Whole days elapsed between intake and `now`, floored
///
/// Clock skew (intake after `now`) clamps to 0.
pub fn elapsed_days(intake_at: u64, now: u64) -> u64 {
    now.saturating_sub(intake_at) / SECONDS_PER_DAY
}

/// Result of classifying one item at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Bucket containing `elapsed_days`
    pub bucket: AgingBucket,

    /// Whole days since intake
    pub elapsed_days: u64,

    /// `elapsed_days >= NEEDS_ATTENTION_DAYS`
    pub needs_attention: bool,
}

/// A classification whose fields disagree with each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation(pub String);

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Classification invariant violated: {}", self.0)
    }
}

impl std::error::Error for InvariantViolation {}

impl Classification {
    /// Check that bucket, day count and attention flag are mutually consistent
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        if !self.bucket.contains(self.elapsed_days) {
            return Err(InvariantViolation(format!(
                "day {} is outside bucket {}",
                self.elapsed_days, self.bucket
            )));
        }
        if self.needs_attention != self.bucket.is_severe() {
            return Err(InvariantViolation(format!(
                "needs_attention={} disagrees with bucket {}",
                self.needs_attention, self.bucket
            )));
        }
        Ok(())
    }
}

/// Classify an item by its intake timestamp
///
/// Pure and total. Timestamps are seconds since the Unix epoch.
///
/// # Examples
///
/// ```
/// use shelfwatch_domain::aging::{classify, AgingBucket, SECONDS_PER_DAY};
///
/// let now = 100 * SECONDS_PER_DAY;
/// let c = classify(now - 45 * SECONDS_PER_DAY, now);
/// assert_eq!(c.bucket, AgingBucket::Obsolete);
/// assert_eq!(c.elapsed_days, 45);
/// assert!(c.needs_attention);
/// ```
pub fn classify(intake_at: u64, now: u64) -> Classification {
    classify_days(elapsed_days(intake_at, now))
}

/// Classify an already-computed elapsed day count
pub fn classify_days(days: u64) -> Classification {
    Classification {
        bucket: AgingBucket::from_elapsed_days(days),
        elapsed_days: days,
        needs_attention: days >= NEEDS_ATTENTION_DAYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(classify_days(0).bucket, AgingBucket::Active);
        assert_eq!(classify_days(30).bucket, AgingBucket::Active);
        assert_eq!(classify_days(31).bucket, AgingBucket::Idle);
        assert_eq!(classify_days(44).bucket, AgingBucket::Idle);
        assert_eq!(classify_days(45).bucket, AgingBucket::Obsolete);
        assert_eq!(classify_days(89).bucket, AgingBucket::Obsolete);
        assert_eq!(classify_days(90).bucket, AgingBucket::Surplus);
        assert_eq!(classify_days(u64::MAX).bucket, AgingBucket::Surplus);
    }

    #[test]
    fn test_needs_attention_threshold() {
        assert!(!classify_days(44).needs_attention);
        assert!(classify_days(45).needs_attention);
        assert!(classify_days(120).needs_attention);
    }

    #[test]
    fn test_elapsed_days_floors_partial_days() {
        let intake = NOW - (38 * SECONDS_PER_DAY + SECONDS_PER_DAY - 1);
        assert_eq!(elapsed_days(intake, NOW), 38);
    }

    #[test]
    fn test_future_intake_clamps_to_zero() {
        let c = classify(NOW + 3 * SECONDS_PER_DAY, NOW);
        assert_eq!(c.elapsed_days, 0);
        assert_eq!(c.bucket, AgingBucket::Active);
        assert!(!c.needs_attention);
    }

    #[test]
    fn test_bucket_progression() {
        assert_eq!(AgingBucket::Active.next(), Some(AgingBucket::Idle));
        assert_eq!(AgingBucket::Idle.next(), Some(AgingBucket::Obsolete));
        assert_eq!(AgingBucket::Obsolete.next(), Some(AgingBucket::Surplus));
        assert_eq!(AgingBucket::Surplus.next(), None);
        assert_eq!(AgingBucket::Active.previous(), None);
        assert_eq!(AgingBucket::Surplus.previous(), Some(AgingBucket::Obsolete));
        assert!(AgingBucket::Active < AgingBucket::Surplus);
    }

    #[test]
    fn test_parse_round_trip() {
        for bucket in AgingBucket::ALL {
            assert_eq!(bucket.as_str().parse::<AgingBucket>(), Ok(bucket));
        }
        assert_eq!(AgingBucket::parse("OBSOLETE"), Some(AgingBucket::Obsolete));
        assert!("stale".parse::<AgingBucket>().is_err());
    }

    #[test]
    fn test_verify_rejects_inconsistent_classification() {
        let wrong_bucket = Classification {
            bucket: AgingBucket::Idle,
            elapsed_days: 50,
            needs_attention: true,
        };
        assert!(wrong_bucket.verify().is_err());

        let wrong_flag = Classification {
            bucket: AgingBucket::Obsolete,
            elapsed_days: 50,
            needs_attention: false,
        };
        assert!(wrong_flag.verify().is_err());

        assert!(classify_days(50).verify().is_ok());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Unit of a drip period. Ordered from the lowest unit upwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    #[default]
    Days,
    Weeks,
    Months,
}

impl Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PeriodType::Days => "days",
            PeriodType::Weeks => "weeks",
            PeriodType::Months => "months",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for PeriodType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(PeriodType::Days),
            "week" | "weeks" => Ok(PeriodType::Weeks),
            "month" | "months" => Ok(PeriodType::Months),
            _ => Err(()),
        }
    }
}

/// Advances `from` by `units` periods of the given type.
///
/// Months are calendar months, a day-of-month past the end of the target month is clamped to its
/// last day (Jan 31 + 1 month = Feb 28/29). Results beyond the representable range saturate at
/// the maximum date.
pub fn add_interval(units: u32, period: PeriodType, from: DateTime<Utc>) -> DateTime<Utc> {
    let next = match period {
        PeriodType::Days => from.checked_add_signed(Duration::days(units as i64)),
        PeriodType::Weeks => from.checked_add_signed(Duration::weeks(units as i64)),
        PeriodType::Months => from.checked_add_months(Months::new(units)),
    };

    next.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{PeriodType, add_interval};

    #[test]
    fn days_and_weeks() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(
            add_interval(3, PeriodType::Days, from),
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
        );
        assert_eq!(
            add_interval(2, PeriodType::Weeks, from),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
        );
        assert_eq!(add_interval(0, PeriodType::Weeks, from), from);
    }

    #[test]
    fn months_clamp_to_end_of_month() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            add_interval(1, PeriodType::Months, from),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        assert_eq!(
            add_interval(12, PeriodType::Months, from),
            Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_period_names() {
        assert_eq!("week".parse::<PeriodType>(), Ok(PeriodType::Weeks));
        assert_eq!("Months".parse::<PeriodType>(), Ok(PeriodType::Months));
        assert_eq!("fortnight".parse::<PeriodType>(), Err(()));
        assert_eq!(PeriodType::default(), PeriodType::Days);
    }
}

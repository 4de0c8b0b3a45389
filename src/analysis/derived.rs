use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Periods in the year-over-year lag and the trailing-sum window.
pub const YEAR_PERIODS: usize = 12;

/// `(value[t] / value[t - periods] - 1) * 100`.
///
/// `None` for the first `periods` slots, when either endpoint is missing, and
/// when the base value is zero.
pub fn pct_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if periods == 0 || t < periods {
                return None;
            }
            match (values[t], values[t - periods]) {
                (Some(current), Some(base)) if base != 0.0 => Some((current / base - 1.0) * 100.0),
                _ => None,
            }
        })
        .collect()
}

pub fn yoy_pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    pct_change(values, YEAR_PERIODS)
}

/// Sum of `value[t + 1 - window ..= t]`; `None` unless every slot in the
/// window is present. A short window never yields a partial sum.
pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if window == 0 || t + 1 < window {
                return None;
            }
            values[t + 1 - window..=t].iter().copied().sum::<Option<f64>>()
        })
        .collect()
}

pub fn trailing_12_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    rolling_sum(values, YEAR_PERIODS)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

/// Most recent observation compared with the one before it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatestReading {
    pub date: NaiveDate,
    pub value: f64,
    pub previous: Option<f64>,
    pub change: Option<f64>,
    pub direction: Direction,
}

/// `observed` must be date-ordered with missing values already dropped.
pub fn latest_reading(observed: &[(NaiveDate, f64)]) -> Option<LatestReading> {
    let (date, value) = *observed.last()?;
    let previous = observed.len().checked_sub(2).map(|idx| observed[idx].1);
    let change = previous.map(|prev| value - prev);

    let direction = match change {
        None => Direction::Neutral,
        Some(diff) if diff >= 0.0 => Direction::Up,
        Some(_) => Direction::Down,
    };

    Some(LatestReading { date, value, previous, change, direction })
}

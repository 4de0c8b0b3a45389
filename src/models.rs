use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// One observation. `value` is `None` when the source sent something that
/// does not parse as a number; it is never coerced to zero.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// Date-ordered observations for one indicator. Dates are strictly increasing.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ObservationSeries {
    points: Vec<DataPoint>,
}

impl ObservationSeries {
    /// Sorts by date and keeps the last point seen for a repeated date.
    pub fn from_points(mut points: Vec<DataPoint>) -> Self {
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<DataPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Binary search on the date axis.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .and_then(|idx| self.points[idx].value)
    }
}

/// Earliest and latest years a range may start on.
pub const START_YEARS: std::ops::RangeInclusive<i32> = 2000..=2023;
/// Earliest and latest years a range may end on.
pub const END_YEARS: std::ops::RangeInclusive<i32> = 2001..=2025;

/// An inclusive calendar range, always `start < end`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start >= end {
            return Err(DashboardError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// `01/01/start_year` through `31/12/end_year`, both years inside
    /// [`START_YEARS`] and [`END_YEARS`].
    pub fn from_years(start_year: i32, end_year: i32) -> Result<Self, DashboardError> {
        let invalid = || DashboardError::InvalidRange {
            start: start_year.to_string(),
            end: end_year.to_string(),
        };

        if start_year >= end_year
            || !START_YEARS.contains(&start_year)
            || !END_YEARS.contains(&end_year)
        {
            return Err(invalid());
        }

        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).ok_or_else(invalid)?;
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31).ok_or_else(invalid)?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn start_year(&self) -> i32 {
        self.start.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end.year()
    }

    /// SGS expects day-first dates.
    pub fn sgs_start(&self) -> String {
        self.start.format("%d/%m/%Y").to_string()
    }

    pub fn sgs_end(&self) -> String {
        self.end.format("%d/%m/%Y").to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

/// Several series outer-joined on date. Every column has one slot per date;
/// a date an indicator did not report is `None`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AggregateTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl AggregateTable {
    pub fn from_parts(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == dates.len()));
        Self { dates, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }

    pub fn column(&self, key: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.values.as_slice())
    }

    pub fn value(&self, date: NaiveDate, key: &str) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.column(key).and_then(|values| values[idx])
    }

    /// The column with missing slots dropped.
    pub fn observed(&self, key: &str) -> Vec<(NaiveDate, f64)> {
        match self.column(key) {
            Some(values) => self
                .dates
                .iter()
                .zip(values)
                .filter_map(|(date, value)| value.map(|v| (*date, v)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.dates.len().saturating_sub(n);
        Self {
            dates: self.dates[skip..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    key: c.key.clone(),
                    values: c.values[skip..].to_vec(),
                })
                .collect(),
        }
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        let factor = 10f64.powi(decimals);
        Self {
            dates: self.dates.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    key: c.key.clone(),
                    values: c
                        .values
                        .iter()
                        .map(|v| v.map(|x| (x * factor).round() / factor))
                        .collect(),
                })
                .collect(),
        }
    }
}

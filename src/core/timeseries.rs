use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::{AggregateTable, Column, ObservationSeries};

/// Outer-joins named series on date.
///
/// The date axis is the sorted union of every input date. A series that has
/// no observation on a given date gets `None` there; values are copied as-is.
/// Column order follows the input order.
pub fn outer_join(series_list: Vec<(String, ObservationSeries)>) -> AggregateTable {
    if series_list.is_empty() {
        return AggregateTable::default();
    }

    let all_dates: BTreeSet<NaiveDate> = series_list
        .iter()
        .flat_map(|(_, series)| series.dates())
        .collect();
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let columns = series_list
        .into_iter()
        .map(|(key, series)| {
            // Both axes are sorted, so walk them together.
            let mut values = Vec::with_capacity(dates.len());
            let mut iter = series.points().iter().peekable();

            for date in &dates {
                match iter.peek() {
                    Some(dp) if dp.date == *date => {
                        values.push(dp.value);
                        iter.next();
                    }
                    _ => values.push(None),
                }
            }

            Column { key, values }
        })
        .collect();

    AggregateTable::from_parts(dates, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataPoint;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series(points: &[(NaiveDate, Option<f64>)]) -> ObservationSeries {
        ObservationSeries::from_points(
            points.iter().map(|(date, v)| DataPoint::new(*date, *v)).collect(),
        )
    }

    #[test]
    fn test_union_of_dates_with_explicit_gaps() {
        let a = series(&[(d(2020, 1), Some(1.0)), (d(2020, 3), Some(3.0))]);
        let b = series(&[(d(2020, 2), Some(20.0)), (d(2020, 3), None)]);

        let table = outer_join(vec![("A".to_string(), a), ("B".to_string(), b)]);

        assert_eq!(table.dates(), &[d(2020, 1), d(2020, 2), d(2020, 3)]);
        assert_eq!(table.column("A").unwrap(), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(table.column("B").unwrap(), &[None, Some(20.0), None]);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_values_match_source_series() {
        let a = series(&[(d(2021, 1), Some(0.25)), (d(2021, 2), Some(0.86))]);
        let table = outer_join(vec![("IPCA".to_string(), a.clone())]);

        for dp in a.points() {
            assert_eq!(table.value(dp.date, "IPCA"), dp.value);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(outer_join(Vec::new()).is_empty());
    }
}

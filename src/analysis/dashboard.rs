//! Everything the page needs, assembled from one aggregate table.

use chrono::NaiveDate;
use serde::Serialize;

use super::derived::{
    latest_reading, rolling_sum, trailing_12_sum, yoy_pct_change, LatestReading, YEAR_PERIODS,
};
use crate::indicators::{CardDefinition, Category, IndicatorDefinition, Registry};
use crate::models::{AggregateTable, DataPoint, DateRange, ObservationSeries};

pub const EMERALD: &str = "#1a6b4a";
pub const RED: &str = "#c0392b";

pub const SPARKLINE_POINTS: usize = 24;
pub const TAIL_ROWS: usize = 24;
pub const TABLE_DECIMALS: i32 = 2;

/// Reference line on the inflation chart (the inflation target).
pub const INFLATION_TARGET: f64 = 3.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub key: String,
    pub label: String,
    pub unit: String,
    /// What the card shows: the latest value, or its 12-period sum.
    pub display_value: f64,
    pub reading: LatestReading,
    pub period: String,
    pub sparkline: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub key: String,
    pub title: String,
    pub unit: String,
    pub color: &'static str,
    pub reference_line: Option<f64>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tab {
    pub title: String,
    pub notes: Vec<String>,
    pub charts: Vec<Chart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub period: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TailTable {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub range: DateRange,
    pub cards: Vec<Card>,
    pub cycle: Vec<Chart>,
    pub tabs: Vec<Tab>,
    pub table: TailTable,
}

/// One indicator with its derived series, for the single-series endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesView {
    pub key: String,
    pub series_id: u32,
    pub label: String,
    pub unit: String,
    pub description: String,
    pub points: Vec<DataPoint>,
    pub yoy: Vec<DataPoint>,
    pub trailing_12: Vec<DataPoint>,
    pub latest: Option<LatestReading>,
}

fn period_label(date: NaiveDate) -> String {
    date.format("%b/%Y").to_string()
}

fn chart_points(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<ChartPoint> {
    dates
        .iter()
        .zip(values)
        .filter_map(|(date, value)| value.map(|value| ChartPoint { date: *date, value }))
        .collect()
}

pub fn build_card(table: &AggregateTable, card: &CardDefinition) -> Option<Card> {
    let observed = table.observed(card.key);
    let reading = latest_reading(&observed)?;

    let mut display_value = reading.value;
    if card.trailing_sum && observed.len() >= YEAR_PERIODS {
        let values: Vec<Option<f64>> = observed.iter().map(|(_, v)| Some(*v)).collect();
        if let Some(Some(sum)) = rolling_sum(&values, YEAR_PERIODS).last() {
            display_value = *sum;
        }
    }

    let skip = observed.len().saturating_sub(SPARKLINE_POINTS);
    let sparkline = observed[skip..]
        .iter()
        .map(|(date, value)| ChartPoint { date: *date, value: *value })
        .collect();

    Some(Card {
        key: card.key.to_string(),
        label: card.label.to_string(),
        unit: card.unit.to_string(),
        display_value,
        period: period_label(reading.date),
        reading,
        sparkline,
    })
}

/// Activity growth against accumulated inflation.
pub fn build_cycle_charts(table: &AggregateTable) -> Vec<Chart> {
    let mut charts = Vec::new();

    if let Some(ibc) = table.column("IBC-Br") {
        charts.push(Chart {
            key: "IBC_YoY".to_string(),
            title: "Crescimento IBC-Br (% YoY)".to_string(),
            unit: "%".to_string(),
            color: EMERALD,
            reference_line: Some(0.0),
            points: chart_points(table.dates(), &yoy_pct_change(ibc)),
        });
    }

    if let Some(ipca) = table.column("IPCA") {
        charts.push(Chart {
            key: "IPCA_12m".to_string(),
            title: "IPCA Acumulado 12 meses (%)".to_string(),
            unit: "%".to_string(),
            color: RED,
            reference_line: Some(INFLATION_TARGET),
            points: chart_points(table.dates(), &trailing_12_sum(ipca)),
        });
    }

    charts
}

fn indicator_chart(table: &AggregateTable, definition: &IndicatorDefinition) -> Option<Chart> {
    let values = table.column(&definition.key)?;
    let color = if definition.key == "IPCA" { RED } else { EMERALD };

    Some(Chart {
        key: definition.key.clone(),
        title: definition.chart_title.clone(),
        unit: definition.unit.clone(),
        color,
        reference_line: None,
        points: chart_points(table.dates(), values),
    })
}

pub fn build_tabs(table: &AggregateTable) -> Vec<Tab> {
    Category::ALL
        .iter()
        .map(|category| {
            let members = Registry::get_by_category(*category);
            Tab {
                title: category.title().to_string(),
                notes: members.iter().map(|m| m.description.clone()).collect(),
                charts: members.iter().filter_map(|m| indicator_chart(table, m)).collect(),
            }
        })
        .collect()
}

pub fn build_tail_table(table: &AggregateTable) -> TailTable {
    let tail = table.tail(TAIL_ROWS).rounded(TABLE_DECIMALS);

    let rows = tail
        .dates()
        .iter()
        .enumerate()
        .map(|(idx, date)| TableRow {
            period: period_label(*date),
            values: tail.columns().iter().map(|c| c.values[idx]).collect(),
        })
        .collect();

    TailTable {
        columns: tail.keys().map(str::to_string).collect(),
        rows,
    }
}

pub fn build_dashboard(table: &AggregateTable, range: &DateRange) -> DashboardView {
    DashboardView {
        range: *range,
        cards: Registry::cards().iter().filter_map(|c| build_card(table, c)).collect(),
        cycle: build_cycle_charts(table),
        tabs: build_tabs(table),
        table: build_tail_table(table),
    }
}

pub fn build_series_view(
    definition: &IndicatorDefinition,
    series: &ObservationSeries,
) -> SeriesView {
    let dates: Vec<NaiveDate> = series.dates().collect();
    let values = series.values();

    let attach = |derived: Vec<Option<f64>>| -> Vec<DataPoint> {
        dates
            .iter()
            .zip(derived)
            .map(|(date, value)| DataPoint::new(*date, value))
            .collect()
    };

    let observed: Vec<(NaiveDate, f64)> = series
        .points()
        .iter()
        .filter_map(|p| p.value.map(|v| (p.date, v)))
        .collect();

    SeriesView {
        key: definition.key.clone(),
        series_id: definition.series_id,
        label: definition.label.clone(),
        unit: definition.unit.clone(),
        description: definition.description.clone(),
        points: series.points().to_vec(),
        yoy: attach(yoy_pct_change(&values)),
        trailing_12: attach(trailing_12_sum(&values)),
        latest: latest_reading(&observed),
    }
}

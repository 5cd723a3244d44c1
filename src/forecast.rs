//! Forward extrapolation of a selected model.

use crate::domain::{FittedModel, SeriesRow, Source, TimeSeries};
use crate::error::DataError;

/// Predict `horizon` consecutive years after the last observed year.
///
/// Values are the raw model output: no clamping, no rounding. Fails when the
/// last forecast year does not fit in an `i32`.
pub fn forecast(series: &TimeSeries, model: &FittedModel, horizon: usize) -> Result<Vec<(i32, f64)>, DataError> {
    let last_year = series.max_year();
    let out_of_range = DataError::HorizonOutOfRange { last_year, horizon };
    let steps = i32::try_from(horizon).map_err(|_| out_of_range.clone())?;
    last_year.checked_add(steps).ok_or(out_of_range)?;

    Ok((1..=steps)
        .map(|step| {
            let year = last_year + step;
            (year, model.predict(year))
        })
        .collect())
}

/// In-sample predictions for every observed year.
pub fn fitted_values(series: &TimeSeries, model: &FittedModel) -> Vec<(i32, f64)> {
    series
        .observations()
        .iter()
        .map(|o| (o.year, model.predict(o.year)))
        .collect()
}

pub(crate) fn actual_rows(series: &TimeSeries) -> Vec<SeriesRow> {
    series
        .observations()
        .iter()
        .map(|o| SeriesRow {
            year: o.year,
            citation_count: o.citation_count as f64,
            source: Source::Actual,
        })
        .collect()
}

pub(crate) fn predicted_rows(points: &[(i32, f64)]) -> Vec<SeriesRow> {
    points
        .iter()
        .map(|&(year, citation_count)| SeriesRow {
            year,
            citation_count,
            source: Source::Predicted,
        })
        .collect()
}

//! Series validation and normalization.
//!
//! Turns caller-supplied observations into a `TimeSeries` that is safe to fit:
//!
//! - keep only years inside the requested range
//! - deduplicate years, keeping the last occurrence in input order
//! - sort ascending by year
//! - require at least `MIN_POINTS` observations
//!
//! Unsorted or duplicated years are normalized, never rejected.

use std::collections::BTreeMap;

use crate::domain::{Observation, TimeSeries, YearRange};
use crate::error::{DataError, MIN_POINTS};

pub fn validate(observations: &[Observation], range: YearRange) -> Result<TimeSeries, DataError> {
    // BTreeMap gives ascending years; later inserts overwrite earlier ones.
    let mut by_year = BTreeMap::new();
    for obs in observations.iter().filter(|o| range.contains(o.year)) {
        by_year.insert(obs.year, obs.citation_count);
    }

    if by_year.len() < MIN_POINTS {
        return Err(DataError::InsufficientPoints {
            needed: MIN_POINTS,
            got: by_year.len(),
        });
    }

    let points = by_year
        .into_iter()
        .map(|(year, citation_count)| Observation { year, citation_count })
        .collect();
    Ok(TimeSeries::from_validated(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(points: &[(i32, u64)]) -> Vec<Observation> {
        points.iter().map(|&(y, c)| Observation::new(y, c)).collect()
    }

    fn wide() -> YearRange {
        YearRange::new(1900, 2100).unwrap()
    }

    #[test]
    fn three_points_is_enough() {
        let series = validate(&obs(&[(2001, 1), (2002, 4), (2003, 9)]), wide()).unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn two_points_are_insufficient() {
        let err = validate(&obs(&[(2001, 1), (2002, 4)]), wide()).unwrap_err();
        assert_eq!(err, DataError::InsufficientPoints { needed: 3, got: 2 });
    }

    #[test]
    fn filters_to_inclusive_range() {
        let raw = obs(&[(1999, 1), (2000, 2), (2001, 3), (2002, 4), (2003, 5)]);
        let series = validate(&raw, YearRange::new(2000, 2002).unwrap()).unwrap();
        let years: Vec<i32> = series.observations().iter().map(|o| o.year).collect();
        assert_eq!(years, vec![2000, 2001, 2002]);
    }

    #[test]
    fn filtering_can_leave_too_few_points() {
        let raw = obs(&[(1990, 1), (1991, 2), (2010, 3), (2011, 4)]);
        let err = validate(&raw, YearRange::new(2000, 2020).unwrap()).unwrap_err();
        assert_eq!(err, DataError::InsufficientPoints { needed: 3, got: 2 });
    }

    #[test]
    fn sorts_and_keeps_last_duplicate() {
        let raw = obs(&[(2003, 30), (2001, 10), (2002, 20), (2001, 11)]);
        let series = validate(&raw, wide()).unwrap();
        assert_eq!(
            series.observations(),
            &obs(&[(2001, 11), (2002, 20), (2003, 30)])[..]
        );
    }

    #[test]
    fn duplicates_do_not_count_twice() {
        let raw = obs(&[(2001, 1), (2001, 2), (2002, 3), (2002, 4)]);
        assert!(validate(&raw, wide()).is_err());
    }

    #[test]
    fn non_monotonic_counts_are_accepted() {
        let series = validate(&obs(&[(2001, 50), (2002, 10), (2003, 40)]), wide()).unwrap();
        assert_eq!(series.max_count(), 50.0);
    }
}

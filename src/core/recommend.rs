//! Pure query layer over the loaded measurement table.
//!
//! Every function here is a pure (subset, target) -> result mapping so the
//! front ends can re-evaluate on each interaction without session state.

use crate::domain::model::Measurement;

/// Min and max release volume within a filtered subset. Drives the range
/// of the target-release input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseBounds {
    pub min: f64,
    pub max: f64,
}

impl ReleaseBounds {
    /// A single unique release value collapses the target input to it.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    pub fn clamp(&self, target: f64) -> f64 {
        target.clamp(self.min, self.max)
    }
}

/// Smallest valve size whose measured release meets or exceeds the target.
///
/// Ties on valve size keep the record that appeared first in the subset.
/// Returns `None` when no record qualifies.
pub fn recommend<'a>(subset: &[&'a Measurement], target: f64) -> Option<&'a Measurement> {
    let mut qualifying: Vec<&Measurement> = subset
        .iter()
        .copied()
        .filter(|m| m.release_mcf >= target)
        .collect();
    // sort_by is stable, so equal valve sizes preserve subset order
    qualifying.sort_by(|a, b| a.valve_size_in.total_cmp(&b.valve_size_in));
    qualifying.first().copied()
}

pub fn release_bounds(subset: &[&Measurement]) -> Option<ReleaseBounds> {
    let mut iter = subset.iter();
    let first = iter.next()?;
    let mut bounds = ReleaseBounds {
        min: first.release_mcf,
        max: first.release_mcf,
    };
    for m in iter {
        bounds.min = bounds.min.min(m.release_mcf);
        bounds.max = bounds.max.max(m.release_mcf);
    }
    Some(bounds)
}

/// Subset sorted ascending by valve size for display, same stable order
/// as the recommendation so the two always agree.
pub fn sorted_by_valve_size<'a>(subset: &[&'a Measurement]) -> Vec<&'a Measurement> {
    let mut sorted = subset.to_vec();
    sorted.sort_by(|a, b| a.valve_size_in.total_cmp(&b.valve_size_in));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MeasurementTable;

    fn m(volume_type: &str, valve_size_in: f64, duration_s: f64, release_mcf: f64) -> Measurement {
        Measurement {
            volume_type: volume_type.to_string(),
            valve_size_in,
            duration_s,
            release_mcf,
        }
    }

    fn tank_table() -> MeasurementTable {
        MeasurementTable::new(vec![
            m("Tank", 2.0, 10.0, 5.0),
            m("Tank", 3.0, 15.0, 8.0),
            m("Pipeline", 4.0, 30.0, 20.0),
        ])
    }

    #[test]
    fn filter_matches_category_exactly() {
        let table = tank_table();
        let subset = table.filter_by_type("Tank");
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|m| m.volume_type == "Tank"));

        // case-sensitive: no normalization
        assert!(table.filter_by_type("tank").is_empty());
        assert!(table.filter_by_type("Tan").is_empty());
    }

    #[test]
    fn volume_types_unique_in_first_seen_order() {
        let table = MeasurementTable::new(vec![
            m("Tank", 2.0, 10.0, 5.0),
            m("Pipeline", 4.0, 30.0, 20.0),
            m("Tank", 3.0, 15.0, 8.0),
        ]);
        assert_eq!(table.volume_types(), vec!["Tank", "Pipeline"]);
    }

    #[test]
    fn target_at_minimum_recommends_smallest_valve() {
        let table = tank_table();
        let subset = table.filter_by_type("Tank");
        let rec = recommend(&subset, 5.0).expect("target equal to min release must qualify");
        assert_eq!(rec.valve_size_in, 2.0);
        assert_eq!(rec.duration_s, 10.0);
        assert_eq!(rec.release_mcf, 5.0);
        assert!(rec.release_mcf >= 5.0);
    }

    #[test]
    fn target_between_releases_skips_undersized_valve() {
        let table = tank_table();
        let subset = table.filter_by_type("Tank");
        let rec = recommend(&subset, 6.0).unwrap();
        assert_eq!(rec.valve_size_in, 3.0);
        assert_eq!(rec.duration_s, 15.0);
        assert_eq!(rec.release_mcf, 8.0);
    }

    #[test]
    fn target_above_all_releases_gives_no_recommendation() {
        let table = tank_table();
        let subset = table.filter_by_type("Tank");
        assert!(recommend(&subset, 9.0).is_none());
    }

    #[test]
    fn recommendation_is_minimal_among_qualifying() {
        let records = vec![
            m("Well", 6.0, 60.0, 50.0),
            m("Well", 2.0, 12.0, 4.0),
            m("Well", 4.0, 25.0, 18.0),
            m("Well", 3.0, 20.0, 12.0),
        ];
        let table = MeasurementTable::new(records);
        let subset = table.filter_by_type("Well");
        let rec = recommend(&subset, 10.0).unwrap();
        for other in subset.iter().filter(|m| m.release_mcf >= 10.0) {
            assert!(rec.valve_size_in <= other.valve_size_in);
        }
        assert_eq!(rec.valve_size_in, 3.0);
    }

    #[test]
    fn ties_on_valve_size_keep_earliest_record() {
        let table = MeasurementTable::new(vec![
            m("Tank", 2.0, 10.0, 5.0),
            m("Tank", 2.0, 11.0, 6.0),
        ]);
        let subset = table.filter_by_type("Tank");
        let rec = recommend(&subset, 4.0).unwrap();
        assert_eq!(rec.duration_s, 10.0);
    }

    #[test]
    fn bounds_span_the_subset() {
        let table = tank_table();
        let subset = table.filter_by_type("Tank");
        let bounds = release_bounds(&subset).unwrap();
        assert_eq!(bounds.min, 5.0);
        assert_eq!(bounds.max, 8.0);
        assert!(!bounds.is_fixed());
        assert_eq!(bounds.clamp(100.0), 8.0);
        assert_eq!(bounds.clamp(0.0), 5.0);
    }

    #[test]
    fn single_release_value_collapses_bounds() {
        let table = MeasurementTable::new(vec![
            m("Flare", 1.0, 5.0, 3.0),
            m("Flare", 2.0, 9.0, 3.0),
        ]);
        let subset = table.filter_by_type("Flare");
        let bounds = release_bounds(&subset).unwrap();
        assert!(bounds.is_fixed());
        assert_eq!(bounds.min, 3.0);
    }

    #[test]
    fn empty_subset_has_no_bounds_and_no_recommendation() {
        assert!(release_bounds(&[]).is_none());
        assert!(recommend(&[], 1.0).is_none());
    }

    #[test]
    fn display_sort_is_stable_ascending() {
        let table = MeasurementTable::new(vec![
            m("Tank", 3.0, 15.0, 8.0),
            m("Tank", 2.0, 10.0, 5.0),
            m("Tank", 2.0, 12.0, 6.0),
        ]);
        let subset = table.filter_by_type("Tank");
        let sorted = sorted_by_valve_size(&subset);
        let sizes: Vec<f64> = sorted.iter().map(|m| m.valve_size_in).collect();
        assert_eq!(sizes, vec![2.0, 2.0, 3.0]);
        // the two 2-inch records keep their original relative order
        assert_eq!(sorted[0].duration_s, 10.0);
        assert_eq!(sorted[1].duration_s, 12.0);
    }
}

use ahash::AHashMap;
use polars::prelude::Column;
use tracing::debug;

use crate::{
    census::round_to,
    error::{invalid, Result},
    frame::{f64_values, string_values, GeoFrame},
    geom::ensure_same_crs,
    spatial::{aggregate::AggregationPlan, overlap::largest_overlap_rows},
};

/// Aggregate `source` attributes onto `target` geometry.
///
/// Each source row is assigned to the target polygon it overlaps most; rows
/// sharing a `target_key` value are reduced per `plan` and rounded to 2 places.
/// The output keeps every target row, geometry and column, followed by one
/// Float64 column per planned column (null where nothing was assigned).
pub fn apportion(
    source: &GeoFrame,
    target: &GeoFrame,
    target_key: &str,
    source_key: &str,
    plan: &AggregationPlan,
) -> Result<GeoFrame> {
    ensure_same_crs(source.epsg(), target.epsg())?;
    if let Some(name) = plan.columns().find(|name| target.column(name).is_ok()) {
        return Err(invalid!("column {name:?} exists on both the source data and the target geometry"));
    }

    let assigned = largest_overlap_rows(source, source_key, target)?;
    let target_keys = string_values(target.data(), target_key)?;

    // Group source rows by the key of the target they were assigned to
    let mut groups: AHashMap<&str, Vec<usize>> = AHashMap::new();
    for (i, row) in assigned.iter().enumerate() {
        if let Some(key) = row.and_then(|j| target_keys[j].as_deref()) {
            groups.entry(key).or_default().push(i);
        }
    }
    debug!("[apportion] {} of {} source rows assigned to {} groups",
        groups.values().map(Vec::len).sum::<usize>(), source.len(), groups.len());

    let mut output = target.clone();
    for (name, reducer) in plan.iter() {
        let values = f64_values(source.data(), name)?;

        let mut reduced: AHashMap<&str, Option<f64>> = AHashMap::with_capacity(groups.len());
        for (&key, rows) in &groups {
            let group = rows.iter().map(|&i| values[i]).collect::<Vec<_>>();
            reduced.insert(key, reducer.reduce(&group)?.map(|v| round_to(v, 2)));
        }

        let column = target_keys.iter()
            .map(|key| key.as_deref().and_then(|key| reduced.get(key).copied().flatten()))
            .collect::<Vec<_>>();
        output.set_column(Column::new(name.into(), column))?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_aggregator, census::MoeMode, AggregationPlan, Error, Reducer};
    use geo::{polygon, MultiPolygon};
    use polars::df;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
        ]])
    }

    fn tracts() -> GeoFrame {
        GeoFrame::new(
            df![
                "tract" => ["t1", "t2", "t3", "t4"],
                "pop" => [100.0f64, 50.0, 25.0, 40.0],
                "pop_M" => [30.0f64, 40.0, 10.0, 5.0],
            ].unwrap(),
            vec![
                rect(0.0, 0.0, 1.0, 1.0),
                rect(1.0, 0.0, 2.0, 1.0),
                rect(2.0, 0.0, 3.0, 1.0),
                rect(50.0, 50.0, 51.0, 51.0), // outside every ward
            ],
            Some(3734),
        ).unwrap()
    }

    fn wards() -> GeoFrame {
        GeoFrame::new(
            df!["ward" => ["w1", "w2", "w3"]].unwrap(),
            vec![
                rect(-0.5, -0.5, 2.2, 1.5), // holds t1, t2
                rect(2.2, -0.5, 4.0, 1.5),  // holds most of t3
                rect(10.0, 10.0, 11.0, 11.0),
            ],
            Some(3734),
        ).unwrap()
    }

    #[test]
    fn aggregates_onto_every_target_row() {
        let plan = build_aggregator(tracts().data(), &[], MoeMode::Sum).unwrap();
        let out = apportion(&tracts(), &wards(), "ward", "tract", &plan).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out.data().height(), 3);
        assert_eq!(f64_values(out.data(), "pop").unwrap(), vec![Some(150.0), Some(25.0), None]);
        assert_eq!(f64_values(out.data(), "pop_M").unwrap(), vec![Some(50.0), Some(10.0), None]);
        assert_eq!(out.epsg(), Some(3734));
        assert_eq!(out.shapes(), wards().shapes());
    }

    #[test]
    fn sum_is_conserved_over_matched_rows() {
        let plan = AggregationPlan::new(vec![("pop".to_owned(), Reducer::Sum)]);
        let out = apportion(&tracts(), &wards(), "ward", "tract", &plan).unwrap();

        let total = f64_values(out.data(), "pop").unwrap().into_iter().flatten().sum::<f64>();
        assert_eq!(total, 100.0 + 50.0 + 25.0);
    }

    #[test]
    fn means_are_rounded_to_two_places() {
        let source = GeoFrame::new(
            df!["id" => ["a", "b", "c"], "rate" => [1.0f64, 2.0, 2.0]].unwrap(),
            vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0), rect(0.0, 1.0, 1.0, 2.0)],
            None,
        ).unwrap();
        let target = GeoFrame::new(df!["zone" => ["z"]].unwrap(), vec![rect(0.0, 0.0, 2.0, 2.0)], None).unwrap();

        let plan = AggregationPlan::new(vec![("rate".to_owned(), Reducer::Mean)]);
        let out = apportion(&source, &target, "zone", "id", &plan).unwrap();
        assert_eq!(f64_values(out.data(), "rate").unwrap(), vec![Some(1.67)]);
    }

    #[test]
    fn planned_column_must_exist_on_source() {
        let plan = AggregationPlan::new(vec![("households".to_owned(), Reducer::Sum)]);
        let err = apportion(&tracts(), &wards(), "ward", "tract", &plan).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn planned_column_must_not_clash_with_target() {
        let plan = AggregationPlan::new(vec![("ward".to_owned(), Reducer::Sum)]);
        let err = apportion(&tracts(), &wards(), "ward", "tract", &plan).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn unmatched_rows_with_null_keys_stay_unassigned() {
        let source = GeoFrame::new(
            df!["tract" => [None::<&str>, None], "pop" => [10.0f64, 99.0]].unwrap(),
            vec![rect(0.0, 0.0, 1.0, 1.0), rect(50.0, 50.0, 51.0, 51.0)],
            Some(3734),
        ).unwrap();

        let plan = AggregationPlan::new(vec![("pop".to_owned(), Reducer::Sum)]);
        let out = apportion(&source, &wards(), "ward", "tract", &plan).unwrap();
        assert_eq!(f64_values(out.data(), "pop").unwrap(), vec![Some(10.0), None, None]);
    }
}

use polars::prelude::*;

use crate::error::{Error, Result};

/// Look up a column by name, failing with `MissingColumn`.
pub(crate) fn column<'a>(data: &'a DataFrame, name: &str) -> Result<&'a Column> {
    data.column(name).map_err(|_| Error::MissingColumn(name.to_owned()))
}

/// Whether a column dtype takes part in numeric aggregation.
#[inline]
pub(crate) fn is_aggregatable(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64 | DataType::Int32)
}

/// Values of `name` rendered as strings; used for keys and predicates.
pub(crate) fn string_values(data: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = column(data, name)?.cast(&DataType::String)?;
    Ok(column.str()?.into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}

/// Values of `name` cast to f64.
pub(crate) fn f64_values(data: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = column(data, name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Per-row null flags.
pub(crate) fn null_mask(column: &Column) -> Result<Vec<bool>> {
    (0..column.len())
        .map(|i| Ok(matches!(column.get(i)?, AnyValue::Null)))
        .collect()
}

/// Build a column named `name` by picking `rows` out of `column`; `None` rows become null.
pub(crate) fn gather(column: &Column, rows: &[Option<usize>], name: &str) -> Result<Column> {
    let values = rows.iter()
        .map(|row| match row {
            Some(i) => column.get(*i),
            None => Ok(AnyValue::Null),
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    let series = Series::from_any_values_and_dtype(name.into(), &values, column.dtype(), true)?;
    Ok(Column::from(series))
}

/// Copy of `target` with `updates` applied, each `(target_row, source_row)`.
///
/// Picked source values are cast strictly to the dtype of `target`. If any of
/// them does not fit, `target` is widened to the source dtype instead. An
/// all-null `target` always takes the source dtype.
pub(crate) fn patch(target: &Column, source: &Column, updates: &[(usize, usize)]) -> Result<Column> {
    let rows = updates.iter().map(|&(_, src)| Some(src)).collect::<Vec<_>>();
    let picked = gather(source, &rows, source.name().as_str())?;

    let (dtype, picked) = match target.dtype() {
        DataType::Null => (source.dtype().clone(), picked),
        dtype if dtype == source.dtype() => (dtype.clone(), picked),
        dtype => match picked.strict_cast(dtype) {
            Ok(cast) => (dtype.clone(), cast),
            Err(_) => (source.dtype().clone(), picked),
        },
    };
    let target_cast = target.strict_cast(&dtype)?;

    let mut values = (0..target_cast.len())
        .map(|i| target_cast.get(i))
        .collect::<PolarsResult<Vec<_>>>()?;
    for (k, &(row, _)) in updates.iter().enumerate() {
        values[row] = picked.get(k)?;
    }

    let series = Series::from_any_values_and_dtype(target.name().clone(), &values, &dtype, true)?;
    Ok(Column::from(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> DataFrame {
        df![
            "id" => [1i64, 2, 3],
            "name" => [Some("a"), None, Some("c")],
            "pop" => [Some(10.5f64), None, Some(3.0)],
        ].unwrap()
    }

    #[test]
    fn string_values_cast_integers() {
        let data = sample();
        assert_eq!(
            string_values(&data, "id").unwrap(),
            vec![Some("1".to_owned()), Some("2".to_owned()), Some("3".to_owned())],
        );
        assert_eq!(string_values(&data, "name").unwrap()[1], None);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let err = f64_values(&sample(), "nope").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref name) if name == "nope"));
    }

    #[test]
    fn gather_fills_none_with_null() {
        let data = sample();
        let out = gather(column(&data, "pop").unwrap(), &[Some(2), None, Some(0)], "picked").unwrap();
        assert_eq!(out.name().as_str(), "picked");
        assert_eq!(out.dtype(), &DataType::Float64);
        assert_eq!(out.f64().unwrap().into_iter().collect::<Vec<_>>(), vec![Some(3.0), None, Some(10.5)]);
    }

    #[test]
    fn patch_only_touches_listed_rows() {
        let data = sample();
        let target = column(&data, "name").unwrap();
        let source = Column::new("src".into(), ["x", "y", "z"]);

        let out = patch(target, &source, &[(1, 2)]).unwrap();
        assert_eq!(out.name().as_str(), "name");
        assert_eq!(
            out.str().unwrap().into_iter().collect::<Vec<_>>(),
            vec![Some("a"), Some("z"), Some("c")],
        );
        assert_eq!(null_mask(&out).unwrap(), vec![false, false, false]);
        assert_eq!(null_mask(target).unwrap(), vec![false, true, false]);
    }

    #[test]
    fn patch_keeps_target_dtype_when_values_fit() {
        let target = Column::new("ward".into(), [Some(1.0f64), None]);
        let source = Column::new("WARD".into(), [7i64, 9]);

        let out = patch(&target, &source, &[(1, 1)]).unwrap();
        assert_eq!(out.dtype(), &DataType::Float64);
        assert_eq!(out.f64().unwrap().into_iter().collect::<Vec<_>>(), vec![Some(1.0), Some(9.0)]);
    }

    #[test]
    fn patch_widens_target_when_values_do_not_fit() {
        let target = Column::new("ward".into(), [Some(4.0f64), None]);
        let source = Column::new("NAME".into(), ["Ward Three"]);

        let out = patch(&target, &source, &[(1, 0)]).unwrap();
        assert_eq!(out.dtype(), &DataType::String);
        let values = out.str().unwrap().into_iter().collect::<Vec<_>>();
        assert_eq!(values[1], Some("Ward Three"));
        assert!(values[0].is_some());
    }
}

use geo::{MultiPolygon, Point};
use polars::prelude::{Column, DataFrame};

use crate::{error::{Error, Result}, geom::Geometries};

/// A polygon feature collection: one attribute row per MultiPolygon, all in one CRS.
#[derive(Debug, Clone)]
pub struct GeoFrame {
    data: DataFrame,
    geoms: Geometries,
}

impl GeoFrame {
    /// Pair attribute rows with geometries. Fails if the counts differ.
    pub fn new(data: DataFrame, shapes: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Result<Self> {
        Self::from_parts(data, Geometries::new(shapes, epsg))
    }

    /// Pair attribute rows with an already indexed geometry collection.
    pub fn from_parts(data: DataFrame, geoms: Geometries) -> Result<Self> {
        if data.height() != geoms.len() {
            return Err(Error::LengthMismatch { rows: data.height(), geometries: geoms.len() });
        }
        Ok(Self { data, geoms })
    }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    #[inline] pub fn epsg(&self) -> Option<u32> { self.geoms.epsg() }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Look up an attribute column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        crate::frame::column(&self.data, name)
    }

    /// Add or replace an attribute column; it must have one value per row.
    pub(crate) fn set_column(&mut self, column: Column) -> Result<()> {
        self.data.with_column(column)?;
        Ok(())
    }
}

/// A point feature collection: one attribute row per Point, all in one CRS.
#[derive(Debug, Clone)]
pub struct PointFrame {
    data: DataFrame,
    points: Vec<Point<f64>>,
    epsg: Option<u32>,
}

impl PointFrame {
    /// Pair attribute rows with points. Fails if the counts differ.
    pub fn new(data: DataFrame, points: Vec<Point<f64>>, epsg: Option<u32>) -> Result<Self> {
        if data.height() != points.len() {
            return Err(Error::LengthMismatch { rows: data.height(), geometries: points.len() });
        }
        Ok(Self { data, points, epsg })
    }

    /// Points with no attributes.
    pub fn from_points(points: Vec<Point<f64>>, epsg: Option<u32>) -> Self {
        Self {
            data: DataFrame::empty_with_height(points.len()),
            points,
            epsg,
        }
    }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn points(&self) -> &[Point<f64>] { &self.points }

    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

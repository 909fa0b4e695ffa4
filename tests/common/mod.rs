#![allow(dead_code)]
use civic_geo::{GeoFrame, Result};
use geo::{polygon, MultiPolygon};
use polars::frame::DataFrame;

/// Axis-aligned rectangle as a MultiPolygon.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
    ]])
}

/// Unit square with its lower-left corner at (x, y).
pub fn unit_square(x: f64, y: f64) -> MultiPolygon<f64> {
    rect(x, y, x + 1.0, y + 1.0)
}

/// Frame in Ohio State Plane North (ft).
pub fn frame(data: DataFrame, shapes: Vec<MultiPolygon<f64>>) -> Result<GeoFrame> {
    GeoFrame::new(data, shapes, Some(3734))
}

use geo::{
    Area, BooleanOps, BoundingRect, Distance, Euclidean, InteriorPoint, Intersects, MultiPolygon,
    Point, Polygon,
};
use rstar::{RTree, AABB};

use crate::{error::{Error, Result}, geom::BoundingBox};

/// Geometries represents an indexed collection of MultiPolygons sharing one CRS.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty MultiPolygons are kept but never indexed.
    pub fn new(polygons: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons.iter().enumerate()
                    .filter_map(|(i, polygon)| polygon.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes: polygons,
            epsg,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get the EPSG code, if known.
    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    /// Indices of shapes whose bounding boxes intersect the given envelope, in ascending order.
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> Vec<usize> {
        let mut hits = self.rtree.locate_in_envelope_intersecting(envelope)
            .map(|bb| bb.idx())
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits
    }

    /// A point guaranteed to lie inside each MultiPolygon.
    pub fn interior_points(&self) -> Result<Vec<Point<f64>>> {
        self.shapes.iter().enumerate()
            .map(|(i, shape)| shape.interior_point()
                .ok_or_else(|| Error::Geometry(format!("shape {i} has no interior point (empty/degenerate)"))))
            .collect()
    }

    /// Area of the intersection between shape `i` and every shape in `other`
    /// whose bounding box overlaps it. Zero-area fragments (boundary touches) are dropped.
    pub(crate) fn overlaps_with(&self, i: usize, other: &Geometries) -> Vec<(usize, f64)> {
        let Some(rect) = self.shapes[i].bounding_rect() else { return Vec::new() };

        other.query(&super::envelope(&rect, 0.0)).into_iter()
            .filter_map(|j| {
                let area = self.shapes[i].intersection(&other.shapes[j]).unsigned_area();
                (area > 0.0).then_some((j, area))
            })
            .collect()
    }

    /// Index of the shape in `self` closest to `shape` (Euclidean distance).
    /// Ties go to the lowest index; returns None if nothing is indexed.
    pub(crate) fn nearest(&self, shape: &MultiPolygon<f64>) -> Option<usize> {
        let rect = shape.bounding_rect()?;
        let center: [f64; 2] = rect.center().into();

        // The shape nearest the center bounds the search radius
        let seed = self.rtree.nearest_neighbor(&center)?;
        let radius = multipolygon_distance(shape, &self.shapes[seed.idx()]);

        let mut best: Option<(usize, f64)> = None;
        for j in self.query(&super::envelope(&rect, radius)) {
            let distance = multipolygon_distance(shape, &self.shapes[j]);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((j, distance));
            }
        }
        best.map(|(j, _)| j)
    }

    /// Compute the union of the given polygons into a single MultiPolygon.
    /// This method may be slow for large numbers of complex polygons.
    pub(crate) fn union_of(polygons: impl IntoIterator<Item = Polygon<f64>>) -> MultiPolygon<f64> {
        polygons.into_iter()
            .map(MultiPolygon::from)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| MultiPolygon::new(Vec::new()))
    }
}

/// Euclidean distance between two MultiPolygons; zero when they intersect.
fn multipolygon_distance(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    if a.intersects(b) { return 0.0 }

    a.0.iter()
        .flat_map(|pa| b.0.iter().map(move |pb| Euclidean.distance(pa, pb)))
        .fold(f64::INFINITY, f64::min)
}

use std::f64::consts::PI;

use geo::{LineString, Point, Polygon};

/// Segments used to approximate a circle (16 per quadrant).
pub const DEFAULT_SEGMENTS: usize = 64;

/// Polygon approximating a circle of `radius` around `center`.
///
/// Vertices lie on the circle, so the polygon is inscribed: every point within
/// `radius * cos(PI / segments)` of the center is inside it.
pub fn circle(center: Point<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(4);
    let r = radius.abs();

    let mut coords = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (center.x() + r * angle.cos(), center.y() + r * angle.sin())
        })
        .collect::<Vec<_>>();
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains};

    #[test]
    fn circle_area_approximates_pi_r_squared() {
        let polygon = circle(Point::new(0.0, 0.0), 10.0, DEFAULT_SEGMENTS);
        let expected = PI * 100.0;
        let error = (polygon.unsigned_area() - expected).abs() / expected;
        assert!(error < 0.01, "circle area error {:.3}%", error * 100.0);
    }

    #[test]
    fn circle_ring_is_closed() {
        let polygon = circle(Point::new(5.0, 5.0), 1.0, 32);
        let ring = polygon.exterior();
        assert_eq!(ring.0.len(), 33);
        assert_eq!(ring.0.first(), ring.0.last());
    }

    #[test]
    fn circle_contains_points_inside_inscribed_radius() {
        let polygon = circle(Point::new(0.0, 0.0), 1.0, DEFAULT_SEGMENTS);
        assert!(polygon.contains(&Point::new(0.99, 0.0)));
        assert!(polygon.contains(&Point::new(0.0, -0.99)));
        assert!(!polygon.contains(&Point::new(1.01, 0.0)));
    }

    #[test]
    fn tiny_segment_counts_are_clamped() {
        let polygon = circle(Point::new(0.0, 0.0), 1.0, 1);
        assert_eq!(polygon.exterior().0.len(), 5);
    }
}

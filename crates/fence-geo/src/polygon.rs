use crate::Coordinate;
use serde::{Deserialize, Serialize};

/// Closed ring of vertices. The last vertex connects back to the first.
///
/// Nothing checks for self-intersection: the crossing-parity test below gives a
/// stable answer for any ring, simple or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Coordinate>,
}

impl Polygon {
    pub fn new(vertices: Vec<Coordinate>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Fewer than three vertices encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point_in_polygon(point, &self.vertices)
    }

    pub fn overlap(&self, other: &Polygon) -> OverlapEstimate {
        polygon_overlap(&self.vertices, &other.vertices)
    }
}

impl From<Vec<Coordinate>> for Polygon {
    fn from(vertices: Vec<Coordinate>) -> Self {
        Self::new(vertices)
    }
}

/// Ray-casting containment test.
///
/// A ray is cast from `point` towards increasing longitude and the edges it
/// crosses are counted; an odd count means inside. An edge counts only when
/// exactly one endpoint lies strictly north of the point, which keeps a shared
/// vertex from being counted twice.
///
/// Points exactly on an edge are not treated specially. The result is stable:
/// points on a southern or western edge report inside, points on a northern or
/// eastern edge report outside. Rings with fewer than three vertices always
/// report outside.
pub fn point_in_polygon(point: Coordinate, vertices: &[Coordinate]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let previous = vertices.iter().cycle().skip(vertices.len() - 1);
    let crossings = vertices
        .iter()
        .zip(previous)
        .filter(|(current, previous)| ray_crosses_edge(point, current, previous))
        .count();

    crossings % 2 == 1
}

fn ray_crosses_edge(point: Coordinate, a: &Coordinate, b: &Coordinate) -> bool {
    if (a.latitude > point.latitude) == (b.latitude > point.latitude) {
        return false;
    }
    // The straddle check above guarantees a.latitude != b.latitude.
    let crossing_longitude = (b.longitude - a.longitude) * (point.latitude - a.latitude)
        / (b.latitude - a.latitude)
        + a.longitude;
    point.longitude < crossing_longitude
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlapEstimate {
    pub has_overlap: bool,
    /// Share of sampled vertices that landed inside the other polygon, 0..=100.
    pub overlap_percent: u8,
}

impl OverlapEstimate {
    pub const NONE: Self = Self {
        has_overlap: false,
        overlap_percent: 0,
    };
}

/// Coarse overlap estimate by vertex sampling.
///
/// Every vertex of `a` is tested against `b` and every vertex of `b` against
/// `a`; the percentage is `round(100 * matches / (|a| + |b|))`. This is not an
/// intersection area. Two polygons can cross without any vertex of one lying
/// inside the other, and concave shapes skew the figure either way. The
/// denominator is the same in both argument orders, so the result is symmetric.
///
/// Degenerate rings (fewer than three vertices) on either side yield no overlap.
pub fn polygon_overlap(a: &[Coordinate], b: &[Coordinate]) -> OverlapEstimate {
    if a.len() < 3 || b.len() < 3 {
        return OverlapEstimate::NONE;
    }

    let matches = a.iter().filter(|vertex| point_in_polygon(**vertex, b)).count()
        + b.iter().filter(|vertex| point_in_polygon(**vertex, a)).count();
    let total = a.len() + b.len();
    let percent = (100.0 * matches as f64 / total as f64).round();

    OverlapEstimate {
        has_overlap: matches > 0,
        overlap_percent: percent.clamp(0.0, 100.0) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points
            .iter()
            .map(|(lat, lng)| Coordinate::new(*lat, *lng))
            .collect()
    }

    fn unit_square() -> Vec<Coordinate> {
        ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)])
    }

    #[test]
    fn square_contains_its_center() {
        assert!(point_in_polygon(Coordinate::new(5.0, 5.0), &unit_square()));
    }

    #[test]
    fn square_excludes_far_point() {
        assert!(!point_in_polygon(Coordinate::new(15.0, 15.0), &unit_square()));
        assert!(!point_in_polygon(Coordinate::new(-1.0, 5.0), &unit_square()));
    }

    #[test]
    fn boundary_classification_is_stable() {
        let square = unit_square();
        for _ in 0..3 {
            assert!(point_in_polygon(Coordinate::new(0.0, 5.0), &square));
            assert!(point_in_polygon(Coordinate::new(5.0, 0.0), &square));
            assert!(!point_in_polygon(Coordinate::new(10.0, 5.0), &square));
            assert!(!point_in_polygon(Coordinate::new(5.0, 10.0), &square));
        }
    }

    #[test]
    fn vertex_order_does_not_change_containment() {
        let mut reversed = unit_square();
        reversed.reverse();
        assert!(point_in_polygon(Coordinate::new(5.0, 5.0), &reversed));
        assert!(!point_in_polygon(Coordinate::new(15.0, 15.0), &reversed));
    }

    #[test]
    fn degenerate_rings_contain_nothing() {
        let probes = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.5, 0.5),
            Coordinate::new(5.0, 5.0),
        ];
        let rings = [
            Vec::new(),
            ring(&[(0.0, 0.0)]),
            ring(&[(0.0, 0.0), (10.0, 10.0)]),
        ];
        for vertices in &rings {
            for probe in probes {
                assert!(!point_in_polygon(probe, vertices));
            }
        }
    }

    #[test]
    fn concave_notch_is_outside() {
        // U shape opening to the north.
        let u_shape = ring(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 3.0),
            (2.0, 3.0),
            (2.0, 7.0),
            (10.0, 7.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);
        assert!(point_in_polygon(Coordinate::new(1.0, 5.0), &u_shape));
        assert!(point_in_polygon(Coordinate::new(5.0, 1.5), &u_shape));
        assert!(!point_in_polygon(Coordinate::new(5.0, 5.0), &u_shape));
    }

    #[test]
    fn non_finite_point_is_outside() {
        assert!(!point_in_polygon(Coordinate::new(f64::NAN, 5.0), &unit_square()));
    }

    #[test]
    fn disjoint_squares_do_not_overlap() {
        let far = ring(&[(20.0, 20.0), (20.0, 30.0), (30.0, 30.0), (30.0, 20.0)]);
        assert_eq!(polygon_overlap(&unit_square(), &far), OverlapEstimate::NONE);
    }

    #[test]
    fn identical_squares_sample_only_the_south_west_corner() {
        // Every vertex of a copy lies on the other copy's boundary. Only the
        // south-west corner touches two inclusive edges, so one vertex per side
        // matches: 2 of 8.
        let square = unit_square();
        let estimate = polygon_overlap(&square, &square);
        assert!(estimate.has_overlap);
        assert_eq!(estimate.overlap_percent, 25);
    }

    #[test]
    fn nested_square_counts_only_inner_vertices() {
        let square = unit_square();
        let inner = ring(&[(1.0, 1.0), (1.0, 9.0), (9.0, 9.0), (9.0, 1.0)]);
        let nested = polygon_overlap(&square, &inner);
        assert!(nested.has_overlap);
        assert_eq!(nested.overlap_percent, 50);
    }

    #[test]
    fn partial_overlap_counts_vertices_both_ways() {
        let shifted = ring(&[(5.0, 5.0), (5.0, 15.0), (15.0, 15.0), (15.0, 5.0)]);
        let estimate = polygon_overlap(&unit_square(), &shifted);
        assert!(estimate.has_overlap);
        assert_eq!(estimate.overlap_percent, 25);
    }

    #[test]
    fn overlap_is_symmetric_for_different_vertex_counts() {
        let triangle = ring(&[(2.0, 2.0), (2.0, 8.0), (8.0, 5.0)]);
        let forward = polygon_overlap(&unit_square(), &triangle);
        let backward = polygon_overlap(&triangle, &unit_square());
        assert_eq!(forward, backward);
        assert_eq!(forward.overlap_percent, 43);
    }

    #[test]
    fn degenerate_input_yields_no_overlap() {
        let line = ring(&[(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(polygon_overlap(&unit_square(), &line), OverlapEstimate::NONE);
        assert_eq!(polygon_overlap(&[], &[]), OverlapEstimate::NONE);
    }

    #[test]
    fn polygon_wrapper_delegates() {
        let polygon = Polygon::from(unit_square());
        assert_eq!(polygon.len(), 4);
        assert!(!polygon.is_degenerate());
        assert!(polygon.contains(Coordinate::new(5.0, 5.0)));
        assert!(Polygon::default().is_degenerate());
    }
}

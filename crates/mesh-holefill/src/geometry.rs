//! Geometry kernel: planes, corner angles, axis statistics, and the
//! triangle intersection predicates used by the boundary-validity check.

use nalgebra::{Point3, Vector3};

const EPSILON: f64 = 1e-10;

/// A plane defined by an origin and two spanning directions.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub origin: Point3<f64>,
    pub span_u: Vector3<f64>,
    pub span_v: Vector3<f64>,
}

impl Plane {
    /// Create a plane from an origin and two spanning vectors.
    #[inline]
    pub fn new(origin: Point3<f64>, span_u: Vector3<f64>, span_v: Vector3<f64>) -> Self {
        Self {
            origin,
            span_u,
            span_v,
        }
    }

    /// Parametric point evaluation: `origin + u * span_u + v * span_v`.
    #[inline]
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + self.span_u * u + self.span_v * v
    }
}

/// Average normal of a closed polygon loop (Newell's method).
///
/// Falls back to +Z for degenerate loops so angle computation stays defined.
pub fn loop_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();

    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }

    n.try_normalize(EPSILON).unwrap_or_else(Vector3::z)
}

/// Interior angle in degrees at `corner`, between the edges to `prev` and
/// `next`. Corners that open against the loop normal are reflex and report
/// the angle as `360 - raw`, so the result lies in `[0, 360)`.
pub fn interior_angle(
    prev: &Point3<f64>,
    corner: &Point3<f64>,
    next: &Point3<f64>,
    normal: &Vector3<f64>,
) -> f64 {
    let a = prev - corner;
    let b = next - corner;

    let denom = a.norm() * b.norm();
    if denom < EPSILON {
        return 0.0;
    }

    let cos = (a.dot(&b) / denom).clamp(-1.0, 1.0);
    let raw = cos.acos().to_degrees();

    if a.cross(&b).dot(normal) > EPSILON {
        360.0 - raw
    } else {
        raw
    }
}

/// Average of two edge-vector lengths.
#[inline]
pub fn average_length(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a.norm() + b.norm()) / 2.0
}

/// Per-axis average and population variance of a point set.
#[derive(Debug, Clone, Copy)]
pub struct AxisStats {
    pub average: Point3<f64>,
    pub variance: Vector3<f64>,
}

/// Compute per-axis average and variance over a point set.
pub fn axis_stats(points: &[Point3<f64>]) -> AxisStats {
    let n = points.len() as f64;

    let mut average = Vector3::zeros();
    for p in points {
        average += p.coords;
    }
    average /= n;

    let mut variance = Vector3::zeros();
    for p in points {
        let d = p.coords - average;
        variance += d.component_mul(&d);
    }
    variance /= n;

    AxisStats {
        average: Point3::from(average),
        variance,
    }
}

/// Segment-triangle intersection test (Möller-Trumbore).
///
/// Reports true only for crossings strictly inside the segment, so a
/// segment endpoint lying exactly on the triangle does not count.
pub fn segment_intersects_triangle(
    p: &Point3<f64>,
    q: &Point3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> bool {
    let dir = q - p;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    // Parallel to the triangle plane (includes the coplanar case).
    if a.abs() < EPSILON {
        return false;
    }

    let f = 1.0 / a;
    let s = p - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let qv = s.cross(&edge1);
    let v = f * dir.dot(&qv);

    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = f * edge2.dot(&qv);
    t > EPSILON && t < 1.0 - EPSILON
}

/// 3D triangle-triangle overlap test.
///
/// Each edge of one triangle is tested against the other triangle's
/// interior. Coplanar overlap is intentionally not detected; the caller
/// skips faces adjacent to the candidate, and coplanar neighbors are
/// exactly those.
pub fn triangles_intersect(
    a0: &Point3<f64>,
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b0: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> bool {
    let edges_a = [(a0, a1), (a1, a2), (a2, a0)];
    for (p, q) in &edges_a {
        if segment_intersects_triangle(p, q, b0, b1, b2) {
            return true;
        }
    }

    let edges_b = [(b0, b1), (b1, b2), (b2, b0)];
    for (p, q) in &edges_b {
        if segment_intersects_triangle(p, q, a0, a1, a2) {
            return true;
        }
    }

    false
}

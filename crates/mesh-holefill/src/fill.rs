//! Advancing-front hole filling.
//!
//! Given a closed boundary loop, the front is initialized from the loop and
//! every corner is classified into a priority bucket by its interior angle.
//! The main loop repeatedly pops the most urgent rule, applies it (mutating
//! front and filling), updates the affected corners' queue memberships, and
//! merges nearby created vertices, until the front collapses to 3 or 4
//! vertices, which are closed directly.

use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::angle::{Angle, AngleArena, AngleId};
use crate::error::{FillError, FillResult};
use crate::front::Front;
use crate::geometry::{self, Plane};
use crate::queue::QueueSet;
use crate::types::{Filling, Mesh};

/// Coincident-point threshold for input loop deduplication.
const DEDUP_EPSILON: f64 = 1e-9;

/// Which committed geometry candidate faces are tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionTest {
    /// Test against the faces committed to the filling so far.
    #[default]
    Filling,
    /// Additionally test against every face of the original mesh.
    All,
}

/// Tuning parameters for one fill invocation.
#[derive(Debug, Clone)]
pub struct FillParams {
    /// Distance below which a created vertex is merged into a front neighbor.
    pub merge_threshold: f64,

    /// Scope of the boundary-validity intersection test.
    pub collision_test: CollisionTest,

    /// Debug iteration cap. Hitting it truncates the loop and returns the
    /// incomplete patch with `completed = false`.
    pub max_iterations: Option<usize>,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            merge_threshold: 0.16,
            collision_test: CollisionTest::Filling,
            max_iterations: None,
        }
    }
}

/// Diagnostics for a finished (or truncated) fill.
#[derive(Debug, Clone)]
pub struct FillReport {
    /// Main-loop iterations executed.
    pub iterations: usize,

    /// Vertices created beyond the original hole loop.
    pub vertices_added: usize,

    /// Faces committed to the patch.
    pub faces_added: usize,

    /// Reflex corners (>= 180 degrees) left unresolved.
    pub reflex_ignored: usize,

    /// False if the loop was truncated by the iteration cap or collapsed
    /// to a single vertex.
    pub completed: bool,
}

impl std::fmt::Display for FillReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Hole filling report:")?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  New vertices: {}", self.vertices_added)?;
        writeln!(f, "  New faces: {}", self.faces_added)?;
        writeln!(f, "  Reflex corners ignored: {}", self.reflex_ignored)?;
        writeln!(
            f,
            "  Completed: {}",
            if self.completed { "yes" } else { "NO" }
        )?;
        Ok(())
    }
}

/// Result of a fill invocation: the patch plus its diagnostics.
#[derive(Debug, Clone)]
pub struct FillOutcome {
    /// The triangulated patch, ready to be merged into the full mesh.
    pub filling: Filling,

    /// Diagnostics accumulated during the fill.
    pub report: FillReport,
}

/// Fill one hole described by a closed, ordered boundary loop.
///
/// `mesh` supplies the faces for the optional global intersection test
/// ([`CollisionTest::All`]); it is never mutated. The returned patch shares
/// the loop vertices as its first entries, in input order.
pub fn fill_hole(
    hole: &[Point3<f64>],
    mesh: Option<&Mesh>,
    params: &FillParams,
) -> FillResult<FillOutcome> {
    let points = dedup_loop(hole);
    if points.len() < 3 {
        return Err(FillError::DegenerateLoop {
            details: format!("{} distinct vertices after deduplication", points.len()),
        });
    }

    info!("Filling hole with {} boundary vertices", points.len());

    let mut ctx = FillContext::new(&points, mesh, params);
    let report = ctx.run()?;

    Ok(FillOutcome {
        filling: ctx.filling,
        report,
    })
}

/// Drop coincident consecutive points, including a duplicated closing point.
fn dedup_loop(hole: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let mut out: Vec<Point3<f64>> = Vec::with_capacity(hole.len());

    for &p in hole {
        if out.last().map_or(true, |q| (p - q).norm() > DEDUP_EPSILON) {
            out.push(p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= DEDUP_EPSILON {
        out.pop();
    }

    out
}

/// Per-invocation state: the shrinking front, the growing patch, the corner
/// arena, and the four rule queues.
struct FillContext<'a> {
    filling: Filling,
    front: Front,
    arena: AngleArena,
    queues: QueueSet,

    /// Average normal of the input loop, used for reflex detection.
    normal: Vector3<f64>,

    /// The first `hole_len` filling vertices are the original loop and are
    /// never merged away.
    hole_len: usize,

    mesh: Option<&'a Mesh>,
    params: &'a FillParams,
}

impl<'a> FillContext<'a> {
    fn new(points: &[Point3<f64>], mesh: Option<&'a Mesh>, params: &'a FillParams) -> Self {
        let n = points.len();
        let normal = geometry::loop_normal(points);

        let mut ctx = Self {
            filling: Filling::from_loop(points),
            front: Front::from_loop(n),
            arena: AngleArena::new(),
            queues: QueueSet::new(),
            normal,
            hole_len: n,
            mesh,
            params,
        };

        // One corner per loop vertex, linked into a circular list mirroring
        // the front, then classified into the rule buckets.
        let mut ids = Vec::with_capacity(n);
        let mut degrees = Vec::with_capacity(n);
        for i in 0..n {
            let vp = ((i + n - 1) % n) as u32;
            let v = i as u32;
            let vn = ((i + 1) % n) as u32;
            let degree =
                geometry::interior_angle(&points[vp as usize], &points[i], &points[vn as usize], &normal);

            ids.push(ctx.arena.insert(Angle {
                prev_vertex: vp,
                mid_vertex: v,
                next_vertex: vn,
                degree,
                prev: AngleId::INVALID,
                next: AngleId::INVALID,
            }));
            degrees.push(degree);
        }
        for i in 0..n {
            let prev = ids[(i + n - 1) % n];
            let next = ids[(i + 1) % n];
            if let Some(angle) = ctx.arena.get_mut(ids[i]) {
                angle.prev = prev;
                angle.next = next;
            }
            ctx.queues.insert(degrees[i], ids[i]);
        }

        ctx
    }

    fn run(&mut self) -> FillResult<FillReport> {
        let mut iterations = 0usize;
        let mut completed = true;

        loop {
            iterations += 1;

            if let Some(cap) = self.params.max_iterations {
                if iterations > cap {
                    warn!("Iteration cap {} reached, truncating fill", cap);
                    iterations -= 1;
                    completed = false;
                    break;
                }
            }

            match self.front.len() {
                4 => {
                    self.close_hole4();
                    break;
                }
                3 => {
                    self.close_hole3();
                    break;
                }
                1 => {
                    // Degenerate collapse: report the last vertex, emit no face.
                    warn!(
                        "Front collapsed to a single vertex {}",
                        self.front.vertices()[0]
                    );
                    completed = false;
                    break;
                }
                2 => {
                    return Err(FillError::InvalidTopology {
                        details: "front collapsed to two vertices".into(),
                    });
                }
                _ => {}
            }

            if !self.rule_step()? {
                // Every queued rule corner was attempted against the
                // current front and none succeeded.
                return Err(FillError::NoRuleApplicable {
                    front_len: self.front.len(),
                    queued: self.queues.rule_len(),
                });
            }
        }

        let report = FillReport {
            iterations,
            vertices_added: self.filling.vertex_count() - self.hole_len,
            faces_added: self.filling.face_count(),
            reflex_ignored: self.queues.reflex.len(),
            completed,
        };

        info!(
            "Finished after {} iterations: {} new vertices, {} new faces",
            report.iterations, report.vertices_added, report.faces_added
        );
        if report.reflex_ignored > 0 {
            warn!(
                "Ignored {} corners with angles >= 180 degrees",
                report.reflex_ignored
            );
        }

        Ok(report)
    }

    /// Rule 1: close corners of <= 75 degrees with a single triangle from
    /// existing vertices. Corners are attempted smallest-first until one
    /// succeeds; failed corners stay queued unchanged for a later retry.
    /// The front shrinks by one on success.
    fn apply_rule1(&mut self) -> FillResult<bool> {
        let mut deferred = Vec::new();
        let mut progressed = false;

        while let Some(id) = self.queues.rule1.pop_smallest() {
            if self.try_rule1(id)? {
                progressed = true;
                break;
            }
            deferred.push(id);
        }
        self.restore_deferred(&deferred);

        Ok(progressed)
    }

    fn try_rule1(&mut self, id: AngleId) -> FillResult<bool> {
        let angle = self.angle(id)?.clone();
        let (vp, v, vn) = (angle.prev_vertex, angle.mid_vertex, angle.next_vertex);

        let p = self.pos(v)?;
        if !self.boundary_valid(&p, vp, Some(vn))? {
            // The front may change shape favorably later.
            return Ok(false);
        }

        debug!("Rule 1: closing corner at vertex {} ({:.1} deg)", v, angle.degree);
        self.filling.push_face([v, vp, vn]);
        self.front.remove(v)?;

        // Splice the neighboring corners together.
        let prev_id = angle.prev;
        let next_id = angle.next;
        self.unqueue(prev_id)?;
        self.unqueue(next_id)?;
        {
            let prev = self.angle_mut(prev_id)?;
            prev.next_vertex = vn;
            prev.next = next_id;
        }
        {
            let next = self.angle_mut(next_id)?;
            next.prev_vertex = vp;
            next.prev = prev_id;
        }
        self.arena.remove(id);
        self.requeue(prev_id)?;
        self.requeue(next_id)?;

        Ok(true)
    }

    /// Rule 2: split a corner of 75-135 degrees with one new vertex on the
    /// angular bisector, at the average of the two edge lengths. Corners
    /// are attempted smallest-first until one succeeds. The front size
    /// stays the same.
    fn apply_rule2(&mut self) -> FillResult<Option<u32>> {
        let mut deferred = Vec::new();
        let mut created = None;

        while let Some(id) = self.queues.rule2.pop_smallest() {
            created = self.try_rule2(id)?;
            if created.is_some() {
                break;
            }
            deferred.push(id);
        }
        self.restore_deferred(&deferred);

        Ok(created)
    }

    fn try_rule2(&mut self, id: AngleId) -> FillResult<Option<u32>> {
        let angle = self.angle(id)?.clone();
        let (vp, v, vn) = (angle.prev_vertex, angle.mid_vertex, angle.next_vertex);

        let pp = self.pos(vp)?;
        let p = self.pos(v)?;
        let pn = self.pos(vn)?;

        // Work in the frame centered at the corner vertex.
        let vp_t = pp - p;
        let vn_t = pn - p;

        let plane = Plane::new(Point3::origin(), vp_t, vn_t);
        let bisector = plane.point_at(1.0, 1.0).coords;
        let Some(dir) = bisector.try_normalize(DEDUP_EPSILON) else {
            return Ok(None);
        };
        let new_pos = p + dir * geometry::average_length(&vp_t, &vn_t);

        if !self.boundary_valid(&new_pos, vp, Some(vn))? {
            return Ok(None);
        }

        debug!("Rule 2: splitting corner at vertex {} ({:.1} deg)", v, angle.degree);
        let new_ix = self.filling.push_vertex(new_pos);
        self.filling.push_face([v, vp, new_ix]);
        self.filling.push_face([v, new_ix, vn]);
        self.front.replace(v, new_ix)?;

        // The corner now sits at the new vertex; both neighbors see it.
        self.angle_mut(id)?.mid_vertex = new_ix;
        self.requeue(id)?;

        self.unqueue(angle.prev)?;
        self.angle_mut(angle.prev)?.next_vertex = new_ix;
        self.requeue(angle.prev)?;

        self.unqueue(angle.next)?;
        self.angle_mut(angle.next)?.prev_vertex = new_ix;
        self.requeue(angle.next)?;

        Ok(Some(new_ix))
    }

    /// Rule 3: widen a corner of 135-180 degrees with one new vertex offset
    /// from the corner along a cross-product direction, snapped onto the
    /// minimum-variance axis of the corner and its next neighbor. Corners
    /// are attempted smallest-first until one succeeds. The front grows by
    /// one on success.
    fn apply_rule3(&mut self) -> FillResult<Option<u32>> {
        let mut deferred = Vec::new();
        let mut created = None;

        while let Some(id) = self.queues.rule3.pop_smallest() {
            created = self.try_rule3(id)?;
            if created.is_some() {
                break;
            }
            deferred.push(id);
        }
        self.restore_deferred(&deferred);

        Ok(created)
    }

    fn try_rule3(&mut self, id: AngleId) -> FillResult<Option<u32>> {
        let angle = self.angle(id)?.clone();
        let (vp, v, vn) = (angle.prev_vertex, angle.mid_vertex, angle.next_vertex);

        let pp = self.pos(vp)?;
        let p = self.pos(v)?;
        let pn = self.pos(vn)?;

        let vp_t = pp - p;
        let vn_t = pn - p;
        let half = vn_t * 0.5;

        let Some(c1) = vp_t.cross(&vn_t).try_normalize(DEDUP_EPSILON) else {
            return Ok(None);
        };
        let mut c2 = c1.cross(&(vn_t - half));
        if angle.degree < 180.0 {
            c2 = -c2;
        }
        let Some(c2) = c2.try_normalize(DEDUP_EPSILON) else {
            return Ok(None);
        };

        let plane = Plane::new(Point3::origin(), vn_t - half, c2);
        let offset = plane.point_at(0.0, vn_t.norm()).coords;
        let mut new_pos = p + half + offset;

        // Keep the new vertex near the local surface: pin the coordinate of
        // the minimum-variance axis (first-smallest wins, x before y before z)
        // to the average of the two defining vertices.
        let stats = geometry::axis_stats(&[p, pn]);
        if stats.variance.x < stats.variance.y {
            if stats.variance.x < stats.variance.z {
                new_pos.x = stats.average.x;
            } else {
                new_pos.z = stats.average.z;
            }
        } else if stats.variance.y < stats.variance.z {
            new_pos.y = stats.average.y;
        } else {
            new_pos.z = stats.average.z;
        }

        if !self.boundary_valid(&new_pos, vp, Some(vn))? {
            return Ok(None);
        }

        debug!("Rule 3: widening corner at vertex {} ({:.1} deg)", v, angle.degree);
        let new_ix = self.filling.push_vertex(new_pos);
        self.filling.push_face([vn, v, new_ix]);
        self.front.insert_after(v, new_ix)?;

        // A fresh corner is spliced in between the original and its next.
        let next_id = angle.next;
        let new_id = self.arena.insert(Angle {
            prev_vertex: v,
            mid_vertex: new_ix,
            next_vertex: vn,
            degree: 0.0,
            prev: id,
            next: next_id,
        });

        self.unqueue(next_id)?;
        {
            let next = self.angle_mut(next_id)?;
            next.prev_vertex = new_ix;
            next.prev = new_id;
        }
        {
            let angle = self.angle_mut(id)?;
            angle.next_vertex = new_ix;
            angle.next = new_id;
        }
        self.requeue(new_id)?;
        self.requeue(next_id)?;
        self.requeue(id)?;

        Ok(Some(new_ix))
    }

    /// Close a 3-vertex front with a single triangle.
    fn close_hole3(&mut self) {
        let f = self.front.vertices();
        debug!("Closing final 3-vertex front");
        self.filling.push_face([f[1], f[0], f[2]]);
        self.front.clear();
    }

    /// Close a 4-vertex front with two triangles across opposite corners.
    fn close_hole4(&mut self) {
        let f = self.front.vertices();
        debug!("Closing final 4-vertex front");
        let (a, b) = ([f[3], f[2], f[0]], [f[1], f[0], f[2]]);
        self.filling.push_face(a);
        self.filling.push_face(b);
        self.front.clear();
    }

    /// Boundary-validity predicate: the prospective triangle formed by the
    /// candidate point and its anchor(s) must not intersect any committed
    /// filling face that does not touch the anchors (adjacent faces are
    /// presumed fine and skipped). With [`CollisionTest::All`], the same
    /// test runs against every face of the original mesh.
    fn boundary_valid(
        &self,
        candidate: &Point3<f64>,
        anchor_a: u32,
        anchor_b: Option<u32>,
    ) -> FillResult<bool> {
        let pa = self.pos(anchor_a)?;
        let pb = match anchor_b {
            Some(b) => Some(self.pos(b)?),
            None => None,
        };

        for &[a, b, c] in &self.filling.faces {
            let touches_anchor = [a, b, c].iter().any(|&ix| {
                ix == anchor_a || anchor_b == Some(ix)
            });
            if touches_anchor {
                continue;
            }

            let (fa, fb, fc) = (
                self.pos(a)?,
                self.pos(b)?,
                self.pos(c)?,
            );
            // The candidate may already exist in the filling (Rule 1);
            // its own faces are adjacent, not intersecting.
            if fa == *candidate || fb == *candidate || fc == *candidate {
                continue;
            }

            if self.candidate_hits(candidate, &pa, pb.as_ref(), &fa, &fb, &fc) {
                return Ok(false);
            }
        }

        if self.params.collision_test == CollisionTest::All {
            if let Some(mesh) = self.mesh {
                for tri in mesh.triangles() {
                    let corners = [tri.v0, tri.v1, tri.v2];
                    let touches = corners.iter().any(|q| {
                        *q == pa || Some(*q) == pb || *q == *candidate
                    });
                    if touches {
                        continue;
                    }

                    if self.candidate_hits(candidate, &pa, pb.as_ref(), &tri.v0, &tri.v1, &tri.v2) {
                        return Ok(false);
                    }
                }
            }
        }

        Ok(true)
    }

    fn candidate_hits(
        &self,
        candidate: &Point3<f64>,
        pa: &Point3<f64>,
        pb: Option<&Point3<f64>>,
        fa: &Point3<f64>,
        fb: &Point3<f64>,
        fc: &Point3<f64>,
    ) -> bool {
        match pb {
            Some(pb) => geometry::triangles_intersect(candidate, pa, pb, fa, fb, fc),
            None => geometry::segment_intersects_triangle(candidate, pa, fa, fb, fc),
        }
    }

    /// Merge pass: compare a created vertex against its two front
    /// neighbors and consolidate any that fall within the threshold.
    /// Original hole-loop vertices are never merged away.
    fn merge_by_distance(&mut self, vertex: u32) -> FillResult<()> {
        let mut v = vertex;
        let p = self
            .filling
            .position(v)
            .ok_or(FillError::VertexNotFound {
                index: v,
                context: "filling",
            })?;

        for side in 0..2 {
            let (before, after) = self.front.neighbors(v)?;
            let t = if side == 0 { before } else { after };

            // The original form of the hole shall not be changed.
            if (t as usize) < self.hole_len || t == v {
                continue;
            }

            let tp = self.pos(t)?;
            if (p - tp).norm() <= self.params.merge_threshold {
                debug!("Merging front vertex {} into {}", t, v);
                self.merge_pair(t, v)?;
                if v > t {
                    v -= 1;
                }
            }
        }

        Ok(())
    }

    /// Remove `old` in favor of `survivor`: reindex filling faces, drop the
    /// old front entry, and repair the corner list around the merge point.
    fn merge_pair(&mut self, old: u32, survivor: u32) -> FillResult<()> {
        let ang_id = self
            .arena
            .find_by_mid(old)
            .ok_or(FillError::VertexNotFound {
                index: old,
                context: "corner list",
            })?;
        let ang = self.angle(ang_id)?.clone();
        let prev_id = ang.prev;
        let next_id = ang.next;

        self.queues.remove(ang.degree, ang_id);
        self.unqueue(prev_id)?;
        self.unqueue(next_id)?;

        // The survivor must be one of the two neighboring corners.
        let prev_mid = self.angle(prev_id)?.mid_vertex;
        let next_mid = self.angle(next_id)?.mid_vertex;
        if prev_mid == survivor {
            self.angle_mut(prev_id)?.next_vertex = ang.next_vertex;
            self.angle_mut(next_id)?.prev_vertex = survivor;
        } else if next_mid == survivor {
            self.angle_mut(prev_id)?.next_vertex = survivor;
            self.angle_mut(next_id)?.prev_vertex = ang.prev_vertex;
        } else {
            return Err(FillError::InvalidTopology {
                details: format!(
                    "neither neighbor of merged corner {} holds surviving vertex {}",
                    old, survivor
                ),
            });
        }

        self.angle_mut(prev_id)?.next = next_id;
        self.angle_mut(next_id)?.prev = prev_id;
        self.arena.remove(ang_id);

        self.front.remove(old)?;
        self.filling.merge_vertex(old, survivor);
        self.front.shift_indices_above(old);
        self.arena.shift_vertex_indices(old);

        self.requeue(prev_id)?;
        self.requeue(next_id)?;

        Ok(())
    }

    /// Put corners that failed their precondition back in their bucket at
    /// their unchanged degree. A corner that a successful application
    /// already requeued (as a spliced neighbor) stays where the requeue
    /// put it, and a corner the merge pass removed is dropped.
    fn restore_deferred(&mut self, deferred: &[AngleId]) {
        for &id in deferred {
            if self.queues.contains(id) {
                continue;
            }
            if let Some(degree) = self.arena.get(id).map(|a| a.degree) {
                self.queues.insert(degree, id);
            }
        }
    }

    /// Recompute a corner's degree from current positions and insert it
    /// into the bucket matching the new value.
    fn requeue(&mut self, id: AngleId) -> FillResult<()> {
        let (vp, v, vn) = {
            let angle = self.angle(id)?;
            (angle.prev_vertex, angle.mid_vertex, angle.next_vertex)
        };
        let pp = self.pos(vp)?;
        let p = self.pos(v)?;
        let pn = self.pos(vn)?;

        let degree = geometry::interior_angle(&pp, &p, &pn, &self.normal);
        self.angle_mut(id)?.degree = degree;
        self.queues.insert(degree, id);
        Ok(())
    }

    /// Drop a corner from whichever bucket currently holds it.
    fn unqueue(&mut self, id: AngleId) -> FillResult<()> {
        let degree = self.angle(id)?.degree;
        self.queues.remove(degree, id);
        Ok(())
    }

    fn angle(&self, id: AngleId) -> FillResult<&Angle> {
        self.arena.get(id).ok_or_else(|| FillError::InvalidTopology {
            details: "stale corner reference".into(),
        })
    }

    fn angle_mut(&mut self, id: AngleId) -> FillResult<&mut Angle> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| FillError::InvalidTopology {
                details: "stale corner reference".into(),
            })
    }

    fn pos(&self, vertex: u32) -> FillResult<Point3<f64>> {
        self.filling
            .position(vertex)
            .ok_or(FillError::VertexNotFound {
                index: vertex,
                context: "filling",
            })
    }
}

// One pass of the rule engine. Buckets are drained in strict priority
// order, but a bucket whose every corner fails its precondition falls
// through to the next one, so Ok(false) means every queued rule corner was
// attempted against the current front without progress. A Rule 2/3
// application that produced a new vertex is followed by a distance merge
// around it, unless the front is already at the terminal 3-vertex state.
impl FillContext<'_> {
    fn rule_step(&mut self) -> FillResult<bool> {
        if self.apply_rule1()? {
            return Ok(true);
        }

        let mut created = self.apply_rule2()?;
        if created.is_none() {
            created = self.apply_rule3()?;
        }

        if let Some(v) = created {
            if self.front.len() != 3 {
                self.merge_by_distance(v)?;
            }
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    /// Irregular convex pentagon, CCW in the XY plane. Smallest interior
    /// angle is ~106 degrees at the first vertex.
    fn obtuse_pentagon() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(-2.0, 0.5, 0.0),
            Point3::new(-1.2, -1.8, 0.0),
            Point3::new(1.2, -1.8, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ]
    }

    /// Pentagon with one sharp (~67 degree) apex: a triangle with two
    /// corners cut off.
    fn sharp_apex_pentagon() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(7.0, 0.0, 0.0),
            Point3::new(7.5, 0.75, 0.0),
            Point3::new(4.0, 6.0, 0.0),
            Point3::new(0.5, 0.75, 0.0),
        ]
    }

    fn unit_hexagon() -> Vec<Point3<f64>> {
        let h = 3f64.sqrt() / 2.0;
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, h, 0.0),
            Point3::new(-0.5, h, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-0.5, -h, 0.0),
            Point3::new(0.5, -h, 0.0),
        ]
    }

    fn regular_polygon(n: u32, radius: f64) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * f64::from(i) / f64::from(n);
                Point3::new(radius * theta.cos(), radius * theta.sin(), 0.0)
            })
            .collect()
    }

    fn sorted_boundary(filling: &Filling) -> Vec<(u32, u32)> {
        let mut edges = filling.boundary_edges();
        edges.sort_unstable();
        edges
    }

    fn rim_edges(n: u32) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                (i.min(j), i.max(j))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    #[test]
    fn test_square_closes_directly() {
        let outcome = fill_hole(&square(), None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 0);
        assert_eq!(outcome.report.faces_added, 2);
        assert_eq!(outcome.filling.face_count(), 2);

        // Watertight: the patch boundary is exactly the hole loop.
        assert_eq!(
            sorted_boundary(&outcome.filling),
            vec![(0, 1), (0, 3), (1, 2), (2, 3)]
        );
    }

    #[test]
    fn test_triangle_closes_with_one_face() {
        let hole = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let outcome = fill_hole(&hole, None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 0);
        assert_eq!(outcome.filling.faces, vec![[1, 0, 2]]);
    }

    #[test]
    fn test_degenerate_loop_rejected() {
        let hole = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let err = fill_hole(&hole, None, &FillParams::default()).unwrap_err();
        assert!(matches!(err, FillError::DegenerateLoop { .. }));
    }

    #[test]
    fn test_duplicated_closing_point_is_deduplicated() {
        let mut hole = square();
        hole.push(hole[0]);

        let outcome = fill_hole(&hole, None, &FillParams::default()).unwrap();
        assert_eq!(outcome.filling.vertex_count(), 4);
        assert_eq!(outcome.report.faces_added, 2);
    }

    #[test]
    fn test_sharp_apex_closes_with_rule1_only() {
        // One corner <= 75 degrees: Rule 1 closes it, then the 4-vertex
        // closure finishes. No vertex is ever created.
        let outcome = fill_hole(&sharp_apex_pentagon(), None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 0);
        assert_eq!(outcome.report.faces_added, 3); // N - 2

        assert_eq!(
            sorted_boundary(&outcome.filling),
            vec![(0, 1), (0, 4), (1, 2), (2, 3), (3, 4)]
        );
    }

    #[test]
    fn test_rule2_vertex_on_bisector_at_average_length() {
        // Cap the loop after one iteration: only the smallest obtuse corner
        // (vertex 0) is split, creating exactly one vertex.
        let hole = obtuse_pentagon();
        let params = FillParams {
            max_iterations: Some(1),
            ..Default::default()
        };
        let outcome = fill_hole(&hole, None, &params).unwrap();

        assert!(!outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 1);
        assert_eq!(outcome.report.faces_added, 2);

        let vp = hole[4] - hole[0];
        let vn = hole[1] - hole[0];
        let expected = hole[0] + (vp + vn).normalize() * ((vp.norm() + vn.norm()) / 2.0);

        let created = outcome.filling.vertices[5].position;
        assert_relative_eq!(created.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(created.y, expected.y, epsilon = 1e-9);
        assert_relative_eq!(created.z, expected.z, epsilon = 1e-9);
    }

    #[test]
    fn test_obtuse_pentagon_closes_watertight() {
        let outcome = fill_hole(&obtuse_pentagon(), None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 1);
        assert_eq!(outcome.report.faces_added, 5);

        for face in &outcome.filling.faces {
            assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
        }

        assert_eq!(
            sorted_boundary(&outcome.filling),
            vec![(0, 1), (0, 4), (1, 2), (2, 3), (3, 4)]
        );
    }

    #[test]
    fn test_hexagon_fan_fill() {
        // All corners are 120 degrees: Rule 2 creates one vertex at the
        // center, the rest closes around it with Rule 1 and the final
        // closure.
        let outcome = fill_hole(&unit_hexagon(), None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 1);
        assert_eq!(outcome.report.faces_added, 6);
        assert_eq!(outcome.report.reflex_ignored, 0);

        let center = outcome.filling.vertices[6].position;
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-9);

        assert_eq!(
            sorted_boundary(&outcome.filling),
            vec![(0, 1), (0, 5), (1, 2), (2, 3), (3, 4), (4, 5)]
        );
    }

    #[test]
    fn test_blocked_corner_does_not_mask_viable_corner() {
        // Two Rule-1 corners: vertex 4 (~53 deg) and vertex 2 (~61 deg).
        // A wall at x = 2 blocks only the smaller corner's triangle, so the
        // engine must move on and close vertex 2 instead of aborting.
        let hole = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 4.0, 0.0),
            Point3::new(5.0, 1.2, 0.0),
            Point3::new(0.0, 5.0, 0.0),
        ];
        let mut mesh = Mesh::new();
        mesh.vertices.push(crate::types::Vertex::from_coords(2.0, 0.0, -2.0));
        mesh.vertices.push(crate::types::Vertex::from_coords(2.0, 5.0, -2.0));
        mesh.vertices.push(crate::types::Vertex::from_coords(2.0, 2.5, 3.0));
        mesh.faces.push([0, 1, 2]);

        let params = FillParams {
            collision_test: CollisionTest::All,
            ..Default::default()
        };
        let outcome = fill_hole(&hole, Some(&mesh), &params).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.report.vertices_added, 0);
        assert_eq!(outcome.report.faces_added, 3);
        // Vertex 3 is a reflex notch that the closure absorbs geometrically
        // but whose corner record is never drained.
        assert_eq!(outcome.report.reflex_ignored, 1);

        assert_eq!(sorted_boundary(&outcome.filling), rim_edges(5));
    }

    #[test]
    fn test_decagon_fills_through_rule3() {
        // Regular decagon: every corner is 144 degrees, so the fill can
        // only start with Rule 3 and its axis-snapped offset vertices.
        let outcome =
            fill_hole(&regular_polygon(10, 2.0), None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert!(outcome.report.vertices_added >= 1);
        for face in &outcome.filling.faces {
            assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
        }
        assert_eq!(sorted_boundary(&outcome.filling), rim_edges(10));

        // The loop is planar, so the minimum-variance axis is always z and
        // snapping keeps every created vertex exactly in the plane.
        for vertex in &outcome.filling.vertices {
            assert_eq!(vertex.position.z, 0.0);
        }
    }

    #[test]
    fn test_icosagon_fills_through_rule3() {
        // 20-gon corners are 162 degrees, near the top of the Rule-3 band.
        let outcome =
            fill_hole(&regular_polygon(20, 3.0), None, &FillParams::default()).unwrap();

        assert!(outcome.report.completed);
        assert!(outcome.report.vertices_added >= 1);
        for face in &outcome.filling.faces {
            assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
        }
        assert_eq!(sorted_boundary(&outcome.filling), rim_edges(20));
    }

    #[test]
    fn test_merge_never_touches_hole_vertices() {
        // Threshold larger than every edge: the only created vertex sits
        // within merge range of its (hole-loop) neighbors, which must
        // survive untouched.
        let hole = unit_hexagon();
        let params = FillParams {
            merge_threshold: 2.0,
            ..Default::default()
        };
        let outcome = fill_hole(&hole, None, &params).unwrap();

        assert!(outcome.report.completed);
        assert_eq!(outcome.filling.vertex_count(), 7);
        for (i, p) in hole.iter().enumerate() {
            assert_eq!(outcome.filling.vertices[i].position, *p);
        }
    }

    #[test]
    fn test_merge_pass_consolidates_created_vertices() {
        // Assemble a mid-fill state by hand: a square hole whose front has
        // advanced past vertex 2, leaving two created vertices adjacent on
        // the front, closer than the merge threshold.
        let points: Vec<Point3<f64>> = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let params = FillParams::default();
        let mut ctx = FillContext::new(&points, None, &params);

        let e = ctx.filling.push_vertex(Point3::new(2.0, 1.0, 0.0));
        let f = ctx.filling.push_vertex(Point3::new(2.1, 1.0, 0.0));
        ctx.filling.push_face([1, 2, e]);
        ctx.filling.push_face([2, f, e]);
        ctx.filling.push_face([2, 3, f]);

        // Front becomes [0, 1, e, f, 3]; rebuild the corner list to match.
        ctx.front.remove(2).unwrap();
        ctx.front.insert_after(1, e).unwrap();
        ctx.front.insert_after(e, f).unwrap();

        ctx.arena = AngleArena::new();
        ctx.queues = QueueSet::new();
        let triples: Vec<[u32; 3]> = vec![
            [3, 0, 1],
            [0, 1, e],
            [1, e, f],
            [e, f, 3],
            [f, 3, 0],
        ];
        let ids: Vec<AngleId> = triples
            .iter()
            .map(|&[vp, v, vn]| {
                ctx.arena.insert(Angle {
                    prev_vertex: vp,
                    mid_vertex: v,
                    next_vertex: vn,
                    degree: 0.0,
                    prev: AngleId::INVALID,
                    next: AngleId::INVALID,
                })
            })
            .collect();
        let n = ids.len();
        for i in 0..n {
            let angle = ctx.arena.get_mut(ids[i]).unwrap();
            angle.prev = ids[(i + n - 1) % n];
            angle.next = ids[(i + 1) % n];
        }
        for &id in &ids {
            ctx.requeue(id).unwrap();
        }

        ctx.merge_by_distance(f).unwrap();

        // e was merged into f; f shifted down to e's old slot.
        assert_eq!(ctx.filling.vertex_count(), 5);
        assert_eq!(ctx.front.vertices(), &[0, 1, 4, 3]);

        // The face shared by both merged vertices degenerated and is gone;
        // the rest reference the survivor.
        assert_eq!(ctx.filling.faces, vec![[1, 2, 4], [2, 3, 4]]);
        for face in &ctx.filling.faces {
            assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
        }

        // Corner list repaired: no corner at the removed vertex, the
        // survivor's corner spans its new neighbors.
        assert!(ctx.arena.find_by_mid(5).is_none());
        let survivor_corner = ctx.arena.find_by_mid(4).unwrap();
        let angle = ctx.arena.get(survivor_corner).unwrap();
        assert_eq!(angle.prev_vertex, 1);
        assert_eq!(angle.next_vertex, 3);
        assert_eq!(ctx.arena.len(), 4);
        assert_eq!(ctx.queues.rule_len() + ctx.queues.reflex.len(), 4);

        // Hole-loop vertices are untouched.
        for (i, p) in points.iter().enumerate() {
            assert_eq!(ctx.filling.vertices[i].position, *p);
        }
    }

    #[test]
    fn test_blocked_by_mesh_reports_stuck() {
        // A vertical wall slices through the pentagon's interior. With the
        // global collision test enabled, every Rule 2 candidate triangle
        // crosses it, so no rule ever succeeds.
        let mut mesh = Mesh::new();
        mesh.vertices.push(crate::types::Vertex::from_coords(-3.0, 0.0, -3.0));
        mesh.vertices.push(crate::types::Vertex::from_coords(3.0, 0.0, -3.0));
        mesh.vertices.push(crate::types::Vertex::from_coords(0.0, 0.0, 3.0));
        mesh.faces.push([0, 1, 2]);

        let params = FillParams {
            collision_test: CollisionTest::All,
            ..Default::default()
        };
        let err = fill_hole(&obtuse_pentagon(), Some(&mesh), &params).unwrap_err();
        assert!(matches!(err, FillError::NoRuleApplicable { .. }));
    }

    #[test]
    fn test_mesh_ignored_without_global_collision() {
        // Same wall, but the default scope only tests committed patch
        // faces, so the fill proceeds.
        let mut mesh = Mesh::new();
        mesh.vertices.push(crate::types::Vertex::from_coords(-3.0, 0.0, -3.0));
        mesh.vertices.push(crate::types::Vertex::from_coords(3.0, 0.0, -3.0));
        mesh.vertices.push(crate::types::Vertex::from_coords(0.0, 0.0, 3.0));
        mesh.faces.push([0, 1, 2]);

        let outcome =
            fill_hole(&obtuse_pentagon(), Some(&mesh), &FillParams::default()).unwrap();
        assert!(outcome.report.completed);
    }

    #[test]
    fn test_report_display() {
        let outcome = fill_hole(&square(), None, &FillParams::default()).unwrap();
        let text = format!("{}", outcome.report);
        assert!(text.contains("New faces: 2"));
        assert!(text.contains("Completed: yes"));
    }
}

// src/math/algorithms/smoothing/bezier.rs

use super::traits::{Smoothing, SmoothingConfig};
use crate::math::{
    error::{MathError, MathResult},
    geometry::polygon::{
        MultiPolygon, Polygon, Ring, SegmentId, TaggedSegment, ValidationError, find_intersections,
    },
    types::*,
    utils::constants,
};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Rundet Ecken mit kubischen Bézier-Kurven.
///
/// Jede Ecke `V` (Vorgänger `P`, Nachfolger `N`) wird durch zwei Kurvenstücke
/// ersetzt: vom Anschlusspunkt auf der Kante `P -> V` bis `V` und von `V` bis
/// zum Anschlusspunkt auf der Kante `V -> N`. In `V` verläuft die Kurve parallel
/// zur Sehne `P -> N`, an den Anschlusspunkten tangential zur Kante. Die
/// Anschlusspunkte liegen bei Toleranz 0 in den Kantenmitten, sonst höchstens
/// `tolerance` von der Ecke entfernt.
///
/// Konvexe Ecken wölben sich dadurch nach außen, die geglättete Fläche
/// umschließt dort die ursprüngliche. Erzeugt eine Rundung Überschneidungen,
/// wird ihre Reichweite für die beteiligten Ecken halbiert, bis höchstens
/// `max_refinements` mal; danach bleibt die Ecke spitz.
#[derive(Debug, Clone)]
pub struct BezierSmoother {
    config: SmoothingConfig,
    /// Länge der Kontrollarme relativ zur Reichweite der Rundung.
    pub control_point_ratio: f64,
}

impl Default for BezierSmoother {
    fn default() -> Self {
        Self {
            config: SmoothingConfig::default(),
            control_point_ratio: 1.0 / 3.0,
        }
    }
}

/// Ausgabepunkt; `owner` ist die Ecke, zu der die Strecke *hin zu* diesem
/// Punkt gehört. Geradlinige Verbindungen auf Originalkanten haben keinen.
#[derive(Debug, Clone, Copy)]
struct Emitted {
    point: Point2D,
    owner: Option<usize>,
}

#[derive(Debug, Default)]
struct Emitter {
    out: Vec<Emitted>,
}

impl Emitter {
    fn push(&mut self, point: Point2D, owner: Option<usize>) {
        if self
            .out
            .last()
            .is_some_and(|last| last.point.distance_squared(point) <= constants::EPSILON_SQUARED)
        {
            return;
        }
        self.out.push(Emitted { point, owner });
    }
}

#[derive(Debug, Clone, Copy)]
struct Path<'a> {
    points: &'a [Point2D],
    closed: bool,
}

impl Path<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn prev(&self, i: usize) -> Point2D {
        self.points[(i + self.len() - 1) % self.len()]
    }

    fn next(&self, i: usize) -> Point2D {
        self.points[(i + 1) % self.len()]
    }
}

impl BezierSmoother {
    pub fn new(config: SmoothingConfig) -> MathResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Wird auf [0.05, 0.95] geklemmt.
    pub fn with_control_point_ratio(mut self, ratio: f64) -> Self {
        self.control_point_ratio = ratio.clamp(0.05, 0.95);
        self
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Glättet mit der angegebenen Toleranz statt der konfigurierten.
    pub fn smooth(&self, multi: &MultiPolygon, tolerance: f64) -> MathResult<MultiPolygon> {
        let config = self.config.with_tolerance(tolerance);
        config.validate()?;
        Self {
            config,
            control_point_ratio: self.control_point_ratio,
        }
        .smooth_multi(multi)
    }

    fn scale(&self, level: u32) -> f64 {
        if level > self.config.max_refinements {
            0.0
        } else {
            0.5f64.powi(level as i32)
        }
    }

    /// Wie weit die Rundung einer Ecke entlang der Kante (a, b) reicht.
    fn reach(&self, a: Point2D, b: Point2D) -> f64 {
        let half = a.distance(b) * 0.5;
        if self.config.tolerance > 0.0 {
            self.config.tolerance.min(half)
        } else {
            half
        }
    }

    fn sample_piece(
        &self,
        out: &mut Emitter,
        [p0, p1, p2, p3]: [Point2D; 4],
        owner: usize,
    ) {
        let n = self.config.samples_per_curve;
        for j in 1..n {
            let t = j as f64 / n as f64;
            out.push(cubic_bezier_evaluate(p0, p1, p2, p3, t), Some(owner));
        }
        out.push(p3, Some(owner));
    }

    /// Anschlusspunkt auf `P -> V`, Kurvenstück bis einschließlich `V`.
    fn emit_incoming(&self, out: &mut Emitter, path: &Path, i: usize, scale: f64) {
        let v = path.points[i];
        if scale == 0.0 {
            out.push(v, None);
            return;
        }
        let (p, n) = (path.prev(i), path.next(i));
        let h = self.reach(p, v) * scale;
        let a = v + (p - v).normalize_or_zero() * h;
        let tangent = (n - p).normalize_or_zero();
        let ratio = self.control_point_ratio;

        out.push(a, None);
        self.sample_piece(out, [a, a + (v - a) * ratio, v - tangent * h * ratio, v], i);
    }

    /// Kurvenstück ab `V` bis zum Anschlusspunkt auf `V -> N`.
    fn emit_outgoing(&self, out: &mut Emitter, path: &Path, i: usize, scale: f64) {
        if scale == 0.0 {
            return;
        }
        let v = path.points[i];
        let (p, n) = (path.prev(i), path.next(i));
        let h = self.reach(v, n) * scale;
        let b = v + (n - v).normalize_or_zero() * h;
        let tangent = (n - p).normalize_or_zero();
        let ratio = self.control_point_ratio;

        self.sample_piece(out, [v, v + tangent * h * ratio, b + (v - b) * ratio, b], i);
    }

    /// Geschlossene Pfade beginnen exakt bei `points[0]`, offene behalten beide Endpunkte.
    fn emit(&self, path: &Path, levels: &[u32]) -> Vec<Emitted> {
        let n = path.len();
        let mut out = Emitter::default();

        if path.closed {
            let first_scale = self.scale(levels[0]);
            let first_owner = (first_scale > 0.0).then_some(0);
            out.push(path.points[0], first_owner);
            self.emit_outgoing(&mut out, path, 0, first_scale);
            for i in 1..n {
                let scale = self.scale(levels[i]);
                self.emit_incoming(&mut out, path, i, scale);
                self.emit_outgoing(&mut out, path, i, scale);
            }
            self.emit_incoming(&mut out, path, 0, first_scale);
            // the incoming piece of corner 0 ends on the start point again
            if out.out.len() > 1
                && out.out[out.out.len() - 1]
                    .point
                    .distance_squared(out.out[0].point)
                    <= constants::EPSILON_SQUARED
            {
                out.out.pop();
            }
        } else {
            out.push(path.points[0], None);
            for i in 1..n.saturating_sub(1) {
                let scale = self.scale(levels[i]);
                self.emit_incoming(&mut out, path, i, scale);
                self.emit_outgoing(&mut out, path, i, scale);
            }
            if n > 1 {
                out.push(path.points[n - 1], None);
            }
        }
        out.out
    }

    /// Glättet alle Pfade gemeinsam, so dass sich auch verschiedene Pfade
    /// nicht schneiden.
    fn smooth_paths(&self, paths: &[Path]) -> Vec<Vec<Point2D>> {
        let mut levels: Vec<Vec<u32>> = paths.iter().map(|p| vec![0; p.len()]).collect();
        let mut rounds = 0usize;

        loop {
            let emitted: Vec<Vec<Emitted>> = paths
                .iter()
                .zip(&levels)
                .map(|(path, l)| self.emit(path, l))
                .collect();
            let segments: Vec<TaggedSegment> = emitted
                .iter()
                .zip(paths)
                .enumerate()
                .flat_map(|(ring, (e, path))| tagged_segments(e, ring, path.closed))
                .collect();

            let conflicts = find_intersections(&segments);
            if conflicts.is_empty() {
                debug!(
                    "Smoothing: {} path(s), {} -> {} vertices after {} refinement round(s)",
                    paths.len(),
                    paths.iter().map(Path::len).sum::<usize>(),
                    emitted.iter().map(Vec::len).sum::<usize>(),
                    rounds
                );
                return emitted
                    .into_iter()
                    .map(|e| e.into_iter().map(|x| x.point).collect())
                    .collect();
            }

            let mut blamed: BTreeSet<(usize, usize)> = BTreeSet::new();
            for conflict in &conflicts {
                let (first, second) = match conflict {
                    ValidationError::SelfIntersection { first, second }
                    | ValidationError::FoldBack { first, second } => (first, second),
                };
                for id in [first, second] {
                    if let Some(corner) = segment_owner(&emitted[id.ring], id.index) {
                        if levels[id.ring][corner] <= self.config.max_refinements {
                            blamed.insert((id.ring, corner));
                        }
                    }
                }
            }

            if blamed.is_empty() {
                // Ringe mit unlösbaren Konflikten bleiben spitz, alle anderen geglättet
                let frozen_level = self.config.max_refinements + 1;
                let mut involved: BTreeSet<usize> = BTreeSet::new();
                for conflict in &conflicts {
                    let (first, second) = match conflict {
                        ValidationError::SelfIntersection { first, second }
                        | ValidationError::FoldBack { first, second } => (first, second),
                    };
                    for ring in [first.ring, second.ring] {
                        if levels[ring].iter().any(|&l| l < frozen_level) {
                            involved.insert(ring);
                        }
                    }
                }
                if involved.is_empty() {
                    warn!(
                        "Smoothing left {} intersection(s) between unsmoothed rings",
                        conflicts.len()
                    );
                    return emitted
                        .into_iter()
                        .map(|e| e.into_iter().map(|x| x.point).collect())
                        .collect();
                }
                warn!(
                    "Smoothing: {} ring(s) keep their original vertices after unresolved intersections",
                    involved.len()
                );
                for ring in involved {
                    levels[ring].fill(frozen_level);
                }
                rounds += 1;
                continue;
            }

            for (ring, corner) in blamed {
                levels[ring][corner] += 1;
            }
            rounds += 1;
        }
    }
}

fn tagged_segments(emitted: &[Emitted], ring: usize, closed: bool) -> Vec<TaggedSegment> {
    let m = emitted.len();
    let (count, ring_len) = if closed {
        (m, m)
    } else {
        // one more than the vertex count so the last segment never counts as adjacent to the first
        (m.saturating_sub(1), m + 1)
    };
    (0..count)
        .map(|k| TaggedSegment {
            a: emitted[k].point,
            b: emitted[(k + 1) % m].point,
            id: SegmentId { ring, index: k },
            ring_len,
        })
        .collect()
}

fn segment_owner(emitted: &[Emitted], index: usize) -> Option<usize> {
    emitted
        .get((index + 1) % emitted.len().max(1))
        .and_then(|e| e.owner)
}

fn check_input(points: &[Point2D], is_closed: bool) -> MathResult<()> {
    let needed = if is_closed { 3 } else { 2 };
    if points.len() < needed {
        return Err(MathError::InsufficientData {
            expected: needed,
            actual: points.len(),
        });
    }
    if let Some(i) = points.iter().position(|&p| !is_finite_point(p)) {
        return Err(MathError::invalid(
            "points",
            format!("vertex {} has non-finite coordinates", i),
        ));
    }
    Ok(())
}

impl Smoothing for BezierSmoother {
    fn smooth_points(&self, points: &[Point2D], is_closed: bool) -> MathResult<Vec<Point2D>> {
        check_input(points, is_closed)?;
        let mut result = self.smooth_paths(&[Path {
            points,
            closed: is_closed,
        }]);
        Ok(result.pop().unwrap_or_default())
    }

    fn smooth_polygon(&self, polygon: &Polygon) -> MathResult<Polygon> {
        let mut parts = self.smooth_multi(&MultiPolygon::from(polygon.clone()))?.into_parts();
        parts.pop().ok_or_else(|| MathError::GeometricFailure {
            operation: "smoothing returned no polygon".to_string(),
        })
    }

    /// Alle Ringe aller Teile werden gemeinsam geprüft, damit sich auch
    /// benachbarte Teile und Löcher nach dem Glätten nicht berühren.
    fn smooth_multi(&self, multi: &MultiPolygon) -> MathResult<MultiPolygon> {
        let paths: Vec<Path> = multi
            .iter()
            .flat_map(Polygon::rings)
            .map(|ring| Path {
                points: ring.vertices(),
                closed: true,
            })
            .collect();
        let mut smoothed = self.smooth_paths(&paths).into_iter();

        let mut parts = Vec::with_capacity(multi.len());
        for polygon in multi {
            let exterior = Ring::new(smoothed.next().unwrap_or_default())?;
            let holes = polygon
                .holes()
                .iter()
                .map(|_| Ring::new(smoothed.next().unwrap_or_default()))
                .collect::<MathResult<Vec<_>>>()?;
            parts.push(Polygon::new(exterior, holes));
        }
        Ok(MultiPolygon::new(parts))
    }
}

/// Evaluiert eine kubische Bézier-Kurve am Parameter `t` (auf [0, 1] geklemmt).
pub fn cubic_bezier_evaluate(p0: Point2D, p1: Point2D, p2: Point2D, p3: Point2D, t: f64) -> Point2D {
    let t_clamped = t.clamp(0.0, 1.0);
    let u = 1.0 - t_clamped;
    let uu = u * u;
    let uuu = uu * u;
    let tt = t_clamped * t_clamped;
    let ttt = tt * t_clamped;

    // (1-t)^3 * P0 + 3*(1-t)^2*t * P1 + 3*(1-t)*t^2 * P2 + t^3 * P3
    p0 * uuu + p1 * (3.0 * uu * t_clamped) + p2 * (3.0 * u * tt) + p3 * ttt
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::f64::consts::TAU;

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 2.0),
        ]
    }

    /// U-Form mit schmalem Schlitz; die Rundungen an der Öffnung reichen ohne
    /// Verfeinerung über die gegenüberliegende Schlitzwand.
    fn slotted() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(1.55, 3.0),
            Point2D::new(1.55, 0.5),
            Point2D::new(1.45, 0.5),
            Point2D::new(1.45, 3.0),
            Point2D::new(0.0, 3.0),
        ]
    }

    #[test]
    fn test_cubic_bezier_endpoints() {
        let (a, b, c, d) = (
            Point2D::ZERO,
            Point2D::new(1.0, 2.0),
            Point2D::new(3.0, 2.0),
            Point2D::new(4.0, 0.0),
        );
        assert_eq!(cubic_bezier_evaluate(a, b, c, d, 0.0), a);
        assert_eq!(cubic_bezier_evaluate(a, b, c, d, 1.0), d);
        let mid = cubic_bezier_evaluate(a, b, c, d, 0.5);
        assert_relative_eq!(mid.x, 2.0);
        assert_relative_eq!(mid.y, 1.5);
    }

    #[test]
    fn test_closed_square_keeps_start_and_grows() {
        let smoother = BezierSmoother::default();
        let smoothed = smoother.smooth_points(&square(), true).unwrap();
        assert_eq!(smoothed[0], Point2D::ZERO);
        // 4 corners, 2 pieces each with 8 samples
        assert_eq!(smoothed.len(), 4 * 16);

        let ring = Ring::new(smoothed).unwrap();
        assert!(ring.is_simple());
        assert!(ring.is_ccw());
        assert!(ring.area() > 4.0);
        for &v in &square() {
            assert!(ring.distance_to_point(v) < 1e-9);
        }
        // edge midpoints stay on the ring
        assert!(ring.distance_to_point(Point2D::new(1.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_tolerance_limits_reach() {
        let config = SmoothingConfig::new().with_tolerance(0.1);
        let smoother = BezierSmoother::new(config).unwrap();
        let smoothed = Ring::new(smoother.smooth_points(&square(), true).unwrap()).unwrap();
        let full = Ring::new(
            BezierSmoother::default()
                .smooth_points(&square(), true)
                .unwrap(),
        )
        .unwrap();
        assert!(smoothed.is_simple());
        assert!(smoothed.area() > 4.0);
        assert!(smoothed.area() < full.area());
        // outside the rounded zone the edge is untouched
        assert!(smoothed.contains_point(Point2D::new(1.0, 0.001)));
        assert!(!smoothed.contains_point(Point2D::new(1.0, -0.001)));
    }

    #[test]
    fn test_smooth_with_explicit_tolerance() {
        let multi = MultiPolygon::from(Polygon::from_vertices(square()).unwrap());
        let smoother = BezierSmoother::default();
        let tight = smoother.smooth(&multi, 0.1).unwrap();
        let loose = smoother.smooth(&multi, 0.0).unwrap();
        assert_eq!(loose, smoother.smooth_multi(&multi).unwrap());
        assert!(tight.area() < loose.area());
        assert!(smoother.smooth(&multi, -0.5).is_err());
    }

    #[test]
    fn test_control_point_ratio_is_clamped() {
        let smoother = BezierSmoother::default().with_control_point_ratio(2.0);
        assert_relative_eq!(smoother.control_point_ratio, 0.95);
        let flat = BezierSmoother::default().with_control_point_ratio(0.2);
        let round = BezierSmoother::default().with_control_point_ratio(0.5);
        let flat_area = Ring::new(flat.smooth_points(&square(), true).unwrap())
            .unwrap()
            .area();
        let round_area = Ring::new(round.smooth_points(&square(), true).unwrap())
            .unwrap()
            .area();
        assert!(flat_area > 4.0);
        assert!(round_area > flat_area);
    }

    #[test]
    fn test_random_star_polygons_stay_simple() {
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let n = rng.random_range(3..20);
            // strikt steigende Winkel um den Ursprung ergeben einen einfachen Sternring
            let mut angles: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..TAU)).collect();
            angles.sort_by(f64::total_cmp);
            angles.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
            if angles.len() < 3 {
                continue;
            }
            let star: Vec<Point2D> = angles
                .iter()
                .map(|&a| Point2D::new(a.cos(), a.sin()) * rng.random_range(0.2..5.0))
                .collect();
            let Ok(ring) = Ring::new(star.clone()) else {
                continue;
            };
            if !ring.is_simple() {
                continue;
            }
            let smoothed = Ring::new(BezierSmoother::default().smooth_points(&star, true).unwrap())
                .unwrap();
            assert!(smoothed.is_simple(), "seed {}", seed);
            assert_eq!(smoothed.vertices()[0], star[0]);
        }
    }

    #[test]
    fn test_point_touching_parts_keep_other_parts_smoothed() {
        let lower = Polygon::from_vertices(square()).unwrap();
        let upper = Polygon::from_vertices(
            square()
                .into_iter()
                .map(|p| p + Point2D::new(2.0, 2.0))
                .collect(),
        )
        .unwrap();
        let far = Polygon::from_vertices(
            square()
                .into_iter()
                .map(|p| p + Point2D::new(10.0, 0.0))
                .collect(),
        )
        .unwrap();
        let multi = MultiPolygon::new(vec![lower.clone(), upper.clone(), far]);

        let smoothed = BezierSmoother::default().smooth_multi(&multi).unwrap();
        assert_eq!(smoothed.len(), 3);
        assert_eq!(smoothed.parts()[0], lower);
        assert_eq!(smoothed.parts()[1], upper);
        assert!(smoothed.parts()[2].area() > 4.0);
        assert!(smoothed.parts()[2].exterior().is_simple());
    }

    #[test]
    fn test_narrow_slot_stays_simple() {
        let smoother = BezierSmoother::default();
        let ring = Ring::new(slotted()).unwrap();
        assert!(ring.is_simple());
        let smoothed = Ring::new(smoother.smooth_points(&slotted(), true).unwrap()).unwrap();
        assert!(smoothed.is_simple());
        assert_eq!(smoothed.vertices()[0], Point2D::ZERO);
    }

    #[test]
    fn test_open_path_keeps_endpoints() {
        let path = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(3.0, 1.0),
        ];
        let smoothed = BezierSmoother::default().smooth_points(&path, false).unwrap();
        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
        assert!(smoothed.len() > path.len());
        assert!(smoothed.contains(&Point2D::new(1.0, 1.0)));
    }

    #[test]
    fn test_close_parts_do_not_touch() {
        let left = Polygon::from_vertices(square()).unwrap();
        let right = Polygon::from_vertices(
            square()
                .into_iter()
                .map(|p| p + Point2D::new(2.05, 0.0))
                .collect(),
        )
        .unwrap();
        let multi = MultiPolygon::new(vec![left, right]);
        assert!(multi.is_simple());
        let smoothed = BezierSmoother::default().smooth_multi(&multi).unwrap();
        assert_eq!(smoothed.len(), 2);
        assert!(smoothed.is_simple());
    }

    #[test]
    fn test_polygon_with_hole() {
        let polygon = Polygon::new(
            Ring::new(vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(6.0, 0.0),
                Point2D::new(6.0, 6.0),
                Point2D::new(0.0, 6.0),
            ])
            .unwrap(),
            vec![
                Ring::new(vec![
                    Point2D::new(2.0, 2.0),
                    Point2D::new(2.0, 4.0),
                    Point2D::new(4.0, 4.0),
                    Point2D::new(4.0, 2.0),
                ])
                .unwrap(),
            ],
        );
        let smoothed = BezierSmoother::default().smooth_polygon(&polygon).unwrap();
        assert_eq!(smoothed.holes().len(), 1);
        assert!(MultiPolygon::from(smoothed.clone()).is_simple());
        assert!(!smoothed.contains_point(Point2D::new(3.0, 3.0)));
        assert!(smoothed.contains_point(Point2D::new(1.0, 1.0)));
    }

    #[test]
    fn test_invalid_input() {
        let smoother = BezierSmoother::default();
        assert!(matches!(
            smoother.smooth_points(&square()[..2], true),
            Err(MathError::InsufficientData { expected: 3, .. })
        ));
        assert!(smoother.smooth_points(&[Point2D::ZERO], false).is_err());
        assert!(BezierSmoother::new(SmoothingConfig::new().with_tolerance(-1.0)).is_err());
        assert!(BezierSmoother::new(SmoothingConfig::new().with_samples_per_curve(0)).is_err());
    }
}

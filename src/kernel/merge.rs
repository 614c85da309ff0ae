use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::{KernelError, Result};
use crate::geometry::CurveLoop;
use crate::math::polygon_3d::{point_segment_distance, polygon_area_3d};
use crate::math::{Point3, Vector3};
use crate::topology::{Face, FaceSurface};

use super::polygon::Polygon;

/// Tolerance for grouping coplanar polygons (plane distance comparison).
const COPLANAR_DISTANCE_TOL: f64 = 1e-6;

/// Tolerance for grouping coplanar polygons (normal direction comparison).
const COPLANAR_NORMAL_TOL: f64 = 1e-6;

/// Tolerance for grouping facets of the same cylinder.
const CYLINDER_TOL: f64 = 1e-6;

/// Tolerance for collinearity simplification.
const COLLINEAR_TOL: f64 = 1e-8;

/// Distance under which a vertex is considered to lie on an edge.
const T_JUNCTION_TOL: f64 = 1e-6;

/// Polygons smaller than this are slivers and are dropped.
const MIN_POLYGON_AREA: f64 = 1e-12;

/// Regroups the polygon soup left by a boolean into faces.
///
/// Polygons on the same plane (or the same cylinder) that share edges are
/// merged into one face whose loops are traced from the boundary edges of
/// the group, with the largest loop first.
#[must_use]
pub fn merge_coplanar_polygons(polygons: Vec<Polygon>) -> Vec<Face> {
    let polygons: Vec<Polygon> = polygons
        .into_iter()
        .filter(|p| p.vertices().len() >= 3 && p.area() > MIN_POLYGON_AREA)
        .collect();

    let mut faces = Vec::new();
    for group in group_by_surface(&polygons) {
        let edges = split_group_edges(&group, &polygons);
        for component in find_connected_components(&group, &edges) {
            faces.extend(build_faces(&component, &polygons, &edges));
        }
    }
    faces
}

/// Groups polygon indices by supporting surface.
fn group_by_surface(polygons: &[Polygon]) -> Vec<Vec<usize>> {
    let n = polygons.len();
    let mut visited = vec![false; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut group = vec![i];

        for j in (i + 1)..n {
            if !visited[j] && same_surface(&polygons[i], &polygons[j]) {
                visited[j] = true;
                group.push(j);
            }
        }

        groups.push(group);
    }

    groups
}

fn same_surface(a: &Polygon, b: &Polygon) -> bool {
    match (a.surface(), b.surface()) {
        (None, None) => a
            .plane()
            .is_coincident(b.plane(), COPLANAR_NORMAL_TOL, COPLANAR_DISTANCE_TOL),
        (Some(ca), Some(cb)) => ca.is_same_surface(cb, CYLINDER_TOL),
        _ => false,
    }
}

/// Directed edges of every polygon in the group, subdivided at vertices of
/// other group members that lie on them. Keyed by polygon index.
fn split_group_edges(group: &[usize], polygons: &[Polygon]) -> HashMap<usize, Vec<(Point3, Point3)>> {
    let mut seen = HashSet::new();
    let mut vertices = Vec::new();
    for &idx in group {
        for v in polygons[idx].vertices() {
            if seen.insert(PointKey::from_point(v)) {
                vertices.push(*v);
            }
        }
    }

    let mut result = HashMap::with_capacity(group.len());
    for &idx in group {
        let verts = polygons[idx].vertices();
        let n = verts.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (verts[i], verts[(i + 1) % n]);
            let (ka, kb) = (PointKey::from_point(&a), PointKey::from_point(&b));
            if ka == kb {
                continue;
            }
            let mut inner: Vec<(f64, Point3)> = vertices
                .iter()
                .filter(|v| {
                    let kv = PointKey::from_point(v);
                    kv != ka && kv != kb
                })
                .filter_map(|v| {
                    let (dist, t) = point_segment_distance(v, &a, &b);
                    (dist < T_JUNCTION_TOL && t > 0.0 && t < 1.0).then_some((t, *v))
                })
                .collect();
            inner.sort_by(|x, y| x.0.total_cmp(&y.0));

            let mut start = a;
            for (_, v) in inner {
                edges.push((start, v));
                start = v;
            }
            edges.push((start, b));
        }
        result.insert(idx, edges);
    }
    result
}

/// Finds connected components within a group of polygons on one surface.
///
/// Two polygons are adjacent if one has directed edge (A→B) and the other has (B→A).
fn find_connected_components(
    group: &[usize],
    edges: &HashMap<usize, Vec<(Point3, Point3)>>,
) -> Vec<Vec<usize>> {
    let n = group.len();
    if n <= 1 {
        return vec![group.to_vec()];
    }

    let mut edge_to_polygon: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (local_idx, global_idx) in group.iter().enumerate() {
        for (start, end) in edges.get(global_idx).into_iter().flatten() {
            edge_to_polygon
                .entry(EdgeKey::new(start, end))
                .or_default()
                .push(local_idx);
        }
    }

    let mut adj: Vec<HashSet<usize>> = vec![HashSet::new(); n];
    for (local_idx, global_idx) in group.iter().enumerate() {
        for (start, end) in edges.get(global_idx).into_iter().flatten() {
            if let Some(neighbors) = edge_to_polygon.get(&EdgeKey::new(end, start)) {
                for &neighbor in neighbors {
                    if neighbor != local_idx {
                        adj[local_idx].insert(neighbor);
                        adj[neighbor].insert(local_idx);
                    }
                }
            }
        }
    }

    let mut visited = vec![false; n];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut component = vec![group[start]];
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(curr) = queue.pop_front() {
            for &neighbor in &adj[curr] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    component.push(group[neighbor]);
                    queue.push_back(neighbor);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Builds the face for one connected component. Falls back to one face per
/// polygon when the boundary cannot be traced into closed loops.
fn build_faces(
    component: &[usize],
    polygons: &[Polygon],
    edges: &HashMap<usize, Vec<(Point3, Point3)>>,
) -> Vec<Face> {
    let first = &polygons[component[0]];
    let surface = match first.surface() {
        Some(cylinder) => FaceSurface::Cylinder(cylinder.clone()),
        None => FaceSurface::Plane(first.plane().clone()),
    };
    let members: Vec<Polygon> = component.iter().map(|&i| polygons[i].clone()).collect();

    match trace_loops(component, edges, first.normal(), first.surface().is_none()) {
        Ok(loops) => vec![Face::from_parts(surface, loops, members)],
        Err(err) => {
            debug!(polygons = component.len(), %err, "boundary tracing failed, keeping facets");
            members
                .into_iter()
                .map(|polygon| {
                    let loops = CurveLoop::from_points(polygon.vertices())
                        .map(|l| vec![l])
                        .unwrap_or_default();
                    let surface = match polygon.surface() {
                        Some(cylinder) => FaceSurface::Cylinder(cylinder.clone()),
                        None => FaceSurface::Plane(polygon.plane().clone()),
                    };
                    Face::from_parts(surface, loops, vec![polygon])
                })
                .collect()
        }
    }
}

/// Traces the boundary of a component into closed loops, outer loop first
/// for planar components.
fn trace_loops(
    component: &[usize],
    edges: &HashMap<usize, Vec<(Point3, Point3)>>,
    normal: &Vector3,
    planar: bool,
) -> Result<Vec<CurveLoop>> {
    let mut edge_count: HashMap<EdgeKey, usize> = HashMap::new();
    let mut edge_points: Vec<(EdgeKey, (Point3, Point3))> = Vec::new();

    for idx in component {
        for &(start, end) in edges.get(idx).into_iter().flatten() {
            let key = EdgeKey::new(&start, &end);
            let count = edge_count.entry(key).or_insert(0);
            if *count == 0 {
                edge_points.push((key, (start, end)));
            }
            *count += 1;
        }
    }

    // Boundary edges: those whose reverse does NOT appear
    let boundary_edges: Vec<(Point3, Point3)> = edge_points
        .iter()
        .filter(|(key, _)| {
            let reverse = EdgeKey::new_from_ints(key.end_key, key.start_key);
            !edge_count.contains_key(&reverse)
        })
        .map(|&(_, pts)| pts)
        .collect();

    if boundary_edges.is_empty() {
        return Err(KernelError::InvalidInput("merge produced no boundary edges".into()).into());
    }

    let mut loops = chain_into_loops(&boundary_edges)?;
    if loops.is_empty() {
        return Err(KernelError::InvalidInput("merge produced no loops".into()).into());
    }

    if planar {
        let outer = largest_loop(&loops, normal);
        loops.swap(0, outer);
    }

    loops
        .iter()
        .map(|l| CurveLoop::from_points(&simplify_collinear(l)))
        .collect()
}

/// Chains directed boundary edges into closed loops.
fn chain_into_loops(edges: &[(Point3, Point3)]) -> Result<Vec<Vec<Point3>>> {
    // Build adjacency: start_point → list of (end_point, used_index)
    let mut start_map: HashMap<PointKey, Vec<(usize, Point3)>> = HashMap::new();
    for (i, &(start, end)) in edges.iter().enumerate() {
        let key = PointKey::from_point(&start);
        start_map.entry(key).or_default().push((i, end));
    }

    let mut used = vec![false; edges.len()];
    let mut loops: Vec<Vec<Point3>> = Vec::new();

    for seed_idx in 0..edges.len() {
        if used[seed_idx] {
            continue;
        }

        used[seed_idx] = true;
        let mut chain = vec![edges[seed_idx].0];
        let mut current_end = edges[seed_idx].1;
        let start_key = PointKey::from_point(&edges[seed_idx].0);

        loop {
            let end_key = PointKey::from_point(&current_end);

            if end_key == start_key {
                break;
            }

            chain.push(current_end);

            let next = start_map.get(&end_key).and_then(|candidates| {
                candidates
                    .iter()
                    .find(|&&(idx, _)| !used[idx])
                    .copied()
            });

            match next {
                Some((idx, end_pt)) => {
                    used[idx] = true;
                    current_end = end_pt;
                }
                None => {
                    return Err(KernelError::InvalidInput(
                        "boundary edges do not form a closed loop".into(),
                    )
                    .into());
                }
            }
        }

        if chain.len() >= 3 {
            loops.push(chain);
        }
    }

    Ok(loops)
}

/// Index of the loop with the largest area; that's the outer boundary.
fn largest_loop(loops: &[Vec<Point3>], normal: &Vector3) -> usize {
    let mut max_area = f64::NEG_INFINITY;
    let mut max_idx = 0;
    for (i, loop_pts) in loops.iter().enumerate() {
        let area = polygon_area_3d(loop_pts, normal);
        if area > max_area {
            max_area = area;
            max_idx = i;
        }
    }
    max_idx
}

/// Removes collinear mid-vertices from a polygon loop.
fn simplify_collinear(points: &[Point3]) -> Vec<Point3> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut result: Vec<Point3> = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];

        if !is_collinear(&prev, &curr, &next) {
            result.push(curr);
        }
    }

    if result.len() < 3 {
        return points.to_vec();
    }

    result
}

fn is_collinear(a: &Point3, b: &Point3, c: &Point3) -> bool {
    let cross = (b - a).cross(&(c - a));
    cross.norm_squared() < COLLINEAR_TOL * COLLINEAR_TOL
}

/// Key for hashing directed edges by quantized start/end coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    start_key: (i64, i64, i64),
    end_key: (i64, i64, i64),
}

impl EdgeKey {
    fn new(start: &Point3, end: &Point3) -> Self {
        Self {
            start_key: quantize(start),
            end_key: quantize(end),
        }
    }

    fn new_from_ints(start_key: (i64, i64, i64), end_key: (i64, i64, i64)) -> Self {
        Self { start_key, end_key }
    }
}

/// Key for hashing points by quantized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey {
    x: i64,
    y: i64,
    z: i64,
}

impl PointKey {
    fn from_point(p: &Point3) -> Self {
        let (x, y, z) = quantize(p);
        Self { x, y, z }
    }
}

/// Quantizes a point onto a micro-unit grid for hashing.
#[allow(clippy::cast_possible_truncation)]
fn quantize(p: &Point3) -> (i64, i64, i64) {
    const INV_GRID: f64 = 1e6;
    (
        (p.x * INV_GRID).round() as i64,
        (p.y * INV_GRID).round() as i64,
        (p.z * INV_GRID).round() as i64,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn poly(points: &[Point3]) -> Polygon {
        Polygon::new(points.to_vec(), None).unwrap()
    }

    #[test]
    fn simplify_collinear_removes_mid_vertex() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(4.0, 4.0, 0.0),
            p(0.0, 4.0, 0.0),
        ];
        let simplified = simplify_collinear(&points);
        assert_eq!(simplified.len(), 4);
        assert!(!simplified.iter().any(|p| (p.x - 2.0).abs() < TOLERANCE && p.y.abs() < TOLERANCE));
    }

    #[test]
    fn chain_with_hole_produces_two_loops() {
        let boundary = vec![
            (p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0)),
            (p(10.0, 0.0, 0.0), p(10.0, 10.0, 0.0)),
            (p(10.0, 10.0, 0.0), p(0.0, 10.0, 0.0)),
            (p(0.0, 10.0, 0.0), p(0.0, 0.0, 0.0)),
            (p(3.0, 3.0, 0.0), p(3.0, 7.0, 0.0)),
            (p(3.0, 7.0, 0.0), p(7.0, 7.0, 0.0)),
            (p(7.0, 7.0, 0.0), p(7.0, 3.0, 0.0)),
            (p(7.0, 3.0, 0.0), p(3.0, 3.0, 0.0)),
        ];
        let loops = chain_into_loops(&boundary).unwrap();
        assert_eq!(loops.len(), 2);
    }

    #[test]
    fn open_chain_is_an_error() {
        let boundary = vec![
            (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)),
            (p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)),
        ];
        assert!(chain_into_loops(&boundary).is_err());
    }

    // ── Regrouping ─────────────────────────────────────────────

    #[test]
    fn two_triangles_merge_into_square() {
        let a = poly(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)]);
        let b = poly(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)]);
        let faces = merge_coplanar_polygons(vec![a, b]);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].loops().len(), 1);
        assert_eq!(faces[0].loops()[0].len(), 4);
        assert!((faces[0].area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn t_junction_is_resolved() {
        // One big square on the left, two stacked squares on the right.
        let left = poly(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 2.0, 0.0), p(0.0, 2.0, 0.0)]);
        let low = poly(&[p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(1.0, 1.0, 0.0)]);
        let high = poly(&[p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0), p(2.0, 2.0, 0.0), p(1.0, 2.0, 0.0)]);
        let faces = merge_coplanar_polygons(vec![left, low, high]);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].loops()[0].len(), 4);
        assert!((faces[0].area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ring_keeps_outer_loop_first() {
        // A 3x3 square with the middle cell missing, as eight unit cells.
        let mut cells = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                if i == 1 && j == 1 {
                    continue;
                }
                let (x, y) = (f64::from(i), f64::from(j));
                cells.push(poly(&[
                    p(x, y, 0.0),
                    p(x + 1.0, y, 0.0),
                    p(x + 1.0, y + 1.0, 0.0),
                    p(x, y + 1.0, 0.0),
                ]));
            }
        }
        let faces = merge_coplanar_polygons(cells);
        assert_eq!(faces.len(), 1);
        let loops = faces[0].loops();
        assert_eq!(loops.len(), 2);
        let up = Vector3::new(0.0, 0.0, 1.0);
        assert!((loops[0].signed_area(&up, 1e-3) - 9.0).abs() < 1e-9);
        assert!((loops[1].signed_area(&up, 1e-3) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_coplanar_polygons_stay_separate() {
        let a = poly(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)]);
        let b = poly(&[p(3.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 1.0, 0.0), p(3.0, 1.0, 0.0)]);
        assert_eq!(merge_coplanar_polygons(vec![a, b]).len(), 2);
    }

    #[test]
    fn slivers_are_dropped() {
        let sliver = Polygon::with_plane(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 1e-14, 0.0)],
            crate::geometry::surface::Plane::from_normal(p(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
                .unwrap(),
            None,
        );
        assert!(merge_coplanar_polygons(vec![sliver]).is_empty());
    }
}

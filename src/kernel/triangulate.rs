use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{KernelError, Result};
use crate::geometry::surface::Plane;
use crate::math::polygon_2d::{is_convex_2d, signed_area_2d};
use crate::math::{Point2, Point3};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Splits a planar region bounded by `loops` into convex pieces wound
/// counter-clockwise around the plane normal.
///
/// A single convex loop is returned as-is. Anything else goes through a
/// constrained Delaunay triangulation where regions at odd nesting depth
/// are kept, so hole winding does not matter. Output vertices are the
/// input points, never reprojected.
///
/// # Errors
///
/// Returns [`KernelError::Triangulation`] for loops with fewer than three
/// points, non-finite coordinates or crossing boundaries.
pub fn triangulate(plane: &Plane, loops: &[Vec<Point3>]) -> Result<Vec<Vec<Point3>>> {
    if let [single] = loops {
        let uv: Vec<Point2> = single.iter().map(|p| plane.project(p)).collect();
        if is_convex_2d(&uv) {
            let mut piece = single.clone();
            if signed_area_2d(&uv) < 0.0 {
                piece.reverse();
            }
            return Ok(vec![piece]);
        }
    }

    let mut cdt = Cdt::new();
    let mut positions: HashMap<FixedVertexHandle, Point3> = HashMap::new();
    for points in loops {
        insert_constraint_loop(&mut cdt, plane, points, &mut positions)?;
    }

    let interior = classify_interior_faces(&cdt);

    let mut pieces = Vec::with_capacity(interior.len());
    for face_handle in cdt.inner_faces() {
        if !interior.contains(&face_handle.fix().index()) {
            continue;
        }
        let mut triangle = Vec::with_capacity(3);
        for vh in face_handle.vertices() {
            let p = positions
                .get(&vh.fix())
                .copied()
                .unwrap_or_else(|| plane.evaluate(&Point2::new(vh.position().x, vh.position().y)));
            triangle.push(p);
        }
        pieces.push(triangle);
    }

    if pieces.is_empty() {
        return Err(KernelError::Triangulation("region has no interior".into()).into());
    }
    Ok(pieces)
}

/// Inserts a closed polygon as constraint edges into the CDT.
fn insert_constraint_loop(
    cdt: &mut Cdt,
    plane: &Plane,
    points: &[Point3],
    positions: &mut HashMap<FixedVertexHandle, Point3>,
) -> Result<()> {
    if points.len() < 3 {
        return Err(
            KernelError::Triangulation("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let uv = plane.project(p);
        let h = cdt
            .insert(SpadePoint2::new(uv.x, uv.y))
            .map_err(|e: InsertionError| KernelError::Triangulation(format!("CDT insert: {e}")))?;
        positions.entry(h).or_insert(*p);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(KernelError::Triangulation("loop boundaries cross".into()).into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the region using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            if let Some(inner) = edge.rev().face().as_inner() {
                let idx = inner.fix().index();
                if depth_map.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_map.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            if let Some(inner_neighbor) = edge.rev().face().as_inner() {
                let n_idx = inner_neighbor.fix().index();
                if depth_map.contains_key(&n_idx) {
                    continue;
                }
                let new_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    depth + 1
                } else {
                    depth
                };
                depth_map.insert(n_idx, new_depth);
                if new_depth % 2 == 1 {
                    interior.insert(n_idx);
                }
                queue.push_back((inner_neighbor.fix(), new_depth));
            }
        }
    }

    interior
}

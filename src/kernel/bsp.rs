use crate::error::{KernelError, Result};
use crate::geometry::surface::Plane;

use super::polygon::Polygon;

/// Thickness of a splitting plane. Vertices closer than this are coplanar.
pub const SPLIT_EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// A node of a solid BSP tree.
///
/// Each node owns the polygons lying on its splitting plane; `front` and
/// `back` hold the half-spaces on either side.
#[derive(Debug, Clone, Default)]
pub struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    /// Builds a tree from `polygons`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::RecursionLimit`] if the tree would be deeper
    /// than `max_depth`.
    pub fn from_polygons(polygons: Vec<Polygon>, max_depth: usize) -> Result<Self> {
        let mut node = Self::default();
        node.build(polygons, 0, max_depth)?;
        Ok(node)
    }

    /// Inserts polygons into the tree, creating child nodes as needed.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::RecursionLimit`] past `max_depth`.
    pub fn build(&mut self, polygons: Vec<Polygon>, depth: usize, max_depth: usize) -> Result<()> {
        if polygons.is_empty() {
            return Ok(());
        }
        if depth > max_depth {
            return Err(KernelError::RecursionLimit { max_depth }.into());
        }

        let plane = match &self.plane {
            Some(plane) => plane.clone(),
            None => {
                let plane = polygons[0].plane().clone();
                self.plane = Some(plane.clone());
                plane
            }
        };

        let mut coplanar = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            split_polygon(&plane, polygon, &mut coplanar, &mut Vec::new(), &mut front, &mut back, true);
        }
        self.polygons.extend(coplanar);

        if !front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(front, depth + 1, max_depth)?;
        }
        if !back.is_empty() {
            self.back
                .get_or_insert_with(Box::default)
                .build(back, depth + 1, max_depth)?;
        }
        Ok(())
    }

    /// Converts solid space to empty space and vice versa.
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &self.plane {
            self.plane = Some(plane.flipped());
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    #[must_use]
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };

        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            split_polygon(
                plane,
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
                false,
            );
        }
        front.append(&mut coplanar_front);
        back.append(&mut coplanar_back);

        let mut result = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            result.extend(node.clip_polygons(back));
        }
        result
    }

    /// Removes every polygon of this tree that lies inside `other`.
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// Collects every polygon in the tree.
    #[must_use]
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(front) = &self.front {
            result.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            result.extend(back.all_polygons());
        }
        result
    }
}

/// Splits `polygon` by `plane` into the four output lists.
///
/// With `merge_coplanar`, coplanar polygons of either orientation go to
/// `coplanar_front`.
#[allow(clippy::too_many_arguments)]
fn split_polygon(
    plane: &Plane,
    polygon: Polygon,
    coplanar_front: &mut Vec<Polygon>,
    coplanar_back: &mut Vec<Polygon>,
    front: &mut Vec<Polygon>,
    back: &mut Vec<Polygon>,
    merge_coplanar: bool,
) {
    let distances: Vec<f64> = polygon
        .vertices()
        .iter()
        .map(|v| plane.signed_distance(v))
        .collect();
    let types: Vec<u8> = distances
        .iter()
        .map(|&t| {
            if t < -SPLIT_EPSILON {
                BACK
            } else if t > SPLIT_EPSILON {
                FRONT
            } else {
                COPLANAR
            }
        })
        .collect();
    let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

    match polygon_type {
        COPLANAR => {
            if merge_coplanar || plane.plane_normal().dot(polygon.normal()) > 0.0 {
                coplanar_front.push(polygon);
            } else {
                coplanar_back.push(polygon);
            }
        }
        FRONT => front.push(polygon),
        BACK => back.push(polygon),
        _ => {
            let vertices = polygon.vertices();
            let n = vertices.len();
            let mut f = Vec::with_capacity(n + 1);
            let mut b = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (vertices[i], vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if ti | tj == SPANNING {
                    let t = distances[i] / (distances[i] - distances[j]);
                    let v = vi + (vj - vi) * t;
                    f.push(v);
                    b.push(v);
                }
            }
            if f.len() >= 3 {
                front.push(Polygon::with_plane(
                    f,
                    polygon.plane().clone(),
                    polygon.surface().cloned(),
                ));
            }
            if b.len() >= 3 {
                back.push(Polygon::with_plane(
                    b,
                    polygon.plane().clone(),
                    polygon.surface().cloned(),
                ));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn quad(points: [Point3; 4]) -> Polygon {
        Polygon::new(points.to_vec(), None).unwrap()
    }

    fn ground() -> Plane {
        Plane::from_normal(p(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap()
    }

    #[test]
    fn spanning_polygon_is_split_in_two() {
        let wall = quad([
            p(0.0, 0.0, -1.0),
            p(1.0, 0.0, -1.0),
            p(1.0, 0.0, 1.0),
            p(0.0, 0.0, 1.0),
        ]);
        let (mut cf, mut cb, mut f, mut b) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        split_polygon(&ground(), wall, &mut cf, &mut cb, &mut f, &mut b, false);
        assert!(cf.is_empty() && cb.is_empty());
        assert_eq!(f.len(), 1);
        assert_eq!(b.len(), 1);
        assert!((f[0].area() - 1.0).abs() < 1e-12);
        assert!((b[0].area() - 1.0).abs() < 1e-12);
        assert!(f[0].vertices().iter().all(|v| v.z >= -1e-12));
    }

    #[test]
    fn coplanar_polygons_sort_by_orientation() {
        let up = quad([
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]);
        let mut down = up.clone();
        down.flip();
        let (mut cf, mut cb, mut f, mut b) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        split_polygon(&ground(), up, &mut cf, &mut cb, &mut f, &mut b, false);
        split_polygon(&ground(), down, &mut cf, &mut cb, &mut f, &mut b, false);
        assert_eq!(cf.len(), 1);
        assert_eq!(cb.len(), 1);
    }

    #[test]
    fn depth_limit_is_reported() {
        let layers: Vec<Polygon> = (0..8)
            .map(|i| {
                let z = f64::from(i);
                quad([p(0.0, 0.0, z), p(1.0, 0.0, z), p(1.0, 1.0, z), p(0.0, 1.0, z)])
            })
            .collect();
        assert!(Node::from_polygons(layers.clone(), 16).is_ok());
        let err = Node::from_polygons(layers, 3).unwrap_err();
        assert!(matches!(
            err,
            crate::error::FormworkError::Kernel(KernelError::RecursionLimit { max_depth: 3 })
        ));
    }

    #[test]
    fn invert_swaps_children() {
        let layers: Vec<Polygon> = (0..2)
            .map(|i| {
                let z = f64::from(i);
                quad([p(0.0, 0.0, z), p(1.0, 0.0, z), p(1.0, 1.0, z), p(0.0, 1.0, z)])
            })
            .collect();
        let mut node = Node::from_polygons(layers, 16).unwrap();
        assert!(node.front.is_some() && node.back.is_none());
        node.invert();
        assert!(node.front.is_none() && node.back.is_some());
        assert_eq!(node.all_polygons().len(), 2);
    }
}

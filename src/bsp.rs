//! [BSP](https://en.wikipedia.org/wiki/Binary_space_partitioning) tree node structure and operations.
//!
//! Every traversal here is iterative over an explicit stack with a hard
//! node-visit budget. Exhausting the budget logs a warning and returns the
//! partial result accumulated so far: pathological or garbage input degrades
//! to a best-effort answer instead of a panic or an unbounded recursion.

use crate::plane::Plane;
use crate::polygon::Polygon;
use log::warn;

/// Hard cap on nodes visited by a single traversal.
const TRAVERSAL_BUDGET: usize = 100_000;

/// A BSP tree node, containing polygons plus optional front/back subtrees.
///
/// Each node exclusively owns its children, so `Clone` is a deep clone and the
/// boolean combinators in [`crate::csg`] never mutate caller-owned trees. A
/// node built from an empty polygon list has no plane and is the canonical
/// empty solid.
#[derive(Debug, Clone)]
pub struct Node<S: Clone> {
    /// Splitting plane for this node *or* **None** for the empty solid.
    pub plane: Option<Plane>,

    /// Subtree on the positive side of `plane`.
    pub front: Option<Box<Node<S>>>,

    /// Subtree on the negative side of `plane`.
    pub back: Option<Box<Node<S>>>,

    /// Polygons lying on `plane` itself (after the node has been built).
    pub polygons: Vec<Polygon<S>>,
}

impl<S: Clone + Send + Sync> Default for Node<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync> Node<S> {
    /// Create a new empty BSP node.
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        }
    }

    /// Creates a new BSP node from polygons.
    pub fn from_polygons(polygons: &[Polygon<S>]) -> Self {
        let mut node = Self::new();
        if !polygons.is_empty() {
            node.build(polygons);
        }
        node
    }

    /// Convert solid space to empty space and empty space to solid space.
    ///
    /// Flips every polygon and plane in the tree and swaps the front/back
    /// subtrees. Applying it twice restores the original solid.
    pub fn invert(&mut self) {
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            node.polygons.iter_mut().for_each(|p| p.flip());
            if let Some(ref mut plane) = node.plane {
                plane.flip();
            }

            std::mem::swap(&mut node.front, &mut node.back);

            if let Some(ref mut front) = node.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = node.back {
                stack.push(back.as_mut());
            }
        }
    }

    /// Build a BSP tree out of `polygons`. When called on an existing tree,
    /// the new polygons are filtered down to the bottom of the tree and become
    /// new nodes there.
    ///
    /// A node without a usable plane seeds it from the first polygon (no
    /// heuristic, first polygon wins, matching the splitting order the rest
    /// of the pipeline expects). If that seed plane is itself degenerate the
    /// node simply absorbs everything as coplanar and never splits.
    pub fn build(&mut self, polygons: &[Polygon<S>]) {
        if polygons.is_empty() {
            return;
        }

        let mut visited = 0usize;
        let mut stack = vec![(self, polygons.to_vec())];

        while let Some((node, polys)) = stack.pop() {
            if polys.is_empty() {
                continue;
            }
            visited += 1;
            if visited > TRAVERSAL_BUDGET {
                warn!("bsp build exceeded its traversal budget; keeping partial tree");
                return;
            }

            if node.plane.as_ref().is_none_or(|p| !p.is_valid()) {
                node.plane = Some(polys[0].plane.clone());
            }
            let Some(plane) = node.plane.clone() else {
                continue;
            };

            let mut front = Vec::with_capacity(polys.len() / 2);
            let mut back = Vec::with_capacity(polys.len() / 2);

            for polygon in &polys {
                let (coplanar_front, coplanar_back, mut front_parts, mut back_parts) =
                    plane.split_polygon(polygon);

                node.polygons.extend(coplanar_front);
                node.polygons.extend(coplanar_back);
                front.append(&mut front_parts);
                back.append(&mut back_parts);
            }

            if !front.is_empty() {
                let front_child =
                    node.front.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((front_child.as_mut(), front));
            }
            if !back.is_empty() {
                let back_child = node.back.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((back_child.as_mut(), back));
            }
        }
    }

    /// Recursively remove all polygons in `polygons` that are inside this BSP
    /// tree's solid.
    ///
    /// Front fragments falling off the tree (no front child) are outside the
    /// solid and kept; back fragments falling off the tree are fully inside
    /// and dropped. A node without a valid plane passes its input through
    /// unchanged.
    pub fn clip_polygons(&self, polygons: &[Polygon<S>]) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut visited = 0usize;
        let mut stack = vec![(self, polygons.to_vec())];

        while let Some((node, polys)) = stack.pop() {
            if polys.is_empty() {
                continue;
            }
            visited += 1;
            if visited > TRAVERSAL_BUDGET {
                warn!("bsp clip exceeded its traversal budget; returning partial result");
                result.extend(polys);
                for (_, pending) in stack {
                    result.extend(pending);
                }
                return result;
            }

            let plane = match &node.plane {
                Some(plane) if plane.is_valid() => plane,
                _ => {
                    result.extend(polys);
                    continue;
                },
            };

            let mut front_polys = Vec::with_capacity(polys.len());
            let mut back_polys = Vec::with_capacity(polys.len());

            for polygon in &polys {
                let (coplanar_front, coplanar_back, mut front_parts, mut back_parts) =
                    plane.split_polygon(polygon);

                // Coplanar fragments travel with the side their facing selects.
                front_polys.extend(coplanar_front);
                back_polys.extend(coplanar_back);
                front_polys.append(&mut front_parts);
                back_polys.append(&mut back_parts);
            }

            if let Some(front_node) = node.front.as_deref() {
                stack.push((front_node, front_polys));
            } else {
                result.extend(front_polys);
            }

            if let Some(back_node) = node.back.as_deref() {
                stack.push((back_node, back_polys));
            }
            // No back child: back fragments are inside the solid and vanish.
        }

        result
    }

    /// Remove all polygons in this BSP tree that are inside the other BSP
    /// tree's solid.
    pub fn clip_to(&mut self, bsp: &Node<S>) {
        let mut visited = 0usize;
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            visited += 1;
            if visited > TRAVERSAL_BUDGET {
                warn!("bsp clip_to exceeded its traversal budget; tree partially clipped");
                return;
            }

            node.polygons = bsp.clip_polygons(&node.polygons);

            if let Some(front) = node.front.as_deref_mut() {
                stack.push(front);
            }
            if let Some(back) = node.back.as_deref_mut() {
                stack.push(back);
            }
        }
    }

    /// Return all polygons in this BSP tree.
    pub fn all_polygons(&self) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut visited = 0usize;
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            visited += 1;
            if visited > TRAVERSAL_BUDGET {
                warn!("bsp collection exceeded its traversal budget; returning partial set");
                return result;
            }

            result.extend_from_slice(&node.polygons);

            stack.extend(
                [&node.front, &node.back]
                    .iter()
                    .filter_map(|child| child.as_ref().map(|boxed| boxed.as_ref())),
            );
        }
        result
    }
}

//! Scene-graph models: a flat mesh list plus an arena of transform nodes.

pub mod loader;

use glam::Mat4;

use crate::drawable::Drawable;
use crate::gfx::{BindContext, DrawError};

pub type NodeId = usize;

/// A drawable plus the identity it was loaded under.
pub struct Mesh {
    pub name: String,
    pub drawable: Drawable,
}

impl Mesh {
    pub fn submit(&self, ctx: &mut BindContext<'_, '_>, world: Mat4) -> Result<(), DrawError> {
        self.drawable.draw(ctx, world)
    }
}

/// One transform in the hierarchy. Children are arena indices into
/// [`Model::nodes`], kept in insertion order.
pub struct Node {
    pub name: String,
    pub transform: Mat4,
    pub meshes: Vec<usize>,
    pub children: Vec<NodeId>,
}

/// A loaded model: meshes owned flat, referenced by index from the node tree.
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub roots: Vec<NodeId>,
}

impl Model {
    /// Walks the tree depth-first in insertion order, calling `f` with each
    /// mesh index and its accumulated world transform. A node's meshes are
    /// visited before its children.
    pub fn visit_meshes<F: FnMut(usize, Mat4)>(&self, base: Mat4, mut f: F) {
        for &root in &self.roots {
            self.visit_node(root, base, &mut f);
        }
    }

    fn visit_node<F: FnMut(usize, Mat4)>(&self, id: NodeId, parent: Mat4, f: &mut F) {
        let node = &self.nodes[id];
        let world = parent * node.transform;
        for &mesh in &node.meshes {
            f(mesh, world);
        }
        for &child in &node.children {
            self.visit_node(child, world, f);
        }
    }

    pub fn draw(&self, ctx: &mut BindContext<'_, '_>, base: Mat4) -> Result<(), DrawError> {
        let mut submissions = Vec::new();
        self.visit_meshes(base, |mesh, world| submissions.push((mesh, world)));
        for (mesh, world) in submissions {
            self.meshes[mesh].submit(ctx, world)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use std::f32::consts::FRAC_PI_2;

    fn node(name: &str, transform: Mat4, meshes: Vec<usize>, children: Vec<NodeId>) -> Node {
        Node {
            name: name.into(),
            transform,
            meshes,
            children,
        }
    }

    #[test]
    fn world_transforms_compose_parent_first() {
        // rot X then rot Y then a translation do not commute; the leaf must
        // see root * mid * leaf applied to its local space.
        let root_t = Mat4::from_rotation_x(FRAC_PI_2);
        let mid_t = Mat4::from_rotation_y(FRAC_PI_2);
        let leaf_t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let model = Model {
            meshes: Vec::new(),
            nodes: vec![
                node("root", root_t, vec![], vec![1]),
                node("mid", mid_t, vec![], vec![2]),
                node("leaf", leaf_t, vec![0], vec![]),
            ],
            roots: vec![0],
        };

        let mut seen = Vec::new();
        model.visit_meshes(Mat4::IDENTITY, |mesh, world| seen.push((mesh, world)));

        assert_eq!(seen.len(), 1);
        let (mesh, world) = seen[0];
        assert_eq!(mesh, 0);
        let expected = root_t * mid_t * leaf_t;
        assert!(world.abs_diff_eq(expected, 1e-5));
        let wrong_order = leaf_t * mid_t * root_t;
        assert!(!world.abs_diff_eq(wrong_order, 1e-5));
        // sanity: the composed transform moves the origin somewhere specific
        let origin = world * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let by_hand = root_t * (mid_t * (leaf_t * Vec4::new(0.0, 0.0, 0.0, 1.0)));
        assert!(origin.abs_diff_eq(by_hand, 1e-5));
    }

    #[test]
    fn siblings_are_visited_in_insertion_order_with_own_transforms() {
        let left = Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0));
        let right = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let base = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let model = Model {
            meshes: Vec::new(),
            nodes: vec![
                node("root", Mat4::IDENTITY, vec![], vec![1, 2]),
                node("left", left, vec![0], vec![]),
                node("right", right, vec![1], vec![]),
            ],
            roots: vec![0],
        };

        let mut seen = Vec::new();
        model.visit_meshes(base, |mesh, world| seen.push((mesh, world)));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 0);
        assert_eq!(seen[1].0, 1);
        assert!(seen[0].1.abs_diff_eq(base * left, 1e-5));
        assert!(seen[1].1.abs_diff_eq(base * right, 1e-5));
    }

    #[test]
    fn node_meshes_come_before_child_meshes() {
        let model = Model {
            meshes: Vec::new(),
            nodes: vec![
                node("root", Mat4::IDENTITY, vec![7], vec![1]),
                node("child", Mat4::IDENTITY, vec![3], vec![]),
            ],
            roots: vec![0],
        };
        let mut order = Vec::new();
        model.visit_meshes(Mat4::IDENTITY, |mesh, _| order.push(mesh));
        assert_eq!(order, vec![7, 3]);
    }
}

//! Transform System
//!
//! Propagates world matrices down the scene graph. Kept apart from
//! [`Scene`](super::Scene) so it only borrows the node slot map.
//!
//! Two traversal modes share one recursive function:
//!
//! - **checked**: a node whose local matrix did not change keeps its world
//!   matrix and its children are visited in checked mode again, so static
//!   subtrees cost one flag test per node;
//! - **unconditional**: entered as soon as a node changed; every descendant
//!   recomposes its world matrix from the freshly computed parent.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Checked update from `root`. Returns the number of world matrices recomputed.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) -> usize {
    let parent_world = parent_world_of(nodes, root);
    let mut recomputed = 0;
    update_transform_recursive(nodes, root, parent_world, false, &mut recomputed);
    recomputed
}

/// Unconditional update from `root`, recomputing every world matrix below it.
pub fn update_hierarchy_forced(
    nodes: &mut SlotMap<NodeHandle, Node>,
    root: NodeHandle,
) -> usize {
    let parent_world = parent_world_of(nodes, root);
    let mut recomputed = 0;
    update_transform_recursive(nodes, root, parent_world, true, &mut recomputed);
    recomputed
}

/// Unconditional update of the subtree rooted at `handle`, composed with its
/// parent's current world matrix.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, handle: NodeHandle) -> usize {
    update_hierarchy_forced(nodes, handle)
}

fn parent_world_of(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Option<Affine3A> {
    nodes
        .get(handle)
        .and_then(|node| node.parent)
        .and_then(|parent| nodes.get(parent))
        .map(|parent| *parent.transform.world_matrix())
}

fn update_transform_recursive(
    nodes: &mut SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
    parent_world: Option<Affine3A>,
    unconditional: bool,
    recomputed: &mut usize,
) {
    let (world, children_unconditional, child_count) = {
        let Some(node) = nodes.get_mut(handle) else {
            return;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = unconditional || local_changed;

        if world_needs_update {
            let local = *node.transform.local_matrix();
            let world = match parent_world {
                Some(parent) => parent * local,
                None => local,
            };
            node.transform.set_world_matrix(world);
            *recomputed += 1;
        }

        (
            *node.transform.world_matrix(),
            world_needs_update,
            node.children.len(),
        )
    };

    for i in 0..child_count {
        let child = nodes[handle].children[i];
        update_transform_recursive(nodes, child, Some(world), children_unconditional, recomputed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn chain() -> (SlotMap<NodeHandle, Node>, NodeHandle, NodeHandle) {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();

        let mut parent = Node::new("parent");
        parent.transform.set_position(Vec3::new(1.0, 0.0, 0.0));
        let parent_handle = nodes.insert(parent);

        let mut child = Node::new("child");
        child.transform.set_position(Vec3::new(0.0, 1.0, 0.0));
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);

        nodes[parent_handle].children.push(child_handle);
        (nodes, parent_handle, child_handle)
    }

    #[test]
    fn test_hierarchy_update() {
        let (mut nodes, parent, child) = chain();

        assert_eq!(update_hierarchy(&mut nodes, parent), 2);

        let child_world_pos = nodes[child].transform.world_position();
        assert!((child_world_pos.x - 1.0).abs() < 1e-5);
        assert!((child_world_pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn checked_update_skips_static_tree() {
        let (mut nodes, parent, _) = chain();
        update_hierarchy(&mut nodes, parent);
        assert_eq!(update_hierarchy(&mut nodes, parent), 0);
    }

    #[test]
    fn changed_parent_refreshes_clean_child() {
        let (mut nodes, parent, child) = chain();
        update_hierarchy(&mut nodes, parent);

        nodes[parent].transform.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(!nodes[child].transform.mat_needs_update());
        assert_eq!(update_hierarchy(&mut nodes, parent), 2);
        assert!((nodes[child].transform.world_position().x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn subtree_update_uses_parent_world() {
        let (mut nodes, parent, child) = chain();
        update_hierarchy(&mut nodes, parent);

        nodes[child].transform.set_position(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(update_subtree(&mut nodes, child), 1);
        let pos = nodes[child].transform.world_position();
        assert!((pos - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }
}

//! Cycle guard for tree-shaped master data.
//!
//! The tree is not protected by any persisted constraint. Every reparenting is validated against a snapshot of all
//! nodes read immediately before the write; the traversal is never cached.
use std::collections::HashMap;
use std::collections::HashSet;

use crate::types::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyConflict {
    SelfParent,
    /// The proposed parent is a descendant of the node.
    Cycle,
}

/// All nodes below `root`, at any depth. `root` itself is not included.
pub fn descendants(nodes: &[Node], root: i32) -> HashSet<i32> {
    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    for node in nodes {
        children.entry(node.parent_id).or_default().push(node.id);
    }

    let mut found = HashSet::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        for &child in children.get(&current).map(Vec::as_slice).unwrap_or_default() {
            // `insert` doubles as a visited check, so a corrupted (cyclic) snapshot still terminates.
            if child != root && found.insert(child) {
                stack.push(child);
            }
        }
    }
    found
}

/// Can `node_id` be moved under `proposed_parent`? A parent of 0 (root level) is always acceptable.
pub fn validate_reparent(nodes: &[Node], node_id: i32, proposed_parent: i32) -> Result<(), HierarchyConflict> {
    if proposed_parent == node_id {
        return Err(HierarchyConflict::SelfParent);
    }
    if proposed_parent != 0 && descendants(nodes, node_id).contains(&proposed_parent) {
        return Err(HierarchyConflict::Cycle);
    }
    Ok(())
}

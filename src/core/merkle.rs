use crate::error::Result;
use crate::utils::{canonical_json, sha256_hex};
use serde::Serialize;
use std::collections::HashMap;

/// Binary hash tree committing to an ordered sequence of JSON-serializable
/// items. In this node the items are blocks: each block header carries the
/// root over every block before it.
///
/// Leaf digest = SHA-256 of the item's canonical serialization. Parents hash
/// the concatenation of their children's hex digests; an unpaired node at the
/// end of a layer is hashed alone rather than duplicated or dropped.
///
/// All intermediate nodes are retained, keyed by digest, so membership proofs
/// can be added later without changing the construction.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    nodes: HashMap<String, MerkleNode>,
    root: Option<String>,
}

/// One tree node; children are referenced by their digests.
#[derive(Debug, Clone)]
pub struct MerkleNode {
    hash: String,
    left: Option<String>,
    right: Option<String>,
}

impl MerkleNode {
    pub fn get_hash(&self) -> &str {
        &self.hash
    }

    pub fn get_left(&self) -> Option<&str> {
        self.left.as_deref()
    }

    pub fn get_right(&self) -> Option<&str> {
        self.right.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl MerkleTree {
    /// Build the tree over `items` in order. An empty sequence has no root;
    /// a single item's root is its leaf digest with no combination step.
    pub fn build<T: Serialize>(items: &[T]) -> Result<MerkleTree> {
        let mut nodes = HashMap::new();
        let mut layer = Vec::with_capacity(items.len());
        for item in items {
            let leaf = sha256_hex(canonical_json(item)?.as_bytes());
            nodes.insert(
                leaf.clone(),
                MerkleNode {
                    hash: leaf.clone(),
                    left: None,
                    right: None,
                },
            );
            layer.push(leaf);
        }

        while layer.len() > 1 {
            let mut next = Vec::with_capacity(layer.len().div_ceil(2));
            for pair in layer.chunks(2) {
                let parent_hash = match pair {
                    [left, right] => sha256_hex(format!("{left}{right}").as_bytes()),
                    // Odd node at the end of the layer: hashed alone
                    [single] => sha256_hex(single.as_bytes()),
                    _ => unreachable!("chunks(2) yields one- or two-element slices"),
                };
                nodes.insert(
                    parent_hash.clone(),
                    MerkleNode {
                        hash: parent_hash.clone(),
                        left: Some(pair[0].clone()),
                        right: pair.get(1).cloned(),
                    },
                );
                next.push(parent_hash);
            }
            layer = next;
        }

        Ok(MerkleTree {
            nodes,
            root: layer.into_iter().next(),
        })
    }

    /// Convenience for callers that only need the root digest.
    pub fn root_of<T: Serialize>(items: &[T]) -> Result<Option<String>> {
        Ok(MerkleTree::build(items)?.root.clone())
    }

    pub fn get_root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn get_node(&self, digest: &str) -> Option<&MerkleNode> {
        self.nodes.get(digest)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sequence_has_no_root() {
        let items: Vec<String> = vec![];
        let tree = MerkleTree::build(&items).unwrap();
        assert!(tree.get_root().is_none());
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_single_item_root_is_leaf_digest() {
        let items = vec!["a".to_string()];
        let tree = MerkleTree::build(&items).unwrap();

        let leaf = sha256_hex(canonical_json(&items[0]).unwrap().as_bytes());
        assert_eq!(tree.get_root(), Some(leaf.as_str()));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_root_is_deterministic() {
        let items: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let root_1 = MerkleTree::root_of(&items).unwrap();
        let root_2 = MerkleTree::root_of(&items).unwrap();
        assert_eq!(root_1, root_2);
        assert!(root_1.is_some());
    }

    #[test]
    fn test_root_is_order_sensitive() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let permuted: Vec<String> = ["b", "a", "c"].iter().map(|s| s.to_string()).collect();

        assert_ne!(
            MerkleTree::root_of(&items).unwrap(),
            MerkleTree::root_of(&permuted).unwrap()
        );
    }

    #[test]
    fn test_two_items_root_combines_leaves() {
        let items: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let tree = MerkleTree::build(&items).unwrap();

        let leaf_a = sha256_hex(canonical_json(&items[0]).unwrap().as_bytes());
        let leaf_b = sha256_hex(canonical_json(&items[1]).unwrap().as_bytes());
        let expected = sha256_hex(format!("{leaf_a}{leaf_b}").as_bytes());
        assert_eq!(tree.get_root(), Some(expected.as_str()));
    }

    #[test]
    fn test_odd_trailing_node_hashed_alone() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let tree = MerkleTree::build(&items).unwrap();

        let leaf_a = sha256_hex(canonical_json(&items[0]).unwrap().as_bytes());
        let leaf_b = sha256_hex(canonical_json(&items[1]).unwrap().as_bytes());
        let leaf_c = sha256_hex(canonical_json(&items[2]).unwrap().as_bytes());
        let parent_ab = sha256_hex(format!("{leaf_a}{leaf_b}").as_bytes());
        let parent_c = sha256_hex(leaf_c.as_bytes());
        let expected_root = sha256_hex(format!("{parent_ab}{parent_c}").as_bytes());

        assert_eq!(tree.get_root(), Some(expected_root.as_str()));
        // 3 leaves, 2 inner nodes, 1 root all retained
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_intermediate_nodes_are_linked() {
        let items: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let tree = MerkleTree::build(&items).unwrap();

        let root = tree.get_node(tree.get_root().unwrap()).unwrap();
        assert!(!root.is_leaf());

        let left = tree.get_node(root.get_left().unwrap()).unwrap();
        let leaf = tree.get_node(left.get_left().unwrap()).unwrap();
        assert!(leaf.is_leaf());
    }
}

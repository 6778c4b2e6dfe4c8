//! Lineage tree models produced by the traceability view.

use std::mem;

use serde::Serialize;

use super::{Stage, Token, TokenId, Transfer, TransferId};

/// Why a branch or record is missing from a lineage tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Omission {
    /// The ledger reported the id as unknown.
    NotFound,
    /// The ledger read failed; absence is not verified.
    ReadFailure { cause: String },
}

/// A child token whose branch could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmittedBranch {
    pub token_id: TokenId,
    pub reason: Omission,
}

/// A transfer that could not be read while indexing histories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmittedRead {
    pub transfer_id: TransferId,
    pub reason: Omission,
}

/// A token with its depth, transfer history and derived tokens.
///
/// Comparison and serialization recurse once per level. Dropping a whole
/// [`LineageTree`] does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageNode {
    pub token: Token,
    /// Derivation steps from the root raw material.
    pub depth: u32,
    pub stage: Stage,
    /// Transfers of this token, in ledger order.
    pub transfers: Vec<Transfer>,
    /// Tokens derived from this one, in ledger order.
    pub children: Vec<LineageNode>,
    /// Children that are known to exist but could not be built.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub omitted: Vec<OmittedBranch>,
}

impl LineageNode {
    pub fn new(token: Token, depth: u32, transfers: Vec<Transfer>) -> Self {
        Self {
            token,
            depth,
            stage: Stage::from_depth(depth),
            transfers,
            children: Vec::new(),
            omitted: Vec::new(),
        }
    }

    /// Pre-order traversal of this node and all its descendants.
    pub fn iter(&self) -> LineageIter<'_> {
        LineageIter { stack: vec![self] }
    }

    /// Find the node for a token anywhere in this subtree.
    pub fn find(&self, token_id: TokenId) -> Option<&LineageNode> {
        self.iter().find(|node| node.token.id == token_id)
    }

    /// Ids of the direct children, in order.
    pub fn child_ids(&self) -> Vec<TokenId> {
        self.children.iter().map(|c| c.token.id).collect()
    }
}

/// Pre-order iterator over a lineage subtree.
pub struct LineageIter<'a> {
    stack: Vec<&'a LineageNode>,
}

impl<'a> Iterator for LineageIter<'a> {
    type Item = &'a LineageNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Result of a lineage build: the tree plus what could not be verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageTree {
    pub root: LineageNode,
    /// Number of tokens in the tree.
    pub token_count: usize,
    /// Number of transfers attached across all nodes.
    pub transfer_count: usize,
    /// Deepest depth present in the tree.
    pub max_depth: u32,
    /// Transfers whose read failed; node histories may be incomplete.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unread_transfers: Vec<OmittedRead>,
}

impl LineageTree {
    pub fn new(root: LineageNode, unread_transfers: Vec<OmittedRead>) -> Self {
        let (token_count, transfer_count, max_depth) =
            root.iter().fold((0, 0, 0), |(tokens, transfers, depth), node| {
                (
                    tokens + 1,
                    transfers + node.transfers.len(),
                    depth.max(node.depth),
                )
            });

        Self {
            root,
            token_count,
            transfer_count,
            max_depth,
            unread_transfers,
        }
    }

    /// Whether every branch and transfer was read successfully.
    pub fn is_complete(&self) -> bool {
        self.unread_transfers.is_empty() && self.root.iter().all(|n| n.omitted.is_empty())
    }
}

impl Drop for LineageTree {
    // Unlinks nodes level by level so long chains don't recurse in drop.
    fn drop(&mut self) {
        let mut stack = mem::take(&mut self.root.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

//! Lineage service: reconstructs token provenance trees from the ledger.
//!
//! A build reads the target token, walks its parent chain for the depth,
//! indexes every transfer by token and every known token by parent once,
//! then descends through the children with constant-time index lookups.
//! The descent keeps its open nodes on an explicit stack, so chain length
//! is bounded by memory rather than by the call stack.

use std::collections::{HashMap, HashSet};
use std::mem;

use crate::error::AppError;
use crate::di::FromContext;
use crate::models::{LineageNode, LineageTree, Omission, OmittedBranch, Token, TokenId, Transfer};
use crate::repositories::{TokenRepository, TransferRepository};

/// Service for token lineage: depth, origin chains and derivation trees.
#[derive(FromContext, Clone)]
pub struct LineageService {
    token_repo: TokenRepository,
    transfer_repo: TransferRepository,
}

impl LineageService {
    /// Depth of a token: derivation steps from its root raw material.
    pub async fn token_level(&self, token_id: TokenId) -> Result<u32, AppError> {
        let token = self.token_repo.get(token_id).await?;
        let ancestors = self.ancestors(&token, &HashMap::new()).await?;
        Ok(depth_of(&ancestors))
    }

    /// Ancestry chain from the root raw material down to the token itself.
    pub async fn trace_origin(&self, token_id: TokenId) -> Result<Vec<Token>, AppError> {
        tracing::debug!(token_id, "Tracing token origin");

        let token = self.token_repo.get(token_id).await?;
        let mut chain = self.ancestors(&token, &HashMap::new()).await?;
        chain.reverse();
        chain.push(token);
        Ok(chain)
    }

    /// Load the full token set, then build the lineage tree for `target_id`.
    pub async fn trace(&self, target_id: TokenId) -> Result<LineageTree, AppError> {
        let all_tokens = self.token_repo.load_all().await?;
        self.build_lineage_tree(target_id, &all_tokens).await
    }

    /// Build the lineage tree rooted at `target_id`.
    ///
    /// `all_tokens` is the caller's already-materialized token set; children
    /// are discovered from it, never by re-listing the ledger. Each node's
    /// token is still read fresh from the ledger. A child that fails to read
    /// or no longer resolves is left out and recorded in its parent's
    /// `omitted`; the rest of the tree is still returned.
    pub async fn build_lineage_tree(
        &self,
        target_id: TokenId,
        all_tokens: &[Token],
    ) -> Result<LineageTree, AppError> {
        tracing::info!(
            token_id = target_id,
            known_tokens = all_tokens.len(),
            "Building lineage tree"
        );

        let root = self.token_repo.get(target_id).await?;

        let known = token_index(all_tokens);
        let depth = depth_of(&self.ancestors(&root, &known).await?);

        let (transfers, unread_transfers) = self.transfer_repo.scan().await?.index_by_token();

        let mut build = TreeBuild {
            token_repo: &self.token_repo,
            children: child_index(all_tokens),
            transfers,
            visited: HashSet::from([target_id]),
        };
        let root = build.descend(root, depth).await?;
        let tree = LineageTree::new(root, unread_transfers);

        tracing::info!(
            token_id = target_id,
            tokens = tree.token_count,
            transfers = tree.transfer_count,
            max_depth = tree.max_depth,
            complete = tree.is_complete(),
            "Lineage tree built"
        );
        Ok(tree)
    }

    /// Ancestors of a token, nearest first.
    ///
    /// Parents are taken from `known` when present and read from the ledger
    /// otherwise. Fails with `CycleDetected` if the chain revisits a token.
    async fn ancestors(
        &self,
        token: &Token,
        known: &HashMap<TokenId, &Token>,
    ) -> Result<Vec<Token>, AppError> {
        let mut chain: Vec<Token> = Vec::new();
        let mut visited = HashSet::from([token.id]);
        let mut path = vec![token.id];
        let mut child_id = token.id;
        let mut next = token.parent();

        while let Some(parent_id) = next {
            path.push(parent_id);
            if !visited.insert(parent_id) {
                return Err(AppError::CycleDetected {
                    token_id: token.id,
                    path,
                });
            }

            let parent = match known.get(&parent_id) {
                Some(&parent) => parent.clone(),
                None => self
                    .token_repo
                    .find_by_id(parent_id)
                    .await?
                    .ok_or(AppError::DanglingParent {
                        token_id: child_id,
                        parent_id,
                    })?,
            };

            child_id = parent.id;
            next = parent.parent();
            chain.push(parent);
        }

        Ok(chain)
    }
}

fn depth_of(ancestors: &[Token]) -> u32 {
    u32::try_from(ancestors.len()).unwrap_or(u32::MAX)
}

/// Token lookup by id. The first occurrence wins.
fn token_index(tokens: &[Token]) -> HashMap<TokenId, &Token> {
    let mut index = HashMap::with_capacity(tokens.len());
    for token in tokens {
        index.entry(token.id).or_insert(token);
    }
    index
}

/// Child ids by parent id, in the order the tokens were given.
fn child_index(tokens: &[Token]) -> HashMap<TokenId, Vec<TokenId>> {
    let mut seen = HashSet::with_capacity(tokens.len());
    let mut index: HashMap<TokenId, Vec<TokenId>> = HashMap::new();

    for token in tokens {
        if !seen.insert(token.id) {
            tracing::warn!(token_id = token.id, "Duplicate token in working set, ignoring");
            continue;
        }
        if let Some(parent_id) = token.parent() {
            index.entry(parent_id).or_default().push(token.id);
        }
    }

    index
}

/// Per-call state of a tree build.
struct TreeBuild<'a> {
    token_repo: &'a TokenRepository,
    children: HashMap<TokenId, Vec<TokenId>>,
    transfers: HashMap<TokenId, Vec<Transfer>>,
    visited: HashSet<TokenId>,
}

/// A node under construction and the children it has yet to visit.
struct Frame {
    node: LineageNode,
    pending: std::vec::IntoIter<TokenId>,
}

impl TreeBuild<'_> {
    fn open(&mut self, token: Token, depth: u32) -> Frame {
        let transfers = self.transfers.remove(&token.id).unwrap_or_default();
        let pending = self.children.remove(&token.id).unwrap_or_default();
        Frame {
            node: LineageNode::new(token, depth, transfers),
            pending: pending.into_iter(),
        }
    }

    /// Depth-first build. `current` is the deepest open node and `open`
    /// holds its ancestors, root first.
    async fn descend(&mut self, root: Token, depth: u32) -> Result<LineageNode, AppError> {
        let mut current = self.open(root, depth);
        let mut open: Vec<Frame> = Vec::new();

        loop {
            let Some(child_id) = current.pending.next() else {
                match open.pop() {
                    Some(mut parent) => {
                        parent.node.children.push(current.node);
                        current = parent;
                        continue;
                    }
                    None => return Ok(current.node),
                }
            };

            let parent_id = current.node.token.id;
            if !self.visited.insert(child_id) {
                let mut path: Vec<TokenId> = open.iter().map(|f| f.node.token.id).collect();
                path.extend([parent_id, child_id]);
                return Err(AppError::CycleDetected {
                    token_id: child_id,
                    path,
                });
            }

            match self.token_repo.find_by_id(child_id).await {
                Ok(Some(child)) => {
                    let child = self.open(child, current.node.depth + 1);
                    open.push(mem::replace(&mut current, child));
                }
                Ok(None) => {
                    tracing::warn!(
                        parent_id,
                        token_id = child_id,
                        "Child token no longer resolves, omitting branch"
                    );
                    current.node.omitted.push(OmittedBranch {
                        token_id: child_id,
                        reason: Omission::NotFound,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        parent_id,
                        token_id = child_id,
                        error = %e,
                        "Failed to read child token, omitting branch"
                    );
                    current.node.omitted.push(OmittedBranch {
                        token_id: child_id,
                        reason: Omission::ReadFailure {
                            cause: e.to_string(),
                        },
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::di::FromRef;
    use crate::ledger::backends::snapshot::LedgerSnapshot;
    use crate::models::{Stage, TransferId, TransferStatus};
    use crate::testing::{
        context_for, cotton_context, cotton_snapshot, token, transfer, FlakyLedger, FACTORY,
        PRODUCER, RETAILER,
    };

    fn service(ctx: &crate::context::Context) -> LineageService {
        LineageService::from_ref(ctx)
    }

    fn transfer_ids(node: &LineageNode) -> Vec<TransferId> {
        node.transfers.iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn test_cotton_to_tshirt_scenario() {
        let ctx = context_for(LedgerSnapshot {
            tokens: vec![
                token(1, 0, "Raw Cotton", PRODUCER),
                token(2, 1, "Cotton Fabric", FACTORY),
                token(3, 2, "T-Shirt", RETAILER),
            ],
            transfers: vec![
                transfer(10, 1, 500, TransferStatus::Accepted, PRODUCER, FACTORY),
                transfer(11, 2, 200, TransferStatus::Pending, FACTORY, RETAILER),
            ],
        });

        let tree = service(&ctx).trace(1).await.unwrap();
        let root = &tree.root;
        assert_eq!(root.token.id, 1);
        assert_eq!(root.depth, 0);
        assert_eq!(transfer_ids(root), vec![10]);
        assert_eq!(root.child_ids(), vec![2]);

        let fabric = &root.children[0];
        assert_eq!(fabric.depth, 1);
        assert_eq!(transfer_ids(fabric), vec![11]);
        assert_eq!(fabric.child_ids(), vec![3]);

        let shirt = &fabric.children[0];
        assert_eq!(shirt.token.name, "T-Shirt");
        assert_eq!(shirt.depth, 2);
        assert_eq!(shirt.stage, Stage::FinalProduct);
        assert!(shirt.transfers.is_empty());
        assert!(shirt.children.is_empty());

        assert_eq!(tree.token_count, 3);
        assert_eq!(tree.transfer_count, 2);
        assert_eq!(tree.max_depth, 2);
        assert!(tree.is_complete());
    }

    #[tokio::test]
    async fn test_subtree_root_keeps_absolute_depth() {
        let tree = service(&cotton_context()).trace(2).await.unwrap();
        assert_eq!(tree.root.token.id, 2);
        assert_eq!(tree.root.depth, 1);
        assert_eq!(tree.root.stage, Stage::Processed);
        assert_eq!(tree.root.children[0].depth, 2);
    }

    #[tokio::test]
    async fn test_children_in_ledger_order_exactly_once() {
        let mut snapshot = cotton_snapshot();
        snapshot.tokens.push(token(5, 1, "Cotton Yarn", FACTORY));
        snapshot.tokens.push(token(6, 1, "Cotton Batting", FACTORY));
        let ctx = context_for(snapshot);

        let tree = service(&ctx).trace(1).await.unwrap();
        assert_eq!(tree.root.child_ids(), vec![2, 5, 6]);

        let mut ids: Vec<TokenId> = tree.root.iter().map(|n| n.token.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 5, 6]);
    }

    #[tokio::test]
    async fn test_every_node_gets_exactly_its_transfers() {
        let tree = service(&cotton_context()).trace(1).await.unwrap();
        for node in tree.root.iter() {
            assert!(node.transfers.iter().all(|t| t.token_id == node.token.id));
        }
        assert_eq!(transfer_ids(&tree.root), vec![10, 12]);
        assert_eq!(tree.transfer_count, 3);
    }

    #[tokio::test]
    async fn test_depth_matches_parent_chain() {
        let svc = service(&cotton_context());
        let tree = svc.trace(1).await.unwrap();
        for node in tree.root.iter() {
            assert_eq!(svc.token_level(node.token.id).await.unwrap(), node.depth);
            for child in &node.children {
                assert_eq!(child.depth, node.depth + 1);
            }
        }
        assert_eq!(svc.token_level(4).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_builds_are_idempotent() {
        let svc = service(&cotton_context());
        let first = svc.trace(1).await.unwrap();
        let second = svc.trace(1).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let svc = service(&cotton_context());
        let all = TokenRepository::from_ref(&cotton_context())
            .load_all()
            .await
            .unwrap();
        assert!(matches!(
            svc.build_lineage_tree(999_999, &all).await,
            Err(AppError::TokenNotFound(999_999))
        ));
        assert!(matches!(
            svc.build_lineage_tree(0, &all).await,
            Err(AppError::TokenNotFound(0))
        ));
    }

    #[tokio::test]
    async fn test_children_come_from_supplied_set() {
        let svc = service(&cotton_context());
        let partial = vec![token(1, 0, "Raw Cotton", PRODUCER)];
        let tree = svc.build_lineage_tree(1, &partial).await.unwrap();
        assert!(tree.root.children.is_empty());
        assert_eq!(tree.token_count, 1);
    }

    #[tokio::test]
    async fn test_failed_child_read_omits_only_that_branch() {
        let mut snapshot = cotton_snapshot();
        snapshot.tokens.push(token(5, 1, "Cotton Yarn", FACTORY));
        let ctx = FlakyLedger::new(snapshot).failing_tokens([2]).into_context();
        let svc = service(&ctx);

        // Working set loaded while the ledger was healthy.
        let mut all = cotton_snapshot().tokens;
        all.push(token(5, 1, "Cotton Yarn", FACTORY));

        let tree = svc.build_lineage_tree(1, &all).await.unwrap();
        assert_eq!(tree.root.child_ids(), vec![5]);
        assert_eq!(tree.root.omitted.len(), 1);
        assert_eq!(tree.root.omitted[0].token_id, 2);
        assert!(matches!(
            tree.root.omitted[0].reason,
            Omission::ReadFailure { .. }
        ));
        assert!(tree.root.find(3).is_none());
        assert!(!tree.is_complete());
    }

    #[tokio::test]
    async fn test_vanished_child_is_recorded_not_found() {
        let ctx = cotton_context();
        let mut all = cotton_snapshot().tokens;
        all.push(token(9, 3, "Ghost Label", RETAILER));

        let tree = service(&ctx).build_lineage_tree(1, &all).await.unwrap();
        let shirt = tree.root.find(3).unwrap();
        assert!(shirt.children.is_empty());
        assert_eq!(
            shirt.omitted,
            vec![OmittedBranch {
                token_id: 9,
                reason: Omission::NotFound
            }]
        );
    }

    #[tokio::test]
    async fn test_unreadable_transfer_is_reported() {
        let ctx = FlakyLedger::cotton().failing_transfers([12]).into_context();
        let tree = service(&ctx).trace(1).await.unwrap();
        assert_eq!(transfer_ids(&tree.root), vec![10]);
        assert_eq!(tree.unread_transfers.len(), 1);
        assert_eq!(tree.unread_transfers[0].transfer_id, 12);
    }

    #[tokio::test]
    async fn test_transfer_listing_failure_aborts_build() {
        let ctx = FlakyLedger::cotton().failing_transfer_listing().into_context();
        assert!(matches!(
            service(&ctx).trace(1).await,
            Err(AppError::LedgerRead(_))
        ));
    }

    #[tokio::test]
    async fn test_root_read_failure_is_distinguishable() {
        let ctx = FlakyLedger::cotton().failing_tokens([2]).into_context();
        let all = cotton_snapshot().tokens;
        assert!(matches!(
            service(&ctx).build_lineage_tree(2, &all).await,
            Err(AppError::LedgerRead(_))
        ));
    }

    #[tokio::test]
    async fn test_each_record_read_once_per_build() {
        let ledger = FlakyLedger::cotton();
        let (token_reads, transfer_reads) = ledger.counters();
        let ctx = ledger.into_context();
        let all = cotton_snapshot().tokens;

        service(&ctx).build_lineage_tree(1, &all).await.unwrap();
        // One read per tree node, one per transfer.
        assert_eq!(token_reads.load(Ordering::SeqCst), 3);
        assert_eq!(transfer_reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_parent_cycle_is_detected() {
        let ctx = context_for(LedgerSnapshot {
            tokens: vec![
                token(1, 2, "Loop A", PRODUCER),
                token(2, 1, "Loop B", FACTORY),
            ],
            transfers: vec![],
        });
        let svc = service(&ctx);

        match svc.trace(1).await {
            Err(AppError::CycleDetected { token_id, path }) => {
                assert_eq!(token_id, 1);
                assert_eq!(path, vec![1, 2, 1]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
        assert!(matches!(
            svc.token_level(2).await,
            Err(AppError::CycleDetected { .. })
        ));
    }

    #[tokio::test]
    async fn test_cycle_in_working_set_is_detected_during_descent() {
        // The ledger is a clean chain, but the caller's token set loops 1 -> 2 -> 1.
        let ctx = context_for(LedgerSnapshot {
            tokens: vec![
                token(1, 0, "Raw Cotton", PRODUCER),
                token(2, 1, "Cotton Fabric", FACTORY),
            ],
            transfers: vec![],
        });
        let all = vec![
            token(1, 2, "Raw Cotton", PRODUCER),
            token(2, 1, "Cotton Fabric", FACTORY),
        ];

        match service(&ctx).build_lineage_tree(1, &all).await {
            Err(AppError::CycleDetected { token_id, path }) => {
                assert_eq!(token_id, 1);
                assert_eq!(path, vec![1, 2, 1]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_long_chain_builds_without_deep_recursion() {
        const LEN: u64 = 5_000;
        let tokens = (1..=LEN)
            .map(|id| token(id, id - 1, "Batch", FACTORY))
            .collect();
        let ctx = context_for(LedgerSnapshot {
            tokens,
            transfers: vec![],
        });
        let svc = service(&ctx);

        let tree = svc.trace(1).await.unwrap();
        assert_eq!(tree.token_count, LEN as usize);
        assert_eq!(tree.max_depth, (LEN - 1) as u32);
        assert!(tree.is_complete());

        assert_eq!(svc.token_level(LEN).await.unwrap(), (LEN - 1) as u32);
    }

    #[tokio::test]
    async fn test_self_parent_is_a_cycle() {
        let ctx = context_for(LedgerSnapshot {
            tokens: vec![token(7, 7, "Ouroboros", PRODUCER)],
            transfers: vec![],
        });
        assert!(matches!(
            service(&ctx).trace_origin(7).await,
            Err(AppError::CycleDetected { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_parent_is_dangling() {
        let ctx = context_for(LedgerSnapshot {
            tokens: vec![token(5, 42, "Orphan", FACTORY)],
            transfers: vec![],
        });
        assert!(matches!(
            service(&ctx).token_level(5).await,
            Err(AppError::DanglingParent {
                token_id: 5,
                parent_id: 42
            })
        ));
    }

    #[tokio::test]
    async fn test_trace_origin_runs_root_first() {
        let chain = service(&cotton_context()).trace_origin(3).await.unwrap();
        let ids: Vec<TokenId> = chain.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_duplicate_working_set_entries_are_ignored() {
        let mut all = cotton_snapshot().tokens;
        all.push(token(2, 1, "Cotton Fabric", FACTORY));
        let tree = service(&cotton_context())
            .build_lineage_tree(1, &all)
            .await
            .unwrap();
        assert_eq!(tree.root.child_ids(), vec![2]);
        assert_eq!(tree.token_count, 3);
    }
}

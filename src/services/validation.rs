//! Validation service for checking ledger integrity.
//!
//! The contract only lets a token be derived from an existing one, so a
//! healthy ledger is a forest. These checks report where a snapshot breaks
//! that assumption before a lineage build trips over it.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::AppError;
use crate::di::FromContext;
use crate::models::{Omission, Token, TokenId, TransferId};
use crate::repositories::{TokenRepository, TransferRepository};

/// Kind of integrity problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A token's parent id resolves to no token.
    DanglingParent,
    /// A token sits on a parent-pointer cycle.
    ParentCycle,
    /// A transfer references a token that does not exist.
    UnknownToken,
    /// A listed transfer could not be read.
    UnreadTransfer,
}

/// A single integrity problem.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<TransferId>,
    /// Description of the issue.
    pub issue: String,
}

/// Result of a full ledger check.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub tokens_checked: usize,
    pub transfers_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Service for validating ledger integrity.
#[derive(FromContext, Clone)]
pub struct ValidationService {
    token_repo: TokenRepository,
    transfer_repo: TransferRepository,
}

impl ValidationService {
    /// Run every check over the current ledger state.
    pub async fn validate(&self) -> Result<ValidationReport, AppError> {
        let tokens = self.token_repo.load_all().await?;
        let scan = self.transfer_repo.scan().await?;
        let by_id: HashMap<TokenId, &Token> = tokens.iter().map(|t| (t.id, t)).collect();

        let mut issues = Vec::new();

        for token in &tokens {
            if let Some(parent_id) = token.parent() {
                if !by_id.contains_key(&parent_id) {
                    issues.push(ValidationIssue {
                        kind: IssueKind::DanglingParent,
                        token_id: Some(token.id),
                        transfer_id: None,
                        issue: format!("parent {} does not exist", parent_id),
                    });
                }
            }
        }

        let order: Vec<TokenId> = tokens.iter().map(|t| t.id).collect();
        for cycle in find_cycles(&by_id, &order) {
            issues.push(ValidationIssue {
                kind: IssueKind::ParentCycle,
                token_id: cycle.first().copied(),
                transfer_id: None,
                issue: format!("parent chain loops through {:?}", cycle),
            });
        }

        for transfer in &scan.transfers {
            if !by_id.contains_key(&transfer.token_id) {
                issues.push(ValidationIssue {
                    kind: IssueKind::UnknownToken,
                    token_id: Some(transfer.token_id),
                    transfer_id: Some(transfer.id),
                    issue: format!("token {} does not exist", transfer.token_id),
                });
            }
        }

        for unread in &scan.unread {
            let issue = match &unread.reason {
                Omission::NotFound => "listed but not found".to_string(),
                Omission::ReadFailure { cause } => cause.clone(),
            };
            issues.push(ValidationIssue {
                kind: IssueKind::UnreadTransfer,
                token_id: None,
                transfer_id: Some(unread.transfer_id),
                issue,
            });
        }

        tracing::info!(
            tokens = tokens.len(),
            transfers = scan.transfers.len(),
            issues = issues.len(),
            "Ledger validation complete"
        );

        Ok(ValidationReport {
            tokens_checked: tokens.len(),
            transfers_checked: scan.transfers.len() + scan.unread.len(),
            issues,
        })
    }
}

/// Every parent-pointer cycle, each reported once, starting from the
/// first member met in `order`.
fn find_cycles(tokens: &HashMap<TokenId, &Token>, order: &[TokenId]) -> Vec<Vec<TokenId>> {
    let mut settled: HashSet<TokenId> = HashSet::new();
    let mut cycles = Vec::new();

    for &start in order {
        let mut path: Vec<TokenId> = Vec::new();
        let mut on_path: HashSet<TokenId> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if settled.contains(&id) {
                break;
            }
            if !on_path.insert(id) {
                if let Some(pos) = path.iter().position(|&p| p == id) {
                    cycles.push(path[pos..].to_vec());
                }
                break;
            }
            path.push(id);
            current = tokens.get(&id).and_then(|t| t.parent());
        }

        settled.extend(path);
    }

    cycles
}

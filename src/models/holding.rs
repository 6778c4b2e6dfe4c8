//! Account holdings derived from token supplies and settled transfers.

use std::collections::HashMap;

use serde::Serialize;

use super::{Address, OmittedRead, Token, TokenId, Transfer, TransferStatus};

/// A token an account holds, with its balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub token: Token,
    pub balance: u64,
}

/// Everything an account holds.
///
/// Balances are only as complete as the transfer scan they were derived
/// from; transfers listed in `unread` were not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountHoldings {
    pub account: Address,
    pub holdings: Vec<Holding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unread: Vec<OmittedRead>,
}

impl AccountHoldings {
    /// Derive an account's balances.
    ///
    /// The creator of a token starts with its whole supply. Accepted
    /// transfers then move `amount` from sender to recipient; pending and
    /// rejected ones move nothing. Tokens are returned in the order given,
    /// keeping only those with a positive balance.
    pub fn derive(
        account: Address,
        tokens: Vec<Token>,
        transfers: &[Transfer],
        unread: Vec<OmittedRead>,
    ) -> Self {
        let mut balances: HashMap<TokenId, i128> = HashMap::new();

        for token in &tokens {
            if token.creator.same_account(&account) {
                *balances.entry(token.id).or_default() += i128::from(token.total_supply);
            }
        }

        for transfer in transfers {
            if transfer.status != TransferStatus::Accepted {
                continue;
            }
            let amount = i128::from(transfer.amount);
            if transfer.from.same_account(&account) {
                *balances.entry(transfer.token_id).or_default() -= amount;
            }
            if transfer.to.same_account(&account) {
                *balances.entry(transfer.token_id).or_default() += amount;
            }
        }

        let holdings = tokens
            .into_iter()
            .filter_map(|token| {
                let balance = balances.get(&token.id).copied().unwrap_or_default();
                if balance < 0 {
                    tracing::warn!(
                        token_id = token.id,
                        account = %account.short(),
                        balance = %balance,
                        "Account sent more than it received, ignoring balance"
                    );
                }
                u64::try_from(balance)
                    .ok()
                    .filter(|&b| b > 0)
                    .map(|balance| Holding { token, balance })
            })
            .collect();

        Self {
            account,
            holdings,
            unread,
        }
    }
}

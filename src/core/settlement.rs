//! Greedy debt netting.
//!
//! Creditors and debtors are each sorted by the size of their position, largest
//! first, and matched pairwise with two cursors. Every step settles at least
//! one side completely, so a group with `c` creditors and `d` debtors needs at
//! most `c + d - 1` transfers. This is an approximation: it does not search for
//! the true minimum number of transfers.

use crate::core::balances::Balances;
use crate::core::constants::SETTLEMENT_EPSILON;
use crate::core::models::settlement::Transfer;
use tracing::debug;

/// Turns a balance map into transfers that bring every balance to zero.
///
/// Positive balances are owed money, negative balances owe money. Balances
/// within [`SETTLEMENT_EPSILON`] of zero are ignored. The sort is stable, so
/// members with equal positions keep the order of `balances`, and the same
/// input always yields the same list.
pub fn plan_settlements(balances: &Balances) -> Vec<Transfer> {
    let mut creditors: Vec<(&str, f64)> = balances
        .iter()
        .filter(|(_, bal)| **bal > SETTLEMENT_EPSILON)
        .map(|(user, bal)| (user.as_str(), *bal))
        .collect();
    let mut debtors: Vec<(&str, f64)> = balances
        .iter()
        .filter(|(_, bal)| **bal < -SETTLEMENT_EPSILON)
        .map(|(user, bal)| (user.as_str(), -*bal))
        .collect();

    creditors.sort_by(|a, b| b.1.total_cmp(&a.1));
    debtors.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut transfers = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));
    let mut i = 0;
    let mut j = 0;

    while i < creditors.len() && j < debtors.len() {
        let (creditor_id, credit) = creditors[i];
        let (debtor_id, debt) = debtors[j];

        let amount = credit.min(debt);
        if amount > SETTLEMENT_EPSILON {
            transfers.push(Transfer {
                from: debtor_id.to_string(),
                to: creditor_id.to_string(),
                amount,
            });
        }

        creditors[i].1 = credit - amount;
        debtors[j].1 = debt - amount;

        if creditors[i].1 < SETTLEMENT_EPSILON {
            i += 1;
        }
        if debtors[j].1 < SETTLEMENT_EPSILON {
            j += 1;
        }
    }

    debug!("Planned {} transfers: {:?}", transfers.len(), transfers);
    transfers
}

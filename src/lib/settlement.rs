use im::Vector;

use crate::error::LedgerError;
use crate::ledger::check_conservation;
use crate::types::{Members, MonetaryAmount, SettlementTransaction};

/// Greedy first-available matching of debtors to creditors.
///
/// Creditors and debtors are taken in member order. Each step pays off as much as possible
/// between the first debtor and the first creditor; whoever still has a remainder stays at the
/// front for the next step. The result zeroes every balance but is not guaranteed to use the
/// fewest transactions.
pub fn plan_settlement(members: &Members) -> Result<Vec<SettlementTransaction>, LedgerError> {
    check_conservation(members)?;

    let mut creditors: Vector<(String, MonetaryAmount)> = Vector::new();
    let mut debtors: Vector<(String, MonetaryAmount)> = Vector::new();
    for m in members.iter() {
        if m.balance.is_positive() {
            creditors.push_back((m.name.clone(), m.balance));
        } else if m.balance.is_negative() {
            debtors.push_back((m.name.clone(), -m.balance));
        }
    }

    let mut transactions = Vec::new();
    while let (Some((creditor, credit)), Some((debtor, debt))) =
        (creditors.front().cloned(), debtors.front().cloned())
    {
        creditors.pop_front();
        debtors.pop_front();

        let amount = credit.min(debt);
        if credit > amount {
            creditors.push_front((creditor.clone(), credit - amount));
        }
        if debt > amount {
            debtors.push_front((debtor.clone(), debt - amount));
        }
        transactions.push(SettlementTransaction {
            debtor,
            creditor,
            amount,
        });
    }

    if !creditors.is_empty() || !debtors.is_empty() {
        return Err(LedgerError::InvariantViolation(format!(
            "{} creditors and {} debtors left unsettled",
            creditors.len(),
            debtors.len()
        )));
    }
    tracing::debug!(count = transactions.len(), "settlement planned");
    Ok(transactions)
}

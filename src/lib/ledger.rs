//! Balance ledger: posts expenses onto member balances and keeps them summing to zero.
use crate::error::LedgerError;
use crate::types::{Members, MonetaryAmount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Posting {
    Apply,
    Reverse,
}

impl Posting {
    fn signed(self, amount: MonetaryAmount) -> MonetaryAmount {
        match self {
            Posting::Apply => amount,
            Posting::Reverse => -amount,
        }
    }
}

/// Splits `amount` into one share per participant.
///
/// Every share is `amount / n` rounded down to the cent; the leftover cents go one each to the
/// first participants, so the shares always add up to exactly `amount`.
pub fn split_shares<'a>(
    amount: MonetaryAmount,
    participants: &'a [String],
) -> Result<Vec<(&'a str, MonetaryAmount)>, LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::validation(
            "amount",
            format!("{amount} must be positive"),
        ));
    }
    if participants.is_empty() {
        return Err(LedgerError::validation(
            "participants",
            "at least one participant is required",
        ));
    }

    let base = amount.divide_floor(participants.len());
    let mut leftover = amount
        - participants
            .iter()
            .map(|_| base)
            .sum::<MonetaryAmount>();

    Ok(participants
        .iter()
        .map(|name| {
            let share = if leftover.is_positive() {
                leftover = leftover - MonetaryAmount::CENT;
                base + MonetaryAmount::CENT
            } else {
                base
            };
            (name.as_str(), share)
        })
        .collect())
}

fn post(
    members: &Members,
    payer: &str,
    participants: &[String],
    amount: MonetaryAmount,
    posting: Posting,
) -> Result<Members, LedgerError> {
    let shares = split_shares(amount, participants)?;
    if !members.contains(payer) {
        return Err(LedgerError::MemberNotFound(payer.to_string()));
    }
    tracing::debug!(?posting, payer, %amount, ?shares, "posting expense");

    shares
        .into_iter()
        .try_fold(members.clone(), |acc, (name, share)| {
            shift_balance(&acc, name, |b| b.checked_sub(posting.signed(share)))
        })
        .and_then(|acc| shift_balance(&acc, payer, |b| b.checked_add(posting.signed(amount))))
}

// `f` returns `None` when the new balance does not fit in a `Decimal`.
fn shift_balance<F>(members: &Members, name: &str, f: F) -> Result<Members, LedgerError>
where
    F: FnOnce(MonetaryAmount) -> Option<MonetaryAmount>,
{
    let balance = members
        .get(name)
        .ok_or_else(|| LedgerError::MemberNotFound(name.to_string()))?;
    let updated = f(balance).ok_or_else(|| {
        tracing::warn!(member = name, %balance, "balance out of range");
        LedgerError::validation("amount", format!("balance of '{name}' would be too large"))
    })?;
    members
        .map_balance(name, |_| updated)
        .ok_or_else(|| LedgerError::MemberNotFound(name.to_string()))
}

/// Debits each participant their share and credits the payer the full amount.
///
/// The payer only pays a share if they are listed among the participants.
pub fn apply_expense(
    members: &Members,
    payer: &str,
    participants: &[String],
    amount: MonetaryAmount,
) -> Result<Members, LedgerError> {
    post(members, payer, participants, amount, Posting::Apply)
}

/// Exact inverse of [`apply_expense`] for the same arguments.
pub fn reverse_expense(
    members: &Members,
    payer: &str,
    participants: &[String],
    amount: MonetaryAmount,
) -> Result<Members, LedgerError> {
    post(members, payer, participants, amount, Posting::Reverse)
}

pub fn check_conservation(members: &Members) -> Result<(), LedgerError> {
    let total = members.total();
    if total.is_zero() {
        Ok(())
    } else {
        tracing::error!(%total, "member balances do not sum to zero");
        Err(LedgerError::InvariantViolation(format!(
            "member balances sum to {total}"
        )))
    }
}

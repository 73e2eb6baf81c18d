//! Expense journal: validates requests and produces the next households snapshot.
//!
//! Nothing here mutates its input. Every operation returns a new [`Households`] value, so a
//! failed check leaves the caller's snapshot exactly as it was.
use crate::error::LedgerError;
use crate::ledger::{apply_expense, check_conservation, reverse_expense};
use crate::types::{
    ExpenseDraft, ExpenseRecord, Household, HouseholdSummary, Households, Members, MonetaryAmount,
};
use crate::utils::{dedup_trimmed, PushImmut, RemoveImmut};

fn require_household<'a>(
    households: &'a Households,
    name: &str,
) -> Result<&'a Household, LedgerError> {
    households
        .get(name)
        .ok_or_else(|| LedgerError::HouseholdNotFound(name.to_string()))
}

/// Checks conservation and that every expense only names current members.
pub fn check_invariants(household: &Household) -> Result<(), LedgerError> {
    check_conservation(&household.members)?;

    let stray = household
        .expenses
        .iter()
        .flat_map(|e| std::iter::once(&e.payer).chain(e.participants.iter()))
        .find(|name| !household.members.contains(name));
    match stray {
        Some(name) => {
            tracing::error!(member = %name, "expense references unknown member");
            Err(LedgerError::InvariantViolation(format!(
                "expense references unknown member '{name}'"
            )))
        }
        None => Ok(()),
    }
}

pub fn create_household<S: AsRef<str>>(
    households: &Households,
    name: &str,
    members: &[S],
) -> Result<(Households, HouseholdSummary), LedgerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("household_name", "is required"));
    }

    let trimmed: Vec<&str> = members
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
        .collect();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(
            "friends",
            "at least one member is required",
        ));
    }
    let unique = dedup_trimmed(&trimmed);
    if unique.len() != trimmed.len() {
        return Err(LedgerError::validation(
            "friends",
            "member names must be unique",
        ));
    }

    if households.contains_key(name) {
        return Err(LedgerError::HouseholdExists(name.to_string()));
    }

    let household = Household::new(Members::with_names(unique.iter().cloned()));
    tracing::info!(household = name, members = unique.len(), "household created");
    Ok((
        households.update(name.to_string(), household),
        HouseholdSummary {
            name: name.to_string(),
            members: unique,
        },
    ))
}

/// Validates `draft` against the household and appends it.
///
/// Checks run in a fixed order and the first failure is reported: household, payer,
/// participants, amount. Participant names are trimmed and repeats dropped, so listing a
/// member twice charges them once.
pub fn add_expense(
    households: &Households,
    household_name: &str,
    draft: &ExpenseDraft,
) -> Result<(Households, ExpenseRecord), LedgerError> {
    let household = require_household(households, household_name)?;

    let payer = draft.payer.trim();
    if payer.is_empty() {
        return Err(LedgerError::validation("payer", "is required"));
    }
    if !household.members.contains(payer) {
        return Err(LedgerError::MemberNotFound(payer.to_string()));
    }

    let participants = dedup_trimmed(&draft.participants);
    if participants.is_empty() {
        return Err(LedgerError::validation(
            "participants",
            "at least one participant is required",
        ));
    }
    if let Some(stranger) = participants
        .iter()
        .find(|p| !household.members.contains(p))
    {
        return Err(LedgerError::validation(
            "participants",
            format!("'{stranger}' is not in the household"),
        ));
    }

    let amount = MonetaryAmount::parse(&draft.amount)?;
    if !amount.is_positive() {
        return Err(LedgerError::validation(
            "amount",
            format!("{amount} must be positive"),
        ));
    }

    let record = ExpenseRecord {
        payer: payer.to_string(),
        description: draft.description.trim().to_string(),
        amount,
        participants,
    };
    let members = apply_expense(
        &household.members,
        &record.payer,
        &record.participants,
        record.amount,
    )?;
    let next = household
        .map_members(|_| members)
        .map_expenses(|e| e.push(record.clone()));
    check_invariants(&next)?;

    tracing::info!(
        household = household_name,
        payer = %record.payer,
        amount = %record.amount,
        participants = record.participants.len(),
        "expense added"
    );
    Ok((households.update(household_name.to_string(), next), record))
}

/// Removes the expense at `index` and reverses its balance changes using the stored record.
pub fn delete_expense(
    households: &Households,
    household_name: &str,
    index: usize,
) -> Result<(Households, ExpenseRecord), LedgerError> {
    let household = require_household(households, household_name)?;
    let (expenses, record) = household
        .expenses
        .remove_idx(index)
        .ok_or(LedgerError::ExpenseNotFound(index))?;

    let members = reverse_expense(
        &household.members,
        &record.payer,
        &record.participants,
        record.amount,
    )?;
    let next = household.map_members(|_| members).map_expenses(|_| expenses);
    check_invariants(&next)?;

    tracing::info!(
        household = household_name,
        index,
        amount = %record.amount,
        "expense deleted"
    );
    Ok((households.update(household_name.to_string(), next), record))
}

#[cfg(test)]
mod tests {
    use im::OrdMap;

    use super::{add_expense, check_invariants, create_household, delete_expense};
    use crate::error::{ErrorKind, LedgerError};
    use crate::types::{ExpenseDraft, Household, Households, Members, MonetaryAmount};

    fn draft(payer: &str, amount: &str, participants: &[&str]) -> ExpenseDraft {
        ExpenseDraft {
            payer: payer.to_string(),
            description: "  groceries ".to_string(),
            amount: amount.to_string(),
            participants: participants.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn roomies() -> Households {
        let (households, _) =
            create_household(&OrdMap::new(), "Roomies", &["Alice", "Bob", "Cara"]).unwrap();
        households
    }

    fn balances(households: &Households) -> Vec<MonetaryAmount> {
        households["Roomies"]
            .members
            .iter()
            .map(|m| m.balance)
            .collect()
    }

    #[test]
    fn add_updates_balances_and_appends_record() {
        let (households, record) = add_expense(
            &roomies(),
            "Roomies",
            &draft("Alice", "30", &["Alice", "Bob", "Cara"]),
        )
        .unwrap();

        assert_eq!(
            balances(&households),
            vec![
                MonetaryAmount::from_cents(2000),
                MonetaryAmount::from_cents(-1000),
                MonetaryAmount::from_cents(-1000),
            ]
        );
        assert_eq!(record.description, "groceries");
        assert_eq!(households["Roomies"].expenses.len(), 1);
        assert_eq!(households["Roomies"].expenses[0], record);
    }

    #[test]
    fn delete_restores_balances_and_journal() {
        let before = roomies();
        let (added, _) = add_expense(
            &before,
            "Roomies",
            &draft("Alice", "30", &["Alice", "Bob", "Cara"]),
        )
        .unwrap();
        let (after, removed) = delete_expense(&added, "Roomies", 0).unwrap();

        assert_eq!(after, before);
        assert_eq!(removed.amount, MonetaryAmount::from_cents(3000));
    }

    #[test]
    fn delete_out_of_range_is_not_found() {
        let (households, _) =
            add_expense(&roomies(), "Roomies", &draft("Alice", "30", &["Bob"])).unwrap();
        let (households, _) =
            add_expense(&households, "Roomies", &draft("Bob", "12", &["Cara"])).unwrap();

        let err = delete_expense(&households, "Roomies", 5).unwrap_err();
        assert_eq!(err, LedgerError::ExpenseNotFound(5));
        assert_eq!(households["Roomies"].expenses.len(), 2);
    }

    #[test]
    fn deleting_twice_reports_not_found() {
        let (households, _) =
            add_expense(&roomies(), "Roomies", &draft("Alice", "30", &["Bob"])).unwrap();
        let (households, _) = delete_expense(&households, "Roomies", 0).unwrap();
        let err = delete_expense(&households, "Roomies", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn validation_order_reports_first_failure() {
        let households = roomies();

        let err = add_expense(&households, "Nowhere", &draft("Dave", "0", &[])).unwrap_err();
        assert_eq!(err, LedgerError::HouseholdNotFound("Nowhere".into()));

        let err = add_expense(&households, "Roomies", &draft("Dave", "0", &[])).unwrap_err();
        assert_eq!(err, LedgerError::MemberNotFound("Dave".into()));

        let err =
            add_expense(&households, "Roomies", &draft("Alice", "0", &["Dave"])).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation {
                field: "participants",
                ..
            }
        ));

        let err =
            add_expense(&households, "Roomies", &draft("Alice", "0", &["Bob"])).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { field: "amount", .. }));
    }

    #[test]
    fn non_numeric_and_missing_fields_are_validation_errors() {
        let households = roomies();
        for bad in [
            draft("Alice", "lots", &["Bob"]),
            draft("Alice", "", &["Bob"]),
            draft("Alice", "-5", &["Bob"]),
            draft("  ", "5", &["Bob"]),
            draft("Alice", "5", &[]),
        ] {
            let err = add_expense(&households, "Roomies", &bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{bad:?}");
        }
    }

    #[test]
    fn repeated_participant_is_charged_once() {
        let (households, record) = add_expense(
            &roomies(),
            "Roomies",
            &draft("Alice", "10", &["Bob", " Bob", "Cara"]),
        )
        .unwrap();

        assert_eq!(record.participants, vec!["Bob".to_string(), "Cara".to_string()]);
        assert_eq!(
            balances(&households),
            vec![
                MonetaryAmount::from_cents(1000),
                MonetaryAmount::from_cents(-500),
                MonetaryAmount::from_cents(-500),
            ]
        );
    }

    #[test]
    fn balances_sum_to_zero_through_a_sequence_of_operations() {
        let steps: Vec<(&str, &str, Vec<&str>)> = vec![
            ("Alice", "10", vec!["Alice", "Bob", "Cara"]),
            ("Bob", "7.01", vec!["Cara", "Alice"]),
            ("Cara", "0.05", vec!["Alice", "Bob", "Cara"]),
            ("Alice", "99.99", vec!["Bob"]),
            ("Bob", "33.33", vec!["Alice", "Bob", "Cara"]),
        ];

        let mut snapshots = vec![roomies()];
        for (payer, amount, participants) in &steps {
            let current = snapshots.last().unwrap();
            let (next, _) =
                add_expense(current, "Roomies", &draft(payer, amount, participants)).unwrap();
            assert!(next["Roomies"].members.total().is_zero());
            snapshots.push(next);
        }

        // deleting from the middle keeps the books balanced too
        let mut households = snapshots.pop().unwrap();
        for index in [2, 0, 1, 0, 0] {
            let (next, _) = delete_expense(&households, "Roomies", index).unwrap();
            check_invariants(&next["Roomies"]).unwrap();
            households = next;
        }
        assert_eq!(households, roomies());
    }

    #[test]
    fn create_household_validates_input() {
        let households = roomies();

        let err = create_household(&households, "Roomies", &["Dan"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = create_household::<&str>(&households, "Flat", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = create_household(&households, "Flat", &["  ", ""]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = create_household(&households, "Flat", &["Dan", " Dan "]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = create_household(&households, " ", &["Dan"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn create_household_trims_member_names() {
        let (households, summary) =
            create_household(&OrdMap::new(), " Flat ", &[" Dan", "Eve "]).unwrap();

        assert_eq!(summary.name, "Flat");
        assert_eq!(summary.members, vec!["Dan".to_string(), "Eve".to_string()]);
        assert_eq!(
            households["Flat"],
            Household::new(Members::with_names(["Dan", "Eve"]))
        );
    }

    #[test]
    fn stray_member_in_journal_is_an_invariant_violation() {
        let (households, _) =
            add_expense(&roomies(), "Roomies", &draft("Alice", "30", &["Bob"])).unwrap();
        let broken = households["Roomies"].map_members(|_| Members::with_names(["Alice"]));

        let err = check_invariants(&broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}

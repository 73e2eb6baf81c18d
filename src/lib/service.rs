use std::sync::Mutex;

use crate::error::{Error, LedgerError, StoreError};
use crate::journal;
use crate::member_view::for_member;
use crate::settlement::plan_settlement;
use crate::storage::Store;
use crate::types::{
    BalanceReport, ExpenseDraft, ExpenseRecord, Household, HouseholdSummary, Households,
    MemberReport,
};
use crate::utils::LastN;

pub const DEFAULT_RECENT_EXPENSES: usize = 20;

/// Runs engine operations against a [`Store`].
///
/// Writes hold a process-wide lock from load to save so two concurrent requests can never
/// interleave their read-modify-write cycles. Reports are computed from a snapshot after the
/// lock is released.
pub struct HouseholdService<S> {
    store: S,
    lock: Mutex<()>,
    recent_expenses: usize,
}

impl<S: Store> HouseholdService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            recent_expenses: DEFAULT_RECENT_EXPENSES,
        }
    }

    /// How many of the latest expenses a [`BalanceReport`] carries.
    pub fn with_recent_expenses(self, recent_expenses: usize) -> Self {
        Self {
            recent_expenses,
            ..self
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn snapshot(&self) -> Result<Households, Error> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.store.load()?)
    }

    fn mutate<T, F>(&self, op: &'static str, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Households) -> Result<(Households, T), LedgerError>,
    {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let households = self.store.load()?;
        let (next, output) = f(&households).map_err(|e| {
            tracing::warn!(op, error = %e, "request rejected");
            e
        })?;
        self.store.save(&next).map_err(|e| {
            tracing::error!(op, error = %e, "failed to save households");
            e
        })?;
        Ok(output)
    }

    pub fn list_households(&self) -> Result<Vec<HouseholdSummary>, Error> {
        Ok(self
            .snapshot()?
            .iter()
            .map(|(name, household)| HouseholdSummary {
                name: name.clone(),
                members: household.members.names(),
            })
            .collect())
    }

    pub fn create_household<M: AsRef<str>>(
        &self,
        name: &str,
        members: &[M],
    ) -> Result<HouseholdSummary, Error> {
        self.mutate("create_household", |households| {
            journal::create_household(households, name, members)
        })
    }

    pub fn add_expense(&self, household: &str, draft: &ExpenseDraft) -> Result<ExpenseRecord, Error> {
        self.mutate("add_expense", |households| {
            journal::add_expense(households, household, draft)
        })
    }

    pub fn delete_expense(&self, household: &str, index: usize) -> Result<ExpenseRecord, Error> {
        self.mutate("delete_expense", |households| {
            journal::delete_expense(households, household, index)
        })
    }

    fn household(&self, name: &str) -> Result<Household, Error> {
        self.snapshot()?
            .get(name)
            .cloned()
            .ok_or_else(|| LedgerError::HouseholdNotFound(name.to_string()).into())
    }

    pub fn balances(&self, name: &str) -> Result<BalanceReport, Error> {
        let household = self.household(name)?;
        Ok(BalanceReport {
            household: name.to_string(),
            balances: household.members.iter().cloned().collect(),
            transactions: plan_settlement(&household.members)?,
            recent_expenses: household.expenses.last_n(self.recent_expenses),
        })
    }

    pub fn member_balances(&self, name: &str, member: &str) -> Result<MemberReport, Error> {
        let household = self.household(name)?;
        if !household.members.contains(member) {
            return Err(LedgerError::MemberNotFound(member.to_string()).into());
        }
        let transactions = plan_settlement(&household.members)?;
        Ok(for_member(&transactions, member))
    }
}

use std::{
    fmt,
    ops::{Add, Neg, Sub},
};

use im::{OrdMap, Vector};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Signed money amount held at cent precision.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonetaryAmount(Decimal);

impl MonetaryAmount {
    pub const ZERO: MonetaryAmount = MonetaryAmount(Decimal::ZERO);
    pub const CENT: MonetaryAmount = MonetaryAmount(Decimal::from_parts(1, 0, 0, false, 2));

    // Decimal keeps a sign on zero results; fold those into a plain zero.
    fn canonical(value: Decimal) -> Self {
        if value.is_zero() {
            Self::ZERO
        } else {
            Self(value)
        }
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Largest amount a single expense may carry (one quadrillion).
    pub const MAX: MonetaryAmount =
        MonetaryAmount(Decimal::from_parts(1_569_325_056, 23_283_064, 0, false, 2));

    /// Parses user input such as `"30"`, `" 12.5 "` or `"-4.20"`.
    ///
    /// Rejects anything that is not a number, that carries more than two decimal places or
    /// whose magnitude exceeds [`MonetaryAmount::MAX`]. Input is never rounded.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::validation("amount", "is required"));
        }
        let sub_cent = || {
            LedgerError::validation(
                "amount",
                format!("'{trimmed}' has more than two decimal places"),
            )
        };

        let value = match Decimal::from_str_exact(trimmed) {
            Ok(value) => value.normalize(),
            Err(_) if fraction_digits(trimmed) > 2 => return Err(sub_cent()),
            Err(_) => {
                return Err(LedgerError::validation(
                    "amount",
                    format!("'{trimmed}' is not a number"),
                ))
            }
        };
        if value.scale() > 2 {
            return Err(sub_cent());
        }
        if value.abs() > Self::MAX.0 {
            return Err(LedgerError::validation(
                "amount",
                format!("'{trimmed}' is larger than {}", Self::MAX),
            ));
        }
        Ok(Self::canonical(value))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self::canonical)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self::canonical)
    }

    /// Divides into `parts` equal pieces, rounded toward zero to the cent.
    pub fn divide_floor(self, parts: usize) -> MonetaryAmount {
        Self::canonical(
            (self.0 / Decimal::from(parts.max(1)))
                .round_dp_with_strategy(2, RoundingStrategy::ToZero),
        )
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

// Significant digits after the decimal point, ignoring trailing zeros.
fn fraction_digits(text: &str) -> usize {
    text.split_once('.')
        .map_or(0, |(_, fraction)| fraction.trim_end_matches('0').len())
}

impl Add for MonetaryAmount {
    type Output = MonetaryAmount;

    fn add(self, rhs: Self) -> Self::Output {
        MonetaryAmount::canonical(self.value() + rhs.value())
    }
}

impl Sub for MonetaryAmount {
    type Output = MonetaryAmount;

    fn sub(self, rhs: Self) -> Self::Output {
        MonetaryAmount::canonical(self.value() - rhs.value())
    }
}

impl Neg for MonetaryAmount {
    type Output = MonetaryAmount;

    fn neg(self) -> Self::Output {
        MonetaryAmount::canonical(-self.value())
    }
}

impl std::iter::Sum for MonetaryAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MonetaryAmount::ZERO, |acc, x| acc + x)
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MemberBalance {
    pub name: String,
    pub balance: MonetaryAmount,
}

/// Net balance per member, kept in the order members joined the household.
///
/// Positive balances are owed to the member, negative balances are owed by the member.
#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Members(Vector<MemberBalance>);

impl Members {
    /// All members start settled.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|name| MemberBalance {
                    name: name.into(),
                    balance: MonetaryAmount::ZERO,
                })
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<MonetaryAmount> {
        self.0.iter().find(|m| m.name == name).map(|m| m.balance)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|m| m.name == name)
    }

    /// Returns a copy with `f` applied to the balance of `name`, or `None` if there is no such
    /// member.
    pub fn map_balance<F: FnOnce(MonetaryAmount) -> MonetaryAmount>(
        &self,
        name: &str,
        f: F,
    ) -> Option<Self> {
        let idx = self.0.iter().position(|m| m.name == name)?;
        let mut members = self.0.clone();
        let entry = &mut members[idx];
        entry.balance = f(entry.balance);
        Some(Self(members))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberBalance> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|m| m.name.clone()).collect()
    }

    pub fn total(&self) -> MonetaryAmount {
        self.0.iter().map(|m| m.balance).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, MonetaryAmount)> for Members {
    fn from_iter<T: IntoIterator<Item = (String, MonetaryAmount)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, balance)| MemberBalance { name, balance })
                .collect(),
        )
    }
}

/// One person paying an amount that is split among a set of participants.
///
/// Records are never edited. Correcting an expense means deleting it and adding it again.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub payer: String,
    pub description: String,
    pub amount: MonetaryAmount,
    pub participants: Vec<String>,
}

/// Raw request for a new expense, validated by [`crate::journal::add_expense`].
#[derive(Clone, Default, Debug)]
pub struct ExpenseDraft {
    pub payer: String,
    pub description: String,
    pub amount: String,
    pub participants: Vec<String>,
}

#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Household {
    pub members: Members,
    pub expenses: Vector<ExpenseRecord>,
}

impl Household {
    pub fn new(members: Members) -> Self {
        Self {
            members,
            expenses: Vector::new(),
        }
    }

    pub fn map_members<F: FnOnce(&Members) -> Members>(&self, f: F) -> Self {
        Self {
            members: f(&self.members),
            ..self.clone()
        }
    }

    pub fn map_expenses<F>(&self, f: F) -> Self
    where
        F: FnOnce(&Vector<ExpenseRecord>) -> Vector<ExpenseRecord>,
    {
        Self {
            expenses: f(&self.expenses),
            ..self.clone()
        }
    }
}

/// Every household, keyed by name.
pub type Households = OrdMap<String, Household>;

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct HouseholdSummary {
    pub name: String,
    pub members: Vec<String>,
}

/// Instruction for `debtor` to pay `creditor`. Derived from balances, never stored.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct SettlementTransaction {
    pub debtor: String,
    pub creditor: String,
    pub amount: MonetaryAmount,
}

impl fmt::Display for SettlementTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} owes {} {}", self.debtor, self.creditor, self.amount)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct BalanceReport {
    pub household: String,
    pub balances: Vec<MemberBalance>,
    pub transactions: Vec<SettlementTransaction>,
    pub recent_expenses: Vec<ExpenseRecord>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Owes {
    pub to: String,
    pub amount: MonetaryAmount,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct OwedBy {
    pub from: String,
    pub amount: MonetaryAmount,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MemberReport {
    pub member: String,
    pub owes: Vec<Owes>,
    pub owed_by: Vec<OwedBy>,
}

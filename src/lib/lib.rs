mod error;
mod io;
pub mod journal;
pub mod ledger;
pub mod member_view;
mod service;
pub mod settlement;
mod storage;
mod types;
mod utils;

pub use error::{Error, ErrorKind, LedgerError, StoreError};
pub use io::{balance_table_csv, settlement_csv};
pub use service::{HouseholdService, DEFAULT_RECENT_EXPENSES};
pub use storage::{JsonFileStore, MemoryStore, Store};
pub use types::{
    BalanceReport, ExpenseDraft, ExpenseRecord, Household, HouseholdSummary, Households,
    MemberBalance, MemberReport, Members, MonetaryAmount, OwedBy, Owes, SettlementTransaction,
};

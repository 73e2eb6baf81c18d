use std::error::Error;

use ::serde::{Serialize, Serializer};

use crate::types::{MemberBalance, MonetaryAmount, SettlementTransaction};

fn fixed_width<S: Serializer>(x: &MonetaryAmount, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.2}", x.value()))
}

#[derive(Debug, Serialize)]
struct BalanceRowEntity<'a> {
    name: &'a str,
    #[serde(serialize_with = "fixed_width")]
    balance: MonetaryAmount,
}

impl<'a> BalanceRowEntity<'a> {
    fn from_balance(member: &'a MemberBalance) -> Self {
        Self {
            name: &member.name,
            balance: member.balance,
        }
    }
}

#[derive(Debug, Serialize)]
struct SettlementRowEntity<'a> {
    debtor: &'a str,
    creditor: &'a str,
    #[serde(serialize_with = "fixed_width")]
    amount: MonetaryAmount,
}

impl<'a> SettlementRowEntity<'a> {
    fn from_transaction(tx: &'a SettlementTransaction) -> Self {
        Self {
            debtor: &tx.debtor,
            creditor: &tx.creditor,
            amount: tx.amount,
        }
    }
}

fn write_rows<T: Serialize>(rows: impl Iterator<Item = T>) -> Result<String, Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for row in rows {
        wtr.serialize(row)?
    }

    wtr.flush()?;
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// `name,balance` table in member order.
pub fn balance_table_csv(balances: &[MemberBalance]) -> Result<String, Box<dyn Error>> {
    write_rows(balances.iter().map(BalanceRowEntity::from_balance))
}

/// `debtor,creditor,amount` rows in settlement order.
pub fn settlement_csv(transactions: &[SettlementTransaction]) -> Result<String, Box<dyn Error>> {
    write_rows(transactions.iter().map(SettlementRowEntity::from_transaction))
}

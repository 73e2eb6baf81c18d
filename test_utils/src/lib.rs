use std::collections::HashMap;

use serde::Serialize;

#[derive(Serialize)]
struct BalanceRow {
    name: &'static str,
    balance: &'static str,
}

#[derive(Serialize)]
struct SettlementRow {
    debtor: &'static str,
    creditor: &'static str,
    amount: &'static str,
}

fn write_csv<T: Serialize>(rows: impl Iterator<Item = T>) -> String {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

// Only used during testing so no need to return result
pub fn create_balance_csv(rows: Vec<[&'static str; 2]>) -> String {
    write_csv(rows.into_iter().map(|r| BalanceRow {
        name: r[0],
        balance: r[1],
    }))
}

pub fn create_settlement_csv(rows: Vec<[&'static str; 3]>) -> String {
    write_csv(rows.into_iter().map(|r| SettlementRow {
        debtor: r[0],
        creditor: r[1],
        amount: r[2],
    }))
}

fn split_to_dict(csv: &str) -> HashMap<String, String> {
    csv.lines()
        .skip(1) // ignore row titles
        .filter(|line| !line.is_empty())
        .map(|line| {
            (
                line.split(',').next().unwrap_or_default().to_string(),
                line.to_string(),
            )
        })
        .collect()
}

// Rows are keyed by their first column, so the comparison ignores row order.
pub fn assert_unsorted_eq(s1: &str, s2: &str) {
    let sut1 = split_to_dict(s1);
    let sut2 = split_to_dict(s2);
    if sut1.len() != sut2.len() {
        panic!("csvs do not contain the same number of rows");
    }

    sut1.iter().for_each(|(k, v)| match sut2.get(k) {
        Some(row) => assert_eq!(row, v),
        None => panic!("row {} not found in both csvs", k),
    })
}

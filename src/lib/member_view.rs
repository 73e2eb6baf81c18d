use crate::types::{MemberReport, OwedBy, Owes, SettlementTransaction};

/// Splits a settlement plan into what `member` pays and what `member` receives.
pub fn for_member(transactions: &[SettlementTransaction], member: &str) -> MemberReport {
    transactions.iter().fold(
        MemberReport {
            member: member.to_string(),
            owes: Vec::new(),
            owed_by: Vec::new(),
        },
        |mut report, t| {
            if t.debtor == member {
                report.owes.push(Owes {
                    to: t.creditor.clone(),
                    amount: t.amount,
                });
            } else if t.creditor == member {
                report.owed_by.push(OwedBy {
                    from: t.debtor.clone(),
                    amount: t.amount,
                });
            }
            report
        },
    )
}

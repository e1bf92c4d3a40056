//! Writes transactions as a CSV document for download.

use csv::WriterBuilder;
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, transaction::Transaction};

const EXPORT_HEADERS: [&str; 8] = [
    "Date",
    "Type",
    "Target",
    "Description",
    "Amount",
    "Category",
    "Recurring",
    "Recurring Rate",
];

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Render `transactions` as CSV with a header row, one row per transaction in the given order.
///
/// # Errors
/// Returns an [Error::InvalidCsv] if a row could not be written.
pub fn export_transactions_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(vec![]);

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|error| Error::InvalidCsv(error.to_string()))?;

    for transaction in transactions {
        let date = transaction
            .created
            .format(DATE_FORMAT)
            .map_err(|error| Error::InvalidCsv(error.to_string()))?;
        let amount = transaction.amount.to_string();
        let recurring = if transaction.recurring { "Yes" } else { "No" };
        let recurring_rate = match (transaction.recurring, transaction.recurring_rate) {
            (true, Some(rate)) => format!("{rate} days"),
            _ => "-".to_owned(),
        };

        writer
            .write_record([
                date.as_str(),
                transaction.kind.as_str(),
                transaction.target.as_str(),
                transaction.description.as_str(),
                amount.as_str(),
                transaction.category.as_str(),
                recurring,
                recurring_rate.as_str(),
            ])
            .map_err(|error| Error::InvalidCsv(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::InvalidCsv(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::InvalidCsv(error.to_string()))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        auth::UserID,
        transaction::{Transaction, TransactionKind},
    };

    use super::export_transactions_csv;

    #[test]
    fn empty_export_has_only_headers() {
        let got = export_transactions_csv(&[]).unwrap();

        assert_eq!(
            got,
            "Date,Type,Target,Description,Amount,Category,Recurring,Recurring Rate\n"
        );
    }

    #[test]
    fn export_rows() {
        let transactions = vec![
            Transaction::build(UserID::new(1), dec!(1200.00), TransactionKind::Expense, "Housing")
                .target("Landlord")
                .description("Rent, March")
                .created(datetime!(2025-03-01 09:00 UTC))
                .recurring(Some(30))
                .finalise(1)
                .unwrap(),
            Transaction::build(UserID::new(1), dec!(5000), TransactionKind::Income, "Salary")
                .target("Employer")
                .created(datetime!(2025-03-15 09:00 UTC))
                .finalise(2)
                .unwrap(),
        ];

        let got = export_transactions_csv(&transactions).unwrap();

        let want = "Date,Type,Target,Description,Amount,Category,Recurring,Recurring Rate\n\
            2025-03-01,EXPENSE,Landlord,\"Rent, March\",1200.00,Housing,Yes,30 days\n\
            2025-03-15,INCOME,Employer,,5000,Salary,No,-\n";
        assert_eq!(got, want);
    }
}

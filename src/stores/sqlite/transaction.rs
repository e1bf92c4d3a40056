//! Implements a SQLite backed ledger store.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, params_from_iter, types::Type, types::Value};
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    db::{CreateTable, MapRow, timestamp_from_sql, timestamp_to_sql},
    stores::LedgerStore,
    transaction::{SortOrder, Transaction, TransactionBuilder, TransactionKind, TransactionQuery},
};

const COLUMNS: &str =
    "id, user_id, target, description, amount, kind, category, created, recurring, recurring_rate";

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteLedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteLedgerStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl LedgerStore for SQLiteLedgerStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the builder is invalid,
    /// - or [Error::StoreUnavailable] if there is some SQL error.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        builder.validate()?;
        let created = timestamp_to_sql(builder.created)?;
        let recurring_rate = builder.recurring_rate.filter(|_| builder.recurring);

        let transaction = self
            .connection
            .lock()?
            .prepare(&format!(
                "INSERT INTO \"transaction\" \
                 (user_id, target, description, amount, kind, category, created, recurring, recurring_rate) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    builder.user_id.as_i64(),
                    builder.target,
                    builder.description,
                    builder.amount.to_string(),
                    builder.kind.as_str(),
                    builder.category,
                    created,
                    builder.recurring,
                    recurring_rate,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::StoreUnavailable] there is some other SQL error.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()?
            .prepare(&format!("SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id"))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    fn update(&self, id: TransactionId, builder: TransactionBuilder) -> Result<Transaction, Error> {
        builder.validate()?;
        let created = timestamp_to_sql(builder.created)?;
        let recurring_rate = builder.recurring_rate.filter(|_| builder.recurring);

        let transaction = self
            .connection
            .lock()?
            .prepare(&format!(
                "UPDATE \"transaction\" SET \
                 user_id = ?1, target = ?2, description = ?3, amount = ?4, kind = ?5, \
                 category = ?6, created = ?7, recurring = ?8, recurring_rate = ?9 \
                 WHERE id = ?10 \
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    builder.user_id.as_i64(),
                    builder.target,
                    builder.description,
                    builder.amount.to_string(),
                    builder.kind.as_str(),
                    builder.category,
                    created,
                    builder.recurring,
                    recurring_rate,
                    id,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()?
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::StoreUnavailable] if there is a SQL error.
    fn query(&self, filter: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM \"transaction\"")];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(user_id) = filter.user_id {
            query_parameters.push(Value::Integer(user_id.as_i64()));
            where_clause_parts.push(format!("user_id = ?{}", query_parameters.len()));
        }

        if let Some(kind) = filter.kind {
            query_parameters.push(Value::Text(kind.as_str().to_owned()));
            where_clause_parts.push(format!("kind = ?{}", query_parameters.len()));
        }

        if let Some(category) = &filter.category {
            query_parameters.push(Value::Text(category.clone()));
            where_clause_parts.push(format!("category = ?{}", query_parameters.len()));
        }

        if let Some(created_range) = &filter.created_range {
            query_parameters.push(Value::Integer(timestamp_to_sql(created_range.start)?));
            query_parameters.push(Value::Integer(timestamp_to_sql(created_range.end)?));
            where_clause_parts.push(format!(
                "created >= ?{} AND created < ?{}",
                query_parameters.len() - 1,
                query_parameters.len(),
            ));
        }

        if let Some(recurring) = filter.recurring {
            query_parameters.push(Value::Integer(i64::from(recurring)));
            where_clause_parts.push(format!("recurring = ?{}", query_parameters.len()));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        // Sort by creation time, and then ID to keep the order stable for equal timestamps
        match filter.sort_created {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY created ASC, id ASC".to_owned())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY created DESC, id ASC".to_owned())
            }
            None => {}
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        let transactions = self
            .connection
            .lock()?
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        // Amounts are stored as exact decimal text, so the threshold is compared here rather than in SQL.
        Ok(match filter.amount_above {
            Some(threshold) => transactions
                .into_iter()
                .filter(|transaction| transaction.amount > threshold)
                .collect(),
            None => transactions,
        })
    }
}

impl CreateTable for SQLiteLedgerStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    target TEXT NOT NULL,
                    description TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    category TEXT NOT NULL,
                    created INTEGER NOT NULL,
                    recurring INTEGER NOT NULL,
                    recurring_rate INTEGER
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_user_created ON \"transaction\"(user_id, created)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteLedgerStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_amount: String = row.get(offset + 4)?;
        let amount = Decimal::from_str(&raw_amount).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 4, Type::Text, Box::new(error))
        })?;

        let raw_kind: String = row.get(offset + 5)?;
        let kind = TransactionKind::from_str(&raw_kind).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 5, Type::Text, Box::new(error))
        })?;

        Ok(Transaction {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            target: row.get(offset + 2)?,
            description: row.get(offset + 3)?,
            amount,
            kind,
            category: row.get(offset + 6)?,
            created: timestamp_from_sql(row, offset + 7)?,
            recurring: row.get(offset + 8)?,
            recurring_rate: row.get(offset + 9)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        stores::LedgerStore,
        transaction::{SortOrder, Transaction, TransactionKind, TransactionQuery},
    };

    use super::SQLiteLedgerStore;

    fn get_store() -> SQLiteLedgerStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteLedgerStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn create_then_get() {
        let store = get_store();
        let builder = Transaction::build(
            UserID::new(1),
            dec!(12.34),
            TransactionKind::Expense,
            "Food & Dining",
        )
        .target("Cafe")
        .description("Lunch")
        .created(datetime!(2025-05-06 12:30:00.123456789 UTC))
        .recurring(Some(7));

        let created = store.create(builder.clone()).unwrap();
        let got = store.get(created.id).unwrap();

        assert!(created.id > 0);
        assert_eq!(got, builder.finalise(created.id).unwrap());
    }

    #[test]
    fn create_rejects_invalid_transaction() {
        let store = get_store();

        let got = store.create(Transaction::build(
            UserID::new(1),
            dec!(0),
            TransactionKind::Expense,
            "Food",
        ));

        assert!(matches!(got, Err(Error::Validation(_))));
        assert_eq!(store.query(&TransactionQuery::default()).unwrap(), vec![]);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = get_store();

        assert_eq!(store.get(123), Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_transaction() {
        let store = get_store();
        let created = store
            .create(Transaction::build(
                UserID::new(1),
                dec!(10),
                TransactionKind::Expense,
                "Food",
            ))
            .unwrap();
        let replacement =
            Transaction::build(UserID::new(1), dec!(99.95), TransactionKind::Income, "Salary")
                .created(datetime!(2025-01-01 00:00 UTC));

        let updated = store.update(created.id, replacement.clone()).unwrap();

        assert_eq!(updated, replacement.finalise(created.id).unwrap());
        assert_eq!(store.get(created.id).unwrap(), updated);
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = get_store();

        let got = store.update(
            42,
            Transaction::build(UserID::new(1), dec!(1), TransactionKind::Income, "Salary"),
        );

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_transaction() {
        let store = get_store();
        let created = store
            .create(Transaction::build(
                UserID::new(1),
                dec!(10),
                TransactionKind::Expense,
                "Food",
            ))
            .unwrap();

        store.delete(created.id).unwrap();

        assert_eq!(store.get(created.id), Err(Error::NotFound));
        assert_eq!(store.delete(created.id), Err(Error::NotFound));
    }

    #[test]
    fn query_combines_filters() {
        let store = get_store();
        let user = UserID::new(1);
        let in_window = store
            .create(
                Transaction::build(user, dec!(20), TransactionKind::Expense, "Food")
                    .created(datetime!(2025-03-01 00:00 UTC)),
            )
            .unwrap();
        // On the exclusive end of the window.
        store
            .create(
                Transaction::build(user, dec!(30), TransactionKind::Expense, "Food")
                    .created(datetime!(2025-04-01 00:00 UTC)),
            )
            .unwrap();
        // Other category.
        store
            .create(
                Transaction::build(user, dec!(40), TransactionKind::Expense, "Travel")
                    .created(datetime!(2025-03-02 00:00 UTC)),
            )
            .unwrap();
        // Other user.
        store
            .create(
                Transaction::build(UserID::new(2), dec!(50), TransactionKind::Expense, "Food")
                    .created(datetime!(2025-03-02 00:00 UTC)),
            )
            .unwrap();

        let got = store
            .query(&TransactionQuery::for_user_and_category_created_between(
                user,
                "Food",
                datetime!(2025-03-01 00:00 UTC),
                datetime!(2025-04-01 00:00 UTC),
            ))
            .unwrap();

        assert_eq!(got, vec![in_window]);
    }

    #[test]
    fn query_by_kind_recurring_and_amount() {
        let store = get_store();
        let user = UserID::new(1);
        let rent = store
            .create(
                Transaction::build(user, dec!(1200), TransactionKind::Expense, "Housing")
                    .recurring(Some(30)),
            )
            .unwrap();
        store
            .create(Transaction::build(user, dec!(5), TransactionKind::Expense, "Food"))
            .unwrap();
        store
            .create(
                Transaction::build(user, dec!(5000), TransactionKind::Income, "Salary")
                    .recurring(Some(30)),
            )
            .unwrap();

        let recurring_expenses = store
            .query(
                &TransactionQuery::for_user_and_recurring(user, true)
                    .with_kind(TransactionKind::Expense),
            )
            .unwrap();
        let large = store
            .query(&TransactionQuery {
                amount_above: Some(dec!(1000)),
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(recurring_expenses, vec![rent.clone()]);
        assert_eq!(large, vec![rent]);
    }

    #[test]
    fn query_sorts_by_created() {
        let store = get_store();
        let user = UserID::new(1);
        let later = store
            .create(
                Transaction::build(user, dec!(1), TransactionKind::Expense, "Food")
                    .created(datetime!(2025-02-01 00:00 UTC)),
            )
            .unwrap();
        let earlier = store
            .create(
                Transaction::build(user, dec!(2), TransactionKind::Expense, "Food")
                    .created(datetime!(2025-01-01 00:00 UTC)),
            )
            .unwrap();

        let ascending = store
            .query(&TransactionQuery::for_user(user).sorted(SortOrder::Ascending))
            .unwrap();
        let descending = store
            .query(&TransactionQuery::for_user(user).sorted(SortOrder::Descending))
            .unwrap();

        assert_eq!(ascending, vec![earlier.clone(), later.clone()]);
        assert_eq!(descending, vec![later, earlier]);
    }
}

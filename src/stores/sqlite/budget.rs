//! Implements a SQLite backed budget store.
//!
//! Budget items have no identity of their own, so they are stored as a JSON
//! array in the budget row.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetItem, NewBudget},
    database_id::BudgetId,
    db::{CreateTable, MapRow, timestamp_from_sql, timestamp_to_sql},
    stores::BudgetStore,
};

const COLUMNS: &str = "id, user_id, name, description, items, created_at, updated_at";

/// Stores budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn items_to_json(items: &[BudgetItem]) -> Result<String, Error> {
    serde_json::to_string(items).map_err(|error| {
        tracing::error!("could not serialise budget items: {error}");
        Error::StoreUnavailable(error.to_string())
    })
}

impl BudgetStore for SQLiteBudgetStore {
    fn create(&self, new_budget: NewBudget, now: OffsetDateTime) -> Result<Budget, Error> {
        let timestamp = timestamp_to_sql(now)?;

        let budget = self
            .connection
            .lock()?
            .prepare(&format!(
                "INSERT INTO budget (user_id, name, description, items, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, '[]', ?4, ?4) \
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    new_budget.user_id.as_i64(),
                    new_budget.name,
                    new_budget.description,
                    timestamp,
                ),
                Self::map_row,
            )?;

        Ok(budget)
    }

    /// Retrieve a budget by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid budget,
    /// - or [Error::StoreUnavailable] there is some other SQL error.
    fn get(&self, id: BudgetId) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()?
            .prepare(&format!("SELECT {COLUMNS} FROM budget WHERE id = :id"))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(budget)
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()?
            .prepare(&format!(
                "SELECT {COLUMNS} FROM budget WHERE user_id = ?1 ORDER BY updated_at DESC, id DESC"
            ))?
            .query_map((user_id.as_i64(),), Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
            .collect()
    }

    fn update(&self, budget: &Budget) -> Result<(), Error> {
        let items = items_to_json(&budget.items)?;

        let rows_affected = self.connection.lock()?.execute(
            "UPDATE budget SET user_id = ?1, name = ?2, description = ?3, items = ?4, \
             created_at = ?5, updated_at = ?6 WHERE id = ?7",
            (
                budget.user_id.as_i64(),
                &budget.name,
                &budget.description,
                items,
                timestamp_to_sql(budget.created_at)?,
                timestamp_to_sql(budget.updated_at)?,
                budget.id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn delete(&self, id: BudgetId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()?
            .execute("DELETE FROM budget WHERE id = ?1", (id,))?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteBudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    items TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteBudgetStore {
    type ReturnType = Budget;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_items: String = row.get(offset + 4)?;
        let items = serde_json::from_str(&raw_items).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 4, Type::Text, Box::new(error))
        })?;

        Ok(Budget {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            name: row.get(offset + 2)?,
            description: row.get(offset + 3)?,
            items,
            created_at: timestamp_from_sql(row, offset + 5)?,
            updated_at: timestamp_from_sql(row, offset + 6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::{Duration, macros::datetime};

    use crate::{
        Error,
        auth::UserID,
        budget::{BudgetItem, NewBudget},
        category::Category,
        db::initialize,
        stores::BudgetStore,
    };

    use super::SQLiteBudgetStore;

    fn get_store() -> SQLiteBudgetStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteBudgetStore::new(Arc::new(Mutex::new(connection)))
    }

    fn new_budget(user_id: i64, name: &str) -> NewBudget {
        NewBudget {
            user_id: UserID::new(user_id),
            name: name.to_owned(),
            description: "test".to_owned(),
        }
    }

    #[test]
    fn create_then_get() {
        let store = get_store();
        let now = datetime!(2025-01-01 08:00 UTC);

        let created = store.create(new_budget(1, "Monthly"), now).unwrap();
        let got = store.get(created.id).unwrap();

        assert_eq!(got, created);
        assert_eq!(got.name, "Monthly");
        assert!(got.items.is_empty());
        assert_eq!(got.created_at, now);
        assert_eq!(got.updated_at, now);
    }

    #[test]
    fn get_missing_is_not_found() {
        assert_eq!(get_store().get(7), Err(Error::NotFound));
    }

    #[test]
    fn update_persists_items() {
        let store = get_store();
        let now = datetime!(2025-01-01 08:00 UTC);
        let mut budget = store.create(new_budget(1, "Monthly"), now).unwrap();
        let category = Category {
            id: 1,
            name: "Food & Dining".to_owned(),
            color: "#FF6B6B".to_owned(),
            icon: "🍽️".to_owned(),
        };
        budget.add_item(
            BudgetItem::new(category, dec!(250.50), 30).unwrap(),
            now + Duration::days(1),
        );

        store.update(&budget).unwrap();

        assert_eq!(store.get(budget.id).unwrap(), budget);
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = get_store();
        let mut budget = store
            .create(new_budget(1, "Monthly"), datetime!(2025-01-01 08:00 UTC))
            .unwrap();
        budget.id += 1;

        assert_eq!(store.update(&budget), Err(Error::NotFound));
    }

    #[test]
    fn get_by_user_orders_by_most_recently_updated() {
        let store = get_store();
        let older = store
            .create(new_budget(1, "Older"), datetime!(2025-01-01 00:00 UTC))
            .unwrap();
        let newer = store
            .create(new_budget(1, "Newer"), datetime!(2025-02-01 00:00 UTC))
            .unwrap();
        store
            .create(new_budget(2, "Someone else's"), datetime!(2025-03-01 00:00 UTC))
            .unwrap();

        let got = store.get_by_user(UserID::new(1)).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn delete_budget() {
        let store = get_store();
        let budget = store
            .create(new_budget(1, "Monthly"), datetime!(2025-01-01 00:00 UTC))
            .unwrap();

        store.delete(budget.id).unwrap();

        assert_eq!(store.get(budget.id), Err(Error::NotFound));
        assert_eq!(store.delete(budget.id), Err(Error::NotFound));
    }
}

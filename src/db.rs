//! Traits and helpers shared by the SQLite backed stores, plus database initialisation.

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    category::seed_default_categories,
    stores::sqlite::{SQLiteBudgetStore, SQLiteCategoryStore, SQLiteLedgerStore},
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    type ReturnType;

    /// Convert a row into a concrete type.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading columns starting at `offset`.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables for the domain models and seed the category catalogue.
///
/// # Errors
/// Returns an error if a table could not be created or the categories could not be seeded.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    SQLiteCategoryStore::create_table(connection)?;
    SQLiteLedgerStore::create_table(connection)?;
    SQLiteBudgetStore::create_table(connection)?;

    seed_default_categories(connection)?;

    Ok(())
}

/// Convert a timestamp to nanoseconds since the Unix epoch for storage.
///
/// Timestamps are stored as integers so that they sort and compare correctly in SQL.
pub(crate) fn timestamp_to_sql(timestamp: OffsetDateTime) -> Result<i64, Error> {
    i64::try_from(timestamp.unix_timestamp_nanos()).map_err(|_| {
        Error::Validation(format!("the timestamp {timestamp} is out of range"))
    })
}

/// Read a timestamp stored in nanoseconds from `column` of `row` as a UTC date time.
pub(crate) fn timestamp_from_sql(row: &Row, column: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let nanos: i64 = row.get(column)?;

    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Integer, Box::new(error))
    })
}

//! The category catalogue model and its default seed data.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId};

/// A labelled, coloured tag for grouping transactions and budget allowances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name, also used as the category label on transactions.
    pub name: String,
    /// A CSS hex colour, e.g. "#FF6B6B".
    pub color: String,
    /// An emoji icon.
    pub icon: String,
}

/// The categories every installation starts with, as (name, colour, icon).
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 12] = [
    ("Food & Dining", "#FF6B6B", "🍽️"),
    ("Transportation", "#4ECDC4", "🚗"),
    ("Shopping", "#45B7D1", "🛍️"),
    ("Entertainment", "#96CEB4", "🎬"),
    ("Healthcare", "#FFEAA7", "🏥"),
    ("Utilities", "#DDA0DD", "💡"),
    ("Housing", "#98D8C8", "🏠"),
    ("Education", "#F7DC6F", "📚"),
    ("Travel", "#BB8FCE", "✈️"),
    ("Salary", "#82E0AA", "💰"),
    ("Freelance", "#F8C471", "💼"),
    ("Investment", "#85C1E9", "📈"),
];

/// Reset the catalogue to [DEFAULT_CATEGORIES] unless it already holds exactly that many rows.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_default_categories(connection: &Connection) -> Result<(), Error> {
    let count: usize = connection.query_row("SELECT COUNT(id) FROM category", [], |row| {
        row.get(0)
    })?;

    if count == DEFAULT_CATEGORIES.len() {
        return Ok(());
    }

    tracing::info!(
        "Found {count} categories, reseeding the {} default categories",
        DEFAULT_CATEGORIES.len()
    );

    let transaction = connection.unchecked_transaction()?;
    transaction.execute("DELETE FROM category", ())?;

    {
        let mut statement =
            transaction.prepare("INSERT INTO category (name, color, icon) VALUES (?1, ?2, ?3)")?;

        for (name, color, icon) in DEFAULT_CATEGORIES {
            statement.execute((name, color, icon))?;
        }
    }

    transaction.commit()?;

    Ok(())
}

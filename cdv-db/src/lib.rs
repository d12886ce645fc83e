//! In-memory SQLite database layer for the conflict datasets.
//!
//! The site embeds its CSV fixtures at compile time, loads them into an
//! in-memory SQLite database once at start-up, and every chart widget then
//! reads typed rows through the query methods here.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper for interior mutability in single-threaded WASM
//! - In-memory SQLite via `rusqlite` (bundled, builds for `wasm32-unknown-unknown`)
//! - CSV data loaded via `include_str!` in the consuming crate
//! - Query methods returning serializable structs from [`models`]
//!
//! # Usage
//!
//! ```rust
//! use cdv_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_monthly_fatalities("MONTH,country,fatalities\n2023-10,Palestine,6245\n2023-10,Israel,1420\n").unwrap();
//!
//! let series = db.query_monthly_fatalities().unwrap();
//! assert_eq!(series.len(), 2);
//! let totals = db.query_total_fatalities().unwrap();
//! assert_eq!(totals[1].fatalities, 6245.0);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding every dataset of the site.
///
/// Cheaply cloneable (via `Rc`); clones share one connection, so a
/// database loaded once can be handed to every widget.
///
/// # Example
///
/// ```rust
/// use cdv_db::Database;
///
/// let db = Database::new().unwrap();
/// db.load_event_flows("country,event_type,sub_event_type,events\nIsrael,Protests,Peaceful protest,12\n").unwrap();
/// let flows = db.query_event_flows().unwrap();
/// assert_eq!(flows.len(), 1);
/// ```
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create an empty in-memory database with the schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

impl PartialEq for Database {
    /// Two handles are equal when they share a connection. Lets a database
    /// travel through component props.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.conn, &other.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_creates_successfully() {
        assert!(Database::new().is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_monthly_fatalities("MONTH,country,fatalities\n2023-10,Israel,1420\n")
            .unwrap();
        let rows = db2.query_monthly_fatalities().unwrap();
        assert_eq!(rows.len(), 1, "Clone should see same data via shared Rc");
        assert!(db == db2);
        assert!(db != Database::new().unwrap());
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        assert!(db.query_monthly_fatalities().unwrap().is_empty());
        assert!(db.query_indicators().unwrap().is_empty());
    }
}

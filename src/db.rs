use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::SqliteConnection;

use crate::error::{AppError, AppResult};
use crate::schema::schema_version;

// Database connection pool type
pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: &[(i32, &str)] = &[(1, include_str!("../migrations/001_initial.sql"))];

// Dependents first so foreign keys never block the drop.
const TABLES: &[&str] = &[
    "attachment",
    "sessions",
    "user_symptom_treatment",
    "user_symptom",
    "appointment",
    "treatment",
    "symptom",
    "provider",
    "users",
    "schema_version",
];

#[derive(Debug, Clone, Copy)]
struct Pragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for Pragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

fn in_memory(url: &str) -> bool {
    url == ":memory:" || url.starts_with("file::memory:")
}

// Builds the pool. An in-memory database lives inside a single connection,
// so the pool is capped at one and that connection is never recycled.
pub fn pool(database_url: &str) -> AppResult<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = DbPool::builder().connection_customizer(Box::new(Pragmas));
    let builder = if in_memory(database_url) {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder
    };
    Ok(builder.build(manager)?)
}

pub fn init(database_url: &str) -> AppResult<DbPool> {
    let pool = pool(database_url)?;
    let mut conn = pool.get()?;
    migrate(&mut conn)?;
    drop(conn);
    Ok(pool)
}

// Current schema version, zero on an empty database.
pub fn version(conn: &mut SqliteConnection) -> i32 {
    schema_version::table
        .select(diesel::dsl::max(schema_version::version))
        .first::<Option<i32>>(conn)
        .ok()
        .flatten()
        .unwrap_or(0)
}

pub fn migrate(conn: &mut SqliteConnection) -> AppResult<()> {
    let current = version(conn);
    for &(number, sql) in MIGRATIONS {
        if number <= current {
            continue;
        }
        log::info!("applying migration v{}", number);
        conn.transaction::<_, AppError, _>(|conn| {
            conn.batch_execute(sql)?;
            diesel::insert_into(schema_version::table)
                .values(schema_version::version.eq(number))
                .execute(conn)?;
            Ok(())
        })?;
    }
    Ok(())
}

pub fn drop_all(conn: &mut SqliteConnection) -> AppResult<()> {
    for table in TABLES {
        log::info!("dropping table {}", table);
        conn.batch_execute(&format!("DROP TABLE IF EXISTS {};", table))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let pool = init(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        assert_eq!(version(&mut conn), 1);
        migrate(&mut conn).unwrap();
        assert_eq!(version(&mut conn), 1);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let pool = init(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        let err = conn
            .batch_execute(
                "INSERT INTO appointment (user_id, date, notes) VALUES (42, '2024-01-01 10:00:00', 'x');",
            )
            .map_err(AppError::from)
            .unwrap_err();
        assert!(matches!(err, AppError::Integrity { .. }));
    }

    #[test]
    fn drop_all_resets_version() {
        let pool = init(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        drop_all(&mut conn).unwrap();
        assert_eq!(version(&mut conn), 0);
        migrate(&mut conn).unwrap();
        assert_eq!(version(&mut conn), 1);
    }
}

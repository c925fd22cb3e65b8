//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `people` table.
//! - Own the explicit create/update timestamp stamping step.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Person::validate()` before SQL mutations.
//! - `created_at` is stamped once on create; `update_person` refreshes
//!   `updated_at` only.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::person::{Person, PersonId};
use crate::model::ValidationError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    romanized_name,
    created_at,
    updated_at
FROM people";

const PEOPLE_REQUIRED_COLUMNS: &[&str] =
    &["uuid", "name", "romanized_name", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by person, lookup and record persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Entity validation rejected the write; nothing was persisted.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap failure.
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// A written row references a person or lookup row that does not exist.
    MissingReference { entity: &'static str, id: Uuid },
    /// A lookup row cannot be deleted while association records reference it.
    StillReferenced { entity: &'static str, id: Uuid },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::MissingReference { entity, id } => {
                write!(f, "{entity} {id} references a missing person or lookup row")
            }
            Self::StillReferenced { entity, id } => {
                write!(f, "{entity} {id} is still referenced by association records")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering applied to person listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameOrder {
    #[default]
    Ascending,
    Descending,
}

/// Query options for listing people.
#[derive(Debug, Clone, Default)]
pub struct PersonListQuery {
    /// Free-text match against `name` and `romanized_name`.
    pub search: Option<String>,
    pub order: NameOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for person CRUD operations.
pub trait PersonRepository {
    /// Persists a new person, stamping both timestamps with `now_ms`.
    fn create_person(&self, person: &mut Person, now_ms: i64) -> RepoResult<PersonId>;
    /// Rewrites scalar fields, stamping `updated_at` with `now_ms`.
    fn update_person(&self, person: &mut Person, now_ms: i64) -> RepoResult<()>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn list_people(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>>;
    fn count_people(&self) -> RepoResult<u64>;
    /// Deletes one person; the storage layer cascades its association rows.
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "people", PEOPLE_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &mut Person, now_ms: i64) -> RepoResult<PersonId> {
        person.validate()?;
        person.stamp_created(now_ms);

        self.conn.execute(
            "INSERT INTO people (uuid, name, romanized_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                person.uuid.to_string(),
                person.name.as_str(),
                person.romanized_name.as_deref(),
                person.created_at,
                person.updated_at,
            ],
        )?;

        Ok(person.uuid)
    }

    fn update_person(&self, person: &mut Person, now_ms: i64) -> RepoResult<()> {
        person.validate()?;

        let changed = self.conn.execute(
            "UPDATE people
             SET
                name = ?1,
                romanized_name = ?2,
                updated_at = ?3
             WHERE uuid = ?4;",
            params![
                person.name.as_str(),
                person.romanized_name.as_deref(),
                now_ms,
                person.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "person",
                id: person.uuid,
            });
        }

        person.stamp_updated(now_ms);
        Ok(())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn list_people(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        let mut sql = format!("{PERSON_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref() {
            let pattern = like_pattern(search);
            sql.push_str(
                " AND (name LIKE ? ESCAPE '\\'
                   OR COALESCE(romanized_name, '') LIKE ? ESCAPE '\\')",
            );
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        match query.order {
            NameOrder::Ascending => sql.push_str(" ORDER BY name ASC, uuid ASC"),
            NameOrder::Descending => sql.push_str(" ORDER BY name DESC, uuid ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut people = Vec::new();

        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }

        Ok(people)
    }

    fn count_people(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM people;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM people WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "person",
                id,
            });
        }

        Ok(())
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "people.uuid")?;

    let person = Person {
        uuid,
        name: row.get("name")?,
        romanized_name: row.get("romanized_name")?,
        created_at: Some(row.get("created_at")?),
        updated_at: Some(row.get("updated_at")?),
    };
    person.validate()?;
    Ok(person)
}

/// Escapes `%`/`_` wildcards and wraps `search` for substring matching.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub(crate) fn parse_uuid(value: &str, context: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {context}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, context: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {context}"
        ))),
    }
}

/// Validates that `conn` carries the migrated schema required by a repository.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    required_columns: &[&'static str],
) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let column_name: String = row.get(1)?;
        columns.push(column_name);
    }

    for required in required_columns {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table,
                column: required,
            });
        }
    }

    Ok(())
}

/// Maps SQLite foreign-key violations to the semantic repository error.
pub(crate) fn map_constraint(
    err: rusqlite::Error,
    missing: impl FnOnce() -> RepoError,
) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return missing();
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ada"), "%ada%");
        assert_eq!(like_pattern("50%_x"), "%50\\%\\_x%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}

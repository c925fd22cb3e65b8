//! Lookup/source repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the simple lookup tables and `sources`.
//! - Keep one generic SQL path for all `LookupKind` tables.
//!
//! # Invariants
//! - Lookup listings are sorted by name (case-insensitive), then uuid.
//! - Deleting a row still referenced by association records is rejected
//!   with `StillReferenced`, never silently cascaded.

use crate::model::lookup::{LookupEntry, LookupId, LookupKind, Source, SourceId};
use crate::repo::person_repo::{
    ensure_table_ready, map_constraint, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const SOURCES_REQUIRED_COLUMNS: &[&str] = &["uuid", "name", "type_source_uuid", "url"];

/// Repository interface for lookup and source rows.
pub trait LookupRepository {
    fn create_entry(&self, kind: LookupKind, entry: &LookupEntry) -> RepoResult<LookupId>;
    fn get_entry(&self, kind: LookupKind, id: LookupId) -> RepoResult<Option<LookupEntry>>;
    fn list_entries(&self, kind: LookupKind) -> RepoResult<Vec<LookupEntry>>;
    fn rename_entry(&self, kind: LookupKind, id: LookupId, name: &str) -> RepoResult<()>;
    fn delete_entry(&self, kind: LookupKind, id: LookupId) -> RepoResult<()>;

    fn create_source(&self, source: &Source) -> RepoResult<SourceId>;
    fn get_source(&self, id: SourceId) -> RepoResult<Option<Source>>;
    fn list_sources(&self) -> RepoResult<Vec<Source>>;
    fn update_source(&self, source: &Source) -> RepoResult<()>;
    fn delete_source(&self, id: SourceId) -> RepoResult<()>;
}

/// SQLite-backed lookup/source repository.
pub struct SqliteLookupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLookupRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for kind in LookupKind::ALL {
            ensure_table_ready(conn, kind.table(), &["uuid", "name"])?;
        }
        ensure_table_ready(conn, "sources", SOURCES_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl LookupRepository for SqliteLookupRepository<'_> {
    fn create_entry(&self, kind: LookupKind, entry: &LookupEntry) -> RepoResult<LookupId> {
        entry.validate(kind)?;

        self.conn.execute(
            &format!(
                "INSERT INTO {} (uuid, name) VALUES (?1, ?2);",
                kind.table()
            ),
            params![entry.uuid.to_string(), entry.name.as_str()],
        )?;

        Ok(entry.uuid)
    }

    fn get_entry(&self, kind: LookupKind, id: LookupId) -> RepoResult<Option<LookupEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, name FROM {} WHERE uuid = ?1;",
            kind.table()
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row, kind)?));
        }

        Ok(None)
    }

    fn list_entries(&self, kind: LookupKind) -> RepoResult<Vec<LookupEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, name FROM {} ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
            kind.table()
        ))?;

        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row, kind)?);
        }

        Ok(entries)
    }

    fn rename_entry(&self, kind: LookupKind, id: LookupId, name: &str) -> RepoResult<()> {
        let renamed = LookupEntry {
            uuid: id,
            name: name.to_string(),
        };
        renamed.validate(kind)?;

        let changed = self.conn.execute(
            &format!("UPDATE {} SET name = ?1 WHERE uuid = ?2;", kind.table()),
            params![name, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: kind.label(),
                id,
            });
        }

        Ok(())
    }

    fn delete_entry(&self, kind: LookupKind, id: LookupId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                &format!("DELETE FROM {} WHERE uuid = ?1;", kind.table()),
                [id.to_string()],
            )
            .map_err(|err| {
                map_constraint(err, || RepoError::StillReferenced {
                    entity: kind.label(),
                    id,
                })
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: kind.label(),
                id,
            });
        }

        Ok(())
    }

    fn create_source(&self, source: &Source) -> RepoResult<SourceId> {
        source.validate()?;

        self.conn
            .execute(
                "INSERT INTO sources (uuid, name, type_source_uuid, url)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    source.uuid.to_string(),
                    source.name.as_str(),
                    source.type_source.map(|id| id.to_string()),
                    source.url.as_deref(),
                ],
            )
            .map_err(|err| {
                map_constraint(err, || RepoError::MissingReference {
                    entity: "source",
                    id: source.uuid,
                })
            })?;

        Ok(source.uuid)
    }

    fn get_source(&self, id: SourceId) -> RepoResult<Option<Source>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, type_source_uuid, url FROM sources WHERE uuid = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_source_row(row)?));
        }

        Ok(None)
    }

    fn list_sources(&self) -> RepoResult<Vec<Source>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, type_source_uuid, url
             FROM sources
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next()? {
            sources.push(parse_source_row(row)?);
        }

        Ok(sources)
    }

    fn update_source(&self, source: &Source) -> RepoResult<()> {
        source.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE sources
                 SET name = ?1, type_source_uuid = ?2, url = ?3
                 WHERE uuid = ?4;",
                params![
                    source.name.as_str(),
                    source.type_source.map(|id| id.to_string()),
                    source.url.as_deref(),
                    source.uuid.to_string(),
                ],
            )
            .map_err(|err| {
                map_constraint(err, || RepoError::MissingReference {
                    entity: "source",
                    id: source.uuid,
                })
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "source",
                id: source.uuid,
            });
        }

        Ok(())
    }

    fn delete_source(&self, id: SourceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sources WHERE uuid = ?1;", [id.to_string()])
            .map_err(|err| {
                map_constraint(err, || RepoError::StillReferenced {
                    entity: "source",
                    id,
                })
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "source",
                id,
            });
        }

        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>, kind: LookupKind) -> RepoResult<LookupEntry> {
    let uuid_text: String = row.get("uuid")?;
    Ok(LookupEntry {
        uuid: parse_uuid(&uuid_text, kind.table())?,
        name: row.get("name")?,
    })
}

fn parse_source_row(row: &Row<'_>) -> RepoResult<Source> {
    let uuid_text: String = row.get("uuid")?;
    let type_source = match row.get::<_, Option<String>>("type_source_uuid")? {
        Some(value) => Some(parse_uuid(&value, "sources.type_source_uuid")?),
        None => None,
    };

    Ok(Source {
        uuid: parse_uuid(&uuid_text, "sources.uuid")?,
        name: row.get("name")?,
        type_source,
        url: row.get("url")?,
    })
}

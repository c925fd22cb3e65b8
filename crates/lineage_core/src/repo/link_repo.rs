//! Association record repository: one generic SQLite implementation for all
//! eight person-linked record tables.
//!
//! # Responsibility
//! - Provide create/get/list/update/reassign/delete APIs per record type.
//! - Keep table/column metadata and row mapping beside each record type.
//!
//! # Invariants
//! - Persisted rows always carry an owning person (`person_uuid NOT NULL`).
//! - Foreign-key violations surface as `MissingReference`, not transport
//!   errors.
//! - `list_for_person` ordering is deterministic: `uuid ASC`.

use crate::model::person::PersonId;
use crate::model::record::{
    Achievement, PersonCategory, PersonIdentityField, PersonJob, PersonLink, PersonPicture,
    PersonRelative, PersonSchool, PersonSocialStatus, RecordId,
};
use crate::model::ValidationError;
use crate::repo::person_repo::{
    bool_to_int, ensure_table_ready, int_to_bool, map_constraint, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::marker::PhantomData;

/// Persistence metadata and row mapping for one association record type.
///
/// `DATA_COLUMNS` lists the columns beyond `uuid`/`person_uuid`, in the same
/// order `data_values` binds them.
pub trait LinkRow: PersonLink + Sized {
    const TABLE: &'static str;
    const ENTITY: &'static str;
    const DATA_COLUMNS: &'static [&'static str];

    fn validate(&self) -> Result<(), ValidationError>;
    fn data_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// SQLite-backed repository for one association record type.
pub struct SqliteLinkRepository<'conn, R: LinkRow> {
    conn: &'conn Connection,
    _marker: PhantomData<R>,
}

impl<'conn, R: LinkRow> SqliteLinkRepository<'conn, R> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let mut required: Vec<&'static str> = vec!["uuid", "person_uuid"];
        required.extend_from_slice(R::DATA_COLUMNS);
        ensure_table_ready(conn, R::TABLE, &required)?;
        Ok(Self {
            conn,
            _marker: PhantomData,
        })
    }

    /// Persists a new record. The record must already be attached to a
    /// person; detached records are rejected before any SQL runs.
    pub fn create(&self, record: &R) -> RepoResult<RecordId> {
        record.validate()?;
        let person = record.person().ok_or(RepoError::Validation(
            ValidationError::MissingPerson { entity: R::ENTITY },
        ))?;

        let mut values = vec![
            Value::Text(record.id().to_string()),
            Value::Text(person.to_string()),
        ];
        values.extend(record.data_values());

        self.conn
            .execute(&insert_sql::<R>(), params_from_iter(values))
            .map_err(|err| {
                map_constraint(err, || RepoError::MissingReference {
                    entity: R::ENTITY,
                    id: record.id(),
                })
            })?;

        Ok(record.id())
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<R>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE uuid = ?1;", select_sql::<R>()))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(R::from_row(row)?));
        }

        Ok(None)
    }

    /// Lists the person's collection for this record type, `uuid ASC`.
    pub fn list_for_person(&self, person: PersonId) -> RepoResult<Vec<R>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE person_uuid = ?1 ORDER BY uuid ASC;",
            select_sql::<R>()
        ))?;

        let mut rows = stmt.query([person.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(R::from_row(row)?);
        }

        Ok(records)
    }

    /// Rewrites all fields of an existing record, including its owner.
    pub fn update(&self, record: &R) -> RepoResult<()> {
        record.validate()?;
        let person = record.person().ok_or(RepoError::Validation(
            ValidationError::MissingPerson { entity: R::ENTITY },
        ))?;

        let mut values = vec![Value::Text(person.to_string())];
        values.extend(record.data_values());
        values.push(Value::Text(record.id().to_string()));

        let changed = self
            .conn
            .execute(&update_sql::<R>(), params_from_iter(values))
            .map_err(|err| {
                map_constraint(err, || RepoError::MissingReference {
                    entity: R::ENTITY,
                    id: record.id(),
                })
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: R::ENTITY,
                id: record.id(),
            });
        }

        Ok(())
    }

    /// Moves one record to a new owning person.
    ///
    /// The membership change and the back-reference rewrite are the same
    /// column write, so no intermediate inconsistent state is visible.
    pub fn reassign(&self, id: RecordId, to_person: PersonId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                &format!("UPDATE {} SET person_uuid = ?1 WHERE uuid = ?2;", R::TABLE),
                [to_person.to_string(), id.to_string()],
            )
            .map_err(|err| {
                map_constraint(err, || RepoError::MissingReference {
                    entity: R::ENTITY,
                    id,
                })
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: R::ENTITY,
                id,
            });
        }

        Ok(())
    }

    pub fn delete(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1;", R::TABLE),
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: R::ENTITY,
                id,
            });
        }

        Ok(())
    }
}

fn select_sql<R: LinkRow>() -> String {
    format!(
        "SELECT uuid, person_uuid, {} FROM {}",
        R::DATA_COLUMNS.join(", "),
        R::TABLE
    )
}

fn insert_sql<R: LinkRow>() -> String {
    let placeholders = (1..=R::DATA_COLUMNS.len() + 2)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} (uuid, person_uuid, {}) VALUES ({placeholders});",
        R::TABLE,
        R::DATA_COLUMNS.join(", ")
    )
}

fn update_sql<R: LinkRow>() -> String {
    let mut assignments = vec!["person_uuid = ?1".to_string()];
    for (offset, column) in R::DATA_COLUMNS.iter().enumerate() {
        assignments.push(format!("{column} = ?{}", offset + 2));
    }
    format!(
        "UPDATE {} SET {} WHERE uuid = ?{};",
        R::TABLE,
        assignments.join(", "),
        R::DATA_COLUMNS.len() + 2
    )
}

fn row_ids(row: &Row<'_>, table: &'static str) -> RepoResult<(RecordId, PersonId)> {
    let uuid_text: String = row.get("uuid")?;
    let person_text: String = row.get("person_uuid")?;
    Ok((
        parse_uuid(&uuid_text, table)?,
        parse_uuid(&person_text, table)?,
    ))
}

fn optional_uuid(
    row: &Row<'_>,
    column: &'static str,
    context: &'static str,
) -> RepoResult<Option<uuid::Uuid>> {
    match row.get::<_, Option<String>>(column)? {
        Some(value) => Ok(Some(parse_uuid(&value, context)?)),
        None => Ok(None),
    }
}

impl LinkRow for PersonIdentityField {
    const TABLE: &'static str = "person_identity_fields";
    const ENTITY: &'static str = "person_identity_field";
    const DATA_COLUMNS: &'static [&'static str] = &["type_identity_field_uuid", "value"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonIdentityField::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.type_identity_field.to_string()),
            Value::Text(self.value.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        let type_text: String = row.get("type_identity_field_uuid")?;
        Ok(Self {
            uuid,
            person: Some(person),
            type_identity_field: parse_uuid(&type_text, "person_identity_fields.type")?,
            value: row.get("value")?,
        })
    }
}

impl LinkRow for PersonJob {
    const TABLE: &'static str = "person_jobs";
    const ENTITY: &'static str = "person_job";
    const DATA_COLUMNS: &'static [&'static str] =
        &["job", "company_uuid", "source_uuid", "start_date", "end_date"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonJob::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.job.clone()),
            self.company
                .map_or(Value::Null, |id| Value::Text(id.to_string())),
            Value::Text(self.source.to_string()),
            self.start_date.map_or(Value::Null, Value::Integer),
            self.end_date.map_or(Value::Null, Value::Integer),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        let source_text: String = row.get("source_uuid")?;
        let job = Self {
            uuid,
            person: Some(person),
            job: row.get("job")?,
            company: optional_uuid(row, "company_uuid", "person_jobs.company_uuid")?,
            source: parse_uuid(&source_text, "person_jobs.source_uuid")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
        };
        job.validate()?;
        Ok(job)
    }
}

impl LinkRow for PersonRelative {
    const TABLE: &'static str = "person_relatives";
    const ENTITY: &'static str = "person_relative";
    const DATA_COLUMNS: &'static [&'static str] =
        &["type_relative_uuid", "name", "is_biological"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonRelative::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.type_relative.to_string()),
            Value::Text(self.name.clone()),
            Value::Integer(bool_to_int(self.is_biological)),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        let type_text: String = row.get("type_relative_uuid")?;
        Ok(Self {
            uuid,
            person: Some(person),
            type_relative: parse_uuid(&type_text, "person_relatives.type_relative_uuid")?,
            name: row.get("name")?,
            is_biological: int_to_bool(
                row.get("is_biological")?,
                "person_relatives.is_biological",
            )?,
        })
    }
}

impl LinkRow for PersonSocialStatus {
    const TABLE: &'static str = "person_social_statuses";
    const ENTITY: &'static str = "person_social_status";
    const DATA_COLUMNS: &'static [&'static str] = &["type_social_status_uuid", "name"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonSocialStatus::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.type_social_status.to_string()),
            Value::Text(self.name.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        let type_text: String = row.get("type_social_status_uuid")?;
        Ok(Self {
            uuid,
            person: Some(person),
            type_social_status: parse_uuid(
                &type_text,
                "person_social_statuses.type_social_status_uuid",
            )?,
            name: row.get("name")?,
        })
    }
}

impl LinkRow for PersonSchool {
    const TABLE: &'static str = "person_schools";
    const ENTITY: &'static str = "person_school";
    const DATA_COLUMNS: &'static [&'static str] = &["school_uuid"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonSchool::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![Value::Text(self.school.to_string())]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        let school_text: String = row.get("school_uuid")?;
        Ok(Self {
            uuid,
            person: Some(person),
            school: parse_uuid(&school_text, "person_schools.school_uuid")?,
        })
    }
}

impl LinkRow for PersonCategory {
    const TABLE: &'static str = "person_categories";
    const ENTITY: &'static str = "person_category";
    const DATA_COLUMNS: &'static [&'static str] = &["category_uuid", "name"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonCategory::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.category.to_string()),
            self.name
                .as_ref()
                .map_or(Value::Null, |name| Value::Text(name.clone())),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        let category_text: String = row.get("category_uuid")?;
        Ok(Self {
            uuid,
            person: Some(person),
            category: parse_uuid(&category_text, "person_categories.category_uuid")?,
            name: row.get("name")?,
        })
    }
}

impl LinkRow for PersonPicture {
    const TABLE: &'static str = "person_pictures";
    const ENTITY: &'static str = "person_picture";
    const DATA_COLUMNS: &'static [&'static str] = &["path", "is_main"];

    fn validate(&self) -> Result<(), ValidationError> {
        PersonPicture::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.path.clone()),
            Value::Integer(bool_to_int(self.is_main)),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        Ok(Self {
            uuid,
            person: Some(person),
            path: row.get("path")?,
            is_main: int_to_bool(row.get("is_main")?, "person_pictures.is_main")?,
        })
    }
}

impl LinkRow for Achievement {
    const TABLE: &'static str = "achievements";
    const ENTITY: &'static str = "achievement";
    const DATA_COLUMNS: &'static [&'static str] = &["name", "source_uuid", "achieved_at"];

    fn validate(&self) -> Result<(), ValidationError> {
        Achievement::validate(self)
    }

    fn data_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            self.source
                .map_or(Value::Null, |id| Value::Text(id.to_string())),
            self.achieved_at.map_or(Value::Null, Value::Integer),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let (uuid, person) = row_ids(row, Self::TABLE)?;
        Ok(Self {
            uuid,
            person: Some(person),
            name: row.get("name")?,
            source: optional_uuid(row, "source_uuid", "achievements.source_uuid")?,
            achieved_at: row.get("achieved_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{insert_sql, select_sql, update_sql, LinkRow};
    use crate::model::record::PersonSchool;

    #[test]
    fn generated_sql_covers_all_columns() {
        assert_eq!(
            select_sql::<PersonSchool>(),
            "SELECT uuid, person_uuid, school_uuid FROM person_schools"
        );
        assert_eq!(
            insert_sql::<PersonSchool>(),
            "INSERT INTO person_schools (uuid, person_uuid, school_uuid) VALUES (?1, ?2, ?3);"
        );
        assert_eq!(
            update_sql::<PersonSchool>(),
            "UPDATE person_schools SET person_uuid = ?1, school_uuid = ?2 WHERE uuid = ?3;"
        );
        assert_eq!(PersonSchool::DATA_COLUMNS.len(), 1);
    }
}

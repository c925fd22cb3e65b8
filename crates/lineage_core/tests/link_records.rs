use lineage_core::db::open_db_in_memory;
use lineage_core::model::ValidationError;
use lineage_core::{
    Achievement, LookupKind, LookupRepository, Person, PersonId, PersonJob, PersonLink,
    PersonPicture, PersonRelative, PersonRepository, PersonSchool, RepoError, Source, SourceId,
    SqliteLinkRepository, SqliteLookupRepository, SqlitePersonRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

const NOW_MS: i64 = 1_700_000_000_000;

struct Fixture {
    conn: Connection,
    ada: PersonId,
    grace: PersonId,
    source: SourceId,
    company: Uuid,
    school: Uuid,
    type_relative: Uuid,
}

fn fixture() -> Fixture {
    let conn = open_db_in_memory().unwrap();
    let (ada, grace, source, company, school, type_relative) = {
        let people = SqlitePersonRepository::try_new(&conn).unwrap();
        let mut ada = Person::new("Ada");
        let mut grace = Person::new("Grace");
        people.create_person(&mut ada, NOW_MS).unwrap();
        people.create_person(&mut grace, NOW_MS).unwrap();

        let lookups = SqliteLookupRepository::try_new(&conn).unwrap();
        let source = Source::new("1851 census");
        lookups.create_source(&source).unwrap();
        let company = lookups
            .create_entry(
                LookupKind::Company,
                &lineage_core::LookupEntry::new("Analytical Engines Ltd"),
            )
            .unwrap();
        let school = lookups
            .create_entry(LookupKind::School, &lineage_core::LookupEntry::new("Home tuition"))
            .unwrap();
        let type_relative = lookups
            .create_entry(
                LookupKind::TypeRelative,
                &lineage_core::LookupEntry::new("father"),
            )
            .unwrap();

        (ada.uuid, grace.uuid, source.uuid, company, school, type_relative)
    };

    Fixture {
        conn,
        ada,
        grace,
        source,
        company,
        school,
        type_relative,
    }
}

#[test]
fn job_create_and_get_roundtrip() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.company = Some(fx.company);
    job.start_date = Some(100);
    job.end_date = Some(200);
    job.set_person(Some(fx.ada));
    let id = repo.create(&job).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.person(), Some(fx.ada));
    assert_eq!(loaded.job, "Engineer");
    assert_eq!(loaded.company, Some(fx.company));
    assert_eq!(loaded.source, fx.source);
    assert_eq!(loaded.start_date, Some(100));
    assert_eq!(loaded.end_date, Some(200));
}

#[test]
fn job_without_company_is_valid() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Mathematician", fx.source);
    job.set_person(Some(fx.ada));
    let id = repo.create(&job).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.company, None);
}

#[test]
fn detached_record_is_rejected_before_any_write() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let job = PersonJob::new("Engineer", fx.source);
    let err = repo.create(&job).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingPerson {
            entity: "person_job"
        })
    ));
    assert!(repo.list_for_person(fx.ada).unwrap().is_empty());
}

#[test]
fn missing_source_reference_is_rejected() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", Uuid::new_v4());
    job.set_person(Some(fx.ada));
    let err = repo.create(&job).unwrap_err();
    assert!(matches!(err, RepoError::MissingReference { entity: "person_job", .. }));
}

#[test]
fn inverted_date_range_blocks_create() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.set_person(Some(fx.ada));
    job.start_date = Some(300);
    job.end_date = Some(100);
    let err = repo.create(&job).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidDateRange { .. })
    ));
}

#[test]
fn relative_roundtrip_preserves_is_biological() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonRelative>::try_new(&fx.conn).unwrap();

    let mut relative = PersonRelative::new(fx.type_relative, "Lord Byron");
    relative.is_biological = true;
    relative.set_person(Some(fx.ada));
    let id = repo.create(&relative).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Lord Byron");
    assert!(loaded.is_biological);
    assert_eq!(loaded.type_relative, fx.type_relative);
}

#[test]
fn list_for_person_returns_only_that_persons_records() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonSchool>::try_new(&fx.conn).unwrap();

    let mut ada_school = PersonSchool::new(fx.school);
    ada_school.set_person(Some(fx.ada));
    repo.create(&ada_school).unwrap();

    let mut grace_school = PersonSchool::new(fx.school);
    grace_school.set_person(Some(fx.grace));
    repo.create(&grace_school).unwrap();

    let ada_records = repo.list_for_person(fx.ada).unwrap();
    assert_eq!(ada_records.len(), 1);
    assert_eq!(ada_records[0].uuid, ada_school.uuid);

    let grace_records = repo.list_for_person(fx.grace).unwrap();
    assert_eq!(grace_records.len(), 1);
    assert_eq!(grace_records[0].uuid, grace_school.uuid);
}

#[test]
fn reassign_moves_record_between_collections() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.set_person(Some(fx.ada));
    let id = repo.create(&job).unwrap();

    repo.reassign(id, fx.grace).unwrap();

    assert!(repo.list_for_person(fx.ada).unwrap().is_empty());
    let grace_jobs = repo.list_for_person(fx.grace).unwrap();
    assert_eq!(grace_jobs.len(), 1);
    assert_eq!(grace_jobs[0].person(), Some(fx.grace));
}

#[test]
fn reassign_to_missing_person_is_rejected() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.set_person(Some(fx.ada));
    let id = repo.create(&job).unwrap();

    let err = repo.reassign(id, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepoError::MissingReference { .. }));

    // The failed reassign left the original owner untouched.
    assert_eq!(repo.list_for_person(fx.ada).unwrap().len(), 1);
}

#[test]
fn update_rewrites_fields_and_reports_missing_rows() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.set_person(Some(fx.ada));
    repo.create(&job).unwrap();

    job.job = "Chief Engineer".to_string();
    job.company = Some(fx.company);
    repo.update(&job).unwrap();

    let loaded = repo.get(job.uuid).unwrap().unwrap();
    assert_eq!(loaded.job, "Chief Engineer");
    assert_eq!(loaded.company, Some(fx.company));

    let mut ghost = PersonJob::new("Ghost", fx.source);
    ghost.set_person(Some(fx.ada));
    let err = repo.update(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "person_job", .. }));
}

#[test]
fn delete_removes_record_from_collection() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.set_person(Some(fx.ada));
    let id = repo.create(&job).unwrap();

    repo.delete(id).unwrap();
    assert!(repo.get(id).unwrap().is_none());
    assert!(repo.list_for_person(fx.ada).unwrap().is_empty());

    let err = repo.delete(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn deleting_person_cascades_association_rows() {
    let fx = fixture();
    let people = SqlitePersonRepository::try_new(&fx.conn).unwrap();
    let jobs = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();
    let pictures = SqliteLinkRepository::<PersonPicture>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.set_person(Some(fx.ada));
    jobs.create(&job).unwrap();

    let mut picture = PersonPicture::new("portraits/ada.png");
    picture.set_person(Some(fx.ada));
    pictures.create(&picture).unwrap();

    people.delete_person(fx.ada).unwrap();

    assert!(jobs.get(job.uuid).unwrap().is_none());
    assert!(pictures.get(picture.uuid).unwrap().is_none());
}

#[test]
fn referenced_lookup_rows_cannot_be_deleted() {
    let fx = fixture();
    let lookups = SqliteLookupRepository::try_new(&fx.conn).unwrap();
    let repo = SqliteLinkRepository::<PersonJob>::try_new(&fx.conn).unwrap();

    let mut job = PersonJob::new("Engineer", fx.source);
    job.company = Some(fx.company);
    job.set_person(Some(fx.ada));
    repo.create(&job).unwrap();

    let err = lookups.delete_source(fx.source).unwrap_err();
    assert!(matches!(err, RepoError::StillReferenced { entity: "source", .. }));

    let err = lookups
        .delete_entry(LookupKind::Company, fx.company)
        .unwrap_err();
    assert!(matches!(err, RepoError::StillReferenced { entity: "company", .. }));

    // Once the job is gone both rows become deletable.
    repo.delete(job.uuid).unwrap();
    lookups.delete_source(fx.source).unwrap();
    lookups.delete_entry(LookupKind::Company, fx.company).unwrap();
}

#[test]
fn achievement_roundtrip_with_optional_source() {
    let fx = fixture();
    let repo = SqliteLinkRepository::<Achievement>::try_new(&fx.conn).unwrap();

    let mut achievement = Achievement::new("First published algorithm");
    achievement.source = Some(fx.source);
    achievement.achieved_at = Some(NOW_MS);
    achievement.set_person(Some(fx.ada));
    let id = repo.create(&achievement).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.name, "First published algorithm");
    assert_eq!(loaded.source, Some(fx.source));
    assert_eq!(loaded.achieved_at, Some(NOW_MS));

    let mut unsourced = Achievement::new("Honorary title");
    unsourced.set_person(Some(fx.grace));
    let id = repo.create(&unsourced).unwrap();
    assert_eq!(repo.get(id).unwrap().unwrap().source, None);
}

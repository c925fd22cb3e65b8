use lineage_core::db::migrations::latest_version;
use lineage_core::db::open_db_in_memory;
use lineage_core::{
    NameOrder, Person, PersonListQuery, PersonRepository, RepoError, SqlitePersonRepository,
};
use rusqlite::Connection;

const NOW_MS: i64 = 1_700_000_000_000;

#[test]
fn create_and_get_roundtrip_stamps_equal_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("Ada");
    person.romanized_name = Some("Ada Lovelace".to_string());
    let id = repo.create_person(&mut person, NOW_MS).unwrap();

    assert!(person.is_persisted());
    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded.uuid, person.uuid);
    assert_eq!(loaded.name, "Ada");
    assert_eq!(loaded.romanized_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(loaded.created_at, Some(NOW_MS));
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn update_refreshes_updated_at_and_preserves_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("Ada");
    repo.create_person(&mut person, NOW_MS).unwrap();

    person.name = "Countess Ada".to_string();
    repo.update_person(&mut person, NOW_MS + 5_000).unwrap();

    let loaded = repo.get_person(person.uuid).unwrap().unwrap();
    assert_eq!(loaded.name, "Countess Ada");
    assert_eq!(loaded.created_at, Some(NOW_MS));
    assert_eq!(loaded.updated_at, Some(NOW_MS + 5_000));
    assert!(loaded.updated_at > loaded.created_at);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("Ghost");
    let err = repo.update_person(&mut person, NOW_MS).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { entity: "person", id } if id == person.uuid
    ));
}

#[test]
fn validation_failure_blocks_create() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("   ");
    let err = repo.create_person(&mut person, NOW_MS).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(!person.is_persisted());
    assert_eq!(repo.count_people().unwrap(), 0);
}

#[test]
fn list_orders_by_name_and_supports_descending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    for name in ["Grace", "Ada", "Charles"] {
        repo.create_person(&mut Person::new(name), NOW_MS).unwrap();
    }

    let ascending = repo.list_people(&PersonListQuery::default()).unwrap();
    let names: Vec<&str> = ascending.iter().map(|person| person.name.as_str()).collect();
    assert_eq!(names, ["Ada", "Charles", "Grace"]);

    let descending = repo
        .list_people(&PersonListQuery {
            order: NameOrder::Descending,
            ..PersonListQuery::default()
        })
        .unwrap();
    let names: Vec<&str> = descending
        .iter()
        .map(|person| person.name.as_str())
        .collect();
    assert_eq!(names, ["Grace", "Charles", "Ada"]);
}

#[test]
fn list_search_matches_name_and_romanized_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut ada = Person::new("Ada");
    ada.romanized_name = Some("Ada Lovelace".to_string());
    repo.create_person(&mut ada, NOW_MS).unwrap();
    repo.create_person(&mut Person::new("Grace"), NOW_MS).unwrap();

    let by_name = repo
        .list_people(&PersonListQuery {
            search: Some("grac".to_string()),
            ..PersonListQuery::default()
        })
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Grace");

    let by_romanized = repo
        .list_people(&PersonListQuery {
            search: Some("Lovelace".to_string()),
            ..PersonListQuery::default()
        })
        .unwrap();
    assert_eq!(by_romanized.len(), 1);
    assert_eq!(by_romanized[0].uuid, ada.uuid);

    let none = repo
        .list_people(&PersonListQuery {
            search: Some("Babbage".to_string()),
            ..PersonListQuery::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    for name in ["Ada", "Charles", "Grace", "Hedy"] {
        repo.create_person(&mut Person::new(name), NOW_MS).unwrap();
    }

    let first_page = repo
        .list_people(&PersonListQuery {
            limit: Some(2),
            ..PersonListQuery::default()
        })
        .unwrap();
    let second_page = repo
        .list_people(&PersonListQuery {
            limit: Some(2),
            offset: 2,
            ..PersonListQuery::default()
        })
        .unwrap();

    let names: Vec<&str> = first_page
        .iter()
        .chain(second_page.iter())
        .map(|person| person.name.as_str())
        .collect();
    assert_eq!(names, ["Ada", "Charles", "Grace", "Hedy"]);
}

#[test]
fn count_people_tracks_creates_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_people().unwrap(), 0);

    let mut ada = Person::new("Ada");
    repo.create_person(&mut ada, NOW_MS).unwrap();
    repo.create_person(&mut Person::new("Grace"), NOW_MS).unwrap();
    assert_eq!(repo.count_people().unwrap(), 2);

    repo.delete_person(ada.uuid).unwrap();
    assert_eq!(repo.count_people().unwrap(), 1);
    assert!(repo.get_person(ada.uuid).unwrap().is_none());
}

#[test]
fn delete_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let ghost = Person::new("Ghost");
    let err = repo.delete_person(ghost.uuid).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "person", .. }));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_people_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("people"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_people_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE people (
            uuid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "people",
            column: "romanized_name"
        })
    ));
}

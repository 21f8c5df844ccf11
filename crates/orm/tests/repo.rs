//! Repository tests over a real SQLite backend, plus scripted backends for
//! the stored-procedure surface and the Postgres identity override.

#![allow(missing_docs)]

mod common;

use common::{Event, ProcDb, Setting, User, ann, events_repo, settings_repo, user_meta, users_repo};
use tabula_orm::{
    Db, DbError, DbValue, Error, Field, Filter, Query, RawId, Repository, Row, vendors,
};

#[test]
fn create_then_get_round_trips_every_non_identity_field() {
    common::init_tracing();
    let repo = users_repo();

    let id = repo.create(&ann()).unwrap();
    assert_eq!(id, 1);

    let fetched = repo.get_by_id(&id).unwrap().unwrap();
    assert_eq!(fetched, User { id: 1, ..ann() });
}

#[test]
fn scenario_create_find_patch() {
    let repo = users_repo();

    let id = repo.create(&ann()).unwrap();
    assert_eq!(id, 1);
    assert_eq!(repo.get_by_id(&1).unwrap().unwrap(), User { id: 1, ..ann() });

    let adults = repo.find_by_query(&Query::new().filter(Filter::gt("age", 20))).unwrap();
    assert_eq!(adults.len(), 1);
    assert_eq!(adults[0].name, "Ann");

    let patched = repo
        .patch_by_query(&Query::new().set("age", 31).filter(Filter::eq("name", "Ann")))
        .unwrap();
    assert_eq!(patched, 1);
    assert_eq!(repo.get_by_id(&1).unwrap().unwrap().age, 31);
}

#[test]
fn get_by_ids_returns_only_existing_rows() {
    let repo = users_repo();
    repo.create(&ann()).unwrap();
    repo.create(&User { name: "Bob".to_string(), ..ann() }).unwrap();
    repo.create(&User { name: "Cat".to_string(), ..ann() }).unwrap();
    repo.delete_by_id(&2).unwrap();

    let found = repo.get_by_ids(&[1, 2, 3]).unwrap();
    assert_eq!(found.len(), 2);

    assert!(repo.get_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn update_reports_affected_rows_as_flag() {
    let repo = users_repo();
    let id = repo.create(&ann()).unwrap();

    let mut stored = repo.get_by_id(&id).unwrap().unwrap();
    stored.age = 44;
    assert!(repo.update(&stored).unwrap());
    assert_eq!(repo.get_by_id(&id).unwrap().unwrap().age, 44);

    let ghost = User { id: 999, ..ann() };
    assert!(!repo.update(&ghost).unwrap());
}

#[test]
fn delete_is_idempotent_false() {
    let repo = users_repo();
    let id = repo.create(&ann()).unwrap();

    assert!(repo.delete_by_id(&id).unwrap());
    assert!(repo.get_by_id(&id).unwrap().is_none());
    assert!(!repo.delete_by_id(&id).unwrap());
}

#[test]
fn counts_track_inserts_and_bulk_deletes() {
    let repo = users_repo();
    assert_eq!(repo.count().unwrap(), 0);
    assert!(!repo.any().unwrap());

    for n in 0..4 {
        repo.create(&User { name: format!("u{n}"), ..ann() }).unwrap();
    }
    assert_eq!(repo.count().unwrap(), 4);
    assert!(repo.any().unwrap());

    assert_eq!(repo.delete_by_ids(&[1, 2]).unwrap(), 2);
    assert_eq!(repo.delete_by_ids(&[]).unwrap(), 0);
    assert_eq!(repo.count().unwrap(), 2);

    assert_eq!(repo.delete_all().unwrap(), 2);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn seq_is_bounded_and_ordered_by_identity() {
    let repo = users_repo();
    for n in 0..5 {
        repo.create(&User { name: format!("u{n}"), ..ann() }).unwrap();
    }

    let newest = repo.seq(2, true).unwrap();
    let ids: Vec<i64> = newest.iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![5, 4]);

    let oldest = repo.seq(2, false).unwrap();
    let ids: Vec<i64> = oldest.iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn query_surface_finds_counts_and_deletes() {
    let repo = users_repo();
    repo.create(&User { name: "Ann".to_string(), age: 30, ..ann() }).unwrap();
    repo.create(&User { name: "Bob".to_string(), age: 17, ..ann() }).unwrap();
    repo.create(&User { name: "Cat".to_string(), age: 52, ..ann() }).unwrap();

    let adults = repo
        .find_by_query(&Query::new().filter(Filter::gt("age", 20)).order_by_desc("age"))
        .unwrap();
    let names: Vec<&str> = adults.iter().map(|user| user.name.as_str()).collect();
    assert_eq!(names, vec!["Cat", "Ann"]);

    assert_eq!(repo.count_by_query(&Query::new().filter(Filter::lt("age", 20))).unwrap(), 1);

    let first = repo
        .find_one_by_query(&Query::new().filter(Filter::like("name", "B%")))
        .unwrap()
        .unwrap();
    assert_eq!(first.name, "Bob");

    assert_eq!(
        repo.delete_by_query(&Query::new().filter(Filter::lt("age", 20))).unwrap(),
        1
    );
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn malformed_query_fails_before_any_side_effect() {
    let repo = users_repo();
    repo.create(&ann()).unwrap();

    let bad = Query::new().filter(Filter::In("age", Vec::new()));
    assert!(matches!(repo.delete_by_query(&bad), Err(Error::Query(_))));
    // Nothing executed.
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn assigned_identity_create_echoes_the_callers_key() {
    let repo = settings_repo();
    let setting = Setting { code: "theme".to_string(), value: "dark".to_string() };

    let id = repo.create(&setting).unwrap();
    assert_eq!(id, "theme");

    assert_eq!(repo.get_by_id(&id).unwrap().unwrap(), setting);
    assert!(repo.exists(&id).unwrap());
    assert!(repo.delete(&setting).unwrap());
    assert!(!repo.exists(&id).unwrap());
}

#[test]
fn timestamps_round_trip_through_text_storage() {
    let repo = events_repo();
    let occurred_at = "2024-01-15T10:30:45Z".parse().unwrap();

    let id = repo.create(&Event { id: 0, occurred_at }).unwrap();
    let stored = repo.get_by_id(&id).unwrap().unwrap();
    assert_eq!(stored.occurred_at, occurred_at);
}

#[test]
fn malformed_stored_value_is_a_conversion_error_with_no_partial_entity() {
    let repo = events_repo();
    repo.db()
        .execute("INSERT INTO events (occurred_at) VALUES ('yesterday')", &[])
        .unwrap();

    let err = repo.get_by_id(&1).unwrap_err();
    assert!(matches!(err, Error::Convert(_)));
}

#[test]
fn backend_errors_propagate_verbatim() {
    let repo = users_repo();
    // Second table with the same schema does not exist; statement fails.
    repo.db().execute("DROP TABLE users", &[]).unwrap();

    let err = repo.count().unwrap_err();
    assert!(matches!(err, Error::Db(DbError::Statement(_))));
}

// Stored-procedure surface, over a scripted backend.

#[test]
fn proc_operations_convert_arguments_and_results() {
    let mut db = ProcDb::new();
    db.raw_id = RawId::Long(7);
    db.affected = 2;
    db.rows = vec![Row {
        fields: vec![
            Field { name: "id".to_string(), value: DbValue::Long(Some(7)) },
            Field { name: "name".to_string(), value: DbValue::Text(Some("Ann".to_string())) },
            Field { name: "age".to_string(), value: DbValue::Long(Some(30)) },
            Field { name: "active".to_string(), value: DbValue::Long(Some(1)) },
        ],
    }];
    let repo = vendors::mysql::repo(db, user_meta());

    let id = repo.create_by_proc("user_create", vec!["Ann".into(), 30.into()]).unwrap();
    assert_eq!(id, 7);

    assert_eq!(repo.update_by_proc("user_touch", vec![7.into()]).unwrap(), 2);
    assert_eq!(repo.delete_by_proc("user_purge", vec![]).unwrap(), 2);

    let found = repo.find_by_proc("user_find", vec![7.into()]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Ann");

    let calls = repo.db().calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["user_create/2", "user_touch/1", "user_purge/0", "user_find/1"]);
}

#[test]
fn proc_calls_surface_backend_unsupported() {
    let db = tabula_sql::SqliteDb::in_memory().unwrap();
    db.execute(
        "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER, active INTEGER)",
        &[],
    )
    .unwrap();
    let repo = vendors::sqlite::repo(db, user_meta());

    let err = repo.update_by_proc("noop", vec![]).unwrap_err();
    assert!(matches!(err, Error::Db(DbError::Unsupported(_))));
}

// Postgres identity override, over a scripted backend.

struct ReturningDb {
    row: Row,
}

impl Db for ReturningDb {
    fn execute(&self, _: &str, _: &[DbValue]) -> Result<u64, DbError> {
        Err(DbError::Unsupported("returning backend".to_string()))
    }

    fn insert_returning_id(&self, _: &str, _: &[DbValue]) -> Result<RawId, DbError> {
        Err(DbError::Unsupported("identity comes back as a row".to_string()))
    }

    fn query(&self, sql: &str, _: &[DbValue]) -> Result<Vec<Row>, DbError> {
        assert!(sql.contains("RETURNING"), "expected a RETURNING insert, got `{sql}`");
        Ok(vec![self.row.clone()])
    }

    fn scalar_long(&self, _: &str, _: &[DbValue]) -> Result<i64, DbError> {
        Err(DbError::Unsupported("returning backend".to_string()))
    }

    fn call_create(&self, _: &str, _: &[DbValue]) -> Result<RawId, DbError> {
        Err(DbError::Unsupported("returning backend".to_string()))
    }

    fn call_update(&self, _: &str, _: &[DbValue]) -> Result<u64, DbError> {
        Err(DbError::Unsupported("returning backend".to_string()))
    }

    fn call_query(&self, _: &str, _: &[DbValue]) -> Result<Vec<Row>, DbError> {
        Err(DbError::Unsupported("returning backend".to_string()))
    }
}

#[test]
fn postgres_create_reads_identity_from_the_returned_row() {
    let db = ReturningDb {
        row: Row { fields: vec![Field { name: "id".to_string(), value: DbValue::Long(Some(41)) }] },
    };
    let repo = vendors::postgres::repo(db, user_meta());

    let id = repo.create(&ann()).unwrap();
    assert_eq!(id, 41);
}

#[test]
fn postgres_create_rejects_an_identityless_row() {
    let db = ReturningDb { row: Row { fields: Vec::new() } };
    let repo = vendors::postgres::repo(db, user_meta());

    let err = repo.create(&ann()).unwrap_err();
    assert!(matches!(err, Error::Convert(_)));
}

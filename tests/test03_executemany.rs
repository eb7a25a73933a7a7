use std::cell::RefCell;
use std::rc::Rc;

use sql_reactor::prelude::*;
use sql_reactor::test_utils::{ScriptHandle, ScriptedDriver, ScriptedResponse};

const FD: Descriptor = Descriptor(31);

fn setup() -> (Connection<ScriptedDriver>, ScriptHandle, ManualEventLoop) {
    let (driver, script) = ScriptedDriver::new(FD);
    let event_loop = ManualEventLoop::new();
    let conn = Connection::new(driver, event_loop.clone());
    (conn, script, event_loop)
}

fn tuples() -> Vec<Vec<RowValues>> {
    vec![
        vec![RowValues::Int(1), RowValues::Text("a".into())],
        vec![RowValues::Int(2), RowValues::Text("b".into())],
        vec![RowValues::Int(3), RowValues::Text("c".into())],
    ]
}

#[test]
fn three_tuples_become_one_statement() -> Result<(), Box<dyn std::error::Error>> {
    let (conn, script, event_loop) = setup();
    script.push_response(ScriptedResponse::affected(3, 12));
    let last_id = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&last_id);

    conn.executemany(
        "INSERT INTO t (a, b) VALUES (%s, %s)",
        &tuples(),
        Callbacks::new(move |id: u64| *slot.borrow_mut() = Some(id)),
    )?;

    assert_eq!(
        script.transmitted(),
        vec!["INSERT INTO t (a, b) VALUES (1, 'a'), (2, 'b'), (3, 'c')".to_string()]
    );
    event_loop.fire(FD, Interest::Readable)?;
    assert_eq!(*last_id.borrow(), Some(12));
    assert_eq!(script.result_reads(), 1);
    Ok(())
}

#[test]
fn executemany_rowcount_counts_all_tuples() -> Result<(), Box<dyn std::error::Error>> {
    let (conn, script, event_loop) = setup();
    script.push_response(ScriptedResponse::affected(3, 12));
    let count = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&count);

    conn.executemany_rowcount(
        "INSERT INTO t (a, b) VALUES (%s, %s) ON DUPLICATE KEY UPDATE b = VALUES(b)",
        &tuples(),
        Callbacks::new(move |rows: u64| *slot.borrow_mut() = Some(rows)),
    )?;
    event_loop.fire(FD, Interest::Readable)?;

    assert_eq!(*count.borrow(), Some(3));
    assert_eq!(
        script.transmitted(),
        vec![
            "INSERT INTO t (a, b) VALUES (1, 'a'), (2, 'b'), (3, 'c') ON DUPLICATE KEY UPDATE b = VALUES(b)"
                .to_string()
        ]
    );
    Ok(())
}

#[test]
fn executemany_lastrowid_escapes_every_tuple() -> Result<(), Box<dyn std::error::Error>> {
    let (conn, script, _event_loop) = setup();
    conn.executemany_lastrowid(
        "insert into notes (body) values (%s)",
        &[
            vec![RowValues::Text("it's".into())],
            vec![RowValues::Text("line\nbreak".into())],
        ],
        Callbacks::none(),
    )?;
    assert_eq!(
        script.transmitted(),
        vec![r"insert into notes (body) values ('it\'s'), ('line\nbreak')".to_string()]
    );
    Ok(())
}

#[test]
fn empty_batch_is_a_parameter_error() {
    let (conn, script, event_loop) = setup();
    let err = conn
        .executemany("INSERT INTO t (a) VALUES (%s)", &[], Callbacks::none())
        .unwrap_err();
    assert!(matches!(err, SqlReactorError::ParameterError(_)));
    assert!(script.transmitted().is_empty());
    assert_eq!(event_loop.registered_count(), 0);
}

#[test]
fn missing_values_clause_sends_statement_unmodified() -> Result<(), Box<dyn std::error::Error>> {
    let (conn, script, _event_loop) = setup();
    conn.executemany(
        "DELETE FROM t WHERE id = %s",
        &[vec![RowValues::Int(1)]],
        Callbacks::none(),
    )?;
    assert_eq!(
        script.transmitted(),
        vec!["DELETE FROM t WHERE id = %s".to_string()]
    );
    Ok(())
}

#[test]
fn missing_values_clause_can_be_rejected() {
    let (conn, script, _event_loop) = setup();
    conn.set_values_clause_miss(ValuesClauseMiss::Reject);
    let err = conn
        .executemany(
            "DELETE FROM t WHERE id = %s",
            &[vec![RowValues::Int(1)]],
            Callbacks::none(),
        )
        .unwrap_err();
    assert!(matches!(err, SqlReactorError::ParameterError(_)));
    assert!(script.transmitted().is_empty());
}

#[test]
fn tuple_arity_mismatch_fails_whole_batch() {
    let (conn, script, _event_loop) = setup();
    let err = conn
        .executemany(
            "INSERT INTO t (a, b) VALUES (%s, %s)",
            &[
                vec![RowValues::Int(1), RowValues::Int(2)],
                vec![RowValues::Int(3)],
            ],
            Callbacks::none(),
        )
        .unwrap_err();
    assert!(matches!(err, SqlReactorError::ParameterError(_)));
    assert!(script.transmitted().is_empty());
}

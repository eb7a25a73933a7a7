use sql_reactor::prelude::*;
use sql_reactor::test_utils::{ScriptHandle, ScriptedDriver, ScriptedResponse};
use tokio::runtime::Runtime;

const FD: Descriptor = Descriptor(51);

fn setup() -> (Connection<ScriptedDriver>, ScriptHandle, ManualEventLoop) {
    let (driver, script) = ScriptedDriver::new(FD);
    let event_loop = ManualEventLoop::new();
    let conn = Connection::new(driver, event_loop.clone());
    (conn, script, event_loop)
}

#[test]
fn futures_resolve_once_the_loop_fires() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let (conn, script, event_loop) = setup();
        script.push_response(ScriptedResponse::rows(
            &["id", "name"],
            vec![
                vec![RowValues::Int(1), RowValues::Text("a".into())],
                vec![RowValues::Int(2), RowValues::Text("b".into())],
            ],
        ));
        script.push_response(ScriptedResponse::rows(&["n"], vec![vec![RowValues::Int(2)]]));
        script.push_response(ScriptedResponse::affected(1, 3));
        script.push_response(ScriptedResponse::affected(2, 0));

        let rows = conn.query_async("SELECT id, name FROM t", &[]);
        let item = conn.get_async("SELECT COUNT(*) AS n FROM t", &[]);
        let inserted = conn.execute_async(
            "INSERT INTO t (name) VALUES (%s)",
            &[RowValues::Text("c".into())],
        );
        let updated = conn.execute_rowcount_async("UPDATE t SET name = UPPER(name)", &[]);

        for _ in 0..4 {
            event_loop.fire(FD, Interest::Readable)?;
        }

        let rows = rows.await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("name").and_then(RowValues::as_text), Some("b"));

        let item = item.await?.expect("one row");
        assert_eq!(item.get("n"), Some(&RowValues::Int(2)));

        assert_eq!(inserted.await?, 3);
        assert_eq!(updated.await?, 2);
        Ok::<(), SqlReactorError>(())
    })?;
    Ok(())
}

#[test]
fn batched_futures_resolve() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let (conn, script, event_loop) = setup();
        script.push_response(ScriptedResponse::affected(2, 40));
        script.push_response(ScriptedResponse::affected(2, 42));
        script.push_response(ScriptedResponse::affected(2, 0));
        let tuples = vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]];

        let many = conn.executemany_async("INSERT INTO t (a) VALUES (%s)", &tuples);
        let last = conn.executemany_lastrowid_async("INSERT INTO t (a) VALUES (%s)", &tuples);
        let count = conn.executemany_rowcount_async("INSERT INTO t (a) VALUES (%s)", &tuples);
        let single = conn.execute_lastrowid_async("SELECT 1", &[]);

        for _ in 0..3 {
            event_loop.fire(FD, Interest::Readable)?;
        }
        assert_eq!(many.await?, 40);
        assert_eq!(last.await?, 42);
        assert_eq!(count.await?, 2);
        assert_eq!(
            script.transmitted()[0],
            "INSERT INTO t (a) VALUES (1), (2)".to_string()
        );

        conn.close();
        assert!(matches!(single.await, Err(SqlReactorError::ConnectionClosed)));
        Ok::<(), SqlReactorError>(())
    })?;
    Ok(())
}

#[test]
fn failures_surface_through_the_future() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let (conn, script, event_loop) = setup();
        script.push_response(ScriptedResponse::rows(
            &["id"],
            vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]],
        ));

        let item = conn.get_async("SELECT id FROM t", &[]);
        // rejected before anything is sent
        let bad = conn.query_async("SELECT %s", &[]);
        let empty = conn.executemany_async("INSERT INTO t (a) VALUES (%s)", &[]);

        event_loop.fire(FD, Interest::Readable)?;

        assert!(matches!(item.await, Err(SqlReactorError::MultipleRows { count: 2 })));
        assert!(matches!(bad.await, Err(SqlReactorError::ParameterError(_))));
        assert!(matches!(empty.await, Err(SqlReactorError::ParameterError(_))));
        assert_eq!(script.transmitted().len(), 1);
        Ok::<(), SqlReactorError>(())
    })?;
    Ok(())
}

#[test]
fn dropping_connection_rejects_pending_future() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let (conn, _script, _event_loop) = setup();
        let pending = conn.query_async("SELECT 1", &[]);
        drop(conn);
        assert!(matches!(pending.await, Err(SqlReactorError::ConnectionClosed)));
    });
    Ok(())
}

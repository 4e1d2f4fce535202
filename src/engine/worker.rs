use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::SqliteWrapperError;

use super::execute::execute;
use super::queue::PendingOperation;
use super::{Output, Shared, lock};

pub(super) fn spawn(shared: Arc<Shared>, name: &str) -> Result<JoinHandle<()>, SqliteWrapperError> {
    thread::Builder::new()
        .name(format!("sqlite-wrapper-{name}"))
        .spawn(move || run_worker(&shared))
        .map_err(|err| {
            SqliteWrapperError::Connection(format!("failed to spawn worker thread: {err}"))
        })
}

fn run_worker(shared: &Shared) {
    while let Some(operation) = next_operation(shared) {
        let result = {
            let mut conn = lock(&shared.connection);
            match conn.as_mut() {
                Some(conn) => {
                    tracing::debug!(
                        id = %operation.id,
                        kind = operation.kind.label(),
                        sql = operation.statement.sql(),
                        "executing"
                    );
                    execute(conn, operation.kind, &operation.statement)
                }
                None => Err(SqliteWrapperError::Closed(
                    "connection is no longer open".into(),
                )),
            }
        };
        settle(shared, operation, result);
    }
    tracing::debug!("worker stopped");
}

/// Block until there is work, `None` once the engine is closed.
fn next_operation(shared: &Shared) -> Option<PendingOperation> {
    let mut state = lock(&shared.state);
    loop {
        if !state.alive {
            return None;
        }
        if let Some(operation) = state.queues.pop_next() {
            state.in_flight = Some(operation.id);
            return Some(operation);
        }
        state = shared.wait(state);
    }
}

fn settle(
    shared: &Shared,
    operation: PendingOperation,
    result: Result<Output, SqliteWrapperError>,
) {
    let PendingOperation {
        id,
        kind,
        wait,
        respond_to,
        ..
    } = operation;

    let mut state = lock(&shared.state);
    state.in_flight = None;
    if let Some(respond_to) = respond_to {
        let _ = respond_to.send(result);
    } else if wait {
        let previous = state.completed.insert(id, result);
        debug_assert!(previous.is_none(), "duplicate correlation id {id}");
    } else if let Err(err) = result {
        tracing::warn!(id = %id, kind = kind.label(), error = %err, "detached operation failed");
    }
    drop(state);
    shared.signal.notify_all();
}

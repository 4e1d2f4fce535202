//! Serialized statement execution over one connection.
//!
//! In inline mode every statement runs on the calling thread under the
//! connection lock. In worker mode statements are queued (reads ahead of
//! writes) and a dedicated thread executes them; callers that want the outcome
//! block on a condition variable until their correlation id is settled, or
//! await a oneshot channel on the async path.

mod execute;
mod queue;
mod worker;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use rusqlite::Connection;
use tokio::sync::oneshot;

use crate::error::SqliteWrapperError;
use crate::query_builder::QueryNode;
use crate::results::{Fetched, ResultSet};

use queue::{OperationQueues, PendingOperation};

/// Links a submitted statement to its outcome. Unique for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(u64);

impl CorrelationId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Whether `run` blocks until the statement has executed.
///
/// Reads always deliver their rows, so only writes can be detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// Use the database's `await_completion` setting.
    #[default]
    EngineDefault,
    Wait,
    Detach,
}

impl Completion {
    #[must_use]
    pub fn resolve(self, engine_default: bool) -> bool {
        match self {
            Completion::EngineDefault => engine_default,
            Completion::Wait => true,
            Completion::Detach => false,
        }
    }
}

impl From<bool> for Completion {
    fn from(wait: bool) -> Self {
        if wait {
            Completion::Wait
        } else {
            Completion::Detach
        }
    }
}

/// How a read's rows are shaped once fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadShape {
    Raw,
    First { simplify: bool },
    All { simplify: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Read(ReadShape),
    Write,
}

impl OperationKind {
    pub(crate) fn is_read(self) -> bool {
        matches!(self, OperationKind::Read(_))
    }

    fn label(self) -> &'static str {
        match self {
            OperationKind::Read(_) => "read",
            OperationKind::Write => "write",
        }
    }
}

#[derive(Debug)]
pub(crate) enum Output {
    Written,
    Rows(ResultSet),
    Fetched(Fetched),
}

impl Output {
    pub(crate) fn into_fetched(self) -> Fetched {
        match self {
            Output::Fetched(fetched) => fetched,
            Output::Rows(result_set) => Fetched::Rows(result_set.rows),
            Output::Written => Fetched::NoRow,
        }
    }

    pub(crate) fn into_result_set(self) -> ResultSet {
        match self {
            Output::Rows(result_set) => result_set,
            Output::Fetched(_) | Output::Written => ResultSet::default(),
        }
    }
}

struct EngineState {
    alive: bool,
    queues: OperationQueues,
    /// Outcomes of operations a synchronous caller is blocked on.
    completed: HashMap<CorrelationId, Result<Output, SqliteWrapperError>>,
    in_flight: Option<CorrelationId>,
}

pub(crate) struct Shared {
    state: Mutex<EngineState>,
    signal: Condvar,
    connection: Mutex<Option<Connection>>,
    next_id: AtomicU64,
}

impl Shared {
    fn wait<'a>(&self, guard: MutexGuard<'a, EngineState>) -> MutexGuard<'a, EngineState> {
        self.signal
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the connection, the two queues, and (in worker mode) the worker thread.
pub(crate) struct Engine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    separate_thread: bool,
    default_await: bool,
}

impl Engine {
    /// Take ownership of `conn`; spawns the worker when `separate_thread` is set.
    ///
    /// # Errors
    /// `SqliteWrapperError::Connection` if the worker thread cannot be spawned.
    pub(crate) fn start(
        conn: Connection,
        name: &str,
        separate_thread: bool,
        default_await: bool,
    ) -> Result<Self, SqliteWrapperError> {
        let shared = Arc::new(Shared {
            state: Mutex::new(EngineState {
                alive: true,
                queues: OperationQueues::default(),
                completed: HashMap::new(),
                in_flight: None,
            }),
            signal: Condvar::new(),
            connection: Mutex::new(Some(conn)),
            next_id: AtomicU64::new(1),
        });
        let worker = if separate_thread {
            Some(worker::spawn(Arc::clone(&shared), name)?)
        } else {
            None
        };
        Ok(Self {
            shared,
            worker: Mutex::new(worker),
            separate_thread,
            default_await,
        })
    }

    #[must_use]
    pub(crate) fn separate_thread(&self) -> bool {
        self.separate_thread
    }

    #[must_use]
    pub(crate) fn is_alive(&self) -> bool {
        lock(&self.shared.state).alive
    }

    /// Pending operations plus the one executing.
    #[must_use]
    pub(crate) fn queue_len(&self) -> usize {
        let state = lock(&self.shared.state);
        state.queues.len() + usize::from(state.in_flight.is_some())
    }

    fn next_id(&self) -> CorrelationId {
        CorrelationId(self.shared.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Execute, or enqueue, one statement.
    ///
    /// Returns `None` only for a detached write in worker mode.
    ///
    /// # Errors
    /// `Closed` if the engine is closed, `Query` if the statement fails, or
    /// `Interrupted` if the operation was still queued when the engine closed.
    pub(crate) fn submit(
        &self,
        kind: OperationKind,
        statement: QueryNode,
        completion: Completion,
    ) -> Result<Option<Output>, SqliteWrapperError> {
        if !self.separate_thread {
            return self.execute_inline(kind, &statement).map(Some);
        }

        let wait = kind.is_read() || completion.resolve(self.default_await);
        let id = self.next_id();
        self.enqueue(PendingOperation {
            id,
            kind,
            wait,
            statement,
            respond_to: None,
        })?;
        if !wait {
            return Ok(None);
        }
        self.await_completion(id).map(Some)
    }

    /// Like [`Engine::submit`], but awaits completion without blocking the thread.
    ///
    /// # Errors
    /// As for [`Engine::submit`].
    pub(crate) async fn submit_async(
        &self,
        kind: OperationKind,
        statement: QueryNode,
    ) -> Result<Output, SqliteWrapperError> {
        if !self.separate_thread {
            return self.execute_inline(kind, &statement);
        }

        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.enqueue(PendingOperation {
            id,
            kind,
            wait: true,
            statement,
            respond_to: Some(tx),
        })?;
        rx.await
            .map_err(|_| SqliteWrapperError::Interrupted(id))?
    }

    fn execute_inline(
        &self,
        kind: OperationKind,
        statement: &QueryNode,
    ) -> Result<Output, SqliteWrapperError> {
        let mut conn = lock(&self.shared.connection);
        let conn = conn.as_mut().ok_or_else(|| {
            SqliteWrapperError::Closed("cannot run query in a closed database".into())
        })?;
        tracing::debug!(kind = kind.label(), sql = statement.sql(), "executing inline");
        execute::execute(conn, kind, statement)
    }

    fn enqueue(&self, operation: PendingOperation) -> Result<(), SqliteWrapperError> {
        {
            let mut state = lock(&self.shared.state);
            if !state.alive {
                return Err(SqliteWrapperError::Closed(
                    "cannot run query in a closed database".into(),
                ));
            }
            tracing::debug!(
                id = %operation.id,
                kind = operation.kind.label(),
                wait = operation.wait,
                sql = operation.statement.sql(),
                "queued"
            );
            state.queues.push(operation);
        }
        self.shared.signal.notify_all();
        Ok(())
    }

    fn await_completion(&self, id: CorrelationId) -> Result<Output, SqliteWrapperError> {
        let mut state = lock(&self.shared.state);
        loop {
            if let Some(result) = state.completed.remove(&id) {
                return result;
            }
            if !state.alive && state.in_flight != Some(id) {
                return Err(SqliteWrapperError::Closed(
                    "cannot await completion from closed database".into(),
                ));
            }
            state = self.shared.wait(state);
        }
    }

    /// Block until both queues are empty and nothing is executing.
    ///
    /// # Errors
    /// `SqliteWrapperError::Closed` if the engine is (or becomes) closed.
    pub(crate) fn wait_for_queue(&self) -> Result<(), SqliteWrapperError> {
        let mut state = lock(&self.shared.state);
        loop {
            if !state.alive {
                return Err(SqliteWrapperError::Closed(
                    "cannot wait for queue in closed database".into(),
                ));
            }
            if state.queues.is_empty() && state.in_flight.is_none() {
                return Ok(());
            }
            state = self.shared.wait(state);
        }
    }

    /// Stop accepting work, answer queued operations with `Interrupted`, and
    /// close the connection. The statement already executing still completes.
    ///
    /// # Errors
    /// `Closed` if already closed, `Connection` if the worker panicked, or the
    /// engine's own error if the connection fails to close.
    pub(crate) fn close(&self, ignore_queue: bool) -> Result<(), SqliteWrapperError> {
        if !self.is_alive() {
            return Err(SqliteWrapperError::Closed("database is already closed".into()));
        }
        if !ignore_queue {
            self.wait_for_queue()?;
        }

        let interrupted = {
            let mut state = lock(&self.shared.state);
            if !state.alive {
                return Err(SqliteWrapperError::Closed("database is already closed".into()));
            }
            state.alive = false;
            let drained = state.queues.drain();
            let count = drained.len();
            for operation in drained {
                // async submitters see their channel close
                if operation.respond_to.is_none() && operation.wait {
                    state
                        .completed
                        .insert(operation.id, Err(SqliteWrapperError::Interrupted(operation.id)));
                }
            }
            count
        };
        self.shared.signal.notify_all();

        let mut outcome = Ok(());
        if let Some(handle) = lock(&self.worker).take() {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
                outcome = Err(SqliteWrapperError::Connection("worker thread panicked".into()));
            }
        }

        if let Some(conn) = lock(&self.shared.connection).take() {
            conn.close().map_err(|(_, err)| err)?;
        }
        tracing::info!(interrupted, "engine closed");
        outcome
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.is_alive() {
            if let Err(err) = self.close(false) {
                tracing::warn!(error = %err, "failed to close database on drop");
            }
        }
    }
}

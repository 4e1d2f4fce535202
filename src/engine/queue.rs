use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::error::SqliteWrapperError;
use crate::query_builder::QueryNode;

use super::{CorrelationId, OperationKind, Output};

pub(super) type Responder = oneshot::Sender<Result<Output, SqliteWrapperError>>;

/// A submitted statement waiting for the worker.
pub(super) struct PendingOperation {
    pub(super) id: CorrelationId,
    pub(super) kind: OperationKind,
    /// A synchronous caller is blocked on this id.
    pub(super) wait: bool,
    pub(super) statement: QueryNode,
    /// Set for async submissions; the result goes here instead of the completed map.
    pub(super) respond_to: Option<Responder>,
}

/// Read and write FIFOs. Reads are always taken first.
#[derive(Default)]
pub(super) struct OperationQueues {
    reads: VecDeque<PendingOperation>,
    writes: VecDeque<PendingOperation>,
}

impl OperationQueues {
    pub(super) fn push(&mut self, operation: PendingOperation) {
        if operation.kind.is_read() {
            self.reads.push_back(operation);
        } else {
            self.writes.push_back(operation);
        }
    }

    pub(super) fn pop_next(&mut self) -> Option<PendingOperation> {
        self.reads.pop_front().or_else(|| self.writes.pop_front())
    }

    pub(super) fn len(&self) -> usize {
        self.reads.len() + self.writes.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    /// Empty both queues, reads first.
    pub(super) fn drain(&mut self) -> Vec<PendingOperation> {
        self.reads.drain(..).chain(self.writes.drain(..)).collect()
    }
}

//! Dispatch from the prompt to the controller worker queue.

use client_core::{InflightActions, InflightGuard};
use tokio::sync::mpsc::{error::TrySendError, Sender};

use crate::commands::WorkerRequest;

/// A request on its way to the worker. `claim` keeps the command's action
/// busy from the moment it is queued until the worker finishes it.
#[derive(Debug)]
pub struct QueuedRequest {
    pub request: WorkerRequest,
    pub claim: Option<InflightGuard>,
}

pub fn dispatch_worker_request(
    tx: &Sender<QueuedRequest>,
    inflight: &InflightActions,
    request: WorkerRequest,
    status: &mut String,
) -> bool {
    let name = match &request {
        WorkerRequest::Run(command) => command.name(),
        WorkerRequest::Show(_) => "show",
    };

    let claim = match &request {
        WorkerRequest::Run(command) => match command.action() {
            Some(action) => match inflight.try_begin(action) {
                Some(guard) => Some(guard),
                None => {
                    *status = format!("{action} is still running; wait for it to finish");
                    return false;
                }
            },
            None => None,
        },
        WorkerRequest::Show(_) => None,
    };

    // A rejected send drops the request and with it the claim.
    match tx.try_send(QueuedRequest { request, claim }) {
        Ok(()) => {
            tracing::debug!(request = name, "queued prompt->worker request");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Closed(_)) => {
            *status = "controller worker stopped; restart the client".to_string();
            false
        }
    }
}

//! Task that owns the controller and runs queued requests in order.
//!
//! `show` requests wait behind a running command. Notifications are read
//! from the shared board by the prompt instead.

use std::path::PathBuf;

use client_core::{CommandOutcome, ViewController};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error};

use crate::{
    commands::{View, WorkerRequest},
    orchestration::QueuedRequest,
    render,
};

pub async fn run_worker(
    mut controller: ViewController,
    mut rx: Receiver<QueuedRequest>,
    export_dir: PathBuf,
) {
    while let Some(QueuedRequest { request, claim }) = rx.recv().await {
        match request {
            WorkerRequest::Run(command) => {
                let name = command.name();
                match controller.dispatch_claimed(command, claim).await {
                    Ok(CommandOutcome::Exported(artifact)) => {
                        match artifact.write_into(&export_dir).await {
                            Ok(path) => println!("saved {}", path.display()),
                            Err(err) => {
                                error!(error = %err, "failed to save export");
                                println!("failed to save export: {err:#}");
                            }
                        }
                    }
                    Ok(CommandOutcome::Reclustered(_) | CommandOutcome::Done) => {}
                    // Already surfaced as a notification.
                    Err(err) => debug!(command = name, error = %err, "command failed"),
                }
            }
            WorkerRequest::Show(view) => println!("{}", show(&controller, view)),
        }
    }
    debug!("prompt closed; controller worker exiting");
}

fn show(controller: &ViewController, view: View) -> String {
    match view {
        View::Stats => controller
            .stats()
            .map(render::render_stats)
            .unwrap_or_else(|| "statistics not loaded".to_string()),
        View::Clusters => render::render_clusters(controller.clusters(), controller.ratings()),
        View::Results => controller
            .last_result()
            .map(render::render_recommendations)
            .unwrap_or_else(|| "no recommendations yet; rate clusters and run 'generate'".to_string()),
    }
}

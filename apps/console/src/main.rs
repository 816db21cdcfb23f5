use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Command, HttpRecommendationApi, ViewController};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast::error::RecvError, mpsc},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod orchestration;
mod render;
mod worker;

use commands::{parse, ParseError, PromptCommand, WorkerRequest, HELP};
use config::{load_settings, Settings};
use orchestration::dispatch_worker_request;

const WORKER_QUEUE_CAPACITY: usize = 16;

#[derive(Parser, Debug)]
#[command(
    name = "blog-recommender",
    about = "Rate AI-generated topic clusters of blog posts and get personalized recommendations"
)]
struct Args {
    /// Base URL of the recommendation backend.
    #[arg(long)]
    server_url: Option<String>,
    /// Config file; defaults to ./recommender.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    display_delay_ms: Option<u64>,
    /// Directory exported JSON files are written to.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// tracing filter directive; takes precedence over RUST_LOG.
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.server_url {
            settings.server_url = v.clone();
        }
        if let Some(v) = self.display_delay_ms {
            settings.display_delay_ms = v;
        }
        if let Some(v) = &self.export_dir {
            settings.export_dir = v.clone();
        }
    }
}

fn init_tracing(explicit: Option<&str>, fallback: &str) {
    let filter = match explicit {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);
    init_tracing(args.log_filter.as_deref(), &settings.log_filter);

    let api = HttpRecommendationApi::new(settings.server_url.as_str())
        .context("cannot use configured server url")?;
    info!(server_url = api.server_url(), "using recommendation backend");

    let controller = ViewController::new(Arc::new(api), settings.controller_options());
    let inflight = controller.inflight();
    let board = controller.notification_board();
    let mut events = controller.subscribe_events();

    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(text) = render::render_event(&event) {
                        println!("{text}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "view renderer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let (tx, rx) = mpsc::channel(WORKER_QUEUE_CAPACITY);
    let worker = tokio::spawn(worker::run_worker(
        controller,
        rx,
        settings.export_dir.clone(),
    ));

    println!("{HELP}\n");
    let mut status = String::new();
    if !dispatch_worker_request(&tx, &inflight, WorkerRequest::Run(Command::Load), &mut status) {
        println!("{status}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse(&line) {
            Ok(PromptCommand::Help) => println!("{HELP}"),
            Ok(PromptCommand::Quit) => break,
            Ok(PromptCommand::Notifications) => {
                println!("{}", render::render_notifications(&board.active(Instant::now())));
            }
            Ok(PromptCommand::Dismiss(id)) => {
                if !board.dismiss(id) {
                    println!("no active notification #{id}");
                }
            }
            Ok(PromptCommand::Worker(request)) => {
                if !dispatch_worker_request(&tx, &inflight, request, &mut status) {
                    println!("{status}");
                }
            }
            Err(ParseError::Empty) => {}
            Err(err) => println!("{err}"),
        }
    }

    drop(tx);
    worker.await.context("controller worker panicked")?;
    let _ = renderer.await;
    Ok(())
}

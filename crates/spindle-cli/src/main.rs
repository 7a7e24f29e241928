use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use spindle_core::Config;
use spindle_core::Scheduler;
use spindle_core::domain::Task;
use spindle_core::impls::{HttpIndexClient, InMemoryRecordStore, LoggingIndexClient};
use spindle_core::observability::{LoggerFormat, logger_init};
use spindle_core::ports::IndexClient;

#[derive(Parser, Debug)]
#[clap(name = "spindle", about = "Keep a search index in sync with a task store")]
struct CliArgs {
    /// TOML config file. `SPINDLE_*` environment variables override it.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Search backend base URL. Without one, documents are only logged.
    #[clap(long)]
    pub base_url: Option<String>,

    /// Log filter directive, e.g. `debug` or `spindle_core=debug,info`.
    #[clap(long)]
    pub log_level: Option<String>,

    /// `text` or `json`.
    #[clap(long)]
    pub log_format: Option<LoggerFormat>,

    /// Tasks present in the demo store at startup.
    #[clap(long, default_value_t = 5)]
    pub seed_tasks: usize,

    /// How often the demo producer edits a task, in milliseconds. 0 disables it.
    #[clap(long, default_value_t = 2000)]
    pub produce_every_ms: u64,
}

impl CliArgs {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::default(),
        };
        config.apply_process_env()?;

        if let Some(base_url) = &self.base_url {
            config.search.base_url = base_url.trim().to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        Ok(config)
    }
}

fn demo_task(n: usize) -> Task {
    Task::new(format!("demo-{n}"), format!("Demo task #{n}"), chrono::Utc::now())
        .with_description("Generated by the spindle demo producer")
        .with_meta(json!({
            "task_type": if n % 2 == 0 { "delivery" } else { "errand" },
            "lat": 55.75 + n as f64 / 100.0,
            "lon": 37.61,
        }))
}

/// Edits a task on every tick and tells the scheduler about it.
async fn produce(
    store: Arc<InMemoryRecordStore>,
    scheduler: Arc<Scheduler>,
    every: Duration,
    seeded: usize,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut n = seeded;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                // Every third edit touches an existing task instead of adding one.
                let task = if n % 3 == 0 && seeded > 0 {
                    demo_task(n % seeded)
                } else {
                    demo_task(n)
                };
                let stored = store.upsert(task);
                scheduler.notify_task_changed(stored.id);
                n += 1;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let config = cli_args.load_config()?;
    logger_init(&config.logging)?;

    let store = Arc::new(InMemoryRecordStore::new());
    for n in 0..cli_args.seed_tasks {
        store.upsert(demo_task(n));
    }
    info!(tasks = store.len(), "demo store seeded");

    let client: Arc<dyn IndexClient> = if config.search.is_enabled() {
        info!(base_url = %config.search.base_url, "indexing into search backend");
        Arc::new(HttpIndexClient::new(&config.search)?)
    } else {
        warn!("no search base url configured, documents will only be logged");
        Arc::new(LoggingIndexClient)
    };

    let scheduler = Arc::new(
        Scheduler::builder()
            .config(config.scheduler.clone())
            .search(&config.search)
            .store(store.clone())
            .client(client)
            .build(),
    );

    let root = CancellationToken::new();
    scheduler.start(&root);

    let producer = (cli_args.produce_every_ms > 0).then(|| {
        tokio::spawn(produce(
            store.clone(),
            scheduler.clone(),
            Duration::from_millis(cli_args.produce_every_ms),
            cli_args.seed_tasks,
            root.child_token(),
        ))
    });

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutting down");

    root.cancel();
    scheduler.stop_and_join().await;
    if let Some(producer) = producer {
        producer.await?;
    }

    let report = scheduler.reports().borrow().clone();
    info!(
        last_pass = %serde_json::to_string(&report)?,
        cursor = ?store.saved_cursor(),
        "search scheduler stopped"
    );
    Ok(())
}

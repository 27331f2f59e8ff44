use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use flow_board::api::{self, EngineApi};
use flow_board::cache::{PollingCache, QueryKey, QueryState};
use flow_board::config::loader;
use flow_board::config::types::AppConfig;
use flow_board::integrations::IntegrationController;
use flow_board::orchestrator::MutationOrchestrator;
use flow_board::projector::{self, StatusFilter};
use flow_board::stats;
use flow_board::tracker::{ActionKind, ActionStateTracker};
use flow_board::types::{ExecutionLog, Workflow};
use flow_board::util;

#[derive(Parser)]
#[command(name = "flow-board", version, about = "Workflow-automation engine dashboard")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the dashboard, refreshing workflows and logs continuously.
    Watch,
    /// List workflows once.
    Workflows,
    /// Show a page of execution logs.
    Logs {
        /// Filter by workflow id text (substring match).
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value = "all")]
        status: StatusArg,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// List service integrations once.
    Integrations,
    /// Run a workflow now.
    Trigger { id: i64 },
    /// Enable a workflow.
    Enable { id: i64 },
    /// Disable a workflow.
    Disable { id: i64 },
    /// Delete a workflow.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Run a connectivity check for an integration.
    Health { id: i64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Success,
    Failed,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => Self::All,
            StatusArg::Success => Self::Success,
            StatusArg::Failed => Self::Failed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    // Load config.
    let config = loader::load_config(cli.config.as_deref())?;

    let api = Arc::new(EngineApi::from_config(&config.engine)?);
    let tracker = Arc::new(ActionStateTracker::new());
    let cache = Arc::new(PollingCache::new());
    let orchestrator = Arc::new(MutationOrchestrator::new(tracker, Arc::clone(&cache)));

    tracing::info!("flow-board starting against {}", api.base_url());

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(&config, &api, &cache).await,

        Commands::Workflows => {
            let workflows = api::workflows::list(&api).await?;
            print_workflows(&workflows, &config);
            Ok(())
        }

        Commands::Logs {
            search,
            status,
            page,
        } => {
            let logs = api::logs::list(&api).await?;
            print_logs_page(&logs, &search, status.into(), page, &config);
            Ok(())
        }

        Commands::Integrations => {
            let integrations = api::integrations::list(&api).await?;
            for i in &integrations {
                let state = if i.is_connected {
                    "connected"
                } else {
                    "disconnected"
                };
                println!(
                    "#{:<4} {:<20} {:<12} {state}",
                    i.id,
                    i.service_name,
                    i.auth_type.to_string()
                );
            }
            Ok(())
        }

        Commands::Trigger { id } => {
            let ack = orchestrator
                .perform(ActionKind::Trigger, id, api::workflows::trigger(&api, id))
                .await?;
            println!("{}", ack.message);
            Ok(())
        }

        Commands::Enable { id } => set_enabled(&orchestrator, &api, id, true).await,
        Commands::Disable { id } => set_enabled(&orchestrator, &api, id, false).await,

        Commands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete workflow #{id}? This cannot be undone."))? {
                println!("aborted");
                return Ok(());
            }
            orchestrator
                .perform(ActionKind::Delete, id, api::workflows::delete(&api, id))
                .await?;
            println!("deleted workflow #{id}");
            Ok(())
        }

        Commands::Health { id } => {
            let controller =
                IntegrationController::new(Arc::clone(&api), Arc::clone(&orchestrator));
            let result = controller.check_health(id).await?;
            let label = if result.is_healthy() {
                "healthy"
            } else {
                "unhealthy"
            };
            println!("integration #{id}: {label}");
            if let Some(message) = &result.message {
                println!("  {message}");
            }
            if let Some(details) = &result.details {
                println!("  {}", serde_json::to_string_pretty(details)?);
            }
            Ok(())
        }
    }
}

async fn set_enabled(
    orchestrator: &MutationOrchestrator,
    api: &Arc<EngineApi>,
    id: i64,
    enabled: bool,
) -> Result<()> {
    let workflow = orchestrator
        .perform(
            ActionKind::Toggle,
            id,
            api::workflows::set_enabled(api, id, enabled),
        )
        .await?;
    let state = if workflow.enabled { "enabled" } else { "disabled" };
    println!("workflow #{} \"{}\" is now {state}", workflow.id, workflow.name);
    Ok(())
}

/// Follow mode: subscribe to workflows and logs and re-render on change.
async fn watch(config: &AppConfig, api: &Arc<EngineApi>, cache: &PollingCache) -> Result<()> {
    let mut workflows_sub = cache.subscribe(
        QueryKey::Workflows,
        Some(Duration::from_secs(config.polling.workflows_interval_secs)),
        {
            let api = Arc::clone(api);
            move || {
                let api = Arc::clone(&api);
                async move { api::workflows::list(&api).await }
            }
        },
    );
    let mut logs_sub = cache.subscribe(
        QueryKey::Logs,
        Some(Duration::from_secs(config.polling.logs_interval_secs)),
        {
            let api = Arc::clone(api);
            move || {
                let api = Arc::clone(&api);
                async move { api::logs::list(&api).await }
            }
        },
    );

    loop {
        tokio::select! {
            changed = workflows_sub.changed() => {
                if !changed {
                    break;
                }
            }
            changed = logs_sub.changed() => {
                if !changed {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        render(&workflows_sub.current(), &logs_sub.current(), config);
    }
    Ok(())
}

fn render(
    workflows: &QueryState<Vec<Workflow>>,
    logs: &QueryState<Vec<ExecutionLog>>,
    config: &AppConfig,
) {
    let workflow_data = workflows.data.as_deref().unwrap_or_default();
    let log_data = logs.data.as_deref().unwrap_or_default();
    let stats = stats::summarize(workflow_data, log_data);

    println!(
        "workflows: {} ({} active)  executions: {}  success rate: {:.1}%{}",
        stats.total_workflows,
        stats.active_workflows,
        stats.total_executions,
        stats.success_rate,
        if workflows.loading || logs.loading {
            "  [refreshing]"
        } else {
            ""
        },
    );
    for workflow in workflow_data.iter().take(5) {
        print_workflow_line(workflow, config);
    }
    // Stale data stays on screen; the error rides alongside it.
    if let Some(err) = &workflows.error {
        println!("! workflows fetch failed: {err}");
    }
    if let Some(err) = &logs.error {
        println!("! logs fetch failed: {err}");
    }
    println!();
}

fn print_workflows(workflows: &[Workflow], config: &AppConfig) {
    for workflow in workflows {
        print_workflow_line(workflow, config);
    }
}

fn print_workflow_line(workflow: &Workflow, config: &AppConfig) {
    let updated = workflow
        .updated_at
        .map_or_else(|| "never".to_owned(), |dt| {
            util::format_date(&dt, &config.display.date_format)
        });
    println!(
        "#{:<4} {:<24} {:<8} last: {:<8} runs: {:<5} updated: {updated}",
        workflow.id,
        workflow.name,
        if workflow.enabled { "active" } else { "paused" },
        workflow.last_status.to_string(),
        workflow.execution_count,
    );
}

fn print_logs_page(
    logs: &[ExecutionLog],
    search: &str,
    status: StatusFilter,
    page: usize,
    config: &AppConfig,
) {
    let projection = projector::project(logs, search, status, page, config.display.page_size);
    for &idx in &projection.visible {
        let log = &logs[idx];
        println!(
            "#{:<6} workflow {:<6} {:<8} {}  ({})",
            log.id,
            log.workflow_id,
            log.status.to_string(),
            util::format_date(&log.started_at, &config.display.date_format),
            util::format_duration(log.started_at, log.completed_at),
        );
    }
    let pages = projector::page_window(page, projection.total_pages)
        .iter()
        .map(|p| {
            if *p == page {
                format!("[{p}]")
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{} matching, page {page}/{} {pages}",
        projection.total_filtered,
        projection.total_pages.max(1),
    );
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

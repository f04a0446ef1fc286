//! Course Seat Monitor CLI
//!
//! Watch course sections by CRN and run the background poller that notifies
//! watchers when a section opens up or disappears from the catalog.

use anyhow::Result;
use clap::{Parser, Subcommand};
use course_seat_monitor::catalog::format::{
    format_course_description, format_department, format_section_info, format_section_list,
};
use course_seat_monitor::{
    AnySender, CatalogClient, Config, ConsoleSender, CourseQuery, FetchError, Notifier, Poller,
    WatchRegistry, WatchStore, WebhookSender,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "csm")]
#[command(about = "Course Seat Monitor - watch course sections and get notified when seats open")]
#[command(version)]
struct Cli {
    /// Config file path (default: ~/.config/course-seat-monitor/config.json)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sections you are waiting on
    Pending {
        /// User id the watches belong to
        #[arg(long)]
        user: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch a CRN and get notified when it opens (run again to stop watching)
    Watch {
        /// Department code, e.g. CS
        department: String,
        /// Course number, e.g. 225
        course_number: String,
        /// Section CRN
        crn: String,
        /// User id to notify
        #[arg(long)]
        user: String,
    },
    /// Show details on the given course
    Course {
        department: String,
        course_number: String,
    },
    /// Look up a department, course section list, or single section
    Info {
        department: String,
        course_number: Option<String>,
        crn: Option<String>,
    },
    /// Run the background poller until Ctrl-C
    Poll,
}

/// User-facing text for a failed direct lookup
fn lookup_failure(error: &FetchError) -> &'static str {
    match error {
        FetchError::NotFound => "Course not found.",
        FetchError::Transient(_) => "Something went wrong fetching the catalog. Try again later.",
        FetchError::ParseFailure(_) => "Could not understand the catalog response.",
    }
}

fn open_registry(config: &Config) -> Result<WatchRegistry> {
    WatchRegistry::open(WatchStore::new(config.store_path()), config.course_limit)
}

fn catalog_client(config: &Config) -> Result<CatalogClient> {
    CatalogClient::new(config.resolve_base_url(), config.fetch_timeout())
}

fn handle_pending(config: &Config, user: &str, json: bool) -> Result<()> {
    let registry = open_registry(config)?;
    let watching = registry.list_watches(user);

    if json {
        let items: Vec<serde_json::Value> = watching
            .iter()
            .map(|(title, crn)| serde_json::json!({"title": title, "crn": crn}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if watching.is_empty() {
        println!("You are not watching any courses right now.");
    } else {
        println!("You are watching:");
        for (title, crn) in watching {
            println!("  {} ({})", title, crn);
        }
    }
    Ok(())
}

async fn handle_watch(
    config: &Config,
    department: &str,
    course_number: &str,
    crn: &str,
    user: &str,
) -> Result<()> {
    let query = match CourseQuery::section(department, course_number, crn) {
        Ok(query) => query,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let client = catalog_client(config)?;
    match client.section_snapshot(&query).await {
        Ok(snapshot) => {
            let registry = open_registry(config)?;
            let outcome = registry.add_or_toggle(user, &snapshot, &query)?;
            println!("{}", outcome.user_message());
        }
        Err(e) => println!("{}", lookup_failure(&e)),
    }
    Ok(())
}

async fn handle_course(config: &Config, department: &str, course_number: &str) -> Result<()> {
    let query = match CourseQuery::new(department, Some(course_number), None) {
        Ok(query) => query,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let client = catalog_client(config)?;
    match client.course_detail(&query).await {
        Ok(course) => println!("{}", format_course_description(&course)),
        Err(e) => println!("{}", lookup_failure(&e)),
    }
    Ok(())
}

async fn handle_info(
    config: &Config,
    department: &str,
    course_number: Option<&str>,
    crn: Option<&str>,
) -> Result<()> {
    let query = match CourseQuery::new(department, course_number, crn) {
        Ok(query) => query,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let client = catalog_client(config)?;
    let result = if query.is_section() {
        client
            .section_detail(&query)
            .await
            .map(|(title, details)| format_section_info(&title, &details))
    } else if query.course_number.is_some() {
        client
            .course_detail(&query)
            .await
            .map(|course| format_section_list(&course))
    } else {
        client
            .department_listing(&query)
            .await
            .map(|listing| format_department(&listing))
    };

    match result {
        Ok(text) => println!("{}", text),
        Err(e) => println!("{}", lookup_failure(&e)),
    }
    Ok(())
}

async fn handle_poll(config: Config) -> Result<()> {
    let registry = Arc::new(open_registry(&config)?);
    let client = catalog_client(&config)?;
    let sender = match &config.webhook {
        Some(webhook) => AnySender::Webhook(WebhookSender::new(webhook.clone())?),
        None => AnySender::Console(ConsoleSender),
    };
    let notifier = Notifier::new(sender, config.notify_config());
    let poller = Poller::new(registry, client, notifier, config.poller_config());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, finishing the current cycle");
            let _ = shutdown_tx.send(true);
        }
    });

    poller.run(shutdown_rx).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log level via RUST_LOG, e.g. RUST_LOG=debug csm poll
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("course_seat_monitor=info,csm=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Pending { user, json } => handle_pending(&config, &user, json)?,
        Commands::Watch {
            department,
            course_number,
            crn,
            user,
        } => handle_watch(&config, &department, &course_number, &crn, &user).await?,
        Commands::Course {
            department,
            course_number,
        } => handle_course(&config, &department, &course_number).await?,
        Commands::Info {
            department,
            course_number,
            crn,
        } => {
            handle_info(
                &config,
                &department,
                course_number.as_deref(),
                crn.as_deref(),
            )
            .await?
        }
        Commands::Poll => handle_poll(config).await?,
    }

    Ok(())
}

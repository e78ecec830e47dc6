//! CLI runner - executes commands

use crate::aggregate::planner::{self, RequestPlan};
use crate::aggregate::Aggregator;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, SourceConfig};
use crate::error::{Error, Result};
use crate::source::HttpPageSource;
use crate::types::{PageEnvelope, Pagination};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                source,
                url,
                external_page_size,
                max_concurrency,
                headers,
                page,
                page_size,
            } => {
                let config = resolve_source(
                    source.as_deref(),
                    url.as_deref(),
                    *external_page_size,
                    *max_concurrency,
                    headers,
                )?;
                self.fetch(config, Pagination::new(*page, *page_size)).await
            }
            Commands::Plan {
                page,
                page_size,
                external_page_size,
                total_records,
            } => self.plan(
                Pagination::new(*page, *page_size),
                *external_page_size,
                *total_records,
            ),
        }
    }

    /// Fetch one page through the aggregator and print it
    async fn fetch(&self, config: SourceConfig, pagination: Pagination) -> Result<()> {
        let aggregator = Aggregator::new(config.aggregator());
        let source: HttpPageSource<Value> = HttpPageSource::new(config)?;
        let url = source.config().url.clone();

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let start = Instant::now();
        let page = aggregator
            .fetch(&cancel, Arc::new(source), pagination)
            .await?;
        info!(
            "Fetched {} records from {} in {:?}",
            page.len(),
            url,
            start.elapsed()
        );

        let envelope: PageEnvelope<Value> = page.into_envelope();
        self.print(&envelope)
    }

    /// Print the request plan for a page
    fn plan(
        &self,
        pagination: Pagination,
        external_page_size: u32,
        total_records: u64,
    ) -> Result<()> {
        let plan = planner::plan_for_total(pagination, external_page_size, total_records)?;

        match self.cli.format {
            OutputFormat::Json => {
                let requests: Vec<Value> = plan.iter().map(plan_to_json).collect();
                println!("{}", Value::Array(requests));
            }
            OutputFormat::Pretty => {
                println!(
                    "Page {} of size {} against a ceiling of {} ({} records):",
                    pagination.page, pagination.page_size, external_page_size, total_records
                );
                for request in &plan {
                    let mode = if request.ordinal == 0 {
                        "first"
                    } else {
                        "concurrent"
                    };
                    println!(
                        "  #{:<3} page={:<6} page_size={:<6} {}",
                        request.ordinal, request.pagination.page, request.pagination.page_size, mode
                    );
                }
                println!("{} request(s)", plan.len());
            }
        }
        Ok(())
    }

    fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

fn plan_to_json(request: &RequestPlan) -> Value {
    json!({
        "ordinal": request.ordinal,
        "page": request.pagination.page,
        "page_size": request.pagination.page_size,
    })
}

/// Build the source config from a file and/or command-line overrides
pub(crate) fn resolve_source(
    source: Option<&Path>,
    url: Option<&str>,
    external_page_size: Option<u32>,
    max_concurrency: Option<usize>,
    headers: &[String],
) -> Result<SourceConfig> {
    let mut config = match (source, url) {
        (Some(path), _) => load_config(path)?,
        (None, Some(url)) => {
            let external_page_size = external_page_size.ok_or_else(|| {
                Error::config("--external-page-size is required when using --url")
            })?;
            SourceConfig::new(url, external_page_size)
        }
        (None, None) => return Err(Error::config("Either --source or --url is required")),
    };

    if let Some(size) = external_page_size {
        config.external_page_size = size;
    }
    if max_concurrency.is_some() {
        config.max_concurrency = max_concurrency;
    }
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        config.headers.insert(name, value);
    }

    config.validate()?;
    Ok(config)
}

/// Parse a `Name: value` header argument
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::config(format!("Invalid header '{raw}' (expected 'Name: value')")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::config(format!("Invalid header '{raw}' (empty name)")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

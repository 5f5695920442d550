//! Command handlers.

pub(crate) mod config;
pub(crate) mod permissions;
pub(crate) mod roles;
pub(crate) mod users;

use std::sync::Arc;

use anyhow::{Context, Result};
use arbiter_api::{AdminClient, AdminResource, ListQuery, Page, ResourceClient, ResourceMutation};
use arbiter_stepup::{GateOutcome, GuardedAction, SensitiveActionController, perform};
use colored::Colorize;
use serde::Serialize;

use crate::prompt::CodePrompt;
use crate::theme::Theme;

/// How command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Aligned columns for humans.
    Table,
    /// Pretty-printed JSON for scripts.
    Json,
}

impl OutputFormat {
    pub(crate) fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// A record that can be shown as one table row.
pub(crate) trait Row: AdminResource + Serialize {
    /// Table title.
    const TITLE: &'static str;
    /// Column headings.
    fn header() -> String;
    /// This record's cells.
    fn row(&self) -> String;
}

/// Everything a command needs: the API client and the step-up gate.
pub(crate) struct Console {
    client: AdminClient,
    controller: Arc<SensitiveActionController>,
    prompt: CodePrompt,
    format: OutputFormat,
}

impl Console {
    pub(crate) fn new(client: AdminClient, max_attempts: u32, format: OutputFormat) -> Self {
        let controller = Arc::new(SensitiveActionController::new(Arc::new(
            client.challenge_transport(),
        )));
        let prompt = CodePrompt::new(Arc::clone(&controller), max_attempts);
        Self {
            client,
            controller,
            prompt,
            format,
        }
    }

    /// Typed handle on `R`'s collection.
    pub(crate) fn api<R: AdminResource>(&self) -> ResourceClient<R> {
        ResourceClient::new(self.client.clone())
    }

    /// Print one page of `R`.
    pub(crate) async fn list<R: Row>(&self, query: ListQuery) -> Result<()> {
        let page = self
            .api::<R>()
            .list(&query)
            .await
            .with_context(|| format!("failed to list {}", R::KIND.collection()))?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
            OutputFormat::Table => print_page(&page, &query),
        }
        Ok(())
    }

    /// Run a write through the step-up gate and report the outcome.
    ///
    /// Cancellation is reported as information, not as a failure.
    pub(crate) async fn mutate<R: Row>(&self, mutation: ResourceMutation<R>) -> Result<()> {
        let action = mutation.action();
        let outcome = self
            .prompt
            .guard(action, perform(&self.controller, mutation))
            .await
            .with_context(|| format!("failed to {action}"))?;

        match outcome {
            GateOutcome::Cancelled => {
                println!("{}", Theme::info("Cancelled, nothing was changed"));
            },
            GateOutcome::Completed(record) => match self.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
                OutputFormat::Table => {
                    println!("{}", Theme::success(&capitalize(&action.to_string())));
                    if let Some(record) = record {
                        println!("{}", R::header().dimmed());
                        println!("{}", record.row());
                    }
                },
            },
        }
        Ok(())
    }

    /// Fresh query from the shared paging flags.
    pub(crate) fn query(page: u32, page_size: u32, keyword: Option<&str>) -> ListQuery {
        let query = ListQuery::new().page(page).page_size(page_size);
        match keyword {
            Some(keyword) => query.keyword(keyword),
            None => query,
        }
    }
}

fn print_page<R: Row>(page: &Page<R>, query: &ListQuery) {
    if page.is_empty() {
        println!("{}", Theme::info(&format!("No {} found", R::KIND.collection())));
        return;
    }

    println!("\n{}", Theme::header(R::TITLE));
    println!("{}", R::header().dimmed());
    println!("{}", Theme::separator());
    for item in &page.items {
        println!("{}", item.row());
    }
    println!(
        "{}",
        Theme::dimmed(&format!(
            "page {} · {} of {} shown",
            query.current_page(),
            page.items.len(),
            page.total
        ))
    );
    println!();
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Terminal prompt for interactive remediation.

use super::{PromptAction, PromptContext, ReleasePrompt};
use anyhow::{Context, Result};

const MAX_TITLE_WIDTH: usize = 100;

/// Clip a string to at most `width` chars, never splitting a character.
fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Reads the operator's choice from stdin. All terminal IO for the
/// interactive flow lives here; the engine only sees [`PromptAction`]s.
pub struct ConsolePrompt;

impl ConsolePrompt {
    fn render(ctx: &PromptContext<'_>) {
        println!();
        println!("X Issue found: {}", ctx.item.title);
        println!("  File: {}", ctx.item.file_name());
        println!(
            "  Required audio: {}",
            if ctx.verdict.audio_ok { "YES" } else { "NO" }
        );
        println!(
            "  Required subs:  {}",
            if ctx.verdict.subs_ok { "YES" } else { "NO" }
        );
        if ctx.skip_recorded {
            println!("  (a skip decision is currently recorded for this item)");
        }
        if ctx.dry_run {
            println!("  (dry run: downloads will not actually be queued)");
        }

        match ctx.filter {
            Some(term) => println!("\nAvailable releases [filter: '{}']:", term),
            None => println!("\nAvailable releases:"),
        }

        if ctx.releases.is_empty() {
            if ctx.total == 0 {
                println!("  No alternative releases found");
            } else {
                println!("  No releases match the filter");
            }
        } else {
            // Width in chars, not bytes: indexer titles are routinely non-ASCII.
            let title_width = ctx
                .releases
                .iter()
                .map(|r| r.title.chars().count())
                .max()
                .unwrap_or(0)
                .min(MAX_TITLE_WIDTH);

            for (index, release) in ctx.releases.iter().enumerate() {
                let title = clip(&release.title, title_width);
                println!(
                    "  {:>3}  {:<width$}  {:>9.2} GB  {:<15}  {}",
                    index + 1,
                    title,
                    release.size_gib(),
                    release.quality_label(),
                    release.indexer.as_deref().unwrap_or("-"),
                    width = title_width,
                );
            }
            println!("  Showing {} of {} releases", ctx.releases.len(), ctx.total);
        }

        println!("\nOptions:");
        println!("  <number>   download that release (replaces the current file)");
        println!("  f <term>   filter the list by title");
        println!("  f          clear the filter");
        println!("  s          skip this item and remember the decision");
        println!("  u          forget a recorded skip decision");
        println!("  k          keep the current file (counts as passed)");
        println!("  q          decide later (prompt again next run)");
    }

    async fn read_line() -> Result<String> {
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read from stdin")?;
            Ok(line)
        })
        .await
        .context("stdin reader task failed")?
    }

    fn parse(input: &str, shown: usize) -> Option<PromptAction> {
        let input = input.trim();

        if input.is_empty() || input.eq_ignore_ascii_case("q") {
            return Some(PromptAction::Cancel);
        }
        if input.eq_ignore_ascii_case("s") {
            return Some(PromptAction::Skip);
        }
        if input.eq_ignore_ascii_case("u") {
            return Some(PromptAction::ClearSkip);
        }
        if input.eq_ignore_ascii_case("k") {
            return Some(PromptAction::Keep);
        }
        if input.eq_ignore_ascii_case("f") {
            return Some(PromptAction::ClearFilter);
        }
        if let Some(term) = input.strip_prefix("f ").or_else(|| input.strip_prefix("F ")) {
            return Some(PromptAction::Filter(term.trim().to_string()));
        }
        if let Ok(choice) = input.parse::<usize>() {
            if choice >= 1 && choice <= shown {
                return Some(PromptAction::Download(choice - 1));
            }
        }

        None
    }
}

#[async_trait::async_trait]
impl ReleasePrompt for ConsolePrompt {
    async fn choose(&self, ctx: &PromptContext<'_>) -> Result<PromptAction> {
        Self::render(ctx);

        loop {
            print!("\n[Your choice]: ");
            use std::io::Write;
            std::io::stdout().flush().ok();

            let line = Self::read_line().await?;
            match Self::parse(&line, ctx.releases.len()) {
                Some(action) => return Ok(action),
                None => {
                    println!(
                        "Invalid input. Enter a number between 1 and {}, 'f <term>', 'f', 's', 'u', 'k' or 'q'.",
                        ctx.releases.len()
                    );
                }
            }
        }
    }
}

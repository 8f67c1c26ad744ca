//! Subcommand execution
//!
//! Commands run against any [`SharedWiki`] and write human-readable output
//! to a caller-supplied writer; `main` wires in the live client and stdout.

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use talkbanner_core::{BannerBot, CategoryTitle, PageTitle, RunReport, SharedWiki, Verdict};
use talkbanner_mediawiki::MediaWikiClient;
use tracing::{info, warn};

use crate::config::{password_from_env, AppConfig, RunOverrides, PASSWORD_ENV};

/// Parsed subcommand
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Full banner run
    Run(RunOverrides),
    /// Print the talk pages of one category
    Closure(String),
    /// Print the verdict breakdown for one page
    Check(String),
}

/// How the process should exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Everything resolved
    Success,
    /// At least one category could not be resolved
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

/// Global options plus the subcommand
#[derive(Debug, Clone)]
pub struct Args {
    /// `--config`
    pub config: Option<PathBuf>,
    /// `--log-level`
    pub log_level: Option<String>,
    /// Subcommand to execute
    pub invocation: Invocation,
}

impl Args {
    /// Extract arguments from clap matches
    ///
    /// # Errors
    ///
    /// Fails when no known subcommand was given.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let invocation = match matches.subcommand() {
            Some(("run", sub)) => Invocation::Run(RunOverrides {
                categories: sub
                    .get_many::<String>("category")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default(),
                dry_run: sub.get_flag("dry-run"),
                max_concurrent: sub.get_one::<usize>("max-concurrent").copied(),
            }),
            Some(("closure", sub)) => Invocation::Closure(required(sub, "category")?),
            Some(("check", sub)) => Invocation::Check(required(sub, "page")?),
            Some((other, _)) => bail!("unknown subcommand '{other}'"),
            None => bail!("no subcommand given"),
        };

        Ok(Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            invocation,
        })
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing argument <{name}>"))
}

/// Build the live client, logging in when credentials are available
///
/// # Errors
///
/// Fails if the client cannot be built or the login is rejected.
pub async fn connect(config: &AppConfig) -> Result<SharedWiki> {
    let client = MediaWikiClient::new(&config.api).context("failed to build API client")?;

    match (config.api.username.as_deref(), password_from_env()) {
        (Some(username), Some(password)) => {
            client
                .login(username, &password)
                .await
                .with_context(|| format!("login as {username} failed"))?;
        }
        (Some(username), None) => {
            warn!(username, "{PASSWORD_ENV} not set, continuing without login");
        }
        (None, _) => info!("no username configured, continuing without login"),
    }

    Ok(Arc::new(client))
}

/// Execute a subcommand
///
/// # Errors
///
/// Fails on invalid configuration or when a lookup that the command
/// depends on fails outright.
pub async fn execute<W: Write>(
    wiki: SharedWiki,
    mut config: AppConfig,
    invocation: &Invocation,
    out: &mut W,
) -> Result<Status> {
    if let Invocation::Run(overrides) = invocation {
        config.apply(overrides).context("invalid run options")?;
    }

    let bot = BannerBot::new(wiki, config.bot).context("failed to configure bot")?;

    match invocation {
        Invocation::Run(_) => {
            let run = bot.run();
            tokio::pin!(run);
            let report = tokio::select! {
                report = &mut run => report,
                Ok(()) = tokio::signal::ctrl_c() => {
                    warn!("interrupted, letting in-flight pages finish");
                    bot.stop();
                    run.await
                }
            }
            .context("run aborted")?;
            write_report(&report, out)?;
            Ok(if report.has_closure_errors() {
                Status::Failure
            } else {
                Status::Success
            })
        }
        Invocation::Closure(category) => {
            let category = CategoryTitle::new(category.as_str());
            let pages = bot
                .talk_pages(&category)
                .await
                .with_context(|| format!("failed to resolve {category}"))?;
            for page in &pages {
                writeln!(out, "{page}")?;
            }
            info!(category = %category, count = pages.len(), "resolved closure");
            Ok(Status::Success)
        }
        Invocation::Check(page) => {
            let mut page = PageTitle::new(page.as_str());
            if !page.is_talk() {
                page = page.talk_page();
            }
            let verdict = bot
                .check_page(&page)
                .await
                .with_context(|| format!("failed to check {page}"))?;
            write_verdict(&page, &verdict, out)?;
            Ok(Status::Success)
        }
    }
}

/// Render a run report
///
/// # Errors
///
/// Propagates writer failures.
pub fn write_report<W: Write>(report: &RunReport, out: &mut W) -> std::io::Result<()> {
    if report.halted {
        return writeln!(out, "Kill switch active; no pages processed");
    }

    for category in &report.categories {
        if category.halted {
            writeln!(out, "{}: halted by kill switch", category.category)?;
            continue;
        }
        match &category.closure_error {
            Some(error) => writeln!(out, "{}: closure failed: {error}", category.category)?,
            None => writeln!(
                out,
                "{}: {} pages, {} edited, {} dry-run, {} ineligible, {} failed",
                category.category,
                category.pages,
                category.edited,
                category.dry_run,
                category.ineligible,
                category.failed,
            )?,
        }
    }

    writeln!(
        out,
        "Total: {} edited, {} failed",
        report.total_edited(),
        report.total_failed()
    )
}

/// Render an eligibility breakdown
///
/// # Errors
///
/// Propagates writer failures.
pub fn write_verdict<W: Write>(
    page: &PageTitle,
    verdict: &Verdict,
    out: &mut W,
) -> std::io::Result<()> {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    writeln!(out, "{page}")?;
    writeln!(out, "  banner present:     {}", yes_no(verdict.banner_present))?;
    writeln!(out, "  kill switch active: {}", yes_no(verdict.kill_switch_active))?;
    writeln!(out, "  opted out:          {}", yes_no(verdict.opted_out))?;
    writeln!(
        out,
        "  subject redirect:   {}",
        verdict.redirect_target.map_or("not checked", yes_no)
    )?;
    match verdict.reason() {
        Some(reason) => writeln!(out, "  eligible:           no ({reason})"),
        None => writeln!(out, "  eligible:           yes"),
    }
}

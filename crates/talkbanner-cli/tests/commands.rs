//! Subcommand tests against the in-memory wiki

use pretty_assertions::assert_eq;
use std::io::Write as _;
use talkbanner_cli::commands::write_report;
use talkbanner_cli::{build_cli, execute, AppConfig, Args, Invocation, RunOverrides, Status};
use talkbanner_core::{CategoryReport, CategoryTitle, RunReport, WikiError};
use talkbanner_test_utils::brooklyn_wiki;

const BROOKLYN: &str = "Category:Parks in Brooklyn";

fn brooklyn_run() -> Invocation {
    Invocation::Run(RunOverrides {
        categories: vec![BROOKLYN.to_string()],
        ..RunOverrides::default()
    })
}

async fn output_of(
    wiki: std::sync::Arc<talkbanner_test_utils::FakeWiki>,
    config: AppConfig,
    invocation: &Invocation,
) -> (Status, String) {
    let mut out = Vec::new();
    let status = execute(wiki, config, invocation, &mut out).await.unwrap();
    (status, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn run_prints_category_tally() {
    let wiki = brooklyn_wiki().shared();

    let (status, output) = output_of(wiki.clone(), AppConfig::default(), &brooklyn_run()).await;

    assert_eq!(status, Status::Success);
    assert_eq!(
        output,
        "Category:Parks in Brooklyn: 2 pages, 2 edited, 0 dry-run, 0 ineligible, 0 failed\n\
         Total: 2 edited, 0 failed\n"
    );
    assert_eq!(wiki.edits().len(), 2);
}

#[tokio::test]
async fn dry_run_flag_prevents_writes() {
    let wiki = brooklyn_wiki().shared();
    let invocation = Invocation::Run(RunOverrides {
        categories: vec![BROOKLYN.to_string()],
        dry_run: true,
        max_concurrent: Some(1),
    });

    let (status, output) = output_of(wiki.clone(), AppConfig::default(), &invocation).await;

    assert_eq!(status, Status::Success);
    assert!(output.contains("2 dry-run"));
    assert!(wiki.edits().is_empty());
}

#[tokio::test]
async fn unresolvable_category_fails_the_process() {
    let wiki = brooklyn_wiki()
        .failing(
            "list_member_pages",
            BROOKLYN,
            WikiError::Transport("connection refused".into()),
        )
        .shared();

    let (status, output) = output_of(wiki, AppConfig::default(), &brooklyn_run()).await;

    assert_eq!(status, Status::Failure);
    assert!(output.starts_with("Category:Parks in Brooklyn: closure failed:"));
}

#[tokio::test]
async fn halted_run_is_reported() {
    let wiki = brooklyn_wiki()
        .with_page("User:ProgrammingBot/shutoff", "stop")
        .shared();

    let (status, output) = output_of(wiki.clone(), AppConfig::default(), &brooklyn_run()).await;

    assert_eq!(status, Status::Success);
    assert_eq!(output, "Kill switch active; no pages processed\n");
    assert!(wiki.edits().is_empty());
}

#[test]
fn halted_category_is_rendered() {
    let report = RunReport {
        halted: false,
        categories: vec![CategoryReport::halted(CategoryTitle::new(BROOKLYN))],
    };

    let mut out = Vec::new();
    write_report(&report, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Category:Parks in Brooklyn: halted by kill switch\n\
         Total: 0 edited, 0 failed\n"
    );
}

#[tokio::test]
async fn closure_lists_talk_pages() {
    let wiki = brooklyn_wiki().shared();

    let (_, output) = output_of(
        wiki,
        AppConfig::default(),
        &Invocation::Closure(BROOKLYN.to_string()),
    )
    .await;

    let mut lines: Vec<_> = output.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["Talk:Central Park", "Talk:Old Fort"]);
}

#[tokio::test]
async fn check_accepts_subject_title() {
    let wiki = brooklyn_wiki()
        .with_templates("Talk:Central Park", &["Template:Bots"])
        .shared();

    let (_, output) = output_of(
        wiki,
        AppConfig::default(),
        &Invocation::Check("Central Park".to_string()),
    )
    .await;

    assert_eq!(
        output,
        "Talk:Central Park\n  \
         banner present:     no\n  \
         kill switch active: no\n  \
         opted out:          yes\n  \
         subject redirect:   not checked\n  \
         eligible:           no (opted out)\n"
    );
}

#[test]
fn config_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[bot]
seed_categories = ["{BROOKLYN}"]
exclude_redirects = true
max_concurrent_pages = 4

[api]
endpoint = "https://test.wikipedia.org/w/api.php"
username = "ExampleBot"
"#
    )
    .unwrap();

    let config = AppConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.bot.seed_categories, vec![CategoryTitle::new(BROOKLYN)]);
    assert!(config.bot.exclude_redirects);
    assert_eq!(config.bot.max_concurrent_pages, 4);
    assert_eq!(config.api.endpoint, "https://test.wikipedia.org/w/api.php");
    assert_eq!(config.api.username.as_deref(), Some("ExampleBot"));
    assert_eq!(config.api.timeout_secs, 30);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = AppConfig::load(Some(dir.path().join("absent.toml").as_path()));
    assert!(result.is_err());
}

#[test]
fn args_capture_global_options() {
    let matches = build_cli()
        .try_get_matches_from([
            "talkbanner",
            "--config",
            "bot.toml",
            "run",
            "--max-concurrent",
            "3",
        ])
        .unwrap();

    let args = Args::from_matches(&matches).unwrap();

    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("bot.toml")));
    match args.invocation {
        Invocation::Run(overrides) => {
            assert!(overrides.categories.is_empty());
            assert_eq!(overrides.max_concurrent, Some(3));
            assert!(!overrides.dry_run);
        }
        other => panic!("unexpected invocation {other:?}"),
    }
}

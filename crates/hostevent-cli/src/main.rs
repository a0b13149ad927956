#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use hostevent_core::coordination::repository_from_env;
use hostevent_core::event::{load_event_file, load_event_str};
use hostevent_core::{
    resolve_event_sync, AffectedItem, Error, ItemKind, ParsedEvent, RepoRef, ResolverConfig,
    WebhookKind,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hostevent",
    version,
    about = "Resolve the pull requests and issues a GitHub Actions event concerns"
)]
struct Cli {
    /// File holding the raw event (`toJSON(github)`)
    #[arg(long, env = "HOSTEVENT_EVENT_PATH")]
    event_payload: Option<PathBuf>,

    /// Raw event text, used when no file is given
    #[arg(long, env = "INPUT_EVENT")]
    event: Option<String>,

    /// Token substituted for the masked `***` placeholder in the event
    #[arg(long, env = "HOSTEVENT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Overall deadline in seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,

    /// Pull requests requested per page (1-100)
    #[arg(long, default_value_t = 100)]
    per_page: u32,

    /// Output format: gha, json, text (default: auto-detect)
    #[arg(long, env = "HOSTEVENT_OUTPUT_FORMAT")]
    output_format: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

/// Output format for the CLI
#[derive(Debug, PartialEq, Eq)]
enum OutputFormat {
    /// GitHub Actions: append to $GITHUB_OUTPUT + summary to stdout
    Gha,
    /// JSON object to stdout
    Json,
    /// One line per item to stdout
    Text,
}

impl OutputFormat {
    fn detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("gha") => OutputFormat::Gha,
            Some("json") => OutputFormat::Json,
            Some("text") => OutputFormat::Text,
            _ => {
                if std::env::var("GITHUB_ACTIONS").is_ok() {
                    OutputFormat::Gha
                } else {
                    OutputFormat::Text
                }
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    std::process::exit(run(cli));
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostevent=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Filter empty string from Option (env vars may produce "" for empty values)
fn clean_opt(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

fn run(cli: Cli) -> i32 {
    let output_format = OutputFormat::detect(clean_opt(&cli.output_format));

    let event = match load_event(&cli) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "cannot load event");
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let config = ResolverConfig {
        api_url: clean_opt(&cli.api_url).map(str::to_string),
        per_page: cli.per_page,
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    let items = match resolve_event_sync(&event, &config) {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(kind = ?e.kind(), error = %e, "resolution failed");
            eprintln!("Error: {e}");
            return 1;
        }
    };

    tracing::info!(kind = %event.event_kind, count = items.len(), "resolved event");

    let result = match output_format {
        OutputFormat::Gha => write_gha_output(&items),
        OutputFormat::Json => write_json_output(&mut std::io::stdout().lock(), &items),
        OutputFormat::Text => write_text_output(&mut std::io::stdout().lock(), &items),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: cannot write output: {e}");
            1
        }
    }
}

/// Read the event from the file or inline text, then fill a missing repository
fn load_event(cli: &Cli) -> Result<ParsedEvent, Error> {
    let token = clean_opt(&cli.github_token);

    let event = match (&cli.event_payload, clean_opt(&cli.event)) {
        (Some(path), _) => load_event_file(path, token)?,
        (None, Some(raw)) => load_event_str(raw, token)?,
        (None, None) => {
            return Err(Error::Config(
                "no event given: pass --event-payload or --event".to_string(),
            ))
        }
    };

    fill_repository(event, repository_from_env)
}

/// Whether resolving `event` may need the repository from the environment
fn needs_repository(event: &ParsedEvent) -> bool {
    event.is_schedule()
        || matches!(
            WebhookKind::from_name(&event.event_kind),
            Some(WebhookKind::WorkflowRun | WebhookKind::Status)
        )
}

/// Fill a missing repository for the kinds that list pull requests
fn fill_repository(
    event: ParsedEvent,
    lookup: impl FnOnce() -> Result<Option<RepoRef>, Error>,
) -> Result<ParsedEvent, Error> {
    if event.repository_full_name.is_some() || !needs_repository(&event) {
        return Ok(event);
    }

    match lookup()? {
        Some(repo) => Ok(event.with_repository(repo.to_string())),
        None => Ok(event),
    }
}

fn numbers(items: &[AffectedItem], kind: ItemKind) -> Vec<u64> {
    items
        .iter()
        .filter(|item| item.kind == kind)
        .map(|item| item.number)
        .collect()
}

/// Append outputs to $GITHUB_OUTPUT, falling back to JSON on stdout
fn write_gha_output(items: &[AffectedItem]) -> std::io::Result<()> {
    let output_file = match std::env::var("GITHUB_OUTPUT") {
        Ok(f) if !f.is_empty() => f,
        _ => {
            tracing::warn!("GITHUB_OUTPUT not set, falling back to stdout");
            return write_json_output(&mut std::io::stdout().lock(), items);
        }
    };

    append_gha_outputs(Path::new(&output_file), items)?;

    // Summary to stdout (visible in job log)
    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    writeln!(w, "Affected items: {}", items.len())?;
    for item in items {
        writeln!(w, "  {item}")?;
    }
    Ok(())
}

fn append_gha_outputs(path: &Path, items: &[AffectedItem]) -> std::io::Result<()> {
    let mut f = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;

    let pull_requests = serde_json::to_string(&numbers(items, ItemKind::PullRequest))?;
    let issues = serde_json::to_string(&numbers(items, ItemKind::Issue))?;
    let affected = serde_json::to_string(items)?;

    writeln!(f, "pull_requests={pull_requests}")?;
    writeln!(f, "issues={issues}")?;
    writeln!(f, "affected={affected}")?;
    Ok(())
}

fn write_json_output(w: &mut impl Write, items: &[AffectedItem]) -> std::io::Result<()> {
    let output = serde_json::json!({
        "pull_requests": numbers(items, ItemKind::PullRequest),
        "issues": numbers(items, ItemKind::Issue),
    });
    serde_json::to_writer(&mut *w, &output)?;
    writeln!(w)
}

fn write_text_output(w: &mut impl Write, items: &[AffectedItem]) -> std::io::Result<()> {
    if items.is_empty() {
        return writeln!(w, "No affected pull requests or issues");
    }
    for item in items {
        writeln!(w, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cli with only the event inputs set, independent of the process environment
    fn event_cli(event_payload: Option<PathBuf>, event: Option<&str>, token: Option<&str>) -> Cli {
        Cli {
            event_payload,
            event: event.map(str::to_string),
            github_token: token.map(str::to_string),
            api_url: None,
            timeout_secs: 600,
            per_page: 100,
            output_format: None,
            log_json: false,
        }
    }

    fn no_repository() -> Result<Option<RepoRef>, Error> {
        panic!("repository lookup not expected")
    }

    #[test]
    fn test_output_format_explicit() {
        assert_eq!(OutputFormat::detect(Some("gha")), OutputFormat::Gha);
        assert_eq!(OutputFormat::detect(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::detect(Some("text")), OutputFormat::Text);
    }

    #[test]
    fn test_json_output_shape() {
        let items = vec![
            AffectedItem::pull_request(7),
            AffectedItem::issue(3),
            AffectedItem::pull_request(9),
        ];
        let mut buf = Vec::new();
        write_json_output(&mut buf, &items).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"issues\":[3],\"pull_requests\":[7,9]}\n"
        );
    }

    #[test]
    fn test_text_output() {
        let mut buf = Vec::new();
        write_text_output(&mut buf, &[AffectedItem::pull_request(130)]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "pull_request #130\n");

        let mut empty = Vec::new();
        write_text_output(&mut empty, &[]).unwrap();
        assert!(String::from_utf8(empty).unwrap().starts_with("No affected"));
    }

    #[test]
    fn test_gha_outputs_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "existing=1\n").unwrap();

        append_gha_outputs(&path, &[AffectedItem::pull_request(9)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "existing=1\n\
             pull_requests=[9]\n\
             issues=[]\n\
             affected=[{\"kind\":\"pull_request\",\"number\":9}]\n"
        );
    }

    #[test]
    fn test_load_event_inline_with_token() {
        let args = event_cli(
            None,
            Some(r#"{"event_name":"schedule","token":"***","repository":"acme/widgets"}"#),
            Some("ghp_real"),
        );
        let event = load_event(&args).unwrap();
        assert!(event.is_schedule());
        assert_eq!(event.credential.unwrap().expose(), "ghp_real");
        assert_eq!(event.repository_full_name.as_deref(), Some("acme/widgets"));
    }

    #[test]
    fn test_load_event_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{"event_name":"issues","event":{"issue":{"number":2}}}"#,
        )
        .unwrap();

        let args = event_cli(Some(path), Some(r#"{"event_name":"schedule"}"#), None);
        assert_eq!(load_event(&args).unwrap().event_kind, "issues");
    }

    #[test]
    fn test_defaults() {
        // Only fields without an env source are checked
        let args = Cli::try_parse_from(["hostevent", "--event", "{}"]).unwrap();
        assert_eq!(args.timeout_secs, 600);
        assert_eq!(args.per_page, 100);
        assert!(!args.log_json);
    }

    #[test]
    fn test_fill_repository_skips_payload_only_kinds() {
        for raw in [
            r#"{"event_name":"pull_request","event":{"number":3}}"#,
            r#"{"event_name":"issues","event":{"issue":{"number":2}}}"#,
        ] {
            let event = ParsedEvent::parse(raw).unwrap();
            let event = fill_repository(event, || {
                Err(Error::Config("Invalid GITHUB_REPOSITORY format: bogus".to_string()))
            })
            .unwrap();
            assert!(event.repository_full_name.is_none());
        }
    }

    #[test]
    fn test_fill_repository_for_listing_kinds() {
        for kind in ["schedule", "workflow_run", "status"] {
            let event = fill_repository(ParsedEvent::new(kind), || {
                Ok(Some(RepoRef::new("acme", "widgets")))
            })
            .unwrap();
            assert_eq!(event.repository_full_name.as_deref(), Some("acme/widgets"), "{}", kind);
        }

        // A declared repository is never overridden
        let event = fill_repository(
            ParsedEvent::new("schedule").with_repository("octo/kept"),
            no_repository,
        )
        .unwrap();
        assert_eq!(event.repository_full_name.as_deref(), Some("octo/kept"));
    }

    #[test]
    fn test_fill_repository_reports_bad_env_for_listing_kinds() {
        let err = fill_repository(ParsedEvent::new("schedule"), || {
            Err(Error::Config("Invalid GITHUB_REPOSITORY format: bogus".to_string()))
        })
        .unwrap_err();
        assert_eq!(err.kind(), hostevent_core::ErrorKind::Config);
    }
}

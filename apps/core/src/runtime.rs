use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::LevelFilter;

use crate::config::{self, ConfigError};
use crate::core_service::{CoreService, ServiceError};
use crate::transport::handle_json;

pub const USAGE: &str = "usage: newtab-core [--config PATH] [--verbose] <command>\n\
  search [--limit N] <query...>   rank launcher rows\n\
  resolve <text...>               resolve command text into targets\n\
  go <key...>                     resolve go/ box input\n\
  open [--all] <id>               open a launcher row by id\n\
  serve                           JSON lines over stdin/stdout";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Usage(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Search { query: String, limit: usize },
    Resolve { text: String },
    Go { input: String },
    Open { id: String, open_all: bool },
    Serve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub command: CliCommand,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, RuntimeError> {
    let mut config_path = None;
    let mut verbose = false;
    let mut rest = args.iter();
    let command_name = loop {
        match rest.next().map(String::as_str) {
            Some("--config") => {
                let value = rest
                    .next()
                    .ok_or_else(|| RuntimeError::Usage("--config requires a path".into()))?;
                config_path = Some(PathBuf::from(value));
            }
            Some("--verbose") | Some("-v") => verbose = true,
            Some(flag) if flag.starts_with("--") => {
                return Err(RuntimeError::Usage(format!("unknown option '{flag}'")));
            }
            Some(name) => break name,
            None => return Err(RuntimeError::Usage("missing command".into())),
        }
    };

    let remaining: Vec<&str> = rest.map(String::as_str).collect();
    let command = match command_name {
        "search" => parse_search(&remaining)?,
        "resolve" => CliCommand::Resolve {
            text: required_text(&remaining, "resolve needs command text")?,
        },
        "go" => CliCommand::Go {
            input: remaining.join(" "),
        },
        "open" => parse_open(&remaining)?,
        "serve" => {
            if !remaining.is_empty() {
                return Err(RuntimeError::Usage("serve takes no arguments".into()));
            }
            CliCommand::Serve
        }
        other => return Err(RuntimeError::Usage(format!("unknown command '{other}'"))),
    };

    Ok(RuntimeOptions {
        config_path,
        verbose,
        command,
    })
}

fn parse_search(args: &[&str]) -> Result<CliCommand, RuntimeError> {
    let mut limit = 0;
    let mut words = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "--limit" {
            let value = iter
                .next()
                .ok_or_else(|| RuntimeError::Usage("--limit requires a number".into()))?;
            limit = value
                .parse()
                .map_err(|_| RuntimeError::Usage(format!("invalid limit '{value}'")))?;
        } else {
            words.push(*arg);
        }
    }
    Ok(CliCommand::Search {
        query: words.join(" "),
        limit,
    })
}

fn parse_open(args: &[&str]) -> Result<CliCommand, RuntimeError> {
    let open_all = args.contains(&"--all");
    let words: Vec<&str> = args.iter().copied().filter(|arg| *arg != "--all").collect();
    Ok(CliCommand::Open {
        id: required_text(&words, "open needs a row id")?,
        open_all,
    })
}

fn required_text(words: &[&str], message: &str) -> Result<String, RuntimeError> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(RuntimeError::Usage(message.to_string()));
    }
    Ok(text)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config_path.as_deref())?;
    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(error) = crate::logging::init(level) {
        eprintln!("[newtab-core] logging disabled: {error}");
    }
    log::info!(
        "startup config_path={} store_path={} dashboard_path={}",
        config.config_path.display(),
        config.store_path.display(),
        config.dashboard_path.display(),
    );

    let service = CoreService::new(config)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_command(&service, &options.command, stdin.lock(), stdout.lock())
}

/// Executes one CLI command against `service`, reading requests from
/// `input` in serve mode.
pub fn run_command<R: BufRead, W: Write>(
    service: &CoreService,
    command: &CliCommand,
    input: R,
    mut output: W,
) -> Result<(), RuntimeError> {
    match command {
        CliCommand::Search { query, limit } => {
            for row in service.search(query, *limit) {
                writeln!(output, "{}\t{} {}\t{}", row.id, row.icon, row.label, row.url)?;
            }
        }
        CliCommand::Resolve { text } => {
            let resolution = service.resolve(text);
            if resolution.is_empty() {
                writeln!(output, "no targets for '{}'", text.trim())?;
            }
            for target in &resolution.targets {
                match target.href() {
                    Some(url) => writeln!(output, "{} {}\t{url}", target.icon, target.label)?,
                    None => writeln!(output, "{} {}", target.icon, target.label)?,
                }
            }
        }
        CliCommand::Go { input: text } => {
            writeln!(output, "{}", service.go(text))?;
        }
        CliCommand::Open { id, open_all } => {
            let actions = service.open(id, *open_all)?;
            writeln!(output, "{}", serde_json::to_string(&actions)?)?;
        }
        CliCommand::Serve => serve(service, input, &mut output)?,
    }
    output.flush()?;
    Ok(())
}

/// JSON-lines loop: one request per input line, one response per output
/// line. Blank lines are skipped.
pub fn serve<R: BufRead, W: Write>(
    service: &CoreService,
    input: R,
    output: &mut W,
) -> Result<(), RuntimeError> {
    log::info!("serve loop started");
    let mut handled = 0_usize;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(output, "{}", handle_json(service, &line))?;
        output.flush()?;
        handled += 1;
    }
    log::info!("serve loop finished after {handled} requests");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, run_command, CliCommand, RuntimeError};
    use crate::config::Config;
    use crate::core_service::CoreService;
    use crate::dashboard::DashboardConfig;
    use crate::local_store::LocalStore;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn service() -> CoreService {
        CoreService::with_store(
            Config::default(),
            DashboardConfig::builtin().unwrap(),
            LocalStore::open_memory().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn parses_global_flags_and_search() {
        let options =
            parse_cli_args(&args(&["--config", "/tmp/c.toml", "search", "--limit", "5", "gh", "x"]))
                .unwrap();
        assert_eq!(options.config_path.unwrap().to_string_lossy(), "/tmp/c.toml");
        assert_eq!(
            options.command,
            CliCommand::Search {
                query: "gh x".into(),
                limit: 5
            }
        );
    }

    #[test]
    fn rejects_missing_and_unknown_commands() {
        assert!(matches!(parse_cli_args(&[]), Err(RuntimeError::Usage(_))));
        assert!(matches!(parse_cli_args(&args(&["launch"])), Err(RuntimeError::Usage(_))));
        assert!(matches!(parse_cli_args(&args(&["resolve"])), Err(RuntimeError::Usage(_))));
        assert!(matches!(
            parse_cli_args(&args(&["--config"])),
            Err(RuntimeError::Usage(_))
        ));
    }

    #[test]
    fn open_all_flag_is_positional_agnostic() {
        let options = parse_cli_args(&args(&["open", "--all", "cmd:pkg", "serde"])).unwrap();
        assert_eq!(
            options.command,
            CliCommand::Open {
                id: "cmd:pkg serde".into(),
                open_all: true
            }
        );
    }

    #[test]
    fn resolve_prints_each_target() {
        let mut out = Vec::new();
        let command = CliCommand::Resolve {
            text: "pkg left-pad".into(),
        };
        run_command(&service(), &command, std::io::empty(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("https://www.npmjs.com/package/left-pad"));
    }

    #[test]
    fn serve_answers_one_line_per_request() {
        let input = "{\"kind\":\"tokenize\",\"payload\":{\"text\":\"so \\\"a b\\\"\"}}\n\nnot json\n";
        let mut out = Vec::new();
        run_command(&service(), &CliCommand::Serve, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"tokens\":[\"so\",\"a b\"]"));
        assert!(lines[1].contains("\"code\":\"invalid_json\""));
    }
}

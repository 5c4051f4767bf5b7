//! reqsan CLI: run sanitize rules against a request from the command line.
//!
//! Subcommands:
//! - `eval <config> [--json] [--param key=value...]` — print the effective
//!   parameters, or only the replaced ones as a JSON object
//! - `explain <config> [--param key=value...]` — print what each rule decided
//! - `check <config>` — validate config and rules without a request
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

use std::process;

use reqsan::prelude::*;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "eval" => cmd_eval(&args[2..]),
        "explain" => cmd_explain(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_eval(args: &[String]) -> Result<(), String> {
    let (config_path, rest) = args
        .split_first()
        .ok_or("eval requires a config file path")?;

    let (json, rest) = match rest.split_first() {
        Some((flag, rest)) if flag == "--json" => (true, rest),
        _ => (false, rest),
    };

    let params = parse_params(rest)?;
    let sanitizer = RequestSanitizer::new(load_config(config_path)?);

    if json {
        println!("{}", overlay_json(&sanitizer, &params)?);
        return Ok(());
    }

    for line in effective_lines(&sanitizer, &params)? {
        println!("{line}");
    }
    Ok(())
}

fn cmd_explain(args: &[String]) -> Result<(), String> {
    let (config_path, rest) = args
        .split_first()
        .ok_or("explain requires a config file path")?;

    let params = parse_params(rest)?;
    let sanitizer = RequestSanitizer::new(load_config(config_path)?);

    for line in explain_lines(&sanitizer, &params)? {
        println!("{line}");
    }
    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    let config_path = args.first().ok_or("check requires a config file path")?;
    let config = load_config(config_path)?;

    let rules = check_rules(&config)?;
    println!("Config valid ({rules} rules)");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════════

/// `name=value` for every effective parameter, all values of multi-valued ones.
fn effective_lines(sanitizer: &RequestSanitizer, params: &ParamMap) -> Result<Vec<String>, String> {
    let prepared = sanitizer
        .prepare(params)
        .map_err(|e| format!("bad request: {e}"))?;

    let view = prepared.params();
    let mut names = view.names();
    names.sort_unstable();

    let mut lines = Vec::new();
    for name in names {
        for value in view.get_all(name).unwrap_or_default() {
            lines.push(format!("{name}={value}"));
        }
    }
    Ok(lines)
}

/// The replaced parameters as a JSON object, `{}` when nothing changed.
fn overlay_json(sanitizer: &RequestSanitizer, params: &ParamMap) -> Result<String, String> {
    let prepared = sanitizer
        .prepare(params)
        .map_err(|e| format!("bad request: {e}"))?;

    serde_json::to_string(prepared.overlay()).map_err(|e| format!("JSON encode error: {e}"))
}

fn explain_lines(sanitizer: &RequestSanitizer, params: &ParamMap) -> Result<Vec<String>, String> {
    if !sanitizer
        .is_enabled_for(params)
        .map_err(|e| format!("bad request: {e}"))?
    {
        return Ok(vec!["(sanitizer disabled)".into()]);
    }

    let rules = RuleSet::parse(sanitizer.raw_rules(params)).map_err(|e| format!("bad request: {e}"))?;
    let trace = rules
        .evaluate_with_trace(params)
        .map_err(|e| format!("bad request: {e}"))?;

    let mut lines = Vec::with_capacity(trace.steps.len());
    for step in &trace.steps {
        let original = step.original.as_deref().unwrap_or("(absent)");
        let mut line = format!("{} [{original}]: {}", step.param, step.outcome);
        if !step.skipped.is_empty() {
            line.push_str(&format!(" (skipped non-numeric at {:?})", step.skipped));
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push("(no rules)".into());
    }
    Ok(lines)
}

/// Parse configured rules and reject thresholds that could never evaluate.
fn check_rules(config: &SanitizerConfig) -> Result<usize, String> {
    let rules = RuleSet::parse(&config.rules).map_err(|e| format!("config invalid: {e}"))?;

    for (param, rule) in rules.iter() {
        for condition in rule.conditions() {
            if let Some((bound, _)) = condition.threshold() {
                if bound.value().is_none() {
                    return Err(format!(
                        "config invalid: threshold \"{}\" for param {param} is not an integer",
                        bound.raw()
                    ));
                }
            }
        }
    }
    Ok(rules.len())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<SanitizerConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: SanitizerConfig = if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))?
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))?
    };

    tracing::debug!(path, enabled = config.enabled, rules = config.rules.len(), "loaded config");
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

/// Collect `--param key=value...` pairs. Repeated keys become multi-valued.
fn parse_params(args: &[String]) -> Result<ParamMap, String> {
    let mut params = ParamMap::new();
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--param" {
            i += 1;
            while i < args.len() && !args[i].starts_with("--") {
                let pair = &args[i];
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("invalid param pair \"{pair}\", expected key=value"))?;
                params.insert(key, value);
                i += 1;
            }
        } else {
            return Err(format!("unexpected argument \"{}\"", args[i]));
        }
    }

    Ok(params)
}

fn print_usage() {
    eprintln!(
        "Usage: reqsan <command> [options]

Commands:
  eval <config> [--json] [--param key=value...]
                                            Print effective request parameters
                                            (--json: replaced ones as JSON)
  explain <config> [--param key=value...]   Show what each rule decided
  check <config>                            Validate config and rules
  help                                      Show this help

Rules in a request are passed as --param sanitize=<param>=<body>."
    );
}

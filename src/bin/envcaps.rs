use std::{env, process::ExitCode};

use anyhow::{anyhow, Context, Result};
use envcaps::{
    config::errors::{ERR_CLI_BAD_ARGUMENT, ERR_CLI_MISSING_COMMAND, ERR_CLI_UNKNOWN_COMMAND},
    discover_parameter_limit, init_tracing, plan_chunks, CapabilityCache, ProbeConfig, SqliteDriver,
    APP_NAME, CAPABILITIES_HEADER,
};

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{APP_NAME}: {err:?}");
            eprintln!("{APP_NAME}: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return Err(anyhow!("{ERR_CLI_MISSING_COMMAND}: missing command"));
    }
    let cmd = args.remove(0);
    match cmd.as_str() {
        "probe" => probe_cmd(&args),
        "capabilities" => capabilities_cmd(&args),
        "plan" => plan_cmd(&args),
        "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("{ERR_CLI_UNKNOWN_COMMAND}: unknown command '{other}'")),
    }
}

fn probe_cmd(args: &[String]) -> Result<()> {
    let mut config = ProbeConfig::from_env();
    let mut emulate: Option<usize> = None;
    let mut json = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--ceiling" => {
                idx += 1;
                config.parameter_ceiling = parse_number(args.get(idx), "--ceiling")?;
            }
            "--emulate-limit" => {
                idx += 1;
                emulate = Some(parse_number(args.get(idx), "--emulate-limit")?);
            }
            "--json" => json = true,
            flag => {
                return Err(anyhow!(
                    "{ERR_CLI_BAD_ARGUMENT}: unexpected flag '{flag}' for probe command"
                ));
            }
        }
        idx += 1;
    }
    config.validate()?;

    let driver = match emulate {
        Some(limit) => SqliteDriver::with_variable_limit(limit)?,
        None => SqliteDriver::new(),
    };
    let compiled = driver
        .compiled_variable_limit()
        .context("read sqlite compile options")?;
    let report = discover_parameter_limit(&driver, config.parameter_ceiling)
        .context("discover bind-parameter limit")?;

    if json {
        let out = serde_json::json!({
            "report": report,
            "compiledVariableLimit": compiled,
            "sqliteVersion": rusqlite::version(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("parameter-limit: {}", report.limit);
        println!("ceiling: {} (rejected: {})", report.ceiling, report.ceiling_rejected);
        println!("iterations: {}", report.iterations);
        match compiled {
            Some(value) => println!("compile-option: MAX_VARIABLE_NUMBER={value}"),
            None => println!("compile-option: not declared"),
        }
        println!("sqlite: {}", rusqlite::version());
    }
    Ok(())
}

fn capabilities_cmd(args: &[String]) -> Result<()> {
    let json = match args {
        [] => false,
        [flag] if flag == "--json" => true,
        _ => {
            return Err(anyhow!(
                "{ERR_CLI_BAD_ARGUMENT}: capabilities accepts only --json"
            ))
        }
    };
    let cache = CapabilityCache::new(ProbeConfig::from_env())?;
    let caps = cache.capabilities();
    if json {
        println!("{}", serde_json::to_string(caps)?);
    } else {
        println!("{CAPABILITIES_HEADER}: {}", caps.to_header_value());
    }
    Ok(())
}

fn plan_cmd(args: &[String]) -> Result<()> {
    let rows = parse_number(args.first(), "<rows>")?;
    let columns = parse_number(args.get(1), "<columns>")?;
    let limit = match args.get(2).map(String::as_str) {
        Some("--limit") => {
            if let Some(extra) = args.get(4) {
                return Err(anyhow!(
                    "{ERR_CLI_BAD_ARGUMENT}: unexpected argument '{extra}' for plan command"
                ));
            }
            parse_number(args.get(3), "--limit")?
        }
        Some(other) => {
            return Err(anyhow!(
                "{ERR_CLI_BAD_ARGUMENT}: unexpected argument '{other}' for plan command"
            ))
        }
        None => {
            let cache = CapabilityCache::new(ProbeConfig::from_env())?;
            cache.parameter_limit()?.get()
        }
    };

    let plan = plan_chunks(rows, columns, limit)?;
    println!(
        "rows-per-chunk: {} chunks: {}",
        plan.rows_per_chunk(),
        plan.chunk_count()
    );
    for range in plan {
        println!("{}..{}", range.start, range.end);
    }
    Ok(())
}

fn parse_number(raw: Option<&String>, name: &str) -> Result<usize> {
    let raw = raw.with_context(|| format!("{ERR_CLI_BAD_ARGUMENT}: {name} expects a number"))?;
    raw.parse::<usize>()
        .with_context(|| format!("{ERR_CLI_BAD_ARGUMENT}: {name} is not a number: '{raw}'"))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  envcaps probe [--ceiling N] [--emulate-limit N] [--json]");
    eprintln!("  envcaps capabilities [--json]");
    eprintln!("  envcaps plan <rows> <columns> [--limit N]");
    eprintln!("  envcaps --help");
}

//! embedo CLI — driving adapter for the embedo engine.
//!
//! Subcommands:
//! - `match <url>` — match a URL and print the result as JSON
//! - `embed <url>` — print the provider's embed URL
//! - `html <url>`  — print the rendered embed HTML
//! - `list`        — print registered matchers
//!
//! Every subcommand accepts `--registry <file>` to load additional matcher
//! definitions (YAML or JSON, a list of pattern configs) on top of the
//! built-in provider set.

use std::process;
use std::sync::Arc;

use embedo::{EmbedOptions, MatcherRegistry, PatternConfig};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "match" => cmd_match(&args[2..]),
        "embed" => cmd_embed(&args[2..]),
        "html" => cmd_html(&args[2..]),
        "list" => cmd_list(&args[2..]),
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

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(args: &[String]) -> Result<(), String> {
    let parsed = parse_args(args)?;
    let url = parsed.url.ok_or("match requires a URL argument")?;
    let registry = build_registry(parsed.registry_file.as_deref())?;

    let (json, matched) = render_match(&registry, &url);
    println!(
        "{}",
        serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
    );
    if !matched {
        process::exit(1);
    }
    Ok(())
}

fn cmd_embed(args: &[String]) -> Result<(), String> {
    let parsed = parse_args(args)?;
    let url = parsed.url.ok_or("embed requires a URL argument")?;
    let registry = build_registry(parsed.registry_file.as_deref())?;

    let embed = registry
        .embed_url(&url, &EmbedOptions::new())
        .ok_or_else(|| format!("no matcher recognized \"{url}\""))?;
    println!("{embed}");
    Ok(())
}

fn cmd_html(args: &[String]) -> Result<(), String> {
    let parsed = parse_args(args)?;
    let url = parsed.url.ok_or("html requires a URL argument")?;
    let registry = build_registry(parsed.registry_file.as_deref())?;

    let output = registry
        .output(&url, &EmbedOptions::new())
        .ok_or_else(|| format!("no matcher recognized \"{url}\""))?;
    println!("{}", output.to_html());
    Ok(())
}

fn cmd_list(args: &[String]) -> Result<(), String> {
    let parsed = parse_args(args)?;
    if parsed.url.is_some() {
        return Err("list takes no URL argument".into());
    }
    let registry = build_registry(parsed.registry_file.as_deref())?;

    for entry in registry.list() {
        let matcher = entry.matcher();
        let domains = matcher
            .domains()
            .map_or_else(|| "(wildcard)".to_owned(), |d| d.join(", "));
        if matcher.schemes().is_empty() {
            println!("{} [{domains}]", matcher.name());
        } else {
            println!(
                "{} [{domains}] schemes: {}",
                matcher.name(),
                matcher.schemes().join(", ")
            );
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry(registry_file: Option<&str>) -> Result<MatcherRegistry, String> {
    let mut registry = MatcherRegistry::with_defaults();
    if let Some(path) = registry_file {
        for config in load_configs(path)? {
            let name = config.name.clone();
            let matcher = config
                .build()
                .map_err(|e| format!("matcher \"{name}\": {e}"))?;
            registry = registry.with_entry(Arc::new(matcher), 0);
        }
    }
    Ok(registry)
}

fn load_configs(path: &str) -> Result<Vec<PatternConfig>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════════

/// Render a match result as the CLI's JSON shape. Returns the value and
/// whether the match succeeded.
fn render_match(registry: &MatcherRegistry, url: &str) -> (serde_json::Value, bool) {
    match registry.match_url(url) {
        Ok(hit) => (
            serde_json::json!({
                "ok": true,
                "matcher": hit.matcher.name(),
                "data": hit.data,
            }),
            true,
        ),
        Err(err) => (
            serde_json::json!({
                "ok": false,
                "error": err,
            }),
            false,
        ),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

struct ParsedArgs {
    url: Option<String>,
    registry_file: Option<String>,
}

fn parse_args(args: &[String]) -> Result<ParsedArgs, String> {
    let mut url = None;
    let mut registry_file = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--registry" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--registry requires a file path".to_owned())?;
                registry_file = Some(path.clone());
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option \"{other}\""));
            }
            other if url.is_none() => url = Some(other.to_owned()),
            other => return Err(format!("unexpected argument \"{other}\"")),
        }
        i += 1;
    }

    Ok(ParsedArgs { url, registry_file })
}

fn print_usage() {
    eprintln!(
        "Usage: embedo <command> [options]

Commands:
  match <url>    Match a URL and print the result as JSON
  embed <url>    Print the provider's embed URL
  html <url>     Print the rendered embed HTML
  list           Print registered matchers
  help           Show this help

Options:
  --registry <file>   Load extra matcher definitions (YAML or JSON)"
    );
}

//! ev-resolve - Resolve a website snapshot offline
//!
//! Reads a website snapshot (the nested JSON returned by
//! `GET /api/websites/:id`) and a visitor context, and prints what the
//! embedded script would receive.
//!
//! Usage:
//!     ev-resolve site.json
//!     ev-resolve site.json --context visit.json
//!     ev-resolve site.json --user-agent "Mozilla/5.0 (iPhone...)" --width 390 --path /sale
//!     ev-resolve site.json --explain

use std::path::{Path, PathBuf};

use clap::Parser;
use ev_core::{explain_element, resolve_site, RequestContext, SiteSnapshot};

#[derive(Parser, Debug)]
#[command(name = "ev-resolve")]
#[command(about = "Resolve element variants for a visitor context")]
#[command(version)]
struct Args {
    /// Path to the website snapshot JSON
    snapshot: PathBuf,

    /// Path to a context JSON file (same shape the widget posts)
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Page URL
    #[arg(long)]
    url: Option<String>,

    /// Page path
    #[arg(long)]
    path: Option<String>,

    /// Referrer URL
    #[arg(long)]
    referrer: Option<String>,

    /// Browser user agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Browser language (e.g. en-US)
    #[arg(long)]
    language: Option<String>,

    /// Screen width in CSS pixels
    #[arg(long)]
    width: Option<f64>,

    /// Screen height in CSS pixels
    #[arg(long)]
    height: Option<f64>,

    /// Show per-variant scores and rejections instead of the result
    #[arg(long)]
    explain: bool,
}

fn main() {
    let args = Args::parse();

    let snapshot: SiteSnapshot = match read_json(&args.snapshot) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading snapshot: {}", e);
            std::process::exit(1);
        }
    };

    let context = match build_context(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading context: {}", e);
            std::process::exit(1);
        }
    };

    let output = if args.explain {
        let reports: Vec<_> = snapshot
            .elements
            .iter()
            .map(|element| explain_element(element, &context))
            .collect();
        serde_json::to_string_pretty(&reports)
    } else {
        let resolution = resolve_site(&snapshot, &context);
        for failure in &resolution.failures {
            eprintln!("skipped: {}", failure);
        }
        serde_json::to_string_pretty(&serde_json::json!({ "variants": resolution.variants }))
    };

    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error rendering output: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Context file first, then individual flags on top of it
fn build_context(args: &Args) -> Result<RequestContext, String> {
    let mut context = match &args.context {
        Some(path) => read_json(path)?,
        None => RequestContext::new(),
    };

    if let Some(url) = &args.url {
        context.url = url.clone();
    }
    if let Some(path) = &args.path {
        context.path = path.clone();
    }
    if let Some(referrer) = &args.referrer {
        context.referrer = referrer.clone();
    }
    if let Some(user_agent) = &args.user_agent {
        context.user_agent = user_agent.clone();
    }
    if let Some(language) = &args.language {
        context.language = language.clone();
    }
    if let Some(width) = args.width {
        context.screen_width = width;
    }
    if let Some(height) = args.height {
        context.screen_height = height;
    }

    Ok(context)
}

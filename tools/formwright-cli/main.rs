use clap::{Parser, Subcommand};
use formwright::prelude::*;
use itertools::Itertools;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Compile form definitions and exercise their pages from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a form definition and list its pages, sections and conditions
    Check {
        /// Path to the form definition JSON file
        form: String,
    },
    /// Print the page that follows PAGE for the given state
    Next {
        form: String,
        /// Path of the page, e.g. /age
        page: String,
        /// Path to a JSON file holding the application state
        state: String,
    },
    /// Validate a form payload against a page and print the resulting state update
    Validate {
        form: String,
        page: String,
        /// Path to a JSON file holding the submitted form data
        payload: String,
    },
    /// Print every answer, marking rows that fail validation with '!'
    Summary { form: String, state: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Command::Check { form } => run_check(&form),
        Command::Next { form, page, state } => run_next(&form, &page, &state),
        Command::Validate { form, page, payload } => run_validate(&form, &page, &payload),
        Command::Summary { form, state } => run_summary(&form, &state),
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_check(form_path: &str) -> i32 {
    let start = Instant::now();
    let model = load_model(form_path);
    let duration = start.elapsed();

    println!("Compiled '{}' in {:?}", form_path, duration);

    println!("\n--- Pages ---");
    for page in model.pages() {
        let section = page.section().map(|s| s.name.as_str()).unwrap_or("-");
        println!(
            "{:<30} section: {:<15} fields: {:<3} routes: {}",
            page.path(),
            section,
            page.components().form_items().count(),
            page.next_rules().len()
        );
    }

    println!("\n--- Sections ---");
    for section in model.sections() {
        println!("{:<20} {}", section.name, section.title);
    }

    println!("\n--- Conditions ---");
    for condition in model.conditions().iter() {
        let mut fields = HashSet::new();
        condition.expression.referenced_fields(&mut fields);
        let reads = fields.iter().map(ToString::to_string).sorted().join(", ");
        println!("{:<20} {:<40} reads: {}", condition.name, condition.source, reads);
    }
    0
}

fn run_next(form_path: &str, page_path: &str, state_path: &str) -> i32 {
    let model = load_model(form_path);
    let state = load_object(state_path, "state");
    let page = find_page(&model, page_path);

    let decision = page.next_decision(&state);
    println!("{}", decision.path);
    println!("  -> Reason: {}", decision.reason);
    0
}

fn run_validate(form_path: &str, page_path: &str, payload_path: &str) -> i32 {
    let model = load_model(form_path);
    let payload = load_object(payload_path, "payload");
    let page = find_page(&model, page_path);

    let result = page
        .validate_form(&payload)
        .and_then(|form_data| page.validate_state(&page.state_from_valid_form(&form_data)));

    match result {
        Ok(state) => {
            let update = Value::Object(page.partial_merge_state(state));
            println!("{}", serde_json::to_string_pretty(&update).unwrap_or_default());
            0
        }
        Err(errors) => {
            println!("{}", errors.title_text);
            for item in &errors.error_list {
                println!("  {:<30} {}", item.name, item.text);
            }
            1
        }
    }
}

fn run_summary(form_path: &str, state_path: &str) -> i32 {
    let model = load_model(form_path);
    let state = load_object(state_path, "state");
    let summary = model.summary(&state);

    for section in &summary.details {
        if let Some(title) = &section.title {
            println!("\n--- {} ---", title);
        }
        for row in &section.items {
            let marker = if row.in_error { "!" } else { " " };
            println!("{} {:<30} {}", marker, row.label, row.value);
        }
    }

    if summary.ready {
        println!("\nReady to submit.");
        0
    } else {
        println!("\n{} problem(s):", summary.errors.len());
        for error in &summary.errors {
            println!("  {}", error.message);
        }
        2
    }
}

fn load_model(path: &str) -> Model {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read form file '{}': {}", path, e)));
    json.parse::<Model>()
        .unwrap_or_else(|e| exit_with_error(&format!("Form compilation failed: {}", e)))
}

fn load_object(path: &str, what: &str) -> State {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e)));
    match serde_json::from_str(&json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => exit_with_error(&format!("The {} file must hold a JSON object", what)),
        Err(e) => exit_with_error(&format!("Failed to parse {} JSON: {}", what, e)),
    }
}

fn find_page<'m>(model: &'m Model, path: &str) -> &'m Page {
    model
        .page(path)
        .unwrap_or_else(|| exit_with_error(&format!("No page is registered at '{}'", path)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use flaglist_core::actions::ListAction;
use flaglist_core::actions::RuntimeAction;
use flaglist_core::config::Config;
use flaglist_core::reducer::reduce;
use flaglist_core::state::EnvironmentScope;
use flaglist_core::state::ListKind;
use flaglist_core::state::ListPageState;
use flaglist_core::validation::validate;
use flaglist_core::validation::FormKind;
use flaglist_core::validation::FormValues;
use flaglist_source::Dataset;
use flaglist_source::FailingSource;
use flaglist_source::ListDataSource;
use flaglist_source::Record;

mod logging;
mod render;
mod runner;
mod ui;

use logging::logger_init;
use logging::LoggerConfig;

pub type SharedSource = Arc<dyn ListDataSource<Record> + Send + Sync>;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("flaglist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "list" => {
            let list_args = parse_list_args(args.collect())?;
            run_list(list_args)
        }
        "browse" => {
            let list_args = parse_list_args(args.collect())?;
            run_browse(list_args)
        }
        "validate" => run_validate(args.collect()),
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListArgs {
    kind: ListKind,
    data: Option<PathBuf>,
    query: String,
    env: Option<String>,
    org: Option<String>,
    config: Option<PathBuf>,
    page_size: Option<u32>,
    log_level: Option<String>,
    log_format: Option<String>,
    simulate_outage: bool,
    json: bool,
}

fn parse_list_args(args: Vec<String>) -> Result<ListArgs, Box<dyn std::error::Error>> {
    let Some(slug) = args.first() else {
        return Err(format!("missing list kind (one of: {})", kind_names()).into());
    };
    let Some(kind) = ListKind::from_slug(slug) else {
        return Err(format!("unknown list kind: {slug} (one of: {})", kind_names()).into());
    };

    let mut parsed = ListArgs {
        kind,
        data: None,
        query: String::new(),
        env: None,
        org: None,
        config: None,
        page_size: None,
        log_level: None,
        log_format: None,
        simulate_outage: false,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--simulate-outage" => {
                parsed.simulate_outage = true;
                i += 1;
                continue;
            }
            "--json" => {
                parsed.json = true;
                i += 1;
                continue;
            }
            _ => {}
        }
        let Some(value) = args.get(i + 1).cloned() else {
            return Err(format!("{flag} requires a value").into());
        };
        match flag {
            "--data" => parsed.data = Some(PathBuf::from(value)),
            "--query" => parsed.query = query_part(&value).to_string(),
            "--env" => parsed.env = Some(value),
            "--org" => parsed.org = Some(value),
            "--config" => parsed.config = Some(PathBuf::from(value)),
            "--page-size" => {
                let size = value
                    .parse::<u32>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| format!("--page-size must be a positive integer, got {value}"))?;
                parsed.page_size = Some(size);
            }
            "--log-level" => parsed.log_level = Some(value),
            "--log-format" => parsed.log_format = Some(value),
            other => return Err(format!("unsupported argument: {other}").into()),
        }
        i += 2;
    }
    Ok(parsed)
}

/// Accepts a bare query string or a whole address such as `/features?page=2`.
fn query_part(value: &str) -> &str {
    match value.split_once('?') {
        Some((_, query)) => query,
        None => value,
    }
}

fn kind_names() -> String {
    ListKind::ALL
        .iter()
        .map(|kind| kind.slug())
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flaglist").join("config.toml"))
}

fn load_config(args: &ListArgs) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => match default_config_path() {
            Some(path) => Config::load_or_default(path)?,
            None => Config::default(),
        },
    };
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &args.log_format {
        config.logging.format = format.clone();
    }
    if let Some(env) = &args.env {
        config.environment.id = env.clone();
    }
    if let Some(org) = &args.org {
        config.environment.organization = Some(org.clone());
    }
    if let Some(page_size) = args.page_size {
        config.list.page_size = page_size;
    }
    Ok(config)
}

fn build_source(args: &ListArgs) -> Result<SharedSource, Box<dyn std::error::Error>> {
    if args.simulate_outage {
        return Ok(Arc::new(FailingSource::unavailable("simulated outage")));
    }
    let dataset = match &args.data {
        Some(path) => Dataset::load(path)?,
        None => Dataset::new(),
    };
    Ok(Arc::new(dataset.source(args.kind)))
}

fn page_state(args: &ListArgs, config: &Config) -> ListPageState<Record> {
    let scope: EnvironmentScope = config.environment.scope();
    ListPageState::new(args.kind, scope, config.list.page_size)
}

fn run_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    logger_init(&LoggerConfig::from_config(&config.logging)?)?;

    let source = build_source(&args)?;
    let mut state = page_state(&args, &config);
    let effects = reduce(
        &mut state,
        ListAction::Runtime(RuntimeAction::Initialize {
            query: args.query.clone(),
        }),
    );
    runner::drive(&mut state, source.as_ref(), effects);

    if args.json {
        println!("{}", render::render_json(&state)?);
    } else {
        print!("{}", render::render_text(&state));
    }
    match &state.fetch.error {
        Some(error) => Err(error.clone().into()),
        None => Ok(()),
    }
}

fn run_browse(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    // Stderr belongs to the terminal UI; only log when a file is configured.
    if config.logging.file.is_some() {
        logger_init(&LoggerConfig::from_config(&config.logging)?)?;
    }

    let source = build_source(&args)?;
    let state = page_state(&args, &config);
    ui::run(state, source, args.query)
}

fn parse_form_values(args: &[String]) -> Result<FormValues, Box<dyn std::error::Error>> {
    let mut values = FormValues::new();
    for arg in args {
        let Some((field, value)) = arg.split_once('=') else {
            return Err(format!("expected field=value, got {arg}").into());
        };
        values.insert(field.trim(), value);
    }
    Ok(values)
}

fn run_validate(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let names = FormKind::ALL
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ");
    let Some(name) = args.first() else {
        return Err(format!("missing form (one of: {names})").into());
    };
    let Some(form) = FormKind::from_name(name) else {
        return Err(format!("unknown form: {name} (one of: {names})").into());
    };

    let values = parse_form_values(&args[1..])?;
    let validation = validate(&values, &form.rules()?);
    if validation.is_valid() {
        println!("{} form is valid", form.name());
        return Ok(());
    }
    for error in validation.errors() {
        println!("  {error}");
    }
    let count = validation.errors().len();
    Err(format!("{} form has {count} invalid field(s)", form.name()).into())
}

fn print_help() {
    println!("flaglist {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  flaglist list <kind> [--data PATH] [--query QUERY] [--env ID] [--org ID]");
    println!("                       [--page-size N] [--config PATH] [--log-level LEVEL]");
    println!("                       [--log-format text|json] [--simulate-outage] [--json]");
    println!("  flaglist browse <kind> [same options as list]");
    println!("  flaglist validate <feature|goal|segment> field=value...");
    println!("  flaglist --help");
    println!("  flaglist --version");
    println!("Kinds: {}", kind_names());
}

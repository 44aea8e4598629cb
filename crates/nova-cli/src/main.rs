use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nova_config::{ClassifierMode, ConfigDiagnostics, NovaConfig};
use nova_framework_webfn::{
    extract_routes_from_source, extract_routes_in_dir, route_symbol, ClassifierKind,
    RouteDefinition, RouteIndexEntry,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nova", version, about = "Nova CLI (functional route extraction)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the routes declared with Spring functional routing
    Routes(RoutesArgs),
}

#[derive(Args)]
struct RoutesArgs {
    /// A Java source file or a project directory
    path: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// Call classifier (`simple` or `precise`); overrides `webfn.classifier`
    #[arg(long)]
    classifier: Option<ClassifierMode>,
    /// Config file to use instead of discovering `nova.toml`
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Tree,
    Symbols,
    Json,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Routes(args) => {
            let config = load_config(&args)?;
            let mode = args.classifier.unwrap_or(config.webfn.classifier);
            let classifier = classifier_kind(mode).classifier();

            let files = if args.path.is_dir() {
                extract_routes_in_dir(&args.path, classifier, &config.webfn.exclude_dirs)
                    .with_context(|| format!("failed to scan {}", args.path.display()))?
            } else {
                let text = std::fs::read_to_string(&args.path)
                    .with_context(|| format!("failed to read {}", args.path.display()))?;
                let uri = args.path.display().to_string();
                let routes = extract_routes_from_source(&uri, &text, classifier)?;
                vec![(args.path.clone(), routes)]
            };

            tracing::debug!(
                target: "nova.cli",
                classifier = %mode,
                files = files.len(),
                routes = files.iter().map(|(_, routes)| routes.len()).sum::<usize>(),
                "route extraction finished"
            );
            print_routes(&files, args.format)?;
            Ok(0)
        }
    }
}

fn load_config(args: &RoutesArgs) -> Result<NovaConfig> {
    let (config, path, diagnostics) = match &args.config {
        Some(path) => {
            let (config, diagnostics) = NovaConfig::load_from_path_with_diagnostics(path)?;
            (config, Some(path.clone()), diagnostics)
        }
        None => {
            let root = workspace_root(&args.path);
            nova_config::load_for_workspace_with_diagnostics(&root)?
        }
    };

    nova_config::init_tracing(&config.logging);
    if let Some(path) = &path {
        tracing::debug!(target: "nova.cli", path = %path.display(), "loaded config");
    }
    report_diagnostics(&diagnostics);
    Ok(config)
}

fn workspace_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn report_diagnostics(diagnostics: &ConfigDiagnostics) {
    for key in &diagnostics.unknown_keys {
        tracing::warn!(target: "nova.cli", key = %key, "unknown config key");
    }
    for warning in &diagnostics.warnings {
        tracing::warn!(target: "nova.cli", ?warning, "config warning");
    }
}

fn classifier_kind(mode: ClassifierMode) -> ClassifierKind {
    match mode {
        ClassifierMode::Simple => ClassifierKind::Simple,
        ClassifierMode::Precise => ClassifierKind::Precise,
    }
}

#[derive(Serialize)]
struct FileRoutes<'a> {
    file: &'a Path,
    routes: Vec<RouteIndexEntry>,
}

fn print_routes(files: &[(PathBuf, Vec<RouteDefinition>)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let out: Vec<FileRoutes<'_>> = files
                .iter()
                .map(|(file, routes)| FileRoutes {
                    file,
                    routes: routes.iter().map(RouteIndexEntry::from_route).collect(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => print_table(files),
        OutputFormat::Tree => {
            for (file, routes) in files {
                println!("{}:", file.display());
                for route in routes {
                    print!("{route}");
                }
            }
        }
        OutputFormat::Symbols => {
            for (file, routes) in files {
                for route in routes {
                    if let Some(symbol) = route_symbol(route) {
                        println!("{}  {}", location(file, route), symbol.label);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_table(files: &[(PathBuf, Vec<RouteDefinition>)]) {
    let rows: Vec<[String; 4]> = files
        .iter()
        .flat_map(|(file, routes)| {
            routes.iter().map(move |route| {
                let methods = route.method_names();
                [
                    if methods.is_empty() {
                        "*".to_string()
                    } else {
                        methods.join(",")
                    },
                    route.full_path().unwrap_or_else(|| "-".to_string()),
                    route.handler_label().unwrap_or_else(|| "-".to_string()),
                    location(file, route),
                ]
            })
        })
        .collect();

    if rows.is_empty() {
        println!("no routes found");
        return;
    }

    let header = ["METHOD", "PATH", "HANDLER", "LOCATION"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: [&str; 4]| {
        format!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        )
    };
    println!("{}", line(header).trim_end());
    for row in &rows {
        let cells = [row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()];
        println!("{}", line(cells).trim_end());
    }
    println!("{} route(s)", rows.len());
}

fn location(file: &Path, route: &RouteDefinition) -> String {
    match route.range {
        Some(range) => format!(
            "{}:{}:{}",
            file.display(),
            range.start.line + 1,
            range.start.character + 1
        ),
        None => file.display().to_string(),
    }
}

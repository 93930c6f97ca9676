use anyhow::{bail, Context, Result};
use chrono::Utc;
use crossterm::style::Stylize;
use std::path::PathBuf;

use tableview::clipboard::ClipboardManager;
use tableview::config::config::Config;
use tableview::data::data_view::TableView;
use tableview::registry::{init_tables, TableSource};
use tableview::table_display::display_view;
use tableview::ui::table_app::TableApp;
use tableview::utils::logging::{self, LogRingBuffer};
use tableview::utils::dual_logging;

#[derive(Debug, Default)]
struct CliArgs {
    files: Vec<PathBuf>,
    print: bool,
    search: Option<String>,
    sort: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
    export: bool,
    generate_config: bool,
    ascii: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--print" => cli.print = true,
            "--search" => cli.search = Some(value("--search")?),
            "--sort" => cli.sort = Some(value("--sort")?),
            "--page" => {
                let v = value("--page")?;
                cli.page = Some(v.parse().with_context(|| format!("bad --page '{}'", v))?);
            }
            "--per-page" => {
                let v = value("--per-page")?;
                cli.per_page = Some(v.parse().with_context(|| format!("bad --per-page '{}'", v))?);
            }
            "--export" => cli.export = true,
            "--generate-config" => cli.generate_config = true,
            "--ascii" => cli.ascii = true,
            "--help" | "-h" => cli.help = true,
            flag if flag.starts_with("--") => bail!("unknown option '{}'", flag),
            file => cli.files.push(PathBuf::from(file)),
        }
    }
    Ok(cli)
}

fn print_help() {
    println!("{}", "tableview - browse tables with search, sort and selection".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  tableview [OPTIONS] FILE.csv|FILE.html ...");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}            - Print one page per table instead of the viewer", "--print".green());
    println!("  {}      - Filter rows before printing", "--search TERM".green());
    println!("  {} - Sort by column name or index", "--sort COL[:desc]".green());
    println!("  {}          - Page to print", "--page N".green());
    println!("  {}      - Rows per page", "--per-page N".green());
    println!("  {}           - Export the filtered rows of every table to CSV", "--export".green());
    println!("  {}            - ASCII icons", "--ascii".green());
    println!("  {}  - Write a commented default config file", "--generate-config".green());
    println!();
    println!("{}", "Viewer keys:".yellow());
    println!("  {}        - Search (Enter to apply now, Esc to leave)", "/".green());
    println!("  {}  - Previous / next page, first / last page", "←/→ Home/End".green());
    println!("  {}  - Move row cursor, toggle row, toggle page", "↑/↓ Space a".green());
    println!("  {}    - Choose header and sort", "h/l s".green());
    println!("  {}      - Rows per page", "+/-".green());
    println!("  {}      - Export selected / all rows", "e/E".green());
    println!("  {}        - Copy filtered rows for spreadsheets", "y".green());
    println!("  {}      - Next table", "Tab".green());
    println!("  {}       - Toggle log panel", "F5".green());
    println!("  {}        - Quit", "q".green());
    println!();
    println!("Set {}=debug for verbose logs", logging::LOG_ENV_VAR);
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Configuration file created at: {}", path.display());
    Ok(())
}

/// Apply the command-line view parameters to one table
fn apply_cli(view: &mut TableView, cli: &CliArgs) -> Result<()> {
    if let Some(per_page) = cli.per_page {
        view.set_per_page(per_page)?;
    }
    if let Some(term) = &cli.search {
        view.search(term.as_str());
    }
    if let Some(sort_arg) = &cli.sort {
        let (column, descending) = match sort_arg.rsplit_once(':') {
            Some((col, dir)) if dir.eq_ignore_ascii_case("desc") => (col, true),
            Some((col, dir)) if dir.eq_ignore_ascii_case("asc") => (col, false),
            _ => (sort_arg.as_str(), false),
        };
        let index = view
            .table()
            .get_column_index(column)
            .or_else(|| column.parse().ok())
            .with_context(|| format!("no column '{}' in '{}'", column, view.name()))?;
        view.sort_by_column(index)?;
        if descending {
            view.sort_by_column(index)?;
        }
    }
    if let Some(page) = cli.page {
        view.set_page(page);
    }
    Ok(())
}

fn run(cli: CliArgs, log_buffer: LogRingBuffer) -> Result<()> {
    let mut config = Config::load().context("loading configuration")?;
    if cli.ascii {
        config.display.icons = tableview::config::config::IconConfig::simple();
    }

    let sources: Vec<TableSource> = cli.files.iter().cloned().map(TableSource::File).collect();
    let mut registry = init_tables(&sources, &config.to_table_options(), &config.to_csv_options());

    for (name, err) in registry.failures() {
        eprintln!("{} {}: {}", "Skipped".yellow(), name, err);
    }
    if registry.is_empty() {
        bail!("none of the {} files could be loaded", sources.len());
    }

    for view in registry.iter_mut() {
        apply_cli(view, &cli)?;
    }

    if cli.export {
        for view in registry.iter() {
            let notice = view.export_all(Utc::now())?;
            println!("{}: {}", view.name(), notice.to_string().green());
        }
        if !cli.print {
            return Ok(());
        }
    }

    if cli.print {
        for view in registry.iter_mut() {
            display_view(&view.render(), &config.display.icons);
            println!();
        }
        return Ok(());
    }

    TableApp::new(registry, config.display.icons.clone(), ClipboardManager::system())
        .with_log_buffer(log_buffer)
        .run()
}

fn main() {
    let log_buffer = logging::init_tracing_with_dual_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            eprintln!("Run with --help for usage");
            std::process::exit(2);
        }
    };

    if cli.help {
        print_help();
        return;
    }

    if cli.generate_config {
        if let Err(e) = generate_config() {
            eprintln!("{} {:#}", "Error:".red(), e);
            std::process::exit(1);
        }
        return;
    }

    if cli.files.is_empty() {
        print_help();
        std::process::exit(2);
    }

    if let Some(dual_logger) = dual_logging::get_dual_logger() {
        eprintln!("Logs: {}", dual_logger.log_path().display());
    }

    // the viewer has restored the terminal by the time an error arrives here
    if let Err(e) = run(cli, log_buffer) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = parse_args(&args(&["a.csv", "--print", "--sort", "Name:desc", "b.html"])).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.csv"), PathBuf::from("b.html")]);
        assert!(cli.print);
        assert_eq!(cli.sort.as_deref(), Some("Name:desc"));
    }

    #[test]
    fn test_missing_value_is_error() {
        assert!(parse_args(&args(&["--search"])).is_err());
        assert!(parse_args(&args(&["--page", "x"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}

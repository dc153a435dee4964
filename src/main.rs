#![warn(clippy::pedantic)]

mod settings;
mod term;

use std::io::{Write, stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};
use thiserror::Error;
use wishes::calendar::{CalendarStats, YearMonth, build_date_index, month_grid};
use wishes::edit::{Draft, add, remove};
use wishes::format::{DayOutput, ListOutput, MonthOutput, SummaryOutput};
use wishes::parse::{parse_day, parse_month};
use wishes::product::is_known_category;
use wishes::stats::{Filter, SortOrder, Summary, select};
use wishes::store::JsonStore;
use wishes::{Currency, Date, Decimal, Priority, ProductId, Status};

use crate::settings::{Settings, Theme};

#[derive(Debug, Parser)]
#[command(version, about = "Wishlist with a purchase calendar")]
struct Command {
    /// Product snapshot, defaults to the one named in the settings
    #[arg(short, long, global = true)]
    products: Option<PathBuf>,

    /// Settings file, defaults to `settings.toml` in the config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more, may be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Opens the calendar if omitted
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Only check the product snapshot
    Check,
    /// Print a month with its products, defaults to the current month
    Month {
        /// Month as YYYY-MM
        month: Option<String>,
    },
    /// Print everything purchased or planned on a day
    Day {
        /// Date as YYYY-MM-DD
        date: String,
    },
    /// Print the wishlist
    List {
        /// pending or purchased
        #[arg(long)]
        status: Option<Status>,
        /// Matched against name, category and notes
        #[arg(long, default_value = "")]
        search: String,
        /// newest, oldest, price-high, price-low or priority
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Add a product to the wishlist
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        category: Option<String>,
        /// low, medium or high
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        store: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Planned purchase day as YYYY-MM-DD
        #[arg(long)]
        target: Option<String>,
        /// Purchase day as YYYY-MM-DD, marks the product purchased
        #[arg(long)]
        purchased: Option<String>,
    },
    /// Remove a product from the wishlist
    Remove {
        id: String,
    },
    /// Print totals of the wishlist and the calendar
    Summary,
    /// Print or change the settings
    Settings {
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        theme: Option<Theme>,
        /// Store a default product snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        add_category: Vec<String>,
        #[arg(long)]
        remove_category: Vec<String>,
    },
}

#[derive(Error, Debug)]
enum Error {
    #[error("{0:#}")]
    Settings(#[from] anyhow::Error),
    #[error("{0}")]
    Store(#[from] wishes::store::Error),
    #[error("Expected a month as YYYY-MM, got {0:?}")]
    Month(String),
    #[error("Expected a date as YYYY-MM-DD, got {0:?}")]
    Date(String),
    #[error("{0}")]
    Edit(#[from] wishes::edit::Error),
    #[error("Failed to set up logging: {0}")]
    Logging(#[from] log::SetLoggerError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// The calendar owns the terminal, so it logs to a file in the data directory.
fn init_logging(verbose: u8, interactive: bool) -> Result<(), Error> {
    if interactive {
        let dir = settings::data_dir()?;
        fs_err::create_dir_all(&dir)?;
        let file = fs_err::File::create(dir.join("wishlist.log"))?;
        WriteLogger::init(level(verbose).max(LevelFilter::Info), Config::default(), file)?;
    } else {
        TermLogger::init(
            level(verbose),
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?;
    }
    Ok(())
}

fn run(
    Command {
        products,
        config,
        verbose,
        action,
    }: Command,
) -> Result<(), Error> {
    init_logging(verbose, action.is_none())?;
    let config = match config {
        Some(config) => config,
        None => settings::default_path()?,
    };
    let mut settings = Settings::load(&config)?;
    let store = JsonStore::new(match products {
        Some(products) => products,
        None => settings.products_path()?,
    });
    let today = Date::today();

    let Some(action) = action else {
        log::info!("Opening {:?}", store.path());
        term::run_term(store, &settings, today)?;
        return Ok(());
    };

    let currency = settings.currency;
    let mut out = stdout().lock();

    match action {
        Action::Check => {
            let products = store.load()?;
            for product in &products {
                if !is_known_category(&product.category, &settings.categories) {
                    log::warn!(
                        "Product {} ({}) has unknown category {:?}",
                        product.id,
                        product.name,
                        product.category
                    );
                }
            }
            writeln!(out, "{} products ok", products.len())?;
        }
        Action::Month { month } => {
            let month = match month {
                Some(text) => parse_month(&text).ok_or(Error::Month(text))?,
                None => YearMonth::of(today),
            };
            let products = store.load()?;
            let index = build_date_index(&products);
            let grid = month_grid(month, &index, today);
            write!(out, "{}", MonthOutput::new(grid, currency))?;
        }
        Action::Day { date } => {
            let day = parse_day(&date).ok_or(Error::Date(date))?;
            let products = store.load()?;
            let index = build_date_index(&products);
            write!(out, "{}", DayOutput::new(day, index.bucket(day), currency))?;
        }
        Action::List {
            status,
            search,
            sort,
        } => {
            let products = store.load()?;
            let selected = select(&products, &Filter { status, search }, sort);
            write!(out, "{}", ListOutput::new(&selected, currency))?;
        }
        Action::Add {
            name,
            price,
            category,
            priority,
            store: shop,
            notes,
            target,
            purchased,
        } => {
            let mut products = store.load()?;
            let draft = Draft {
                name,
                price,
                category,
                priority,
                store: shop,
                notes,
                target_date: target,
                purchase_date: purchased,
            };
            let product = add(&mut products, draft)?;
            if !is_known_category(&product.category, &settings.categories) {
                log::warn!("Unknown category {:?}", product.category);
            }
            let id = product.id.clone();
            store.save(&products)?;
            writeln!(out, "Added product {id}")?;
        }
        Action::Remove { id } => {
            let mut products = store.load()?;
            let product = remove(&mut products, &ProductId::from(id))?;
            store.save(&products)?;
            writeln!(out, "Removed product {} ({})", product.id, product.name)?;
        }
        Action::Summary => {
            let products = store.load()?;
            let output = SummaryOutput::new(
                Summary::of(&products),
                CalendarStats::of(&products, YearMonth::of(today)),
                currency,
            );
            write!(out, "{output}")?;
        }
        Action::Settings {
            currency,
            theme,
            snapshot,
            add_category,
            remove_category,
        } => {
            let before = settings.clone();
            if let Some(currency) = currency {
                settings.currency = currency;
            }
            if let Some(theme) = theme {
                settings.theme = theme;
            }
            if let Some(snapshot) = snapshot {
                settings.products = Some(snapshot);
            }
            for category in &add_category {
                if !settings.add_category(category) {
                    log::warn!("Category {category:?} already exists");
                }
            }
            for category in &remove_category {
                if !settings.remove_category(category) {
                    log::warn!("No custom category {category:?}");
                }
            }
            if settings != before {
                settings.save(&config)?;
            }
            write!(out, "{}", settings.to_toml()?)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let command = Command::parse();
    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

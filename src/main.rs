mod app;
mod config;
mod edit_form;
mod listeners;
mod preview;
mod ticket;
mod widgets;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use app::App;
use config::AppConfig;
use ticket::Ticket;

#[derive(Debug, Default, PartialEq)]
struct Args {
    ticket: Option<PathBuf>,
    config: Option<PathBuf>,
    verbosity: u8,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => parsed.help = true,
            "--config" | "-c" => {
                let path = iter.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-v" => parsed.verbosity += 1,
            "-vv" => parsed.verbosity += 2,
            "-vvv" => parsed.verbosity += 3,
            s if s.starts_with('-') => bail!("Unknown option: {}", s),
            _ => {
                if parsed.ticket.is_some() {
                    bail!("Only one ticket file can be edited at a time");
                }
                parsed.ticket = Some(PathBuf::from(arg));
            }
        }
    }
    Ok(parsed)
}

fn print_help() {
    println!("ticketdesk <TICKET.json>");
    println!("  -c, --config PATH  Read settings from PATH instead of ~/.config/ticketdesk/config.toml");
    println!("  -v, -vv, -vvv      More log output (info, debug, trace)");
    println!("  -h, --help         Show this help");
}

fn load_settings(args: &Args) -> Result<AppConfig> {
    match &args.config {
        Some(path) => config::load_config_from(path)?
            .with_context(|| format!("Config file not found: {}", path.display())),
        None => config::load_config(),
    }
}

/// Log to a file; the terminal belongs to the UI.
fn setup_logging(config: &AppConfig, verbosity: u8) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directive = match verbosity {
        0 => config.log.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directive))?;

    let path = config.log_file()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        print_help();
        return Ok(());
    }
    let Some(ticket_path) = args.ticket.clone() else {
        print_help();
        std::process::exit(2);
    };

    let config = load_settings(&args)?;
    if let Err(e) = setup_logging(&config, args.verbosity) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let ticket = Ticket::load(&ticket_path)?;
    tracing::info!(path = %ticket_path.display(), "ticket loaded");
    let mut app = App::new(&config, ticket_path, Some(ticket));

    // Setup panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal()?;
    terminal.show_cursor()?;
    result?;

    if app.saved {
        if let Some(record) = &app.record {
            println!("{}", serde_json::to_string_pretty(record.as_ref())?);
        }
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(120))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
                    app.handle_mouse(mouse, area);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

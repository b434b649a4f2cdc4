pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::feed::PostFeed;

use self::app::{Command, InputMode, TuiApp};
use self::event::{AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let base_url = ctx.site.base_url.clone();

    let feed = ctx.feed();
    let mut updates = feed.subscribe();
    spawn_command(&feed, Command::LoadNext);

    loop {
        if updates.has_changed().unwrap_or(false) {
            tui_app.set_state(updates.borrow_and_update().clone());
        }

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors, &base_url))?;

        match event_handler.next()? {
            AppEvent::Key(key) if tui_app.input_mode == InputMode::Search => {
                handle_search_key(&mut tui_app, key);
            }
            AppEvent::Key(key) => {
                let action = config.keybindings.get_action(&key);
                match tui_app.handle_action(action) {
                    Some(Command::Open(post)) => {
                        let url = post.permalink(&base_url);
                        if let Err(e) = open::that(&url) {
                            tui_app.set_status(format!("Failed to open browser: {}", e));
                        } else {
                            tui_app.set_status(format!("Opened {}", url));
                        }
                    }
                    Some(command) => spawn_command(&feed, command),
                    None => {}
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_search_key(tui_app: &mut TuiApp, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => tui_app.clear_search(),
        KeyCode::Enter => tui_app.finish_search(),
        KeyCode::Backspace => tui_app.pop_search_char(),
        KeyCode::Char(c) => tui_app.push_search_char(c),
        _ => {}
    }
}

/// Feed commands run on the runtime so the UI keeps drawing; results arrive
/// through the watch channel.
fn spawn_command(feed: &PostFeed, command: Command) {
    let feed = feed.clone();
    match command {
        Command::LoadNext => {
            tokio::spawn(async move { feed.load_next().await });
        }
        Command::Refresh => {
            tokio::spawn(async move { feed.refresh().await });
        }
        Command::Retry => {
            tokio::spawn(async move { feed.retry().await });
        }
        Command::Select(post) => feed.select(post),
        Command::Clear => feed.clear(),
        Command::Open(_) => {}
    }
}

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

mod api;
mod app;
mod ui;

use api::ApiClient;
use app::{App, AppEvent};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Get server URL from environment
    let server_url = std::env::var("LINGODOCS_SERVER_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    // Create API client
    let mut api = ApiClient::new(&server_url);
    if let Err(e) = api.load_session() {
        eprintln!("Warning: could not load stored session: {}", e);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let app = App::new(api);
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> Result<()> {
    // Create event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Spawn input handler
    let tx_input = tx.clone();
    tokio::spawn(async move {
        loop {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        let _ = tx_input.send(AppEvent::Key(key)).await;
                    }
                }
            }
            // Send tick events for UI refresh
            let _ = tx_input.send(AppEvent::Tick).await;
        }
    });

    // Fetch metrics and the first page before the first keystroke
    let tx_init = tx.clone();
    tokio::spawn(async move {
        let _ = tx_init.send(AppEvent::Init).await;
    });

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if let Some(event) = rx.recv().await {
            match event {
                AppEvent::Key(key) => {
                    if app.handle_key(key).await? {
                        return Ok(());
                    }
                }
                AppEvent::Tick => {
                    // Just refresh UI
                }
                AppEvent::Init => {
                    app.initialize().await;
                }
            }
        }
    }
}

use std::io;
use std::path::PathBuf;

use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use medit::kernel::editor::EditorState;
use medit::kernel::services::adapters::{load_all, ConfigDirs, SessionStore};
use medit::kernel::services::{kernel_bus, KernelServiceHost};
use medit::tui::crossterm::spawn_input_reader;
use medit::tui::{draw, TerminalGuard, Ticker, TICK_INTERVAL};

fn main() {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let code = run(path).unwrap_or_else(|err| {
        tracing::error!(error = %err, "editor failed");
        eprintln!("medit: {err}");
        1
    });
    std::process::exit(code);
}

fn run(path: Option<PathBuf>) -> io::Result<i32> {
    let dirs = ConfigDirs::from_env();
    if let Err(err) = dirs.ensure_state_dir() {
        eprintln!("medit: state directory {}: {err}", dirs.state.display());
    }
    let _logging = medit::logging::init(&dirs.log_dir());

    let loaded = load_all(&dirs.config);
    let theme = loaded.app.theme.clone();
    let mut state =
        EditorState::new(loaded.app.editor.clone()).with_keymaps(loaded.normal_keymap, loaded.insert_keymap);
    for error in &loaded.errors {
        state.set_error(error.clone());
    }

    let (bus, inbox) = kernel_bus();
    let store = dirs.state.is_dir().then(|| SessionStore::new(&dirs.state));
    let mut host = KernelServiceHost::new(bus.clone(), loaded.languages, store);

    let guard = TerminalGuard::acquire()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let size = terminal.size()?;
    state.resize(size.width, size.height);

    #[cfg(unix)]
    medit::tui::terminal_guard::install_termination_signals(guard.restorer(), bus.clone())?;
    spawn_input_reader(bus.clone())?;
    let _ticker = Ticker::spawn(bus.clone(), TICK_INTERVAL)?;
    drop(bus);

    host.open_initial(&mut state, path.as_deref());
    terminal.draw(|frame| draw(frame, &mut state, &theme))?;

    while !host.should_quit() {
        let Some(msg) = inbox.recv() else {
            break;
        };
        let mut redraw = host.handle_message(&mut state, msg);
        while let Ok(msg) = inbox.try_recv() {
            redraw |= host.handle_message(&mut state, msg);
            if host.should_quit() {
                break;
            }
        }
        if redraw && !host.should_quit() {
            terminal.draw(|frame| draw(frame, &mut state, &theme))?;
        }
    }

    host.shutdown(&state);
    drop(terminal);
    drop(guard);
    tracing::info!(code = host.exit_code(), "editor exited");
    Ok(host.exit_code())
}

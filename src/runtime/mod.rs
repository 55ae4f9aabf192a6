use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::logging::FileLogger;
use crate::mpris::ControlCmd;
use crate::session::PlaybackSessionController;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();

    let _logger = match FileLogger::init(&settings.logging) {
        Ok(logger) => {
            info!(
                "logging to {} at {}",
                logger.path().display(),
                logger.root_log_level()
            );
            Some(logger)
        }
        Err(e) => {
            eprintln!("andante: logging disabled: {e}");
            None
        }
    };
    if let Some(msg) = &settings_warning {
        warn!("{msg}");
    }

    let source = match env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => env::current_dir()?,
    };

    let playlist = startup::load_playlist(&source, &settings.library)
        .map_err(|e| format!("{}: {e}", source.display()))?;
    let audio_player = AudioPlayer::new(settings.audio.clone());

    let mut app = App::new(playlist.len(), &settings.ui);
    app.set_source_label(source.display().to_string());
    if let Some(msg) = settings_warning {
        app.set_status(msg);
    }

    let mut controller = PlaybackSessionController::new(playlist, audio_player);
    startup::apply_playback_defaults(&mut controller, &settings.playback);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &controller);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("andante is shutting down");
    run_result
}

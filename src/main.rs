mod audio;
mod audio_api;
mod conductor;
mod melody;
mod pipeline;
mod pitch;
mod sensor;
mod shared;
mod trigger;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Instant;

use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use audio::AudioHandle;
use audio_api::AudioCommand;
use conductor::Conductor;
use pipeline::pattern_store::PatternStore;
use pipeline::settings::{self, Settings};
use sensor::SimulatedLight;
use shared::InputEvent;

// dim-ish starting point for the simulated sensor
const INITIAL_LIGHT: u16 = 20_000;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let base_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    // bad config is fatal before any sound happens
    let settings = settings::load_or_init(&base_dir)?;
    settings.validate()?;

    let store = PatternStore::new(base_dir.join(".lumitone").join("patterns"))?;
    let (light, knob) = SimulatedLight::new(INITIAL_LIGHT);
    let mut conductor = Conductor::new(settings.clone(), light, store)?;

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let audio = audio::start_audio()?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let result = event_loop(&mut term, &audio, &mut conductor, &knob, &settings);

    // every exit path leaves the output silent, error or not
    audio.send(AudioCommand::Silence);
    drop(term);
    result
}

fn event_loop(
    term: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    audio: &AudioHandle,
    conductor: &mut Conductor<SimulatedLight>,
    knob: &Arc<AtomicU16>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let tick_rate = std::time::Duration::from_millis(settings.tick_ms);
    let mut last_tick = Instant::now();

    loop {
        let ds = conductor.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        let events = tui::input::poll_input(tick_rate)?;
        for event in events {
            match event {
                InputEvent::Quit => return Ok(()),
                InputEvent::LightDelta(delta) => {
                    let current = knob.load(Ordering::Relaxed);
                    let next = (current as i32 + delta).clamp(0, u16::MAX as i32) as u16;
                    knob.store(next, Ordering::Relaxed);
                }
                InputEvent::LightFlash => {
                    knob.store(settings.trigger.peak, Ordering::Relaxed);
                }
                InputEvent::LightDim => {
                    knob.store(dim_value(settings), Ordering::Relaxed);
                }
                other => conductor.handle_input(other),
            }
        }

        let elapsed = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        for cmd in conductor.tick(elapsed)? {
            audio.send(cmd);
        }
    }
}

// a reading safely past the re-arm boundary, whichever direction the
// trigger points
fn dim_value(settings: &Settings) -> u16 {
    match settings.trigger.direction {
        trigger::PeakDirection::Low => settings.trigger.rearm.saturating_add(2000),
        trigger::PeakDirection::High => settings.trigger.rearm.saturating_sub(2000),
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

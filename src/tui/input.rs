use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::shared::InputEvent;

// poll for input, resolve keys into semantic events for the conductor /
// main loop to handle
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        // raw mode swallows the usual SIGINT; treat ctrl-c as quit so the
        // output still gets silenced on the way out
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(vec![InputEvent::Quit]);
        }
        return Ok(handle_key(key.code));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],

        // the simulated sensor knob (raw ADC units; low = bright)
        KeyCode::Up => vec![InputEvent::LightDelta(-1500)],
        KeyCode::Down => vec![InputEvent::LightDelta(1500)],
        KeyCode::PageUp => vec![InputEvent::LightDelta(-8000)],
        KeyCode::PageDown => vec![InputEvent::LightDelta(8000)],
        KeyCode::Char(' ') => vec![InputEvent::LightFlash],
        KeyCode::Char('d') => vec![InputEvent::LightDim],

        // pattern store
        KeyCode::Char('w') => vec![InputEvent::SavePattern],
        KeyCode::Char('o') => vec![InputEvent::CyclePattern],
        KeyCode::Char('x') => vec![InputEvent::DeletePattern],
        KeyCode::Char('r') => vec![InputEvent::ResetMelody],
        KeyCode::Char('l') => vec![InputEvent::RefreshPatterns],

        _ => vec![],
    }
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};

use crate::shared::{DisplayState, RAW_MAX};

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // light gauge
            Constraint::Length(6), // instrument readout
            Constraint::Min(5),    // pattern list
            Constraint::Length(3), // status + keys
        ])
        .split(area);

    draw_light_gauge(frame, sections[0], state);
    draw_readout(frame, sections[1], state);
    draw_patterns(frame, sections[2], state);
    draw_status(frame, sections[3], state);
}

fn draw_light_gauge(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let ratio = (state.raw as f64 / RAW_MAX as f64).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" sensor (low = bright) "),
        )
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio(ratio)
        .label(format!("raw {}  norm {:.3}", state.raw, state.norm));
    frame.render_widget(gauge, area);
}

fn draw_readout(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let voice = match (state.active, state.freq_hz) {
        (true, _) => Span::styled(
            format!("melody: {}", state.melody_name),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        (false, Some(freq)) => Span::styled(
            format!("ambient tone: {freq:.1} Hz"),
            Style::default().fg(Color::Cyan),
        ),
        (false, None) => Span::raw("quiet"),
    };

    let trigger = if state.active {
        Span::styled("PLAYING", Style::default().fg(Color::Magenta))
    } else if state.armed {
        Span::styled("armed", Style::default().fg(Color::Green))
    } else {
        Span::styled("waiting to re-arm", Style::default().fg(Color::DarkGray))
    };

    let lines = vec![
        Line::from(voice),
        Line::from(vec![Span::raw("trigger: "), trigger]),
        Line::from(format!("override: {}  bpm {:.0}", state.melody_name, state.bpm)),
    ];
    let block = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" voice "));
    frame.render_widget(block, area);
}

fn draw_patterns(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let items: Vec<ListItem> = if state.patterns.is_empty() {
        vec![ListItem::new("(none yet, press w to save one)")]
    } else {
        state
            .patterns
            .iter()
            .map(|name| {
                let loaded = state.loaded_pattern.as_deref() == Some(name.as_str());
                let style = if loaded {
                    Style::default()
                        .fg(Color::LightMagenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let marker = if loaded { "> " } else { "  " };
                ListItem::new(format!("{marker}{name}")).style(style)
            })
            .collect()
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" patterns "));
    frame.render_widget(list, area);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let line = Line::from(vec![
        Span::styled(
            format!("{}  ", state.status),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            "↑/↓ light  space flash  d dim  w save  o load  x del  r reset  esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let block = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(block, area);
}

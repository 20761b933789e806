//! Voice bitmap and engine status widgets

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{keyboard::note_name, state::StatusUpdate};

/// One cell per voice, slot 0 on the left
pub fn render_voices(frame: &mut Frame, area: Rect, status: &StatusUpdate) {
    let block = Block::default()
        .title(format!(" Voices {}/{} ", status.busy_count(), status.voice_count))
        .borders(Borders::ALL);

    let cells: Vec<Span> = (0..status.voice_count as usize)
        .map(|i| {
            if status.is_busy(i) {
                Span::styled("█ ", Style::default().fg(Color::Green))
            } else {
                Span::styled("· ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(cells)).block(block), area);
}

/// Mode, pedal and key lists
pub fn render_status(frame: &mut Frame, area: Rect, status: &StatusUpdate, sample_rate: f32) {
    let block = Block::default().title(" saavy-poly ").borders(Borders::ALL);

    let keys = |keys: &[u8]| {
        if keys.is_empty() {
            "-".to_string()
        } else {
            keys.iter().map(|&k| note_name(k)).collect::<Vec<_>>().join(" ")
        }
    };

    let pedal = if status.sustain { "down" } else { "up" };
    let last = status.previous_key.map(note_name).unwrap_or_else(|| "-".into());

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" Mode: {:?}  ", status.poly_mode),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("Unison: {}  ", status.unison),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("Pedal: {}  ", pedal),
                Style::default().fg(if status.sustain {
                    Color::Yellow
                } else {
                    Color::White
                }),
            ),
            Span::styled(
                format!("{:.1}kHz  ", sample_rate / 1000.0),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("Dropped: {}", status.dropped_events),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(format!(" Held:      {}", keys(status.held.as_slice()))),
        Line::from(format!(" Sustained: {}", keys(status.sustained.as_slice()))),
        Line::from(Span::styled(
            format!(" Last poly key: {}", last),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

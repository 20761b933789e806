//! Computer keyboard as a piano, plus the one-octave key strip widget
//!
//! Terminals rarely report key releases, so keys latch: the first press
//! sends note-on, the second sends note-off.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::StatusUpdate;

/// Home row and the row above, laid out like a piano octave plus one.
const PIANO_ROW: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];
const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Semitone above the octave base for a piano key, if `c` is one.
pub fn semitone_for(c: char) -> Option<u8> {
    PIANO_ROW.iter().position(|&k| k == c).map(|i| i as u8)
}

pub fn note_name(key: u8) -> String {
    let octave = (key / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(key % 12) as usize], octave)
}

/// Keys currently latched down from the computer keyboard.
#[derive(Debug, Clone)]
pub struct Latch {
    down: [bool; 128],
}

impl Latch {
    pub fn new() -> Self {
        Self { down: [false; 128] }
    }

    /// Flip `key` and return whether it is now down.
    pub fn toggle(&mut self, key: u8) -> bool {
        let slot = &mut self.down[key as usize & 0x7f];
        *slot = !*slot;
        *slot
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.down[key as usize & 0x7f]
    }

    pub fn clear(&mut self) {
        self.down = [false; 128];
    }
}

/// Render the playable octave: latched keys highlighted, held keys bold,
/// keys only kept alive by the pedal dimmed.
pub fn render_keyboard(
    frame: &mut Frame,
    area: Rect,
    base: u8,
    latch: &Latch,
    status: &StatusUpdate,
) {
    let block = Block::default()
        .title(format!(" Keys from {} ", note_name(base)))
        .borders(Borders::ALL);

    let mut labels = Vec::new();
    let mut names = Vec::new();
    for (i, c) in PIANO_ROW.iter().enumerate() {
        let key = base.saturating_add(i as u8);
        let held = status.held.as_slice().contains(&key);
        let sustained = status.sustained.as_slice().contains(&key);

        let style = if latch.is_down(key) {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else if sustained && !held {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let style = if held {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        };

        labels.push(Span::styled(format!(" {:<3}", c), style));
        names.push(Span::styled(format!(" {:<3}", note_name(key)), style));
    }

    let paragraph = Paragraph::new(vec![Line::from(labels), Line::from(names)]).block(block);
    frame.render_widget(paragraph, area);
}

//! TUI module for saavy-poly
//!
//! Plays the engine from the computer keyboard and shows which voices the
//! scheduler has busy.

mod keyboard;
pub mod state;
mod voices;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use saavy_poly::{
    io::midi::{MidiEvent, TimedEvent},
    PolyMode,
};
use std::time::Duration;

pub use state::{ControlMessage, StatusUpdate};

use keyboard::{render_keyboard, semitone_for, Latch};
use voices::{render_status, render_voices};

const VELOCITY: u8 = 100;

/// UI application state
pub struct UiApp {
    events_tx: Producer<TimedEvent>,
    control_tx: Producer<ControlMessage>,
    status_rx: Consumer<StatusUpdate>,
    /// Latest status from the audio thread
    status: StatusUpdate,
    sample_rate: f32,
    max_unison: usize,
    latch: Latch,
    octave_base: u8,
    sustain: bool,
    poly_mode: PolyMode,
    unison: usize,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        events_tx: Producer<TimedEvent>,
        control_tx: Producer<ControlMessage>,
        status_rx: Consumer<StatusUpdate>,
        initial: StatusUpdate,
        sample_rate: f32,
    ) -> Self {
        Self {
            events_tx,
            control_tx,
            status_rx,
            status: initial,
            sample_rate,
            max_unison: (initial.voice_count as usize).max(1),
            latch: Latch::new(),
            octave_base: 60,
            sustain: initial.sustain,
            poly_mode: initial.poly_mode,
            unison: initial.unison as usize,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.panic();
        Ok(())
    }

    fn poll_status(&mut self) {
        // Keep only the latest state
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.sustain = !self.sustain;
                self.send(MidiEvent::sustain(self.sustain));
            }
            KeyCode::Char('m') => {
                self.poly_mode = self.poly_mode.next();
                self.control(ControlMessage::SetPolyMode(self.poly_mode));
            }
            KeyCode::Char(']') => {
                self.unison = (self.unison + 1).min(self.max_unison);
                self.control(ControlMessage::SetUnison(self.unison));
            }
            KeyCode::Char('[') => {
                self.unison = self.unison.saturating_sub(1).max(1);
                self.control(ControlMessage::SetUnison(self.unison));
            }
            KeyCode::Char('z') => self.octave_base = self.octave_base.saturating_sub(12).max(12),
            KeyCode::Char('x') => self.octave_base = (self.octave_base + 12).min(96),
            KeyCode::Char('p') => self.panic(),
            KeyCode::Char(c) => {
                if let Some(semitone) = semitone_for(c) {
                    let key = self.octave_base + semitone;
                    if self.latch.toggle(key) {
                        self.send(MidiEvent::note_on(key, VELOCITY));
                    } else {
                        self.send(MidiEvent::note_off(key));
                    }
                }
            }
            _ => {}
        }
    }

    /// Live input carries no timing; it lands at the start of the next block
    fn send(&mut self, event: MidiEvent) {
        // A full ring means the audio thread has stalled; drop the key
        let _ = self.events_tx.push(TimedEvent::new(0, event));
    }

    fn control(&mut self, message: ControlMessage) {
        let _ = self.control_tx.push(message);
    }

    fn panic(&mut self) {
        self.latch.clear();
        self.sustain = false;
        self.control(ControlMessage::Panic);
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Status
                Constraint::Length(3), // Voice bitmap
                Constraint::Length(4), // Keyboard
                Constraint::Min(0),
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_status(frame, chunks[0], &self.status, self.sample_rate);
        render_voices(frame, chunks[1], &self.status);
        render_keyboard(frame, chunks[2], self.octave_base, &self.latch, &self.status);

        let help = Line::from(vec![
            Span::styled(" a-k ", Style::default().fg(Color::Yellow)),
            Span::raw("latch notes  "),
            Span::styled("z/x ", Style::default().fg(Color::Yellow)),
            Span::raw("octave  "),
            Span::styled("space ", Style::default().fg(Color::Yellow)),
            Span::raw("pedal  "),
            Span::styled("m ", Style::default().fg(Color::Yellow)),
            Span::raw("mode  "),
            Span::styled("[/] ", Style::default().fg(Color::Yellow)),
            Span::raw("unison  "),
            Span::styled("p ", Style::default().fg(Color::Yellow)),
            Span::raw("panic  "),
            Span::styled("q ", Style::default().fg(Color::Yellow)),
            Span::raw("quit"),
        ]);
        frame.render_widget(Paragraph::new(help), chunks[4]);
    }
}

//! Interactive front end on a raw-mode terminal.

use super::{canvas::Canvas, Command, Input, Renderer, Scene};
use crate::error::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Stdout, Write},
    time::Duration,
};

/// Owns the terminal for as long as it lives: raw mode and the alternate screen are entered on
/// construction and restored on drop.
pub struct Terminal {
    out: Stdout,
    canvas: Canvas,
}

impl Terminal {
    pub fn enter() -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, terminal::DisableLineWrap)?;
        Ok(Self {
            out,
            canvas: Canvas::new(cols as usize, rows as usize),
        })
    }

    fn present(&mut self) -> Result<()> {
        for (row, line) in self.canvas.lines().enumerate() {
            queue!(self.out, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Renderer for Terminal {
    fn draw(&mut self, scene: &Scene) -> Result<()> {
        self.canvas.render_scene(scene);
        self.present()
    }

    fn draw_menu(&mut self) -> Result<()> {
        self.canvas.render_menu();
        self.present()
    }

    fn draw_paused(&mut self) -> Result<()> {
        self.canvas.render_paused();
        self.present()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(err) = execute!(
            self.out,
            LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap
        ) {
            tracing::error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
    }
}

/// Keyboard commands, read without blocking
#[derive(Debug, Default, Clone, Copy)]
pub struct Keyboard;

impl Input for Keyboard {
    fn poll(&mut self) -> Result<Vec<Command>> {
        let mut commands = vec![];
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                commands.extend(command_for(key));
            }
        }
        Ok(commands)
    }
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Up => Some(Command::Jump),
        KeyCode::Esc => Some(Command::Pause),
        KeyCode::Char('r') => Some(Command::Resume),
        KeyCode::Char('m') => Some(Command::Menu),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('1') => Some(Command::Play),
        KeyCode::Char('2') => Some(Command::Train),
        _ => None,
    }
}

//! Drawing in arena coordinates.
//!
//! Game code talks to [`Renderer`] using the arena's own pixel space (origin
//! top-left, y pointing down). [`Scene`] records those calls and paints the
//! finished frame onto a braille canvas scaled to whatever terminal area it
//! is given.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block,
    },
    Frame,
};
use tui_big_text::{BigText, PixelSize};

/// Text at or above this size is drawn with big block glyphs.
pub const BIG_TEXT_SIZE: u16 = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: ArenaRect,
        color: Color,
    },
    Circle {
        center: (f32, f32),
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        pos: (f32, f32),
        color: Color,
        font_size: u16,
    },
}

pub trait Renderer {
    fn clear(&mut self);
    fn draw_rect(&mut self, rect: ArenaRect, color: Color);
    fn draw_circle(&mut self, center: (f32, f32), radius: f32, color: Color);
    /// `pos` is the horizontal centre and top of the text.
    fn draw_text(&mut self, text: &str, pos: (f32, f32), color: Color, font_size: u16);
    fn present(&mut self);
}

#[derive(Debug, Clone)]
pub struct Scene {
    width: f32,
    height: f32,
    pending: Vec<DrawCommand>,
    frame: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pending: Vec::new(),
            frame: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.frame.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Paints the last presented frame inside `block`, stretched over `area`.
    pub fn paint(&self, frame: &mut Frame, area: Rect, block: Block) {
        let inner = block.inner(area);
        if inner.width == 0 || inner.height == 0 {
            frame.render_widget(block, area);
            return;
        }

        let (w, h) = (self.width as f64, self.height as f64);
        // arena units per braille dot
        let dot_w = w / (inner.width as f64 * 2.0);
        let dot_h = h / (inner.height as f64 * 4.0);

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, w])
            .y_bounds([0.0, h])
            .paint(|ctx| {
                for cmd in &self.frame {
                    match cmd {
                        DrawCommand::Rect { rect, color } => {
                            fill_rect(ctx, rect, h, dot_h, *color);
                        }
                        DrawCommand::Circle {
                            center,
                            radius,
                            color,
                        } => {
                            let mut r = *radius as f64;
                            while r > 0.0 {
                                ctx.draw(&Circle {
                                    x: center.0 as f64,
                                    y: h - center.1 as f64,
                                    radius: r,
                                    color: *color,
                                });
                                r -= dot_w;
                            }
                        }
                        DrawCommand::Text {
                            text,
                            pos,
                            color,
                            font_size,
                        } if *font_size < BIG_TEXT_SIZE => {
                            let half = text.chars().count() as f64 * dot_w;
                            ctx.print(
                                (pos.0 as f64 - half).max(0.0),
                                h - pos.1 as f64,
                                Line::from(Span::styled(text.clone(), Style::default().fg(*color))),
                            );
                        }
                        DrawCommand::Text { .. } => {}
                    }
                }
            });
        frame.render_widget(canvas, area);

        for cmd in &self.frame {
            if let DrawCommand::Text {
                text,
                pos,
                color,
                font_size,
            } = cmd
            {
                if *font_size >= BIG_TEXT_SIZE {
                    let row = inner.y + ((pos.1 as f64 / h) * inner.height as f64) as u16;
                    let banner = Rect::new(
                        inner.x,
                        row.min(inner.bottom().saturating_sub(1)),
                        inner.width,
                        4.min(inner.bottom().saturating_sub(row)).max(1),
                    );
                    let big_text = BigText::builder()
                        .pixel_size(PixelSize::Quadrant)
                        .style(Style::new().fg(*color))
                        .lines(vec![Line::from(text.clone())])
                        .alignment(Alignment::Center)
                        .build();
                    frame.render_widget(big_text, banner);
                }
            }
        }
    }
}

fn fill_rect(ctx: &mut Context, rect: &ArenaRect, h: f64, step: f64, color: Color) {
    let x1 = rect.x as f64;
    let x2 = (rect.x + rect.width) as f64;
    let top = h - rect.y as f64;
    let bottom = h - (rect.y + rect.height) as f64;

    let mut y = bottom;
    while y <= top {
        ctx.draw(&CanvasLine {
            x1,
            y1: y,
            x2,
            y2: y,
            color,
        });
        y += step.max(f64::EPSILON);
    }
}

impl Renderer for Scene {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn draw_rect(&mut self, rect: ArenaRect, color: Color) {
        self.pending.push(DrawCommand::Rect { rect, color });
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        self.pending.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, pos: (f32, f32), color: Color, font_size: u16) {
        self.pending.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            color,
            font_size,
        });
    }

    fn present(&mut self) {
        self.frame = std::mem::take(&mut self.pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, widgets::Borders, Terminal};

    #[test]
    fn present_publishes_the_pending_frame() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.clear();
        scene.draw_circle((400.0, 300.0), 10.0, Color::Red);
        assert!(scene.frame.is_empty());

        scene.present();
        assert_eq!(scene.frame.len(), 1);

        scene.clear();
        scene.draw_text("hi", (400.0, 10.0), Color::White, 24);
        scene.present();
        assert_eq!(scene.texts().collect::<Vec<_>>(), vec!["hi"]);
    }

    #[test]
    fn painted_text_lands_in_the_buffer() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.clear();
        scene.draw_rect(
            ArenaRect {
                x: 350.0,
                y: 560.0,
                width: 100.0,
                height: 20.0,
            },
            Color::Cyan,
        );
        scene.draw_circle((400.0, 300.0), 10.0, Color::Red);
        scene.draw_text("RALLY", (400.0, 100.0), Color::White, 24);
        scene.present();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                scene.paint(frame, area, Block::default().borders(Borders::ALL));
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect();
        assert!(rows.iter().any(|row| row.contains("RALLY")));
    }
}

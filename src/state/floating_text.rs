//! Floating phrase layout for the gathering animation
//!
//! Each glyph starts somewhere in a corner of the viewport and drifts toward
//! its slot in the settled phrase as the eased gathering progress rises.

use rand::Rng;
use serde::Serialize;

pub const DEFAULT_PHRASE: &str = "将一个想法带入现实，它可能看起来变小了似的，从无形到有形。";

const GLYPHS_PER_LINE: usize = 18;
const GLYPH_ADVANCE: f64 = 12.0;
const LINE_HEIGHT: f64 = 30.0;
/// Header height plus spacing above the settled phrase
const PHRASE_TOP: f64 = 140.0;
/// Eased progress at which the phrase is shown settled
pub const GATHERED_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Zone {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Zone {
    fn contains(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }

    fn sample(&self, rng: &mut impl Rng) -> Point {
        Point {
            x: self.x + rng.gen::<f64>() * self.width,
            y: self.y + rng.gen::<f64>() * self.height,
        }
    }
}

/// Corners clear of the logo, the audio control and the timer itself
fn safe_zones(v: Viewport) -> [Zone; 4] {
    [
        Zone { x: 0.0, y: 0.0, width: v.width * 0.25, height: v.height * 0.3 },
        Zone { x: v.width * 0.75, y: 0.0, width: v.width * 0.25, height: v.height * 0.3 },
        Zone { x: 0.0, y: v.height * 0.7, width: v.width * 0.3, height: v.height * 0.3 },
        Zone { x: v.width * 0.7, y: v.height * 0.7, width: v.width * 0.3, height: v.height * 0.3 },
    ]
}

fn center_zone(v: Viewport) -> Zone {
    Zone {
        x: v.width * 0.2,
        y: v.height * 0.25,
        width: v.width * 0.6,
        height: v.height * 0.5,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub index: usize,
    pub origin: Point,
    pub target: Point,
}

/// One glyph's rendered position for a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphFrame {
    pub ch: char,
    pub index: usize,
    pub position: Point,
    pub alpha: f64,
}

#[derive(Debug, Clone)]
pub struct FloatingText {
    phrase: String,
    viewport: Viewport,
    glyphs: Vec<Glyph>,
}

impl FloatingText {
    /// Lay out `phrase` with random origins drawn from `rng`
    pub fn layout(phrase: &str, viewport: Viewport, rng: &mut impl Rng) -> Self {
        let zones = safe_zones(viewport);
        let left = viewport.width / 2.0 - (GLYPHS_PER_LINE as f64 * GLYPH_ADVANCE) / 2.0;

        let glyphs = phrase
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                let line = index / GLYPHS_PER_LINE;
                let column = index % GLYPHS_PER_LINE;
                let zone = zones[rng.gen_range(0..zones.len())];
                Glyph {
                    ch,
                    index,
                    origin: zone.sample(rng),
                    target: Point {
                        x: left + column as f64 * GLYPH_ADVANCE,
                        y: PHRASE_TOP + line as f64 * LINE_HEIGHT,
                    },
                }
            })
            .collect();

        Self {
            phrase: phrase.to_string(),
            viewport,
            glyphs,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Glyph positions for a given eased progress and animation frame
    pub fn frame(&self, eased: f64, animation_frame: u64, running: bool) -> Vec<GlyphFrame> {
        let center = center_zone(self.viewport);
        let alpha = glyph_alpha(eased, running);
        let t = animation_frame as f64;

        self.glyphs
            .iter()
            .map(|glyph| {
                let base = Point {
                    x: glyph.origin.x + (glyph.target.x - glyph.origin.x) * eased,
                    y: glyph.origin.y + (glyph.target.y - glyph.origin.y) * eased,
                };

                let (mut dx, mut dy) = if running {
                    let phase = glyph.index as f64;
                    ((t * 0.01 + phase).sin() * 4.0, (t * 0.008 + phase).cos() * 3.0)
                } else {
                    (0.0, 0.0)
                };

                // damp the drift over the central controls
                if center.contains(Point { x: base.x + dx, y: base.y + dy }) {
                    dx *= 0.3;
                    dy *= 0.3;
                }

                GlyphFrame {
                    ch: glyph.ch,
                    index: glyph.index,
                    position: Point { x: base.x + dx, y: base.y + dy },
                    alpha,
                }
            })
            .collect()
    }
}

pub fn is_gathered(eased: f64) -> bool {
    eased >= GATHERED_THRESHOLD
}

fn glyph_alpha(eased: f64, running: bool) -> f64 {
    if eased == 0.0 || (running && eased < 0.9) {
        0.3
    } else if eased > 0.8 {
        0.6
    } else {
        0.3
    }
}

//! Renders one round of a parsed demo as an animated gif.

use crate::demo::{Frame, FramePlayer, ParsedDemo};

pub const DEFAULT_OUTPUT_DIR: &str = "rendered_gifs/";

const CANVAS: u32 = 512;
const MARGIN: f64 = 16.0;
const PLAYER_RADIUS: i64 = 4;
const FRAME_DELAY_MS: u32 = 100;

const T_HUE: f32 = 36.0;
const CT_HUE: f32 = 210.0;

/// Handle to a rendered (or reused) round gif.
#[derive(Debug, PartialEq)]
pub struct RenderedRound {
    pub path: std::path::PathBuf,
    /// An existing gif was kept instead of re-rendering.
    pub reused: bool,
}

#[derive(Debug)]
pub enum RenderError {
    RoundOutOfRange { requested: usize, available: usize },
    EmptyRound,
    Io(std::io::Error),
    Encode(image::ImageError),
}

impl From<std::io::Error> for RenderError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<image::ImageError> for RenderError {
    fn from(value: image::ImageError) -> Self {
        Self::Encode(value)
    }
}

impl core::fmt::Display for RenderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RoundOutOfRange {
                requested,
                available,
            } => write!(
                f,
                "round {} out of range, demo has {} rounds",
                requested, available
            ),
            Self::EmptyRound => write!(f, "round carries no renderable frames"),
            Self::Io(e) => write!(f, "writing gif: {}", e),
            Self::Encode(e) => write!(f, "encoding gif: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

/// Renders round `round_num` (1-based) of the demo to
/// `rendered_gifs/{id}-{round}.gif`, reusing an existing file unless
/// `replace` is set.
pub fn render_round(
    demo: &ParsedDemo,
    demo_id: &str,
    round_num: usize,
    replace: bool,
) -> Result<RenderedRound, RenderError> {
    render_round_in(DEFAULT_OUTPUT_DIR, demo, demo_id, round_num, replace)
}

pub fn render_round_in<P>(
    dir: P,
    demo: &ParsedDemo,
    demo_id: &str,
    round_num: usize,
    replace: bool,
) -> Result<RenderedRound, RenderError>
where
    P: AsRef<std::path::Path>,
{
    let dir = dir.as_ref();
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        tracing::info!("Created render directory {:?}", dir);
    }

    let path = dir.join(format!("{}-{}.gif", demo_id, round_num));
    if !replace && path.exists() {
        tracing::info!("Reusing previously rendered {:?}", path);
        return Ok(RenderedRound { path, reused: true });
    }

    let round = round_num
        .checked_sub(1)
        .and_then(|idx| demo.game_rounds.get(idx))
        .ok_or(RenderError::RoundOutOfRange {
            requested: round_num,
            available: demo.game_rounds.len(),
        })?;

    let bounds = Bounds::of(&round.frames).ok_or(RenderError::EmptyRound)?;
    tracing::debug!(
        "Rendering {} frames of round {} into {:?}",
        round.frames.len(),
        round_num,
        path
    );

    let file = std::fs::File::create(&path)?;
    let mut encoder = image::codecs::gif::GifEncoder::new(std::io::BufWriter::new(file));
    encoder.set_repeat(image::codecs::gif::Repeat::Infinite)?;

    for frame in round.frames.iter() {
        let canvas = draw_frame(frame, &bounds);
        encoder.encode_frame(image::Frame::from_parts(
            canvas,
            0,
            0,
            image::Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1),
        ))?;
    }

    Ok(RenderedRound {
        path,
        reused: false,
    })
}

/// Bounding box of every player position seen in the round.
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Bounds {
    fn of(frames: &[Frame]) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;

        for frame in frames {
            for player in [&frame.t.players, &frame.ct.players]
                .into_iter()
                .flatten()
                .flatten()
            {
                match &mut bounds {
                    Some(b) => {
                        b.min_x = b.min_x.min(player.x);
                        b.max_x = b.max_x.max(player.x);
                        b.min_y = b.min_y.min(player.y);
                        b.max_y = b.max_y.max(player.y);
                    }
                    None => {
                        bounds = Some(Bounds {
                            min_x: player.x,
                            max_x: player.x,
                            min_y: player.y,
                            max_y: player.y,
                        })
                    }
                }
            }
        }

        bounds
    }

    /// Maps a map coordinate onto the canvas, game y axis pointing up.
    fn project(&self, x: f64, y: f64) -> (u32, u32) {
        let span = CANVAS as f64 - 2.0 * MARGIN;
        let sx = if self.max_x > self.min_x {
            (x - self.min_x) / (self.max_x - self.min_x)
        } else {
            0.5
        };
        let sy = if self.max_y > self.min_y {
            (y - self.min_y) / (self.max_y - self.min_y)
        } else {
            0.5
        };

        let px = MARGIN + sx * span;
        let py = MARGIN + (1.0 - sy) * span;
        (px as u32, py as u32)
    }
}

fn draw_frame(frame: &Frame, bounds: &Bounds) -> image::RgbaImage {
    let mut canvas = image::RgbaImage::from_pixel(CANVAS, CANVAS, image::Rgba([20, 20, 20, 255]));

    for (players, hue) in [(&frame.t.players, T_HUE), (&frame.ct.players, CT_HUE)] {
        let players = match players {
            Some(players) => players,
            None => continue,
        };

        for player in players.iter().filter(|p| p.is_alive) {
            let (cx, cy) = bounds.project(player.x, player.y);
            draw_disc(&mut canvas, cx, cy, player_color(hue, player));
        }
    }

    canvas
}

fn player_color(hue: f32, player: &FramePlayer) -> image::Rgba<u8> {
    use colors_transform::Color;

    // full hp renders bright, low hp fades towards the background
    let lightness = 25.0 + (player.hp.min(100) as f32 / 100.0) * 35.0;
    let rgb = colors_transform::Hsl::from(hue, 80.0, lightness).to_rgb();

    image::Rgba([
        rgb.get_red() as u8,
        rgb.get_green() as u8,
        rgb.get_blue() as u8,
        255,
    ])
}

fn draw_disc(canvas: &mut image::RgbaImage, cx: u32, cy: u32, color: image::Rgba<u8>) {
    for dy in -PLAYER_RADIUS..=PLAYER_RADIUS {
        for dx in -PLAYER_RADIUS..=PLAYER_RADIUS {
            if dx * dx + dy * dy > PLAYER_RADIUS * PLAYER_RADIUS {
                continue;
            }

            let x = cx as i64 + dx;
            let y = cy as i64 + dy;
            if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
                continue;
            }

            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

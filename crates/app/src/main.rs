//! Headless demo: drives a viewport through resize events and prints the world/screen mapping.

use anyhow::{Context, Result};
use corelib::{HeadlessGraphics, Scaling, ScreenBounds, Vec2, Viewport, vec2};
use pools::{Poolable, Pools};
use tasks::AsyncExecutor;

#[derive(Clone, Debug, PartialEq)]
struct Options {
    viewport: String,
    world: (f32, f32),
    size: (i32, i32),
    units_per_pixel: f32,
    workers: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            viewport: "fit".into(),
            world: (16.0, 9.0),
            size: (1280, 720),
            units_per_pixel: 1.0,
            workers: 2,
        }
    }
}

fn parse_pair<T: std::str::FromStr>(v: &str) -> Option<(T, T)> {
    let (a, b) = v.split_once('x').or_else(|| v.split_once('X'))?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

impl Options {
    // Accept: --viewport=NAME --world=WxH --size=WxH --width=W --height=H
    //         --units-per-pixel=F --workers=N
    fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut opts = Options::default();
        for arg in args {
            if let Some(v) = arg.strip_prefix("--viewport=") {
                opts.viewport = v.to_ascii_lowercase();
            } else if let Some(v) = arg.strip_prefix("--world=") {
                match parse_pair::<f32>(v) {
                    Some((w, h)) if w > 0.0 && h > 0.0 => opts.world = (w, h),
                    _ => log::warn!("Invalid world size '{v}', keeping {:?}", opts.world),
                }
            } else if let Some(v) = arg.strip_prefix("--size=") {
                match parse_pair::<i32>(v) {
                    Some((w, h)) if w > 0 && h > 0 => opts.size = (w, h),
                    _ => log::warn!("Invalid screen size '{v}', keeping {:?}", opts.size),
                }
            } else if let Some(v) = arg.strip_prefix("--width=") {
                match v.parse::<i32>() {
                    Ok(w) if w > 0 => opts.size.0 = w,
                    _ => log::warn!("Invalid width '{v}'"),
                }
            } else if let Some(v) = arg.strip_prefix("--height=") {
                match v.parse::<i32>() {
                    Ok(h) if h > 0 => opts.size.1 = h,
                    _ => log::warn!("Invalid height '{v}'"),
                }
            } else if let Some(v) = arg.strip_prefix("--units-per-pixel=") {
                match v.parse::<f32>() {
                    Ok(u) if u.is_finite() && u > 0.0 => opts.units_per_pixel = u,
                    _ => log::warn!("Invalid units per pixel '{v}', keeping 1"),
                }
            } else if let Some(v) = arg.strip_prefix("--workers=") {
                match v.parse::<usize>() {
                    Ok(n) if n > 0 => opts.workers = n,
                    _ => log::warn!("Invalid worker count '{v}', keeping {}", opts.workers),
                }
            }
        }
        opts
    }

    fn build_viewport(&self) -> Result<Viewport> {
        let (w, h) = self.world;
        let viewport = match self.viewport.as_str() {
            "extend" => Viewport::extend(w, h)?,
            "screen" => Viewport::screen_with_units(self.units_per_pixel)?,
            name => {
                let scaling = name.parse::<Scaling>().unwrap_or_else(|e| {
                    log::warn!("{e}, falling back to fit");
                    Scaling::Fit
                });
                Viewport::scaling(scaling, w, h)?
            }
        };
        Ok(viewport)
    }
}

/// Pooled input event, reused between frames.
#[derive(Debug, Default)]
struct TouchEvent {
    screen: Vec2,
    world: Vec2,
}

impl Poolable for TouchEvent {
    fn reset(&mut self) {
        self.screen = Vec2::ZERO;
        self.world = Vec2::ZERO;
    }
}

fn describe(b: ScreenBounds) -> String {
    format!("({}, {}) {}x{}", b.x, b.y, b.width, b.height)
}

/// Screen sizes the demo walks through: as given, rotated, then twice as wide.
fn resize_sequence(width: i32, height: i32) -> [(i32, i32); 3] {
    [
        (width, height),
        (height, width),
        (width.saturating_mul(2), height),
    ]
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Options::from_args(std::env::args().skip(1));
    log::info!(
        "Starting viewport demo. viewport={}, world={}x{}, screen={}x{}, workers={}",
        opts.viewport,
        opts.world.0,
        opts.world.1,
        opts.size.0,
        opts.size.1,
        opts.workers
    );

    let (width, height) = opts.size;
    let mut gfx = HeadlessGraphics::new(width, height);
    let mut viewport = opts.build_viewport().context("Failed to create viewport")?;

    let mut pools = Pools::new();
    for (sw, sh) in resize_sequence(width, height) {
        gfx.resize(sw, sh);
        viewport.update(&gfx, sw, sh, true);
        let gutters = viewport.gutters(&gfx);
        println!(
            "screen {sw}x{sh}: bounds {} world {}x{} gutters l={} r={} b={} t={}",
            describe(viewport.screen_bounds()),
            viewport.world_width(),
            viewport.world_height(),
            gutters.left,
            gutters.right,
            gutters.bottom,
            gutters.top
        );

        for touch in [vec2(0.0, 0.0), vec2(sw as f32 / 2.0, sh as f32 / 2.0)] {
            let mut event = pools.obtain(TouchEvent::default);
            event.screen = touch;
            event.world = viewport.unproject(&gfx, touch);
            let (screen, world) = (event.screen, event.world);
            let back = viewport.project(world);
            println!("  touch {screen:.1} -> world {world:.3} -> screen {back:.1}");
            pools.free(event);
        }
    }

    // Lay the viewport out for several screens in the background.
    let mut executor =
        AsyncExecutor::new(opts.workers, "layout").context("Failed to start executor")?;
    let mut pending = Vec::new();
    for (sw, sh) in [(640, 480), (1920, 1080), (2560, 1080), (1080, 1920)] {
        let mut vp = viewport.clone();
        let result = executor.submit(move || {
            let gfx = HeadlessGraphics::new(sw, sh);
            vp.update(&gfx, sw, sh, true);
            Ok((sw, sh, vp.screen_bounds(), vp.world_width(), vp.world_height()))
        })?;
        pending.push(result);
    }
    for result in pending {
        let (sw, sh, bounds, ww, wh) = result.get()?;
        let bounds = describe(bounds);
        println!("layout {sw}x{sh}: bounds {bounds} world {ww}x{wh}");
    }
    executor.dispose()?;

    log::info!("Done. Bye!");
    Ok(())
}

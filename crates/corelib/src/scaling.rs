//! Scaling policies: map a source size onto an available target size.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::{Vec2, vec2};

/// How a source size (usually the world size) is scaled into a target size (usually the screen).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scaling {
    /// Keep aspect ratio, largest size that fits inside the target. May letterbox.
    #[default]
    Fit,
    /// Like `Fit`, but never scales above the source size.
    Contain,
    /// Keep aspect ratio, smallest size that covers the target. May overflow one axis.
    Fill,
    /// Keep aspect ratio, width matches the target.
    FillX,
    /// Keep aspect ratio, height matches the target.
    FillY,
    /// Exactly the target size; aspect ratio is not kept.
    Stretch,
    StretchX,
    StretchY,
    /// Exactly the source size.
    None,
}

impl Scaling {
    pub const ALL: [Scaling; 9] = [
        Scaling::Fit,
        Scaling::Contain,
        Scaling::Fill,
        Scaling::FillX,
        Scaling::FillY,
        Scaling::Stretch,
        Scaling::StretchX,
        Scaling::StretchY,
        Scaling::None,
    ];

    /// Apply the policy. Pure; sizes must be positive and finite (see [`Scaling::try_apply`]).
    pub fn apply(self, source: Vec2, target: Vec2) -> Vec2 {
        match self {
            Scaling::Fit => source * fit_scale(source, target),
            Scaling::Contain => source * fit_scale(source, target).min(1.0),
            Scaling::Fill => {
                let target_ratio = target.y / target.x;
                let source_ratio = source.y / source.x;
                let scale = if target_ratio < source_ratio {
                    target.x / source.x
                } else {
                    target.y / source.y
                };
                source * scale
            }
            Scaling::FillX => source * (target.x / source.x),
            Scaling::FillY => source * (target.y / source.y),
            Scaling::Stretch => target,
            Scaling::StretchX => vec2(target.x, source.y),
            Scaling::StretchY => vec2(source.x, target.y),
            Scaling::None => source,
        }
    }

    /// Like [`Scaling::apply`], but rejects zero, negative or non-finite sizes.
    pub fn try_apply(self, source: Vec2, target: Vec2) -> CoreResult<Vec2> {
        check_size("source", source)?;
        check_size("target", target)?;
        Ok(self.apply(source, target))
    }

    pub fn name(self) -> &'static str {
        match self {
            Scaling::Fit => "fit",
            Scaling::Contain => "contain",
            Scaling::Fill => "fill",
            Scaling::FillX => "fill_x",
            Scaling::FillY => "fill_y",
            Scaling::Stretch => "stretch",
            Scaling::StretchX => "stretch_x",
            Scaling::StretchY => "stretch_y",
            Scaling::None => "none",
        }
    }
}

fn fit_scale(source: Vec2, target: Vec2) -> f32 {
    let target_ratio = target.y / target.x;
    let source_ratio = source.y / source.x;
    if target_ratio > source_ratio {
        target.x / source.x
    } else {
        target.y / source.y
    }
}

pub(crate) fn check_size(what: &str, size: Vec2) -> CoreResult<()> {
    if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
        Ok(())
    } else {
        Err(CoreError::invalid(format!(
            "{what} size must be positive and finite, got {}x{}",
            size.x, size.y
        )))
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scaling {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Scaling::ALL
            .into_iter()
            .find(|scaling| scaling.name() == wanted)
            .ok_or_else(|| CoreError::invalid(format!("unknown scaling '{s}'")))
    }
}

//! Scripted pointer paths for unattended sessions

use crate::algorithm::effects::PointerSample;
use crate::io::configuration::{
    ORBIT_ANGULAR_SPEED, ORBIT_RADIUS_FRACTION, SWEEP_AMPLITUDE_FRACTION,
};

/// Simulated pointer movement over the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PointerPath {
    /// No pointer over the canvas
    Absent,
    /// Pointer resting at the canvas center
    Still,
    /// Pointer circling the canvas center
    #[default]
    Orbit,
    /// Pointer tracing a Lissajous figure across the canvas
    Sweep,
}

impl PointerPath {
    /// Pointer position in canvas pixels at session time `t`
    pub fn position(self, t: f64, canvas: (u32, u32)) -> Option<[f64; 2]> {
        let width = f64::from(canvas.0);
        let height = f64::from(canvas.1);
        let center = [width / 2.0, height / 2.0];

        match self {
            Self::Absent => None,
            Self::Still => Some(center),
            Self::Orbit => {
                let radius = width.min(height) * ORBIT_RADIUS_FRACTION;
                let angle = t * ORBIT_ANGULAR_SPEED;
                Some([
                    radius.mul_add(angle.cos(), center[0]),
                    radius.mul_add(angle.sin(), center[1]),
                ])
            }
            Self::Sweep => Some([
                (width * SWEEP_AMPLITUDE_FRACTION).mul_add((t * 0.5).sin(), center[0]),
                (height * SWEEP_AMPLITUDE_FRACTION).mul_add((t * 0.9).sin(), center[1]),
            ]),
        }
    }

    /// Pointer sample for a frame at `t` whose predecessor ran at `previous_t`
    pub fn sample(self, t: f64, previous_t: f64, canvas: (u32, u32)) -> Option<PointerSample> {
        let position = self.position(t, canvas)?;
        let previous = self.position(previous_t, canvas).unwrap_or(position);
        Some(PointerSample { position, previous })
    }
}

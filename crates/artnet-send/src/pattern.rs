//! Test patterns for fixture checks

use serde::{Deserialize, Serialize};

/// Channel pattern rendered each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// One channel at full, walking up one channel per frame
    #[default]
    Chase,
    /// All channels ramping 0-255 and back
    Fade,
    /// All channels at full
    Full,
    /// All channels at zero
    Blackout,
}

impl Pattern {
    /// Render `channels` values for `frame`
    pub fn render(&self, frame: u64, channels: usize, out: &mut Vec<u8>) {
        out.clear();
        out.resize(channels, 0);
        if channels == 0 {
            return;
        }

        match self {
            Pattern::Chase => out[(frame % channels as u64) as usize] = 255,
            Pattern::Fade => {
                // Triangle wave, period 510 frames
                let phase = (frame % 510) as u16;
                let level = if phase < 256 { phase } else { 510 - phase };
                out.fill(level as u8);
            }
            Pattern::Full => out.fill(255),
            Pattern::Blackout => {}
        }
    }
}

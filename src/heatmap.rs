//! Sample value to color mapping.

/// RGB color for one taxel cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Default display ceiling: the scanner's ADC is 10-bit, so raw counts
/// saturate at 1023. Values above are drawn at full heat, not rejected.
pub const DEFAULT_CEILING: i32 = 1023;

/// Thermal ramp stops, cold to hot. Sampled from the inferno colormap so
/// low readings stay near-black and contacts glow orange-white.
#[rustfmt::skip]
const RAMP: [CellColor; 8] = [
    CellColor { r: 0,   g: 0,   b: 4   },
    CellColor { r: 40,  g: 11,  b: 84  },
    CellColor { r: 101, g: 21,  b: 110 },
    CellColor { r: 159, g: 42,  b: 99  },
    CellColor { r: 212, g: 72,  b: 66  },
    CellColor { r: 245, g: 125, b: 21  },
    CellColor { r: 250, g: 193, b: 39  },
    CellColor { r: 252, g: 255, b: 164 },
];

/// Map a raw sample to its display color.
///
/// The value is clipped into `[0, ceiling]` before mapping; out-of-range
/// readings are a display concern only and never rejected. Interpolates
/// linearly between the ramp stops.
pub fn color_for(value: i32, ceiling: i32) -> CellColor {
    let ceiling = ceiling.max(1);
    let clipped = value.clamp(0, ceiling);
    let t = clipped as f32 / ceiling as f32;

    let pos = t * (RAMP.len() - 1) as f32;
    let i = (pos as usize).min(RAMP.len() - 2);
    let frac = pos - i as f32;

    let lo = RAMP[i];
    let hi = RAMP[i + 1];
    CellColor {
        r: lerp(lo.r, hi.r, frac),
        g: lerp(lo.g, hi.g, frac),
        b: lerp(lo.b, hi.b, frac),
    }
}

#[inline]
fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

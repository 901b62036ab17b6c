use crate::overlay::model::Color;
use image::imageops::FilterType;

const HELPER_PNG: &[u8] = include_bytes!("../../assets/helper.png");

/// Pixels below this alpha are treated as background and keyed out.
const ALPHA_CUTOFF: u8 = 128;

/// Pre-keyed glyph image stored as top-down 32-bit BGRA rows, the layout a
/// Win32 DIB section expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    width: u32,
    height: u32,
    bgra: Vec<u8>,
}

impl Glyph {
    /// Convert straight RGBA pixels into a keyed BGRA glyph.
    ///
    /// Translucent pixels become `key` so the layered window shows through
    /// them. Opaque pixels that happen to equal `key` are shifted by one step
    /// on the blue channel so they stay visible.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8], key: Color) -> Self {
        let mut bgra = Vec::with_capacity(rgba.len());
        for px in rgba.chunks_exact(4) {
            let color = if px[3] < ALPHA_CUTOFF {
                key
            } else {
                avoid_key(Color::rgb(px[0], px[1], px[2]), key)
            };
            bgra.extend_from_slice(&[color.b, color.g, color.r, 0xff]);
        }
        Self {
            width,
            height,
            bgra,
        }
    }

    /// Solid filled square with a one pixel border, used when the embedded
    /// image cannot be decoded.
    pub fn placeholder(width: u32, height: u32, key: Color) -> Self {
        let fill = avoid_key(Color::rgb(0xf0, 0xc8, 0x40), key);
        let border = avoid_key(Color::rgb(0x40, 0x40, 0x40), key);
        let mut bgra = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                let c = if edge { border } else { fill };
                bgra.extend_from_slice(&[c.b, c.g, c.r, 0xff]);
            }
        }
        Self {
            width,
            height,
            bgra,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bgra(&self) -> &[u8] {
        &self.bgra
    }
}

/// Shift `color` off the transparency key if it matches it exactly.
pub fn avoid_key(color: Color, key: Color) -> Color {
    if color != key {
        return color;
    }
    let b = if key.b == u8::MAX { key.b - 1 } else { key.b + 1 };
    Color { b, ..key }
}

/// Decode a PNG and scale it to `size`.
pub fn decode_glyph(bytes: &[u8], size: (u32, u32), key: Color) -> anyhow::Result<Glyph> {
    let mut rgba = image::load_from_memory(bytes)?.to_rgba8();
    if rgba.dimensions() != size {
        rgba = image::imageops::resize(&rgba, size.0, size.1, FilterType::Lanczos3);
    }
    Ok(Glyph::from_rgba(size.0, size.1, rgba.as_raw(), key))
}

/// The helper glyph bundled into the binary, or a placeholder if it fails to
/// decode.
pub fn helper_glyph(size: (u32, u32), key: Color) -> Glyph {
    match decode_glyph(HELPER_PNG, size, key) {
        Ok(glyph) => glyph,
        Err(err) => {
            tracing::warn!(error = %err, "embedded helper image unreadable; using placeholder");
            Glyph::placeholder(size.0, size.1, key)
        }
    }
}

//! Color plumbing between the graph model and the vertex buffers.
//!
//! Geometry encoders ship RGB through a single f32 attribute instead of
//! three: the channels are packed as `r * 65536 + g * 256 + b` and the
//! shaders decode them with `floor`/`mod`. Every value in that scheme is
//! an integer below 2^24, so it survives the f32 round trip exactly.
//! Alpha travels as its own attribute because packing four channels would
//! not.

pub use skein_graph::Rgba;

/// Packs the RGB channels of a color into one float attribute.
#[inline]
pub fn packed_channel(color: Rgba) -> f32 {
    ((color.r as u32) * 65_536 + (color.g as u32) * 256 + color.b as u32) as f32
}

/// Inverse of [`packed_channel`]; the alpha of the result is opaque since
/// alpha is never part of the packed value.
pub fn unpacked_channel(value: f32) -> Rgba {
    let v = value as u32;
    Rgba::opaque((v >> 16) as u8, ((v >> 8) & 0xff) as u8, (v & 0xff) as u8)
}

/// Converts to the linear-ish float quadruple wgpu clear colors use.
pub fn to_wgpu(color: Rgba) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64 / 255.0,
        g: color.g as f64 / 255.0,
        b: color.b as f64 / 255.0,
        a: color.a as f64 / 255.0,
    }
}

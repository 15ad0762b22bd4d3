/// Straight-alpha RGBA color with byte channels.
///
/// Graph elements store colors in this form; the engine packs the RGB
/// channels into a single float attribute at encode time, so channels are
/// kept as exact bytes rather than normalized floats.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Alpha as a unit-interval float, the form shaders consume.
    #[inline]
    pub fn alpha_f32(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    ///
    /// Returns `None` for any other shape or non-hex digits.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        let byte = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();

        match s.len() {
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_six_digits() {
        assert_eq!(Rgba::from_hex("#336699"), Some(Rgba::opaque(0x33, 0x66, 0x99)));
    }

    #[test]
    fn hex_eight_digits() {
        assert_eq!(Rgba::from_hex("11223344"), Some(Rgba::new(0x11, 0x22, 0x33, 0x44)));
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("zzzzzz"), None);
        assert_eq!(Rgba::from_hex(""), None);
    }

    #[test]
    fn alpha_endpoints() {
        assert_eq!(Rgba::opaque(0, 0, 0).alpha_f32(), 1.0);
        assert_eq!(Rgba::new(0, 0, 0, 0).alpha_f32(), 0.0);
    }
}

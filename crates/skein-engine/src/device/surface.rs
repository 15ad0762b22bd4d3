//! Surface format/alpha selection and error classification.

use wgpu::SurfaceError;

/// What the frame loop should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was (or will be) reconfigured; redraw everything next
    /// frame, since swapchain contents did not survive.
    Reconfigured,
    /// Transient error; skip this frame and try again.
    SkipFrame,
    /// Unrecoverable (commonly out of memory); shut down gracefully.
    Fatal,
}

/// Picks a surface format, preferring sRGB variants when asked to.
pub(crate) fn choose_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }
    caps.formats.first().copied()
}

/// Honors a requested alpha mode when supported, otherwise takes the
/// first mode the surface offers.
pub(crate) fn choose_alpha(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .unwrap_or_else(|| {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        })
}

pub(crate) fn classify_error(err: &SurfaceError) -> SurfaceErrorAction {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        SurfaceError::Timeout | SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

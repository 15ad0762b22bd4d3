//! Compiled style programs and their cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::style::ProgramError;

/// A style's compiled pipeline plus its uniform block and bind group.
///
/// Built against one target format; the owning cache drops it when the
/// format changes.
pub struct StyleProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub uniforms: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// Lazily built per-style-name program cache.
///
/// Generic over the program type so the caching policy itself (build
/// once per name, rebuild everything when the target format changes,
/// failed builds stay absent) has no GPU dependency.
pub struct ProgramCache<P = StyleProgram> {
    entries: HashMap<String, P>,
    format: Option<wgpu::TextureFormat>,
}

impl<P> ProgramCache<P> {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), format: None }
    }

    /// Returns the program for `name`, building it at most once per
    /// (name, format). A changed format drops every cached entry first,
    /// since pipelines are format-bound. Build failures propagate and
    /// leave the cache without an entry, so a later call retries.
    pub fn get_or_build(
        &mut self,
        name: &str,
        format: wgpu::TextureFormat,
        build: impl FnOnce() -> Result<P, ProgramError>,
    ) -> Result<&P, ProgramError> {
        if self.format != Some(format) {
            if self.format.is_some() && !self.entries.is_empty() {
                log::debug!(
                    "target format changed, dropping {} cached programs",
                    self.entries.len(),
                );
            }
            self.entries.clear();
            self.format = Some(format);
        }
        match self.entries.entry(name.to_owned()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(build()?)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&P> {
        self.entries.get(name)
    }

    /// Drops every cached program (device teardown).
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.format = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> Default for ProgramCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGBA: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    const BGRA: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

    #[test]
    fn second_lookup_reuses_the_first_build() {
        let mut cache: ProgramCache<u32> = ProgramCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_build("arrow", RGBA, || {
                    builds += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(*value, 7);
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn names_build_independently() {
        let mut cache: ProgramCache<u32> = ProgramCache::new();
        cache.get_or_build("arrow", RGBA, || Ok(1)).unwrap();
        cache.get_or_build("line", RGBA, || Ok(2)).unwrap();
        assert_eq!(cache.get("arrow"), Some(&1));
        assert_eq!(cache.get("line"), Some(&2));
    }

    #[test]
    fn format_change_rebuilds_everything() {
        let mut cache: ProgramCache<u32> = ProgramCache::new();
        cache.get_or_build("arrow", RGBA, || Ok(1)).unwrap();
        let mut rebuilt = false;
        cache
            .get_or_build("arrow", BGRA, || {
                rebuilt = true;
                Ok(2)
            })
            .unwrap();
        assert!(rebuilt);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("arrow"), Some(&2));
    }

    #[test]
    fn failed_builds_are_retried() {
        let mut cache: ProgramCache<u32> = ProgramCache::new();
        let err = cache
            .get_or_build("arrow", RGBA, || Err(ProgramError::new("arrow", "boom")))
            .unwrap_err();
        assert_eq!(err.style, "arrow");
        assert!(cache.is_empty());
        cache.get_or_build("arrow", RGBA, || Ok(3)).unwrap();
        assert_eq!(cache.get("arrow"), Some(&3));
    }

    #[test]
    fn invalidate_empties_the_cache() {
        let mut cache: ProgramCache<u32> = ProgramCache::new();
        cache.get_or_build("arrow", RGBA, || Ok(1)).unwrap();
        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.get("arrow"), None);
    }
}

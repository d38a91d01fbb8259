/// Capability probing
///
/// Entry points are resolved per context through the device and stored in a
/// `CapabilitySet` owned by the scene instance. Nothing here is cached
/// process-wide, so a recreated context never sees stale pointers.

use crate::device::{
    GlDevice, IntegerQuery, ProcAddress, StringQuery, CONTEXT_CORE_PROFILE_BIT,
};
use crate::error::Result;
use crate::{engine_err, engine_warn};

/// One named entry point and its resolved address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub resolved: Option<ProcAddress>,
}

impl Capability {
    pub fn is_available(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Group of entry points a scene depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    VertexArrays,
    Instancing,
    UniformBuffers,
    ProgramPipelines,
    FragDataLocation,
    IndexedBlend,
    Blit,
    MapBufferRange,
    SyncObjects,
    GenerateMipmap,
}

impl Feature {
    /// Features every gl41 scene needs (VAO + instancing + UBO)
    pub const CORE: [Feature; 3] = [
        Feature::VertexArrays,
        Feature::Instancing,
        Feature::UniformBuffers,
    ];

    pub fn entry_points(&self) -> &'static [&'static str] {
        match self {
            Feature::VertexArrays => &["glGenVertexArrays", "glBindVertexArray", "glDeleteVertexArrays"],
            Feature::Instancing => &["glDrawArraysInstanced", "glVertexAttribDivisor"],
            Feature::UniformBuffers => &["glBindBufferBase", "glGetUniformBlockIndex", "glUniformBlockBinding"],
            Feature::ProgramPipelines => &[
                "glGenProgramPipelines",
                "glBindProgramPipeline",
                "glUseProgramStages",
                "glDeleteProgramPipelines",
                "glProgramParameteri",
            ],
            Feature::FragDataLocation => &["glBindFragDataLocation"],
            Feature::IndexedBlend => &["glEnablei", "glDisablei", "glBlendFunci", "glBlendEquationi"],
            Feature::Blit => &["glBlitFramebuffer"],
            Feature::MapBufferRange => &["glMapBufferRange", "glUnmapBuffer"],
            Feature::SyncObjects => &["glFenceSync", "glClientWaitSync", "glDeleteSync"],
            Feature::GenerateMipmap => &["glGenerateMipmap"],
        }
    }

    /// Short label used in the "Missing:" summary
    pub fn label(&self) -> &'static str {
        match self {
            Feature::VertexArrays => "VAO",
            Feature::Instancing => "instancing",
            Feature::UniformBuffers => "UBO",
            Feature::ProgramPipelines => "program-pipelines",
            Feature::FragDataLocation => "frag-data-location",
            Feature::IndexedBlend => "indexed-blend",
            Feature::Blit => "blit",
            Feature::MapBufferRange => "map-buffer-range",
            Feature::SyncObjects => "sync",
            Feature::GenerateMipmap => "mipmap",
        }
    }
}

/// Entry points resolved for one scene on the current context
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    entries: Vec<(Feature, Capability)>,
}

impl CapabilitySet {
    /// Resolve every entry point of `features`
    ///
    /// Absence is a normal outcome. With `show_errors`, one line per missing
    /// entry point is logged under `source`.
    pub fn resolve(device: &dyn GlDevice, features: &[Feature], show_errors: bool, source: &str) -> Self {
        let mut entries = Vec::new();
        for feature in features {
            for name in feature.entry_points() {
                let capability = Capability {
                    name,
                    resolved: device.get_proc_address(name),
                };
                if !capability.is_available() && show_errors {
                    engine_warn!(source, "missing symbol {}", name);
                }
                entries.push((*feature, capability));
            }
        }
        Self { entries }
    }

    /// Every entry point of `feature` resolved (false if never probed)
    pub fn has(&self, feature: Feature) -> bool {
        let mut probed = false;
        for (f, capability) in &self.entries {
            if *f == feature {
                probed = true;
                if !capability.is_available() {
                    return false;
                }
            }
        }
        probed
    }

    /// Features with at least one unresolved entry point, in probe order
    pub fn missing(&self) -> Vec<Feature> {
        let mut missing: Vec<Feature> = Vec::new();
        for (feature, capability) in &self.entries {
            if !capability.is_available() && !missing.contains(feature) {
                missing.push(*feature);
            }
        }
        missing
    }

    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.entries.iter().map(|(_, c)| c).find(|c| c.name == name)
    }

    pub fn all_resolved(&self) -> bool {
        self.entries.iter().all(|(_, c)| c.is_available())
    }

    /// Fail with `CapabilityMissing` unless the core set resolved
    pub fn require_core(&self, show_errors: bool, source: &str) -> Result<()> {
        let missing: Vec<&str> = Feature::CORE
            .iter()
            .filter(|feature| !self.has(**feature))
            .map(|feature| feature.label())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let message = format!(
            "Scene requires core features (VAO + instancing + UBO). Missing: {}",
            missing.join(" ")
        );
        if show_errors {
            Err(engine_err!(source, CapabilityMissing, "{}", message))
        } else {
            Err(crate::error::Error::CapabilityMissing(message))
        }
    }
}

/// Three-tier core profile detection
///
/// Profile mask first, then a null legacy extension string (core contexts
/// reject `glGetString(GL_EXTENSIONS)`), then the version string. Anything
/// undecided is reported as not core.
pub fn is_core_profile(device: &dyn GlDevice) -> bool {
    if let Some(mask) = device.get_integer(IntegerQuery::ContextProfileMask) {
        if mask != 0 {
            return mask & CONTEXT_CORE_PROFILE_BIT != 0;
        }
    }

    if device.get_string(StringQuery::Extensions).is_none() {
        return true;
    }

    if let Some(version) = device.get_string(StringQuery::Version) {
        if version.contains("OpenGL ES") {
            return false;
        }
    }

    false
}

/// Extension lookup that works on both legacy and core contexts
///
/// `GL_ARB_depth_texture` is folded into core and always reported there.
pub fn has_extension(device: &dyn GlDevice, name: &str) -> bool {
    if name == "GL_ARB_depth_texture" && is_core_profile(device) {
        return true;
    }

    if let Some(extensions) = device.get_string(StringQuery::Extensions) {
        if !extensions.is_empty() {
            return extensions.split_ascii_whitespace().any(|ext| ext == name);
        }
    }

    let count = device.get_integer(IntegerQuery::NumExtensions).unwrap_or(0).max(0) as u32;
    (0..count).any(|i| device.get_string_indexed(StringQuery::Extensions, i).as_deref() == Some(name))
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;

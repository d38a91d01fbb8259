/// Shader text rewriting collaborators
///
/// A rewriter is a pure string transform applied to every stage source right
/// before compilation. It never touches the device.

use crate::device::ShaderStage;

/// Output name substituted for `gl_FragColor`
pub const FRAG_COLOR_OUTPUT: &str = "gl41mark_FragColor";

/// Source + stage -> source
pub trait ShaderRewriter {
    fn rewrite(&self, source: &str, stage: ShaderStage) -> String;
}

/// Identity transform
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRewriter;

impl ShaderRewriter for PassthroughRewriter {
    fn rewrite(&self, source: &str, _stage: ShaderStage) -> String {
        source.to_string()
    }
}

/// Brings legacy GLSL up to what a core context accepts
///
/// - prepends `#version 330` when no directive is present
/// - `texture2D` / `textureCube` become `texture`
/// - `attribute` / `varying` become `in` / `out` according to the stage
/// - `gl_FragColor` becomes a declared location-0 output
///
/// Only whole identifiers are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreProfileRewriter;

impl ShaderRewriter for CoreProfileRewriter {
    fn rewrite(&self, source: &str, stage: ShaderStage) -> String {
        let mut s = if has_version_directive(source) {
            source.to_string()
        } else {
            format!("#version 330\n{}", source)
        };

        s = replace_word(&s, "texture2D", "texture");
        s = replace_word(&s, "textureCube", "texture");

        match stage {
            ShaderStage::Vertex => {
                s = replace_word(&s, "attribute", "in");
                s = replace_word(&s, "varying", "out");
            }
            ShaderStage::Fragment => {
                s = replace_word(&s, "varying", "in");
                if s.contains("gl_FragColor") {
                    s = replace_word(&s, "gl_FragColor", FRAG_COLOR_OUTPUT);
                    if let Some(nl) = s.find('\n') {
                        s.insert_str(
                            nl + 1,
                            &format!("layout(location = 0) out vec4 {};\n", FRAG_COLOR_OUTPUT),
                        );
                    }
                }
            }
            ShaderStage::Geometry => {}
        }
        s
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn has_version_directive(source: &str) -> bool {
    source.trim_start().starts_with("#version")
}

/// Replace `from` wherever it stands as a complete identifier
pub fn replace_word(source: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return source.to_string();
    }

    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut prev: Option<char> = None;
    while let Some(pos) = rest.find(from) {
        let before = rest[..pos].chars().next_back().or(prev);
        let after = rest[pos + from.len()..].chars().next();
        let standalone = !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char);

        let replacement = if standalone { to } else { from };
        out.push_str(&rest[..pos]);
        out.push_str(replacement);
        prev = replacement.chars().next_back().or(before);
        rest = &rest[pos + from.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "rewriter_tests.rs"]
mod tests;

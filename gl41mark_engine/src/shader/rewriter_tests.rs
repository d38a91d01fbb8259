//! Unit tests for rewriter.rs

use crate::device::ShaderStage;
use crate::shader::rewriter::{
    replace_word, CoreProfileRewriter, PassthroughRewriter, ShaderRewriter, FRAG_COLOR_OUTPUT,
};

// ============================================================================
// WORD REPLACEMENT
// ============================================================================

#[test]
fn test_replace_word_whole_identifiers_only() {
    let out = replace_word("varying vec2 v; my_varying x; varying2 y;", "varying", "out");
    assert_eq!(out, "out vec2 v; my_varying x; varying2 y;");
}

#[test]
fn test_replace_word_adjacent_occurrences() {
    assert_eq!(replace_word("aa aa", "aa", "b"), "b b");
    assert_eq!(replace_word("aaaa", "aa", "b"), "aaaa");
}

// ============================================================================
// CORE PROFILE REWRITER
// ============================================================================

#[test]
fn test_passthrough_is_identity() {
    let src = "#version 150\nvoid main() {}\n";
    assert_eq!(PassthroughRewriter.rewrite(src, ShaderStage::Vertex), src);
}

#[test]
fn test_adds_version_when_missing() {
    let out = CoreProfileRewriter.rewrite("void main() {}\n", ShaderStage::Geometry);
    assert!(out.starts_with("#version 330\n"));
}

#[test]
fn test_keeps_existing_version() {
    let src = "  #version 150\nvoid main() {}\n";
    let out = CoreProfileRewriter.rewrite(src, ShaderStage::Geometry);
    assert_eq!(out, src);
}

#[test]
fn test_vertex_qualifiers() {
    let src = "#version 150\nattribute vec3 position;\nvarying vec2 uv;\n";
    let out = CoreProfileRewriter.rewrite(src, ShaderStage::Vertex);
    assert!(out.contains("in vec3 position;"));
    assert!(out.contains("out vec2 uv;"));
}

#[test]
fn test_fragment_output_mapping() {
    let src = "#version 150\nvarying vec2 uv;\nuniform sampler2D t;\nvoid main() { gl_FragColor = texture2D(t, uv); }\n";
    let out = CoreProfileRewriter.rewrite(src, ShaderStage::Fragment);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "#version 150");
    assert_eq!(lines[1], format!("layout(location = 0) out vec4 {};", FRAG_COLOR_OUTPUT));
    assert!(out.contains("in vec2 uv;"));
    assert!(out.contains(&format!("{} = texture(t, uv);", FRAG_COLOR_OUTPUT)));
    assert!(!out.contains("gl_FragColor"));
}

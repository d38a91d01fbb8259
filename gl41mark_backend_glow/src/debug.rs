/// GL error tracking and colored diagnostic reports
///
/// With the `gl-error-checks` feature every GlowDevice call drains
/// glGetError afterwards and feeds the codes here. Counters are process-wide
/// atomics; the per-call grouping sits behind a mutex.

use colored::*;
use gl41mark_engine::gl41mark::capability::is_core_profile;
use gl41mark_engine::gl41mark::device::{GlDevice, IntegerQuery, StringQuery};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Global GL error counters
static GL_ERROR_STATS: GlErrorStatsTracker = GlErrorStatsTracker::new();

/// Calls that raised errors, with occurrence counts
static CALL_TRACKER: Mutex<Option<FxHashMap<&'static str, u32>>> = Mutex::new(None);

/// Snapshot of the GL error counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlErrorStats {
    pub invalid_enum: u32,
    pub invalid_value: u32,
    pub invalid_operation: u32,
    pub invalid_framebuffer_operation: u32,
    pub out_of_memory: u32,
    pub other: u32,
}

impl GlErrorStats {
    pub fn total(&self) -> u32 {
        self.invalid_enum
            + self.invalid_value
            + self.invalid_operation
            + self.invalid_framebuffer_operation
            + self.out_of_memory
            + self.other
    }
}

struct GlErrorStatsTracker {
    invalid_enum: AtomicU32,
    invalid_value: AtomicU32,
    invalid_operation: AtomicU32,
    invalid_framebuffer_operation: AtomicU32,
    out_of_memory: AtomicU32,
    other: AtomicU32,
}

impl GlErrorStatsTracker {
    const fn new() -> Self {
        Self {
            invalid_enum: AtomicU32::new(0),
            invalid_value: AtomicU32::new(0),
            invalid_operation: AtomicU32::new(0),
            invalid_framebuffer_operation: AtomicU32::new(0),
            out_of_memory: AtomicU32::new(0),
            other: AtomicU32::new(0),
        }
    }

    fn counter(&self, code: u32) -> &AtomicU32 {
        match code {
            glow::INVALID_ENUM => &self.invalid_enum,
            glow::INVALID_VALUE => &self.invalid_value,
            glow::INVALID_OPERATION => &self.invalid_operation,
            glow::INVALID_FRAMEBUFFER_OPERATION => &self.invalid_framebuffer_operation,
            glow::OUT_OF_MEMORY => &self.out_of_memory,
            _ => &self.other,
        }
    }

    fn get_stats(&self) -> GlErrorStats {
        GlErrorStats {
            invalid_enum: self.invalid_enum.load(Ordering::Relaxed),
            invalid_value: self.invalid_value.load(Ordering::Relaxed),
            invalid_operation: self.invalid_operation.load(Ordering::Relaxed),
            invalid_framebuffer_operation: self.invalid_framebuffer_operation.load(Ordering::Relaxed),
            out_of_memory: self.out_of_memory.load(Ordering::Relaxed),
            other: self.other.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in [
            &self.invalid_enum,
            &self.invalid_value,
            &self.invalid_operation,
            &self.invalid_framebuffer_operation,
            &self.out_of_memory,
            &self.other,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Count one glGetError code raised after `call`
///
/// Returns how many times `call` has raised an error so far.
pub(crate) fn record_gl_error(call: &'static str, code: u32) -> u32 {
    GL_ERROR_STATS.counter(code).fetch_add(1, Ordering::Relaxed);
    match CALL_TRACKER.lock() {
        Ok(mut guard) => {
            let count = guard.get_or_insert_with(FxHashMap::default).entry(call).or_insert(0);
            *count += 1;
            *count
        }
        Err(_) => 1,
    }
}

/// Current GL error counters
pub fn get_gl_error_stats() -> GlErrorStats {
    GL_ERROR_STATS.get_stats()
}

/// Zero the counters and forget per-call history
pub fn reset_gl_error_stats() {
    GL_ERROR_STATS.reset();
    if let Ok(mut guard) = CALL_TRACKER.lock() {
        *guard = None;
    }
}

/// Calls that raised errors, most frequent first
pub fn gl_error_offenders() -> Vec<(&'static str, u32)> {
    let mut offenders: Vec<(&'static str, u32)> = match CALL_TRACKER.lock() {
        Ok(guard) => guard
            .as_ref()
            .map(|calls| calls.iter().map(|(call, count)| (*call, *count)).collect())
            .unwrap_or_default(),
        Err(_) => Vec::new(),
    };
    offenders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    offenders
}

/// Print the GL error statistics report
pub fn print_gl_error_stats_report() {
    let stats = get_gl_error_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No GL errors".green().bold());
        return;
    }

    println!("\n{}", "=== GL Error Report ===".bright_blue().bold());

    let rows = [
        ("GL_INVALID_ENUM:", stats.invalid_enum),
        ("GL_INVALID_VALUE:", stats.invalid_value),
        ("GL_INVALID_OPERATION:", stats.invalid_operation),
        ("GL_INVALID_FRAMEBUFFER_OPERATION:", stats.invalid_framebuffer_operation),
        ("GL_OUT_OF_MEMORY:", stats.out_of_memory),
        ("Other:", stats.other),
    ];
    for (label, count) in rows {
        if count > 0 {
            println!("  {} {}", label.red().bold(), count);
        }
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());

    let offenders = gl_error_offenders();
    if !offenders.is_empty() {
        println!("\n  {}", "Raised by:".bright_black());
        for (call, count) in offenders {
            println!("    {} [×{}]", call.yellow(), count);
        }
    }

    println!("{}\n", "=======================".bright_blue().bold());
}

/// Print the driver identification strings and profile of a context
pub fn print_context_report(device: &dyn GlDevice) {
    let field = |query| device.get_string(query).unwrap_or_else(|| "(null)".to_string());

    println!("\n{}", "=== GL Context ===".bright_blue().bold());
    println!("  {} {}", "Vendor:".cyan(), field(StringQuery::Vendor));
    println!("  {} {}", "Renderer:".cyan(), field(StringQuery::Renderer));
    println!("  {} {}", "Version:".cyan(), field(StringQuery::Version));
    println!("  {} {}", "GLSL:".cyan(), field(StringQuery::ShadingLanguageVersion));

    let profile = if is_core_profile(device) {
        "core".green()
    } else {
        "compatibility / unknown".yellow()
    };
    println!("  {} {}", "Profile:".cyan(), profile);

    if let Some(count) = device.get_integer(IntegerQuery::NumExtensions) {
        println!("  {} {}", "Extensions:".cyan(), count);
    }
    println!("{}\n", "==================".bright_blue().bold());
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;

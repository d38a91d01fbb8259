/// Scene options and defensive parsing
///
/// The driver sets every option as a string. Scenes read them back through
/// the `parse_clamped_*` helpers, which never fail: unparsable text yields
/// the declared default and anything out of range is clamped.

use rustc_hash::FxHashMap;

use crate::engine_warn;

const SOURCE: &str = "gl41mark::params";

/// One named option with its declared default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneOption {
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
    pub value: String,
}

impl SceneOption {
    pub fn new(name: &'static str, default: &'static str, description: &'static str) -> Self {
        Self {
            name,
            default,
            description,
            value: default.to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default
    }
}

/// Options of one scene, iterated in declaration order
#[derive(Debug, Clone, Default)]
pub struct SceneOptions {
    options: FxHashMap<&'static str, SceneOption>,
    order: Vec<&'static str>,
}

impl SceneOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option; re-declaring replaces default and description
    pub fn declare(mut self, name: &'static str, default: &'static str, description: &'static str) -> Self {
        if self.options.insert(name, SceneOption::new(name, default, description)).is_none() {
            self.order.push(name);
        }
        self
    }

    /// Set an option's string value; false for an undeclared name
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match self.options.get_mut(name) {
            Some(option) => {
                option.value = value.to_string();
                true
            }
            None => {
                engine_warn!(SOURCE, "unknown option '{}' ignored", name);
                false
            }
        }
    }

    /// Current string value (empty for an undeclared name)
    pub fn value(&self, name: &str) -> &str {
        self.options.get(name).map_or("", |option| option.value.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&SceneOption> {
        self.options.get(name)
    }

    /// Restore every option to its default
    pub fn reset(&mut self) {
        for option in self.options.values_mut() {
            option.value = option.default.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneOption> {
        self.order.iter().filter_map(|name| self.options.get(name))
    }

    /// Parse the named option as an integer within `[min, max]`
    pub fn u32_in(&self, name: &str, default: u32, min: u32, max: u32) -> u32 {
        parse_clamped_u32(self.value(name), default, min, max)
    }

    pub fn u64_in(&self, name: &str, default: u64, min: u64, max: u64) -> u64 {
        parse_clamped_u64(self.value(name), default, min, max)
    }

    pub fn f32_in(&self, name: &str, default: f32, min: f32, max: f32) -> f32 {
        parse_clamped_f32(self.value(name), default, min, max)
    }
}

/// Integer option parsing: default on garbage, clamp otherwise
///
/// Negative values clamp to `min`; digit strings too large for 64 bits
/// clamp to `max`.
pub fn parse_clamped_u64(text: &str, default: u64, min: u64, max: u64) -> u64 {
    let text = text.trim();
    let value = match text.parse::<i64>() {
        Ok(v) if v < 0 => min,
        Ok(v) => v as u64,
        Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => max,
        Err(_) => default,
    };
    value.clamp(min, max)
}

pub fn parse_clamped_u32(text: &str, default: u32, min: u32, max: u32) -> u32 {
    parse_clamped_u64(text, default as u64, min as u64, max as u64) as u32
}

/// Float option parsing: default on garbage or NaN, clamp otherwise
pub fn parse_clamped_f32(text: &str, default: f32, min: f32, max: f32) -> f32 {
    match text.trim().parse::<f32>() {
        Ok(v) if !v.is_nan() => v.clamp(min, max),
        _ => default.clamp(min, max),
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

//! Configuration access port.
//!
//! Typed getters fall back to the supplied default when a key is absent or
//! does not parse; callers validate ranges themselves.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Whether the named section exists at all.
    fn has_section(&self, section: &str) -> bool;
}

//! Configuration access port trait.

/// Lookups into a sectioned key/value configuration. Values come back raw;
/// typing and range checks live in `domain::config_validation`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}

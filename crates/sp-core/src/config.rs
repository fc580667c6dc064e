use std::collections::BTreeMap;

/// Participant properties declared with `<property name="..." value="..."/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    properties: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(name, value);
        self
    }

    pub fn put(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// `true`/`yes` (any case) are true, every other present value is false.
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(value) => {
                let value = value.trim();
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
            }
            None => default,
        }
    }

    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.get(name)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_fall_back_to_defaults() {
        let cfg = Configuration::new()
            .with("compiled", "YES")
            .with("timeout", "30")
            .with("bad", "thirty");
        assert!(cfg.get_bool("compiled", false));
        assert!(cfg.get_bool("missing", true));
        assert!(!cfg.get_bool("timeout", true));
        assert_eq!(cfg.get_int("timeout", 0), 30);
        assert_eq!(cfg.get_int("bad", 5), 5);
        assert_eq!(cfg.get_or("missing", "x"), "x");
        assert_eq!(cfg.names().collect::<Vec<_>>(), vec!["bad", "compiled", "timeout"]);
    }
}

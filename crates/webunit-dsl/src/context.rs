use std::collections::HashMap;

/// Variables visible to `{NAME}` substitution during one parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    vars: HashMap<String, String>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the context, typically from `--set NAME=VALUE` options.
    pub fn with_variables<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut context = Self::new();
        for (key, value) in vars {
            context.set(key, value);
        }
        context
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Sets `key` only if it has no value yet. Returns whether it was set.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.vars.contains_key(&key) {
            return false;
        }
        self.vars.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Variable names consist of ASCII letters, digits and underscores and
    /// do not start with a digit, so `{3}` stays a literal.
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let mut context = ParseContext::new();
        context.set("HOST", "a");
        context.set("HOST", "b");
        assert_eq!(context.get("HOST"), Some("b"));
    }

    #[test]
    fn test_set_default_keeps_existing() {
        let mut context = ParseContext::with_variables([("HOST", "cli")]);
        assert!(!context.set_default("HOST", "file"));
        assert!(context.set_default("PORT", "8080"));
        assert_eq!(context.get("HOST"), Some("cli"));
        assert_eq!(context.get("PORT"), Some("8080"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let context = ParseContext::with_variables([("host", "x")]);
        assert!(context.contains("host"));
        assert!(!context.contains("HOST"));
    }

    #[test]
    fn test_valid_names() {
        assert!(ParseContext::is_valid_name("BASE_URL"));
        assert!(ParseContext::is_valid_name("v2"));
        assert!(ParseContext::is_valid_name("_private"));
        assert!(!ParseContext::is_valid_name(""));
        assert!(!ParseContext::is_valid_name("2fa"));
        assert!(!ParseContext::is_valid_name("base-url"));
        assert!(!ParseContext::is_valid_name("a b"));
    }
}

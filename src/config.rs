//! Checker configuration

/// Name of the function every program must define
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Options for a semantic check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Required entry point: a top-level function with no parameters returning nothing
    pub entry_point: String,
}

impl CheckerConfig {
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entry_point() {
        assert_eq!(CheckerConfig::default().entry_point, "main");
        assert_eq!(
            CheckerConfig::default().with_entry_point("start").entry_point,
            "start"
        );
    }
}

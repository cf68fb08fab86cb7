//! Compiler and evaluator configuration

/// Default bound on filter nesting and deep-scan document depth
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Tunables shared by [`crate::Compiler`] and [`crate::Evaluator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Maximum nesting of parenthesized/negated filter expressions while
    /// compiling, and maximum document depth visited by a deep scan.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth() {
        assert_eq!(Options::default().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_builder() {
        let options = Options::new().max_depth(4);
        assert_eq!(options.max_depth, 4);
    }
}

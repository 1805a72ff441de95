use std::borrow::Cow;

pub const DEFAULT_SEPARATOR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Joins the labels of a nested field into its path.
    pub separator: Cow<'static, str>,
    /// How many levels of nested records below the root get descended into.
    /// Records past the limit are kept whole as a single value. `None` means
    /// no limit.
    pub max_depth: Option<usize>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: Cow::Borrowed(DEFAULT_SEPARATOR),
            max_depth: None,
        }
    }
}

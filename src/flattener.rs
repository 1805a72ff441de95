use {
    crate::{
        fields::{FieldMap, flatten::flattened_with},
        format::write_fields,
        options::FlattenOptions,
    },
    serde::Serialize,
    std::{borrow::Cow, fmt},
    tap::Tap,
};

/// Reusable flattener carrying its [`FlattenOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FlattenOptions) -> Self {
        Self { options }
    }

    pub fn separator(self, separator: impl Into<Cow<'static, str>>) -> Self {
        self.tap_mut(|f| f.options.separator = separator.into())
    }

    pub fn max_depth(self, max_depth: usize) -> Self {
        self.tap_mut(|f| f.options.max_depth = Some(max_depth))
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    pub fn flatten<T: Serialize + ?Sized>(&self, value: &T) -> FieldMap {
        flattened_with(&self.options, value)
    }

    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> String {
        crate::format::formatted_with(&self.options, value)
    }

    /// Only fails when `out` does.
    pub fn write_to<T: Serialize + ?Sized>(&self, out: &mut impl fmt::Write, value: &T) -> fmt::Result {
        write_fields(out, &self.flatten(value))
    }
}

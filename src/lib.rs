//! Flattens the fields of any `Serialize` record into a `path -> value` map
//! and renders it as `label: value` lines for logs and test diagnostics.
//!
//! Labels come from `#[serde(rename)]` or the field name, nested records are
//! joined into dotted paths and skipped fields are left out. Values that are
//! not records flatten to nothing.

pub mod fields;
pub mod flattener;
pub mod format;
pub mod options;

pub use {
    fields::{
        FieldMap,
        flatten::{flattened, flattened_with},
    },
    flattener::Flattener,
    format::{formatted, formatted_with},
    options::FlattenOptions,
};

/// Borrows a value for logging. `Display` renders it like [`formatted`] and
/// `Serialize` writes the flat map.
#[derive(Debug)]
pub struct Fields<'a, T: ?Sized>(pub &'a T);

#[extension_traits::extension(pub trait StructLogExt)]
impl<T: ::serde::Serialize> T {
    fn struct_fields(&self) -> FieldMap {
        flattened(self)
    }

    fn log_struct(&self) -> String {
        formatted(self)
    }

    fn as_fields(&self) -> Fields<'_, Self> {
        Fields(self)
    }
}

mod serde;

use {
    crate::{Fields, fields::flatten::flattened},
    serde::{Serialize, Serializer},
    tracing::instrument,
};

/// Serializes as the flat `path -> value` map instead of the nested value.
impl<T> Serialize for Fields<'_, T>
where
    T: Serialize + ?Sized,
{
    #[instrument(level = "debug", skip_all)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(flattened(self.0))
    }
}

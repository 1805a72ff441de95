use {
    super::{FieldMap, FieldPath, Node, capture::capture},
    crate::options::FlattenOptions,
    serde::Serialize,
    serde_json::Value,
    std::iter::once,
    tap::Pipe,
    tracing::{debug, instrument},
};

fn boxed_iter<'a, T, I>(iter: I) -> Box<dyn Iterator<Item = T> + 'a>
where
    T: 'a,
    I: Iterator<Item = T> + 'a,
{
    Box::new(iter)
}

/// Walks the fields of a record depth first. Nested records are descended
/// into while `max_depth` allows it, any other node is yielded as a leaf
/// under its full path.
pub fn flattened_iter(
    prefix: FieldPath,
    fields: Vec<(&'static str, Node)>,
    max_depth: Option<usize>,
) -> impl Iterator<Item = (FieldPath, Value)> {
    fields
        .into_iter()
        .flat_map(move |(label, node)| {
            let path = prefix.join(label);
            match node {
                Node::Record(fields) if max_depth.is_none_or(|max| path.depth() <= max) => {
                    flattened_iter(path, fields, max_depth).pipe(boxed_iter)
                }
                empty if empty.is_empty_record() => {
                    std::iter::empty::<(FieldPath, Value)>().pipe(boxed_iter)
                }
                other => once((path, other.into_value())).pipe(boxed_iter),
            }
        })
        .pipe(boxed_iter)
}

#[instrument(level = "debug", skip(value))]
pub fn flattened_with<T: Serialize + ?Sized>(options: &FlattenOptions, value: &T) -> FieldMap {
    capture(value)
        .and_then(Node::deref_once)
        .and_then(|root| match root {
            Node::Record(fields) => Some(fields),
            other => {
                debug!(?other, "not a record, nothing to flatten");
                None
            }
        })
        .map(|fields| {
            flattened_iter(FieldPath::default(), fields, options.max_depth)
                .map(|(path, value)| (path.render(&options.separator), value))
                .collect()
        })
        .unwrap_or_default()
}

pub fn flattened<T: Serialize + ?Sized>(value: &T) -> FieldMap {
    flattened_with(&FlattenOptions::default(), value)
}

//! Captures any `Serialize` value as a field tree.
//!
//! Named structs (and unit structs) are records, `Option` is a nullable
//! reference and newtype structs are transparent. Everything else is handed
//! to `serde_json` and kept as a leaf [`Value`].

use {
    super::Node,
    serde::{
        Serialize, Serializer,
        ser::{
            self, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
            SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
        },
    },
    serde_json::{Value, value::Serializer as ValueSerializer},
    tap::Pipe,
    tracing::{debug, trace},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Custom(String),
    #[error("converting leaf value")]
    Json(#[from] serde_json::Error),
}

impl ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

type Result<T> = std::result::Result<T, self::Error>;

/// Returns `None` when the value's `Serialize` impl fails at the top level.
pub fn capture<T: Serialize + ?Sized>(value: &T) -> Option<Node> {
    value
        .serialize(NodeSerializer)
        .map_err(|error| debug!(%error, "value could not be captured"))
        .ok()
}

fn leaf(value: std::result::Result<Value, serde_json::Error>) -> Result<Node> {
    value.map(Node::Leaf).map_err(self::Error::from)
}

/// Integers past the json number range keep their decimal text.
fn wide_integer<N, W>(v: W) -> Node
where
    N: TryFrom<W>,
    Value: From<N>,
    W: Copy + std::fmt::Display,
{
    N::try_from(v)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(v.to_string()))
        .pipe(Node::Leaf)
}

/// Keeps `NaN`, `inf` and `-inf` as text, json would turn them into `null`.
fn float(v: f64) -> Node {
    match v.is_finite() {
        true => Value::from(v),
        false => Value::String(v.to_string()),
    }
    .pipe(Node::Leaf)
}

pub struct NodeSerializer;

pub struct RecordSerializer {
    fields: Vec<(&'static str, Node)>,
}

/// Compound leaf (sequence, map, enum payload) built by `serde_json`.
pub struct LeafCompound<S>(S);

macro_rules! serialize_leaf {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Node> {
                ValueSerializer.$method(v).pipe(leaf)
            }
        )*
    };
}

impl Serializer for NodeSerializer {
    type Ok = Node;
    type Error = self::Error;
    type SerializeSeq = LeafCompound<<ValueSerializer as Serializer>::SerializeSeq>;
    type SerializeTuple = LeafCompound<<ValueSerializer as Serializer>::SerializeTuple>;
    type SerializeTupleStruct = LeafCompound<<ValueSerializer as Serializer>::SerializeTupleStruct>;
    type SerializeTupleVariant = LeafCompound<<ValueSerializer as Serializer>::SerializeTupleVariant>;
    type SerializeMap = LeafCompound<<ValueSerializer as Serializer>::SerializeMap>;
    type SerializeStruct = RecordSerializer;
    type SerializeStructVariant = LeafCompound<<ValueSerializer as Serializer>::SerializeStructVariant>;

    serialize_leaf! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(wide_integer::<i64, _>(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(wide_integer::<u64, _>(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(float(v))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Reference(None))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value
            .serialize(NodeSerializer)
            .map(Box::new)
            .map(Some)
            .map(Node::Reference)
    }

    fn serialize_unit(self) -> Result<Node> {
        ValueSerializer.serialize_unit().pipe(leaf)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::Record(Vec::new()))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        ValueSerializer
            .serialize_unit_variant(name, variant_index, variant)
            .pipe(leaf)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        ValueSerializer
            .serialize_newtype_variant(name, variant_index, variant, value)
            .pipe(leaf)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        ValueSerializer
            .serialize_seq(len)
            .map(LeafCompound)
            .map_err(self::Error::from)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        ValueSerializer
            .serialize_tuple(len)
            .map(LeafCompound)
            .map_err(self::Error::from)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        ValueSerializer
            .serialize_tuple_struct(name, len)
            .map(LeafCompound)
            .map_err(self::Error::from)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        ValueSerializer
            .serialize_tuple_variant(name, variant_index, variant, len)
            .map(LeafCompound)
            .map_err(self::Error::from)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        ValueSerializer
            .serialize_map(len)
            .map(LeafCompound)
            .map_err(self::Error::from)
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(RecordSerializer {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        ValueSerializer
            .serialize_struct_variant(name, variant_index, variant, len)
            .map(LeafCompound)
            .map_err(self::Error::from)
    }
}

impl SerializeStruct for RecordSerializer {
    type Ok = Node;
    type Error = self::Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match value.serialize(NodeSerializer) {
            Ok(node) => self.fields.push((key, node)),
            Err(error) => debug!(field = key, %error, "omitting field that could not be captured"),
        }
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        trace!(field = key, "skipping field");
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Record(self.fields))
    }
}

impl<S> SerializeSeq for LeafCompound<S>
where
    S: SerializeSeq<Ok = Value, Error = serde_json::Error>,
{
    type Ok = Node;
    type Error = self::Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_element(value).map_err(self::Error::from)
    }

    fn end(self) -> Result<Node> {
        self.0.end().pipe(leaf)
    }
}

impl<S> SerializeTuple for LeafCompound<S>
where
    S: SerializeTuple<Ok = Value, Error = serde_json::Error>,
{
    type Ok = Node;
    type Error = self::Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_element(value).map_err(self::Error::from)
    }

    fn end(self) -> Result<Node> {
        self.0.end().pipe(leaf)
    }
}

impl<S> SerializeTupleStruct for LeafCompound<S>
where
    S: SerializeTupleStruct<Ok = Value, Error = serde_json::Error>,
{
    type Ok = Node;
    type Error = self::Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_field(value).map_err(self::Error::from)
    }

    fn end(self) -> Result<Node> {
        self.0.end().pipe(leaf)
    }
}

impl<S> SerializeTupleVariant for LeafCompound<S>
where
    S: SerializeTupleVariant<Ok = Value, Error = serde_json::Error>,
{
    type Ok = Node;
    type Error = self::Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_field(value).map_err(self::Error::from)
    }

    fn end(self) -> Result<Node> {
        self.0.end().pipe(leaf)
    }
}

impl<S> SerializeMap for LeafCompound<S>
where
    S: SerializeMap<Ok = Value, Error = serde_json::Error>,
{
    type Ok = Node;
    type Error = self::Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_key(key).map_err(self::Error::from)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_value(value).map_err(self::Error::from)
    }

    fn end(self) -> Result<Node> {
        self.0.end().pipe(leaf)
    }
}

impl<S> SerializeStructVariant for LeafCompound<S>
where
    S: SerializeStructVariant<Ok = Value, Error = serde_json::Error>,
{
    type Ok = Node;
    type Error = self::Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.0.serialize_field(key, value).map_err(self::Error::from)
    }

    fn end(self) -> Result<Node> {
        self.0.end().pipe(leaf)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde::ser::Error as _,
        serde_json::json,
        std::collections::BTreeMap,
    };

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    struct Meters(f64);

    #[derive(Serialize)]
    enum Mode {
        Fast,
        Slow { delay: u8 },
    }

    struct Refusing;

    impl Serialize for Refusing {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_struct_becomes_record() {
        assert_eq!(
            capture(&Point { x: 1, y: -2 }),
            Some(Node::Record(vec![
                ("x", Node::Leaf(json!(1))),
                ("y", Node::Leaf(json!(-2))),
            ]))
        );
    }

    #[test]
    fn test_option_becomes_reference() {
        assert_eq!(capture(&None::<u8>), Some(Node::Reference(None)));
        assert_eq!(
            capture(&Some(5u8)),
            Some(Node::Reference(Some(Box::new(Node::Leaf(json!(5))))))
        );
    }

    #[test]
    fn test_transparent_wrappers() {
        assert_eq!(capture(&Meters(1.5)), Some(Node::Leaf(json!(1.5))));
        assert_eq!(
            capture(&Box::new(Point { x: 0, y: 0 })),
            capture(&Point { x: 0, y: 0 })
        );
        assert_eq!(capture(&Marker), Some(Node::Record(vec![])));
    }

    #[test]
    fn test_compound_values_are_leaves() {
        assert_eq!(capture(&vec![1, 2]), Some(Node::Leaf(json!([1, 2]))));
        assert_eq!(capture(&(1, "a")), Some(Node::Leaf(json!([1, "a"]))));
        assert_eq!(capture(&Mode::Fast), Some(Node::Leaf(json!("Fast"))));
        assert_eq!(
            capture(&Mode::Slow { delay: 3 }),
            Some(Node::Leaf(json!({"Slow": {"delay": 3}})))
        );
        assert_eq!(
            capture(&BTreeMap::from([("k", 1)])),
            Some(Node::Leaf(json!({"k": 1})))
        );
    }

    #[test]
    fn test_wide_integers_keep_their_digits() {
        assert_eq!(capture(&7u128), Some(Node::Leaf(json!(7))));
        assert_eq!(capture(&-7i128), Some(Node::Leaf(json!(-7))));
        assert_eq!(
            capture(&u128::MAX),
            Some(Node::Leaf(json!("340282366920938463463374607431768211455")))
        );
        assert_eq!(
            capture(&i128::MIN),
            Some(Node::Leaf(json!("-170141183460469231731687303715884105728")))
        );
    }

    #[test]
    fn test_non_finite_floats_are_not_null() {
        assert_eq!(capture(&f64::NAN), Some(Node::Leaf(json!("NaN"))));
        assert_eq!(capture(&f64::INFINITY), Some(Node::Leaf(json!("inf"))));
        assert_eq!(capture(&f32::NEG_INFINITY), Some(Node::Leaf(json!("-inf"))));
        assert_eq!(capture(&0.25f32), Some(Node::Leaf(json!(0.25))));
    }

    #[test]
    fn test_failing_root_is_not_captured() {
        assert_eq!(capture(&Refusing), None);
        // map keys must be strings for a json leaf
        assert_eq!(capture(&BTreeMap::from([((1u8, 2u8), 3u8)])), None);
    }

    #[test]
    fn test_failing_field_is_omitted() {
        #[derive(Serialize)]
        struct Mixed {
            before: u8,
            broken: Refusing,
            after: u8,
        }

        assert_eq!(
            capture(&Mixed {
                before: 1,
                broken: Refusing,
                after: 2,
            }),
            Some(Node::Record(vec![
                ("before", Node::Leaf(json!(1))),
                ("after", Node::Leaf(json!(2))),
            ]))
        );
    }
}

use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, forward_to_deserialize_any};

use crate::{Operator, TxtAstItem, TxtParseNode};
use std::fmt;

pub struct Deserializer<'de> {
    input: &'de TxtParseNode,
}

impl<'de> Deserializer<'de> {
    pub fn from_node(input: &'de TxtParseNode) -> Self {
        Deserializer { input }
    }

    fn integer(&self) -> Result<i64, DeError> {
        match &self.input.entry {
            TxtAstItem::IntValue(i) => Ok(*i),
            // some files write counts as 3.000
            TxtAstItem::FloatValue(f) if f.fract() == 0.0 => Ok(*f as i64),
            other => Err(DeError(format!("expected an integer, found {:?}", other))),
        }
    }

    fn float(&self) -> Result<f64, DeError> {
        match &self.input.entry {
            TxtAstItem::FloatValue(f) => Ok(*f),
            TxtAstItem::IntValue(i) => Ok(*i as f64),
            other => Err(DeError(format!("expected a number, found {:?}", other))),
        }
    }

    fn is_list(&self) -> bool {
        matches!(self.input.entry, TxtAstItem::AssignmentList)
    }
}

/// Deserializes a parse tree node into `T`.
///
/// Unknown keys are skipped, so structs only need to declare the fields
/// they care about. Date-keyed history blocks are skipped the same way.
pub fn from_node<'a, T>(node: &'a TxtParseNode) -> Result<T, DeError>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_node(node);
    T::deserialize(&mut deserializer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeError(String);

impl fmt::Display for DeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for DeError {}
impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeError(msg.to_string())
    }
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = DeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            TxtAstItem::Identifier(s) | TxtAstItem::StringValue(s) => visitor.visit_str(s),
            TxtAstItem::IntValue(i) => visitor.visit_i64(*i),
            TxtAstItem::FloatValue(f) => visitor.visit_f64(*f),
            TxtAstItem::AssignmentList => {
                // A block whose first child is an assignment reads as a map.
                if self
                    .input
                    .children
                    .first()
                    .is_some_and(|first| matches!(first.entry, TxtAstItem::Assignment(_)))
                {
                    return self.deserialize_map(visitor);
                }
                self.deserialize_seq(visitor)
            }
            TxtAstItem::Assignment(_) => Err(DeError(
                "Unexpected assignment in deserialize_any".to_string(),
            )),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            TxtAstItem::Identifier(s) if s == "yes" => visitor.visit_bool(true),
            TxtAstItem::Identifier(s) if s == "no" => visitor.visit_bool(false),
            other => Err(DeError(format!("Invalid bool: {:?}", other))),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }
    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }
    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }
    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i64(self.integer()?)
    }
    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }
    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }
    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }
    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_f64(visitor)
    }
    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_f64(self.float()?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            TxtAstItem::Identifier(s) | TxtAstItem::StringValue(s) => visitor.visit_str(s),
            // numeric keys (province ids in building blocks) read as text
            _ => match self.input.scalar_text() {
                Some(text) => visitor.visit_string(text),
                None => Err(DeError("Not a string".to_string())),
            },
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.is_list() {
            visitor.visit_seq(NodeAccess::new(self.input.children.iter()))
        } else {
            // `add_ideas = foo` is shorthand for `add_ideas = { foo }`
            visitor.visit_seq(NodeAccess::new(std::slice::from_ref(self.input).iter()))
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if !self.is_list() {
            return Err(DeError(format!(
                "Expected a block, found {:?}",
                self.input.entry
            )));
        }
        visitor.visit_map(NodeAccess::new(self.input.children.iter()))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Absent keys never reach here; a present key is always Some.
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            TxtAstItem::Identifier(s) | TxtAstItem::StringValue(s) => {
                visitor.visit_enum(s.as_str().into_deserializer())
            }
            other => Err(DeError(format!(
                "Only unit enum variants are supported, found {:?}",
                other
            ))),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        i128 u128 char bytes byte_buf unit unit_struct tuple tuple_struct
    }
}

/// Walks the children of a block as either a sequence or a map.
struct NodeAccess<'de> {
    iter: std::slice::Iter<'de, TxtParseNode>,
    value: Option<&'de TxtParseNode>,
}

impl<'de> NodeAccess<'de> {
    fn new(iter: std::slice::Iter<'de, TxtParseNode>) -> Self {
        NodeAccess { iter, value: None }
    }
}

impl<'de> SeqAccess<'de> for NodeAccess<'de> {
    type Error = DeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => {
                let mut de = Deserializer::from_node(node);
                seed.deserialize(&mut de).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl<'de> MapAccess<'de> for NodeAccess<'de> {
    type Error = DeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        // Comparisons (`date > 1939.1.1`) and loose values are not bindings;
        // skip them instead of failing the whole block.
        for node in self.iter.by_ref() {
            if let TxtAstItem::Assignment(Operator::Eq) = node.entry {
                let key_node = node
                    .children
                    .first()
                    .ok_or(DeError("Missing key".to_string()))?;
                let val_node = node
                    .children
                    .get(1)
                    .ok_or(DeError("Missing value".to_string()))?;
                self.value = Some(val_node);

                let mut de = Deserializer::from_node(key_node);
                return seed.deserialize(&mut de).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let val_node = self.value.take().ok_or(DeError(
            "MapAccess::next_value called before next_key".to_string(),
        ))?;
        let mut de = Deserializer::from_node(val_node);
        seed.deserialize(&mut de)
    }
}

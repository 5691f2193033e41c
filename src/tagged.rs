//! Reading the discriminant field off a record.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::tag::TagValue;

/// A record that carries one or more literal-valued discriminant fields.
///
/// `tag` returns `None` when the field is absent or its value is not a literal
/// (see [`TagValue::from_json`]).
pub trait Tagged {
    fn tag(&self, field: &str) -> Option<TagValue>;
}

impl Tagged for Value {
    fn tag(&self, field: &str) -> Option<TagValue> {
        self.as_object().and_then(|map| map.tag(field))
    }
}

impl Tagged for Map<String, Value> {
    fn tag(&self, field: &str) -> Option<TagValue> {
        self.get(field).and_then(TagValue::from_json)
    }
}

impl Tagged for IndexMap<String, Value> {
    fn tag(&self, field: &str) -> Option<TagValue> {
        self.get(field).and_then(TagValue::from_json)
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn tag(&self, field: &str) -> Option<TagValue> {
        (**self).tag(field)
    }
}

impl<T: Tagged + ?Sized> Tagged for Box<T> {
    fn tag(&self, field: &str) -> Option<TagValue> {
        (**self).tag(field)
    }
}

//! Switch expression for tagged records.
//!
//! ```
//! use serde_json::json;
//! use switch_tag::{switch_tag, Matcher};
//!
//! let result = json!({"type": "ok", "value": 1});
//!
//! let switch_result = switch_tag("type");
//! let output = switch_result.on(&result).with(
//!     Matcher::new()
//!         .case("ok", |r: &serde_json::Value| format!("successful: {}", r["value"]))
//!         .case("err", |r| format!("failed: {}", r["error"])),
//! );
//!
//! assert_eq!(output.unwrap(), "successful: 1");
//! ```
use log::{debug, trace};

use crate::error::DispatchError;
use crate::matcher::{Matcher, Route};
use crate::tagged::Tagged;

/// A dispatcher bound to one discriminant field.
///
/// Holds nothing but the field name; build one per field and reuse it freely,
/// including across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTag<'f> {
    field: &'f str,
}

/// A dispatcher with the record to switch on already bound.
#[derive(Debug)]
pub struct Bound<'f, 'v, V: ?Sized> {
    switch: SwitchTag<'f>,
    value: &'v V,
}

/// Start a switch on the field `field`. No validation happens here.
pub fn switch_tag(field: &str) -> SwitchTag<'_> {
    SwitchTag { field }
}

impl<'f> SwitchTag<'f> {
    pub fn field(&self) -> &'f str {
        self.field
    }

    pub fn on<'v, V: Tagged + ?Sized>(self, value: &'v V) -> Bound<'f, 'v, V> {
        Bound { switch: self, value }
    }

    /// Uncurried form of `on(value).with(matcher)`.
    pub fn dispatch<V, R>(&self, value: &V, matcher: &Matcher<'_, V, R>) -> Result<R, DispatchError>
    where
        V: Tagged + ?Sized,
    {
        let tag = value.tag(self.field);
        match matcher.resolve(tag.as_ref()) {
            Some((route, handler)) => {
                match route {
                    Route::Case => trace!("switch on `{}`: matched {:?}", self.field, tag),
                    Route::Otherwise => trace!("switch on `{}`: {:?} falls back to otherwise", self.field, tag),
                }
                handler(value)
            }
            None => {
                debug!("switch on `{}`: no case for {:?} and no otherwise", self.field, tag);
                Err(DispatchError::Unresolved { field: self.field.to_owned(), tag })
            }
        }
    }
}

impl<V: Tagged + ?Sized> Bound<'_, '_, V> {
    /// Run the matching handler and return its result unchanged.
    pub fn with<R>(self, matcher: Matcher<'_, V, R>) -> Result<R, DispatchError> {
        self.switch.dispatch(self.value, &matcher)
    }

    /// Same as [`Bound::with`] for a matcher that is kept around.
    pub fn with_ref<R>(self, matcher: &Matcher<'_, V, R>) -> Result<R, DispatchError> {
        self.switch.dispatch(self.value, matcher)
    }
}

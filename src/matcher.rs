//! Handler mappings.
//!
//! A [`Matcher`] maps tag literals to handlers and may carry one fallback
//! handler. Two shapes are meaningful:
//!
//! - *exhaustive*: a handler for every tag the records can carry, no fallback;
//! - *partial with fallback*: handlers for some tags plus [`Matcher::otherwise`],
//!   which receives the whole record for every tag not otherwise matched.
//!
//! Which shape a given matcher must have is checked against a declared tag set
//! by [`crate::Switch::new`]; the plain dispatcher accepts either and fails at
//! call time if a record's tag cannot be resolved.
use std::fmt;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DispatchError;
use crate::path_de::from_value_with_path;
use crate::tag::{CaseKey, TagValue};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Handlers are `Send + Sync` so that a built matcher, and any [`crate::Switch`]
/// holding one, can be shared across threads.
pub type Handler<'h, V, R> = Box<dyn Fn(&V) -> Result<R, DispatchError> + Send + Sync + 'h>;

pub struct Matcher<'h, V: ?Sized, R> {
    cases: IndexMap<TagValue, Handler<'h, V, R>>,
    otherwise: Option<Handler<'h, V, R>>,
    duplicates: Vec<TagValue>,
}

/// Which handler a tag resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Case,
    Otherwise,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<'h, V: ?Sized, R> Matcher<'h, V, R> {
    pub fn new() -> Self {
        Self { cases: IndexMap::new(), otherwise: None, duplicates: Vec::new() }
    }

    /// Handle records tagged `tag`.
    pub fn case<F>(self, tag: impl Into<TagValue>, handler: F) -> Self
    where
        F: Fn(&V) -> R + Send + Sync + 'h,
    {
        self.try_case(tag, move |value: &V| Ok(handler(value)))
    }

    /// Handle records tagged `tag` with a handler that may fail.
    pub fn try_case<F>(mut self, tag: impl Into<TagValue>, handler: F) -> Self
    where
        F: Fn(&V) -> Result<R, DispatchError> + Send + Sync + 'h,
    {
        let tag = tag.into();
        if self.cases.insert(tag.clone(), Box::new(handler)).is_some() {
            self.duplicates.push(tag);
        }
        self
    }

    /// Handle every record whose tag has no case of its own.
    ///
    /// The handler sees the record as-is, not narrowed to any variant.
    pub fn otherwise<F>(self, handler: F) -> Self
    where
        F: Fn(&V) -> R + Send + Sync + 'h,
    {
        self.try_otherwise(move |value: &V| Ok(handler(value)))
    }

    pub fn try_otherwise<F>(mut self, handler: F) -> Self
    where
        F: Fn(&V) -> Result<R, DispatchError> + Send + Sync + 'h,
    {
        self.otherwise = Some(Box::new(handler));
        self
    }

    /// Declared keys in declaration order, with the fallback last.
    pub fn keys(&self) -> impl Iterator<Item = CaseKey> + '_ {
        self.cases
            .keys()
            .cloned()
            .map(CaseKey::Tag)
            .chain(self.otherwise.as_ref().map(|_| CaseKey::Otherwise))
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagValue> {
        self.cases.keys()
    }

    pub fn has_case(&self, tag: &TagValue) -> bool {
        self.cases.contains_key(tag)
    }

    pub fn has_otherwise(&self) -> bool {
        self.otherwise.is_some()
    }

    /// Tags that were given a case more than once. The last handler wins.
    pub fn duplicates(&self) -> &[TagValue] {
        &self.duplicates
    }

    /// Number of tag-specific cases (the fallback is not counted).
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// No cases and no fallback.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.otherwise.is_none()
    }

    /// Where a record with this tag would go, if anywhere.
    pub fn route(&self, tag: Option<&TagValue>) -> Option<Route> {
        self.resolve(tag).map(|(route, _)| route)
    }

    /// An exact tag match wins; otherwise the fallback, if any.
    /// A record without a literal tag can only reach the fallback.
    pub(crate) fn resolve(&self, tag: Option<&TagValue>) -> Option<(Route, &Handler<'h, V, R>)> {
        if let Some(handler) = tag.and_then(|tag| self.cases.get(tag)) {
            return Some((Route::Case, handler));
        }
        self.otherwise.as_ref().map(|handler| (Route::Otherwise, handler))
    }
}

impl<'h, R> Matcher<'h, Value, R> {
    /// Handle records tagged `tag`, viewed as the variant type `T`.
    ///
    /// The record is deserialized into `T` before the handler runs, so the
    /// handler can only reach the fields `T` declares:
    ///
    /// ```compile_fail
    /// use serde::Deserialize;
    /// use switch_tag::Matcher;
    ///
    /// #[derive(Deserialize)]
    /// struct Okay { value: i64 }
    ///
    /// let m: Matcher<serde_json::Value, String> = Matcher::new()
    ///     .case_as("ok", |ok: Okay| ok.error.clone());
    /// ```
    ///
    /// A record that does not fit `T` fails with [`DispatchError::Narrowing`].
    pub fn case_as<T, F>(self, tag: impl Into<TagValue>, handler: F) -> Self
    where
        T: DeserializeOwned,
        F: Fn(T) -> R + Send + Sync + 'h,
    {
        let tag = tag.into();
        let key = tag.clone();
        self.try_case(key, move |value: &Value| {
            let variant = from_value_with_path::<T>(value).map_err(|err| DispatchError::Narrowing {
                tag: tag.clone(),
                path: err.path,
                message: err.message,
            })?;
            Ok(handler(variant))
        })
    }
}

impl<V: ?Sized, R> Default for Matcher<'_, V, R> {
    fn default() -> Self { Self::new() }
}

impl<V: ?Sized, R> fmt::Debug for Matcher<'_, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

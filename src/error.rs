use std::fmt;
use thiserror::Error;

use crate::tag::TagValue;

/// Failure of a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Neither a handler for the record's tag nor a fallback exists.
    #[error("unresolved tag: no case for {} = {} and no otherwise case", .field, DisplayTag(.tag.as_ref()))]
    Unresolved {
        field: String,
        tag: Option<TagValue>,
    },
    /// The record could not be viewed as the variant bound to its tag.
    #[error("case {tag} does not fit its variant at {path}: {message}")]
    Narrowing {
        tag: TagValue,
        path: String,
        message: String,
    },
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// A handler mapping that does not fit its declared tag set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("tag set is empty")]
    EmptyTagSet,
    #[error("tag set lists {} more than once", TagList(.0))]
    DuplicateTags(Vec<TagValue>),
    #[error("match is not exhaustive: missing {}", TagList(.0))]
    MissingCases(Vec<TagValue>),
    #[error("cases for tags outside the tag set: {}", TagList(.0))]
    UnknownCases(Vec<TagValue>),
    #[error("cases declared more than once: {}", TagList(.0))]
    DuplicateCases(Vec<TagValue>),
}

impl DispatchError {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved { .. })
    }
}

struct DisplayTag<'a>(Option<&'a TagValue>);

impl fmt::Display for DisplayTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(tag) => tag.fmt(f),
            None => f.write_str("<no literal tag>"),
        }
    }
}

struct TagList<'a>(&'a [TagValue]);

impl fmt::Display for TagList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            tag.fmt(f)?;
        }
        Ok(())
    }
}

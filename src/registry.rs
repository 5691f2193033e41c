//! Exhaustiveness as a construction-time check.
//!
//! A [`TagSet`] enumerates the tag values a family of records may carry. A
//! [`Switch`] binds a field, a tag set and a [`Matcher`], and refuses to be
//! built unless the matcher fits the set:
//!
//! - without a fallback, every tag in the set has a case;
//! - with or without a fallback, no case names a tag outside the set;
//! - no tag is given a case twice.
//!
//! Once built, a `Switch` is reused for any number of records.
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;

use crate::dispatch::switch_tag;
use crate::error::{DispatchError, SchemaError};
use crate::matcher::Matcher;
use crate::tag::TagValue;
use crate::tagged::Tagged;

// ————————————————————————————————————————————————————————————————————————————
// TAG SET
// ————————————————————————————————————————————————————————————————————————————

/// The ordered enumeration of tag values a record family may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: IndexSet<TagValue>,
}

impl TagSet {
    pub fn new<I>(tags: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator,
        I::Item: Into<TagValue>,
    {
        let mut set = IndexSet::new();
        let mut duplicates = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !set.insert(tag.clone()) && !duplicates.contains(&tag) {
                duplicates.push(tag);
            }
        }
        if set.is_empty() {
            return Err(SchemaError::EmptyTagSet);
        }
        if !duplicates.is_empty() {
            return Err(SchemaError::DuplicateTags(duplicates));
        }
        Ok(Self { tags: set })
    }

    pub fn contains(&self, tag: &TagValue) -> bool {
        self.tags.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagValue> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Observe the tags carried by `records` on `field`.
    pub fn survey<'r, V, I>(field: &str, records: I) -> TagSurvey
    where
        V: Tagged + ?Sized + 'r,
        I: IntoIterator<Item = &'r V>,
    {
        let mut survey = TagSurvey::new(field);
        for record in records {
            survey.observe(record);
        }
        survey
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a TagValue;
    type IntoIter = indexmap::set::Iter<'a, TagValue>;
    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SURVEY
// ————————————————————————————————————————————————————————————————————————————

/// Tag histogram over a sample of records, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TagSurvey {
    pub field: String,
    pub records: u64,
    pub untagged: u64,
    pub counts: IndexMap<TagValue, u64>,
}

#[derive(Debug, Serialize)]
struct SurveyReport<'a> {
    field: &'a str,
    records: u64,
    untagged: u64,
    tags: Vec<SurveyEntry>,
}

#[derive(Debug, Serialize)]
struct SurveyEntry {
    tag: serde_json::Value,
    count: u64,
}

impl TagSurvey {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_owned(), ..Self::default() }
    }

    pub fn observe<V: Tagged + ?Sized>(&mut self, record: &V) {
        self.records += 1;
        match record.tag(&self.field) {
            Some(tag) => *self.counts.entry(tag).or_insert(0) += 1,
            None => self.untagged += 1,
        }
    }

    /// The observed tags as a tag set, or `None` if no record was tagged.
    pub fn tag_set(&self) -> Option<TagSet> {
        TagSet::new(self.counts.keys().cloned()).ok()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let report = SurveyReport {
            field: &self.field,
            records: self.records,
            untagged: self.untagged,
            tags: self
                .counts
                .iter()
                .map(|(tag, count)| SurveyEntry { tag: tag.to_json(), count: *count })
                .collect(),
        };
        serde_json::to_value(report).unwrap_or_default()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATED SWITCH
// ————————————————————————————————————————————————————————————————————————————

/// A matcher checked once against a declared tag set.
#[derive(Debug)]
pub struct Switch<'h, V: ?Sized, R> {
    field: String,
    tags: TagSet,
    matcher: Matcher<'h, V, R>,
}

impl<'h, V: Tagged + ?Sized, R> Switch<'h, V, R> {
    pub fn new(field: impl Into<String>, tags: TagSet, matcher: Matcher<'h, V, R>) -> Result<Self, SchemaError> {
        let field = field.into();
        if !matcher.duplicates().is_empty() {
            return Err(SchemaError::DuplicateCases(matcher.duplicates().to_vec()));
        }
        let unknown: Vec<TagValue> = matcher
            .tags()
            .filter(|tag| !tags.contains(tag))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SchemaError::UnknownCases(unknown));
        }
        if !matcher.has_otherwise() {
            let missing: Vec<TagValue> = tags
                .iter()
                .filter(|tag| !matcher.has_case(tag))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(SchemaError::MissingCases(missing));
            }
        }
        debug!(
            "switch on `{field}` validated: {} case(s) over {} tag(s){}",
            matcher.case_count(),
            tags.len(),
            if matcher.has_otherwise() { " with otherwise" } else { "" },
        );
        Ok(Self { field, tags, matcher })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn matcher(&self) -> &Matcher<'h, V, R> {
        &self.matcher
    }

    /// Dispatch one record.
    ///
    /// A record whose tag lies outside the declared set still reaches the
    /// fallback if there is one, and is `Unresolved` otherwise.
    pub fn dispatch(&self, value: &V) -> Result<R, DispatchError> {
        switch_tag(&self.field).dispatch(value, &self.matcher)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

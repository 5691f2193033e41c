//! Switch expressions over tagged records.
//!
//! Branch on a record's discriminant field with a mapping from tag values to
//! handlers, plus an optional `otherwise` fallback:
//!
//! ```
//! use serde_json::{json, Value};
//! use switch_tag::{switch_tag, Matcher, Switch, TagSet};
//!
//! let reqs = [
//!     json!({"type": "ok", "value": 1, "otherTag": 1}),
//!     json!({"type": "err", "error": "error", "otherTag": 2}),
//! ];
//!
//! let first: Vec<String> = reqs
//!     .iter()
//!     .map(|req| {
//!         switch_tag("type").on(req).with(
//!             Matcher::new()
//!                 .case("ok", |r: &Value| format!("{} ok", r["value"]))
//!                 .case("err", |r| format!("{} err", r["error"].as_str().unwrap_or_default())),
//!         )
//!     })
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(first, ["1 ok", "error err"]);
//!
//! // Declare the tag set up front to have the matcher checked once.
//! let by_other_tag = Switch::new(
//!     "otherTag",
//!     TagSet::new([1, 2])?,
//!     Matcher::new()
//!         .case(1, |r: &Value| format!("{} ok", r["value"]))
//!         .case(2, |r| format!("{} err", r["error"].as_str().unwrap_or_default())),
//! )?;
//! let second: Vec<String> = reqs.iter().map(|r| by_other_tag.dispatch(r)).collect::<Result<_, _>>()?;
//! assert_eq!(second, first);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod path_de;
pub mod registry;
pub mod tag;
pub mod tagged;

pub use dispatch::{switch_tag, Bound, SwitchTag};
pub use error::{DispatchError, SchemaError};
pub use matcher::{Handler, Matcher, Route};
pub use registry::{Switch, TagSet, TagSurvey};
pub use tag::{CaseKey, TagValue, OTHERWISE};
pub use tagged::Tagged;

//! Route tables: tag literals mapped to jq programs.
//!
//! A table comes from a JSON route file, from command-line flags, or both
//! (flags are applied on top of the file):
//!
//! ```json
//! { "tag": "type", "expect": ["ok", "err"],
//!   "cases": { "ok": ".value" }, "otherwise": "." }
//! ```
//!
//! Case keys are read as tag literals: a canonical integer (`1`, `-3`, `0`)
//! is an integer, `true` a boolean, `"1"` (with the quotes) the string `1`,
//! anything else a string. `01` and `+5` are strings.
//!
//! A tag gets at most one case from the file and one from the flags; a flag
//! case replaces the file's case for the same tag.
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use switch_tag::path_de::from_str_with_path;
use switch_tag::{switch_tag, DispatchError, Matcher, SchemaError, Switch, SwitchTag, TagSet, TagValue};

use crate::jq_exec::JqProgram;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    tag: String,
    #[serde(default)]
    expect: Option<Vec<Value>>,
    #[serde(default)]
    cases: IndexMap<String, String>,
    #[serde(default)]
    otherwise: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOrigin {
    File,
    Flag,
}

#[derive(Debug)]
pub struct RouteCase {
    pub tag: TagValue,
    pub program: JqProgram,
    pub origin: CaseOrigin,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    pub tag: Option<String>,
    pub expect: Option<TagSet>,
    pub cases: Vec<RouteCase>,
    pub otherwise: Option<JqProgram>,
}

/// A route table ready to dispatch records.
pub enum Router<'a> {
    Checked(Switch<'a, Value, Vec<Value>>),
    Plain(SwitchTag<'a>, Matcher<'a, Value, Vec<Value>>),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl RouteTable {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read route file {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("invalid route file {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        let file = from_str_with_path::<RouteFile>(source)?;
        let expect = match file.expect {
            None => None,
            Some(literals) => {
                let tags = literals
                    .iter()
                    .map(|v| TagValue::from_json(v).ok_or_else(|| anyhow!("`expect` entry {v} is not a tag literal")))
                    .collect::<Result<Vec<_>>>()?;
                Some(TagSet::new(tags)?)
            }
        };
        let mut table = Self { tag: Some(file.tag), expect, ..Self::default() };
        for (key, program) in &file.cases {
            table.add_case(parse_tag_literal(key), program, CaseOrigin::File)?;
        }
        if let Some(program) = file.otherwise {
            table.set_otherwise(&program)?;
        }
        Ok(table)
    }

    pub fn add_case(&mut self, tag: TagValue, program: &str, origin: CaseOrigin) -> Result<()> {
        let program = JqProgram::new(program).with_context(|| format!("case {tag}"))?;
        match self.cases.iter_mut().find(|case| case.tag == tag) {
            Some(case) if case.origin == CaseOrigin::File && origin == CaseOrigin::Flag => {
                log::debug!("case {tag} from the route file replaced by a flag");
                case.program = program;
                case.origin = origin;
            }
            Some(_) => {
                let source = match origin {
                    CaseOrigin::File => "route file",
                    CaseOrigin::Flag => "--case flags",
                };
                let error = SchemaError::DuplicateCases(vec![tag]);
                return Err(anyhow::Error::new(error).context(format!("in {source}")));
            }
            None => self.cases.push(RouteCase { tag, program, origin }),
        }
        Ok(())
    }

    pub fn set_otherwise(&mut self, program: &str) -> Result<()> {
        self.otherwise = Some(JqProgram::new(program).context("otherwise case")?);
        Ok(())
    }

    pub fn router(&self) -> Result<Router<'_>> {
        let Some(tag) = self.tag.as_deref() else {
            bail!("no tag field given (use --tag or a route file)");
        };
        let mut matcher = Matcher::new();
        for RouteCase { tag: value, program, .. } in &self.cases {
            log::trace!("case {value} → {}", program.source());
            matcher = matcher.try_case(value.clone(), move |record: &Value| {
                program.run(record).map_err(DispatchError::from)
            });
        }
        if let Some(program) = &self.otherwise {
            matcher = matcher.try_otherwise(move |record: &Value| {
                program.run(record).map_err(DispatchError::from)
            });
        }
        log::debug!("route on `{tag}`: {matcher:?}");
        Ok(match &self.expect {
            Some(tags) => Router::Checked(Switch::new(tag, tags.clone(), matcher)?),
            None => Router::Plain(switch_tag(tag), matcher),
        })
    }
}

impl Router<'_> {
    pub fn dispatch(&self, record: &Value) -> Result<Vec<Value>, DispatchError> {
        match self {
            Self::Checked(switch) => switch.dispatch(record),
            Self::Plain(switch, matcher) => switch.on(record).with_ref(matcher),
        }
    }
}

/// Read a case key or `--expect` entry as a tag literal.
pub fn parse_tag_literal(raw: &str) -> TagValue {
    if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return TagValue::from(inner);
    }
    if let Ok(int) = raw.parse::<i64>() {
        if int.to_string() == raw {
            return TagValue::Int(int);
        }
    }
    match raw {
        "true" => TagValue::Bool(true),
        "false" => TagValue::Bool(false),
        _ => TagValue::from(raw),
    }
}

/// Split a `--case KEY=PROGRAM` argument. A quoted key may contain `=`.
pub fn parse_case_arg(arg: &str) -> Result<(TagValue, &str)> {
    let (key, program) = match arg.strip_prefix('"') {
        Some(rest) => {
            let close = rest.find('"').ok_or_else(|| anyhow!("unterminated quoted key in `{arg}`"))?;
            let program = rest[close + 1..]
                .strip_prefix('=')
                .ok_or_else(|| anyhow!("expected `=` after quoted key in `{arg}`"))?;
            (&arg[..close + 2], program)
        }
        None => arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=PROGRAM, got `{arg}`"))?,
    };
    Ok((parse_tag_literal(key), program))
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_literals() {
        assert_eq!(parse_tag_literal("ok"), TagValue::from("ok"));
        assert_eq!(parse_tag_literal("2"), TagValue::Int(2));
        assert_eq!(parse_tag_literal("\"2\""), TagValue::from("2"));
        assert_eq!(parse_tag_literal("false"), TagValue::Bool(false));
    }

    #[test]
    fn only_canonical_integers_are_integer_tags() {
        assert_eq!(parse_tag_literal("-3"), TagValue::Int(-3));
        assert_eq!(parse_tag_literal("0"), TagValue::Int(0));
        assert_eq!(parse_tag_literal("01"), TagValue::from("01"));
        assert_eq!(parse_tag_literal("+5"), TagValue::from("+5"));
        assert_eq!(parse_tag_literal("-0"), TagValue::from("-0"));
    }

    #[test]
    fn route_file_keys_naming_one_tag_twice_are_rejected() {
        let err = RouteTable::parse(r#"{
            "tag": "type",
            "cases": { "ok": "\"first\"", "\"ok\"": "\"second\"" }
        }"#).unwrap_err();
        assert!(format!("{err:#}").contains("declared more than once: \"ok\""), "{err:#}");

        let table = RouteTable::parse(r#"{
            "tag": "code",
            "cases": { "1": "\"int\"", "01": "\"text\"" }
        }"#).unwrap();
        let router = table.router().unwrap();
        assert_eq!(router.dispatch(&json!({"code": 1})).unwrap(), vec![json!("int")]);
        assert_eq!(router.dispatch(&json!({"code": "01"})).unwrap(), vec![json!("text")]);
    }

    #[test]
    fn a_flag_replaces_a_file_case_once() {
        let mut table = RouteTable::parse(r#"{ "tag": "type", "cases": { "ok": "\"file\"" } }"#).unwrap();
        table.add_case("ok".into(), "\"flag\"", CaseOrigin::Flag).unwrap();
        assert_eq!(table.cases.len(), 1);
        let out = table.router().unwrap().dispatch(&json!({"type": "ok"})).unwrap();
        assert_eq!(out, vec![json!("flag")]);

        let err = table.add_case("ok".into(), "\"again\"", CaseOrigin::Flag).unwrap_err();
        assert!(format!("{err:#}").contains("--case flags"), "{err:#}");
    }

    #[test]
    fn case_args() {
        let (tag, prog) = parse_case_arg("ok=.value").unwrap();
        assert_eq!((tag, prog), (TagValue::from("ok"), ".value"));
        let (tag, prog) = parse_case_arg("\"a=b\"=.x == 1").unwrap();
        assert_eq!((tag, prog), (TagValue::from("a=b"), ".x == 1"));
        assert!(parse_case_arg("ok").is_err());
        assert!(parse_case_arg("\"ok=.value").is_err());
    }

    #[test]
    fn route_file_with_fallback() {
        let table = RouteTable::parse(r#"{
            "tag": "type",
            "expect": ["ok", "err"],
            "cases": { "ok": ".value" },
            "otherwise": "\"otherwise\""
        }"#).unwrap();
        let router = table.router().unwrap();
        assert!(matches!(router, Router::Checked(_)));
        assert_eq!(router.dispatch(&json!({"type": "ok", "value": 1})).unwrap(), vec![json!(1)]);
        assert_eq!(router.dispatch(&json!({"type": "err", "error": "e"})).unwrap(), vec![json!("otherwise")]);
    }

    #[test]
    fn route_file_integer_keys() {
        let table = RouteTable::parse(r#"{
            "tag": "otherTag",
            "cases": { "1": ".value", "2": ".error" }
        }"#).unwrap();
        let router = table.router().unwrap();
        let out = router.dispatch(&json!({"type": "err", "error": "error", "otherTag": 2})).unwrap();
        assert_eq!(out, vec![json!("error")]);
    }

    #[test]
    fn non_exhaustive_route_rejected() {
        let table = RouteTable::parse(r#"{
            "tag": "type", "expect": ["ok", "err"], "cases": { "ok": ".value" }
        }"#).unwrap();
        let err = table.router().err().unwrap();
        assert!(err.to_string().contains("missing \"err\""), "{err}");
    }

    #[test]
    fn route_file_errors_carry_path() {
        let err = RouteTable::parse(r#"{ "tag": "type", "cases": { "ok": 3 } }"#).unwrap_err();
        assert!(err.to_string().contains("cases.ok"), "{err}");
        assert!(RouteTable::parse(r#"{ "tag": "type", "expect": [1.5] }"#).is_err());
        assert!(RouteTable::parse(r#"{ "tag": "type", "extra": 1 }"#).is_err());
    }

    #[test]
    fn unresolved_record() {
        let mut table = RouteTable { tag: Some("type".into()), ..RouteTable::default() };
        table.add_case("ok".into(), ".value", CaseOrigin::Flag).unwrap();
        let err = table.router().unwrap().dispatch(&json!({"type": "err"})).unwrap_err();
        assert!(err.is_unresolved());
    }

    #[test]
    fn missing_tag_field() {
        assert!(RouteTable::default().router().is_err());
    }
}

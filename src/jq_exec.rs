//! jq programs used as case handlers and input pre-filters.
use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// A jq program that is known to compile.
#[derive(Debug, Clone)]
pub struct JqProgram {
    source: String,
}

impl JqProgram {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        run_jaq(&source, None).with_context(|| format!("invalid jq program `{source}`"))?;
        Ok(Self { source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the program on `input` and collect every output.
    ///
    /// Only the source is kept, so every call parses and compiles it again.
    pub fn run(&self, input: &Value) -> Result<Vec<Value>> {
        run_jaq(&self.source, Some(input))
    }
}

/// Compile `filter_src` and, given an input, run it.
fn run_jaq(filter_src: &str, input: Option<&Value>) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let Some(input) = input else { return Ok(Vec::new()) };

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| anyhow!(format!("{e:?}")))?;
        // Val renders as JSON text.
        let text = format!("{v}");
        let value = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("jq produced non-JSON output: {text}"))?;
        out.push(value);
    }
    Ok(out)
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    anyhow!(s)
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    anyhow!(s)
}

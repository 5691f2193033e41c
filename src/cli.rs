//! Minimal CLI: route records by tag → (jq outputs | tag survey)
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use switch_tag::TagSurvey;

use crate::jq_exec::JqProgram;
use crate::route::{parse_case_arg, parse_tag_literal, CaseOrigin, RouteTable};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// switch on a tag field of JSON/NDJSON records: route each record to a jq case, or survey the tags in use
#[derive(Parser, Debug)]
#[command(name = "switch-tag", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// more logging (-v info, -vv debug, -vvv trace); SWITCH_TAG_LOG is used when absent
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// dispatch every record to the jq program of its tag
    Route(RouteOut),
    /// count the tag values carried by the records
    Tags(TagsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// treat a top-level array (after pointer and jq) as a stream of records
    #[arg(long, default_value_t = false)]
    each: bool,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct RouteOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON route file ({"tag", "expect", "cases", "otherwise"}); flags below are applied on top
    #[arg(long)]
    routes: Option<PathBuf>,

    /// discriminant field to switch on
    #[arg(long)]
    tag: Option<String>,

    /// one case: tag literal and jq program, e.g. ok=.value, 1=.x for the integer 1, '"1"=.x' for the string "1".
    /// Only canonical integers (no '+', no leading zeros) are integer tags. Replaces the route file's case for the same tag
    #[arg(long = "case", value_name = "KEY=PROGRAM")]
    cases: Vec<String>,

    /// jq program for records whose tag has no case
    #[arg(long, value_name = "PROGRAM")]
    otherwise: Option<String>,

    /// comma-separated tag literals the records may carry; the cases are checked against them up front
    #[arg(long, value_delimiter = ',')]
    expect: Vec<String>,

    /// report unresolved records on stderr and continue
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    /// output file, one JSON text per line (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct TagsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// discriminant field to survey
    #[arg(long)]
    tag: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// Where a record came from, for diagnostics.
#[derive(Debug, Clone)]
struct Origin<'a> {
    source: &'a str,
    record: usize,
}

impl std::fmt::Display for Origin<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} record #{}", self.source, self.record)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_process(&self, mut apply: impl FnMut(Value, Origin<'_>) -> Result<()>) -> Result<()> {
        let pre_filter = self.jq_expr.as_deref().map(|src| JqProgram::new(src)).transpose()?;
        let sources = resolve_sources(&self.input).context("failed to resolve input file paths")?;
        for source in sources {
            let (source_name, text) = source.read()?;
            let mut record = 0usize;
            for document in self.documents(&text, &source_name)? {
                let document = self.select(document, &source_name)?;
                let values = match pre_filter.as_ref() {
                    None => vec![document],
                    Some(program) => program.run(&document).with_context(|| {
                        format!("failed to apply jq expression to {source_name}")
                    })?,
                };
                for value in values {
                    let records = match value {
                        Value::Array(items) if self.each => items,
                        other => vec![other],
                    };
                    for value in records {
                        record += 1;
                        apply(value, Origin { source: &source_name, record })?;
                    }
                }
            }
            log::info!("{source_name}: {record} record(s)");
        }
        Ok(())
    }

    fn documents(&self, text: &str, source_name: &str) -> Result<Vec<Value>> {
        if !self.ndjson {
            let value = serde_json::from_str::<Value>(text)
                .with_context(|| format!("failed to parse JSON source {source_name}"))?;
            return Ok(vec![value]);
        }
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(ix, line)| {
                serde_json::from_str::<Value>(line)
                    .with_context(|| format!("failed to parse NDJSON line {} of {source_name}", ix + 1))
            })
            .collect()
    }

    fn select(&self, document: Value, source_name: &str) -> Result<Value> {
        match self.json_pointer.as_deref() {
            None => Ok(document),
            Some(pointer) => document
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {source_name}")),
        }
    }
}

impl RouteOut {
    fn route_table(&self) -> Result<RouteTable> {
        let mut table = match self.routes.as_deref() {
            Some(path) => RouteTable::load(path)?,
            None => RouteTable::default(),
        };
        if let Some(tag) = &self.tag {
            table.tag = Some(tag.clone());
        }
        for arg in &self.cases {
            let (tag, program) = parse_case_arg(arg)?;
            table.add_case(tag, program, CaseOrigin::Flag)?;
        }
        if let Some(program) = &self.otherwise {
            table.set_otherwise(program)?;
        }
        if !self.expect.is_empty() {
            let tags = self.expect.iter().map(|raw| parse_tag_literal(raw.trim()));
            table.expect = Some(switch_tag::TagSet::new(tags)?);
        }
        Ok(table)
    }

    fn run(&self) -> Result<()> {
        let table = self.route_table()?;
        let router = table.router()?;

        let mut output = String::new();
        let mut routed = 0usize;
        let mut unresolved = 0usize;
        self.input_settings.load_process(|record, origin| {
            match router.dispatch(&record) {
                Ok(values) => {
                    routed += 1;
                    for value in values {
                        output.push_str(&serde_json::to_string(&value)?);
                        output.push('\n');
                    }
                    Ok(())
                }
                Err(error) if error.is_unresolved() && self.keep_going => {
                    unresolved += 1;
                    log::warn!("{origin}: {error}");
                    Ok(())
                }
                Err(error) => Err(anyhow::Error::new(error).context(format!("{origin}"))),
            }
        })?;

        if unresolved > 0 {
            log::warn!("{unresolved} record(s) unresolved, {routed} routed");
        } else {
            log::info!("{routed} record(s) routed");
        }
        write_output(self.out.as_deref(), &output)
    }
}

impl TagsOut {
    fn run(&self) -> Result<()> {
        let mut survey = TagSurvey::new(&self.tag);
        self.input_settings.load_process(|record, _| {
            survey.observe(&record);
            Ok(())
        })?;
        let report = serde_json::to_string_pretty(&survey.to_json())?;
        write_output(self.out.as_deref(), &format!("{report}\n"))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Route(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                target.run()
            }
            Command::Tags(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn read(&self) -> Result<(String, String)> {
        match self {
            Self::Stdin => {
                let text = std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?;
                Ok(("<stdin>".to_owned(), text))
            }
            Self::File(path) => {
                let name = path.to_string_lossy().to_string();
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read source file {name}"))?;
                Ok((name, text))
            }
        }
    }
}

fn resolve_sources<I>(patterns: I) -> Result<Vec<Source>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<Source>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            out.push(Source::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(Source::File(entry?));
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Source::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

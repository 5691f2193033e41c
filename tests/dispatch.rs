use serde::Deserialize;
use serde_json::{json, Value};
use switch_tag::{switch_tag, DispatchError, Matcher, Switch, TagSet, TagValue};

fn reqs() -> [Value; 2] {
    [
        json!({"type": "ok", "value": 1, "otherTag": 1}),
        json!({"type": "err", "error": "error", "otherTag": 2}),
    ]
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn strict<'h>() -> Matcher<'h, Value, String> {
    Matcher::new()
        .case("ok", |r: &Value| text(&r["value"]))
        .case("err", |r: &Value| text(&r["error"]))
}

#[test]
fn can_be_used_as_a_function() {
    let switch_result = switch_tag("type");
    let strict = |req: &Value| {
        switch_result.on(req).with(
            Matcher::new()
                .case("ok", |r: &Value| format!("{} ok", text(&r["value"])))
                .case("err", |r: &Value| format!("{} err", text(&r["error"]))),
        )
    };
    let out: Vec<String> = reqs().iter().map(|r| strict(r).unwrap()).collect();
    assert_eq!(out, ["1 ok", "error err"]);
}

#[test]
fn can_be_used_as_an_expression() {
    let [ok, err] = reqs();
    assert_eq!(switch_tag("type").on(&ok).with(strict()).unwrap(), "1");
    assert_eq!(switch_tag("type").on(&err).with(strict()).unwrap(), "error");
}

#[test]
fn err_record_with_boom() {
    let v = json!({"type": "err", "error": "boom"});
    assert_eq!(switch_tag("type").on(&v).with(strict()).unwrap(), "boom");
}

#[test]
fn can_be_switched_on_other_tags() {
    let by_other = |req: &Value| {
        switch_tag("otherTag").on(req).with(
            Matcher::new()
                .case(1, |r: &Value| text(&r["value"]))
                .case(2, |r: &Value| text(&r["error"])),
        )
    };
    let [ok, err] = reqs();
    assert_eq!(by_other(&ok).unwrap(), "1");
    assert_eq!(by_other(&err).unwrap(), "error");

    // Same routing as the primary tag.
    for req in reqs() {
        assert_eq!(by_other(&req).unwrap(), switch_tag("type").on(&req).with(strict()).unwrap());
    }
}

#[test]
fn otherwise_can_be_the_only_case() {
    for req in reqs() {
        let out = switch_tag("type")
            .on(&req)
            .with(Matcher::new().otherwise(|_: &Value| "otherwise"))
            .unwrap();
        assert_eq!(out, "otherwise");
    }
}

#[test]
fn otherwise_can_be_used_with_other_cases() {
    let loose = Matcher::new()
        .case("ok", |r: &Value| text(&r["value"]))
        .otherwise(|_| "otherwise".to_owned());
    let [ok, err] = reqs();
    assert_eq!(switch_tag("type").on(&ok).with_ref(&loose).unwrap(), "1");
    assert_eq!(switch_tag("type").on(&err).with_ref(&loose).unwrap(), "otherwise");
}

#[test]
fn otherwise_sees_the_whole_record() {
    let [_, err] = reqs();
    let out = switch_tag("type")
        .on(&err)
        .with(Matcher::new().case("ok", |_: &Value| Value::Null).otherwise(|all| all.clone()))
        .unwrap();
    assert_eq!(out, err);
}

#[test]
fn empty_match_is_unresolved() {
    for req in reqs() {
        let err = switch_tag("type").on(&req).with(Matcher::<Value, String>::new()).unwrap_err();
        match err {
            DispatchError::Unresolved { field, tag } => {
                assert_eq!(field, "type");
                assert_eq!(tag, req["type"].as_str().map(TagValue::from));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn non_exhaustive_match_fails_only_for_missing_case() {
    let m = Matcher::new().case("ok", |r: &Value| format!("{} ok", text(&r["value"])));
    let [ok, err] = reqs();
    assert_eq!(switch_tag("type").on(&ok).with_ref(&m).unwrap(), "1 ok");
    let error = switch_tag("type").on(&err).with_ref(&m).unwrap_err();
    assert!(error.is_unresolved());
    assert!(error.to_string().contains("\"err\""), "{error}");
}

#[test]
fn unknown_and_missing_cases_caught_at_construction() {
    let tags = TagSet::new(["ok", "err"]).unwrap();
    let with_foo = strict().case("foo", |r: &Value| format!("{} foo", text(&r["value"])));
    assert!(Switch::new("type", tags.clone(), with_foo).is_err());

    let non_exhaustive = Matcher::new().case("ok", |_: &Value| ());
    assert!(Switch::new("type", tags.clone(), non_exhaustive).is_err());

    let empty: Matcher<Value, ()> = Matcher::new();
    assert!(Switch::new("type", tags, empty).is_err());
}

#[derive(Debug, Deserialize)]
struct Okay {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct Failed {
    error: String,
}

#[test]
fn narrowed_handlers_see_only_their_variant() {
    let switch = Switch::new(
        "type",
        TagSet::new(["ok", "err"]).unwrap(),
        Matcher::new()
            .case_as("ok", |ok: Okay| format!("{} ok", ok.value))
            .case_as("err", |err: Failed| format!("{} err", err.error)),
    )
    .unwrap();
    let out: Vec<String> = reqs().iter().map(|r| switch.dispatch(r).unwrap()).collect();
    assert_eq!(out, ["1 ok", "error err"]);
}

#[test]
fn specific_case_wins_over_fallback_for_every_tag() {
    let records = [
        json!({"kind": "a"}),
        json!({"kind": "b"}),
        json!({"kind": 3}),
        json!({"kind": true}),
        json!({"kind": null}),
        json!({}),
    ];
    let m = Matcher::new()
        .case("a", |_: &Value| "a")
        .case(3, |_: &Value| "three")
        .case(true, |_: &Value| "yes")
        .otherwise(|_| "fallback");
    let out: Vec<_> = records
        .iter()
        .map(|r| switch_tag("kind").on(r).with_ref(&m).unwrap())
        .collect();
    assert_eq!(out, ["a", "fallback", "three", "yes", "fallback", "fallback"]);
}

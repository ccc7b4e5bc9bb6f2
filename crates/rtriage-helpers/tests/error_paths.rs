//! Runtime failure behavior: traces, short-circuiting, and the guarantee
//! that malformed events fail cleanly instead of panicking.

use serde_json::json;

use rtriage_event::Document;
use rtriage_helpers::{Definition, build_helper};

#[test]
fn missing_reference_trace_names_term_and_path() {
    let term = build_helper(&Definition::new("out", "s_up", &["$user.name"])).unwrap();
    let mut event = Document::from(json!({}));
    let result = term.apply(&mut event);
    assert!(!result.is_success());
    assert_eq!(
        result.trace(),
        "[s_up(/out, $/user/name)] -> Failure: [/user/name] not found"
    );
}

#[test]
fn success_trace_format() {
    let term = build_helper(&Definition::new("out", "s_lo", &["LIT"])).unwrap();
    let mut event = Document::from(json!({}));
    assert_eq!(term.apply(&mut event).trace(), "[s_lo(/out, LIT)] -> Success");
}

#[test]
fn type_mismatch_is_a_failure_not_a_panic() {
    // Every reference-reading helper applied to a field of the wrong type.
    let cases = [
        Definition::new("out", "s_up", &["$n"]),
        Definition::new("out", "s_from_array", &["$n", ","]),
        Definition::new("out", "s_from_hexa", &["$n"]),
        Definition::new("out", "s_hex_to_num", &["$n"]),
        Definition::new("out", "s_to_array", &["$n", ","]),
        Definition::new("out", "r_ext", &["$n", "(x)"]),
        Definition::new("out", "s_ip_version", &["$n"]),
        Definition::new("out", "h_sha1", &["$n"]),
    ];
    for def in cases {
        let term = build_helper(&def).unwrap();
        let mut event = Document::from(json!({"n": 42}));
        let result = term.apply(&mut event);
        assert!(!result.is_success(), "helper '{}' should fail", def.name);
    }
}

#[test]
fn value_domain_failures() {
    // Bad hex digit.
    let term = build_helper(&Definition::new("out", "s_from_hexa", &["$h"])).unwrap();
    let mut event = Document::from(json!({"h": "zz"}));
    assert!(!term.apply(&mut event).is_success());

    // Invalid IP.
    let term = build_helper(&Definition::new("out", "s_ip_version", &["$ip"])).unwrap();
    let mut event = Document::from(json!({"ip": "999.1.2.3"}));
    let result = term.apply(&mut event);
    assert!(result.trace().contains("not a valid IP address"));

    // Runtime divide-by-zero through a reference.
    let term = build_helper(&Definition::new("n", "i_calc", &["div", "$z"])).unwrap();
    let mut event = Document::from(json!({"n": 10, "z": 0}));
    let result = term.apply(&mut event);
    assert!(result.trace().contains("division by zero"));
    assert_eq!(event.get_int("/n"), Some(10));
}

#[test]
fn merge_mismatch_failures() {
    let term = build_helper(&Definition::new("dst", "merge", &["$src"])).unwrap();

    // Missing source.
    let mut event = Document::from(json!({"dst": {}}));
    assert!(term.apply(&mut event).trace().contains("not found"));

    // Missing target.
    let mut event = Document::from(json!({"src": {}}));
    assert!(term.apply(&mut event).trace().contains("not found"));

    // Composite kind mismatch.
    let mut event = Document::from(json!({"src": [1], "dst": {"a": 1}}));
    assert!(!term.apply(&mut event).is_success());
}

#[test]
fn regex_no_match_failure() {
    let term = build_helper(&Definition::new("out", "r_ext", &["$msg", r"id=(\d+)"])).unwrap();
    let mut event = Document::from(json!({"msg": "no identifiers"}));
    let result = term.apply(&mut event);
    assert!(!result.is_success());
    assert!(result.trace().contains("did not capture"));
    assert!(!event.exists("/out"));
}

#[test]
fn delete_absent_field_fails() {
    let term = build_helper(&Definition::new("gone", "ef_delete", &[])).unwrap();
    let mut event = Document::from(json!({}));
    let result = term.apply(&mut event);
    assert!(result.trace().contains("does not exist"));
}

#[test]
fn concat_names_the_offending_parameter() {
    let term =
        build_helper(&Definition::new("out", "s_concat", &["$present", "$absent"])).unwrap();
    let mut event = Document::from(json!({"present": "x"}));
    let result = term.apply(&mut event);
    assert!(result.trace().contains("$/absent"));
    assert!(!event.exists("/out"));
}

#![cfg(not(feature = "noop"))]

mod common;

use std::borrow::Cow;
use std::ffi::{CStr, CString};

use scope_timer::{IntoLabel, Label, ScopeTimer, DEFAULT_LABEL};

const LOC: &str = "label_tests";

#[test]
fn test_label_ownership_by_input() {
    let literal = "literal".into_label();
    assert_eq!(literal, Label::Borrowed("literal"));

    let built = format!("built {}", 1).into_label();
    assert_eq!(built.as_str(), "built 1");
    assert!(built.owns_storage());

    let source = String::from("copied");
    let copied = (&source).into_label();
    assert!(copied.owns_storage());

    let c = CString::new("from c").unwrap();
    let from_c = c.as_c_str().into_label();
    assert_eq!(from_c.as_str(), "from c");
    assert!(from_c.owns_storage());

    let cow_borrowed: Cow<str> = Cow::Borrowed("cow");
    assert!(!cow_borrowed.into_label().owns_storage());
    let cow_owned: Cow<str> = Cow::Owned("cow".to_string());
    assert!(cow_owned.into_label().owns_storage());
}

#[test]
fn test_missing_and_empty_labels() {
    let cases: Vec<Label> = vec![
        ().into_label(),
        None::<&str>.into_label(),
        None::<&CStr>.into_label(),
        "".into_label(),
        String::new().into_label(),
        c"".into_label(),
    ];
    for label in cases {
        assert_eq!(label.as_str(), DEFAULT_LABEL);
        assert!(!label.owns_storage());
    }
}

#[test]
fn test_timer_reports_ownership() {
    let _captured = common::capture();

    let literal = ScopeTimer::with_label(LOC, "literal tag");
    assert_eq!(literal.label(), Some("literal tag"));
    assert!(!literal.owns_label());

    let unnamed = ScopeTimer::new(LOC);
    assert_eq!(unnamed.label(), Some(DEFAULT_LABEL));
    assert!(!unnamed.owns_label());
    assert_eq!(unnamed.location(), Some(LOC));

    let dynamic = ScopeTimer::with_label(LOC, format!("request #{}", 42));
    assert_eq!(dynamic.label(), Some("request #42"));
    assert!(dynamic.owns_label());
}

#[test]
fn test_copied_label_survives_source_change() {
    let captured = common::capture();
    let mut name = String::from("before");
    {
        let timer = ScopeTimer::with_label(LOC, &name);
        name.push_str(" and after");
        assert_eq!(timer.label(), Some("before"));
    }
    let c_label = CString::new("c label").unwrap();
    {
        let timer = ScopeTimer::with_label(LOC, c_label.as_c_str());
        drop(c_label);
        assert_eq!(timer.label(), Some("c label"));
    }

    let labels: Vec<String> = captured.records().into_iter().map(|r| r.label).collect();
    assert_eq!(labels, ["before", "c label"]);
}

#[test]
fn test_borrowed_view_outliving_timer() {
    let captured = common::capture();
    let request = String::from("GET /index.html HTTP/1.1");
    {
        // a view into a string that outlives the timer stays borrowed
        let view = &request[..15];
        let timer = ScopeTimer::with_label(LOC, view);
        assert!(!timer.owns_label());
    }
    assert_eq!(captured.records()[0].label, "GET /index.html");
}

use docroute::cli::{check_file, DocKind};
use serde_json::json;
use std::fs;

#[test]
fn test_check_file_with_shared_doc() {
    let dir = tempfile::tempdir().unwrap();
    let api = dir.path().join("api.txt");
    let route = dir.path().join("route.txt");
    fs::write(&api, "Test API\n\n@message:\n    message?str: Message\n").unwrap();
    fs::write(
        &route,
        "Test action\n\n$input:\n    name?str: Name\n$output: @message\n",
    )
    .unwrap();

    let shared = check_file(&api, DocKind::Shared, None).unwrap();
    assert_eq!(shared["desc"], json!("Test API"));
    assert_eq!(shared["shared"]["message"], json!({"message?str": "Message"}));

    let checked = check_file(&route, DocKind::Directive, Some(&api)).unwrap();
    assert_eq!(checked["desc"], json!("Test action"));
    assert_eq!(checked["directives"]["input"], json!({"name?str": "Name"}));
}

#[test]
fn test_check_file_reports_bad_docs() {
    let dir = tempfile::tempdir().unwrap();
    let route = dir.path().join("route.txt");
    fs::write(&route, "Test\n\n$unknown:\n    name?str: Name\n").unwrap();
    let err = check_file(&route, DocKind::Directive, None).unwrap_err();
    assert!(format!("{err:#}").contains("unknown directive"));

    let missing = dir.path().join("missing.txt");
    let err = check_file(&missing, DocKind::Directive, None).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

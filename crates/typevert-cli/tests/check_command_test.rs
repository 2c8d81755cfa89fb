use std::path::PathBuf;
use std::process::Command;

fn cargo_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_typevert"))
}

fn rules_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/rules")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn check_lists_every_loaded_converter() {
    let line = rules_path("line_dto_to_line.yaml");
    let order = rules_path("order_dto_to_order.yaml");

    let output = Command::new(cargo_bin())
        .args(["check", "-r", line.as_str(), order.as_str()])
        .output()
        .expect("run typevert check");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "line_dto_to_line: LineDto -> Line (2 rules)",
            "order_dto_to_order: OrderDto -> Order (4 rules)",
        ]
    );
}

#[test]
fn check_rejects_out_of_order_documents() {
    let line = rules_path("line_dto_to_line.yaml");
    let order = rules_path("order_dto_to_order.yaml");

    let output = Command::new(cargo_bin())
        .args(["check", "-r", order.as_str(), line.as_str()])
        .output()
        .expect("run typevert check");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown converter 'line_dto_to_line'"),
        "stderr: {stderr}"
    );
}

#[test]
fn check_reports_unknown_rule_keys() {
    let path = std::env::temp_dir().join(format!("typevert-check-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "name: typo\nsource_type: A\ntarget_type: B\nrules:\n  - source: a\n    target: b\n    isCollection: true\n",
    )
    .expect("write rules");

    let output = Command::new(cargo_bin())
        .args(["check", "-r", path.to_string_lossy().as_ref()])
        .output()
        .expect("run typevert check");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("isCollection"), "stderr: {stderr}");

    let _ = std::fs::remove_file(&path);
}

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn cargo_bin() -> PathBuf {
    if let Ok(path) = env::var("CARGO_BIN_EXE_typevert") {
        return PathBuf::from(path);
    }

    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| repo_root().join("target"));
    let executable_name = format!("typevert{}", std::env::consts::EXE_SUFFIX);
    let fallback = target_dir.join("debug").join(executable_name);

    if fallback.exists() {
        return fallback;
    }

    panic!(
        "CARGO_BIN_EXE_typevert is not set and fallback binary was not found at {}",
        fallback.display()
    );
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn testdata_path(path: &str) -> String {
    repo_root()
        .join("testdata")
        .join(path)
        .to_string_lossy()
        .into_owned()
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time after epoch")
        .as_nanos();
    let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let filename = format!(
        "typevert-cli-{name}-{}-{nanos}-{counter}.{extension}",
        std::process::id()
    );
    env::temp_dir().join(filename)
}

fn order_rules() -> [String; 2] {
    [
        testdata_path("rules/line_dto_to_line.yaml"),
        testdata_path("rules/order_dto_to_order.yaml"),
    ]
}

#[test]
fn map_writes_json_to_stdout_when_output_is_omitted() {
    let [line, order] = order_rules();
    let output = Command::new(cargo_bin())
        .args([
            "map",
            "-r",
            line.as_str(),
            "-r",
            order.as_str(),
            "-i",
            testdata_path("json/order.json").as_str(),
        ])
        .output()
        .expect("run typevert map");

    assert!(
        output.status.success(),
        "expected map to succeed; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let payload = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    let parsed: serde_json::Value =
        serde_json::from_str(&payload).expect("stdout should contain valid JSON");

    let keys: Vec<&str> = parsed
        .as_object()
        .expect("mapped order should be a JSON object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["reference", "items", "note"], "fields follow rule order");

    let first_item: Vec<&str> = parsed["items"][0]
        .as_object()
        .expect("mapped line should be a JSON object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(first_item, vec!["sku", "quantity"]);

    assert_eq!(
        parsed,
        serde_json::json!({
            "reference": "ORD-17",
            "items": [
                { "sku": "ABC", "quantity": 2 },
                { "sku": "XYZ", "quantity": 5 }
            ],
            "note": "n/a"
        })
    );
}

#[test]
fn map_converts_array_roots_element_by_element() {
    let [line, order] = order_rules();
    let output_path = unique_temp_path("orders", "json");

    let output = Command::new(cargo_bin())
        .args([
            "map",
            "--rules",
            line.as_str(),
            order.as_str(),
            "--input",
            testdata_path("json/orders.json").as_str(),
            "--output",
            output_path.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run typevert map");

    assert!(
        output.status.success(),
        "expected map to succeed; stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let written = fs::read_to_string(&output_path).expect("output file should be readable");
    let parsed: serde_json::Value =
        serde_json::from_str(&written).expect("output file should contain valid JSON");

    assert_eq!(
        parsed,
        serde_json::json!([
            {
                "reference": "ORD-1",
                "items": [{ "sku": "A1", "quantity": 1 }],
                "note": "rush",
                "discount": 0.1
            },
            null,
            {
                "reference": "ORD-2",
                "items": [],
                "note": "n/a"
            }
        ])
    );

    let _ = fs::remove_file(&output_path);
}

#[test]
fn map_selects_named_converter() {
    let [line, _] = order_rules();
    let input = unique_temp_path("line", "json");
    fs::write(&input, r#"{"sku": "q-1", "qty": 3.9}"#).expect("write input");

    let output = Command::new(cargo_bin())
        .args([
            "map",
            "-r",
            line.as_str(),
            "-c",
            "line_dto_to_line",
            "-i",
            input.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run typevert map");

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should contain valid JSON");
    assert_eq!(parsed, serde_json::json!({ "sku": "Q-1", "quantity": 3 }));

    let _ = fs::remove_file(&input);
}

#[test]
fn map_fails_on_unknown_converter_name() {
    let [line, _] = order_rules();
    let output = Command::new(cargo_bin())
        .args([
            "map",
            "-r",
            line.as_str(),
            "-c",
            "nope",
            "-i",
            testdata_path("json/order.json").as_str(),
        ])
        .output()
        .expect("run typevert map");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown converter 'nope'"), "stderr: {stderr}");
}

#[test]
fn map_reports_failing_rule() {
    let [line, order] = order_rules();
    let output = Command::new(cargo_bin())
        .args([
            "map",
            "-r",
            line.as_str(),
            "-r",
            order.as_str(),
            "-i",
            testdata_path("json/bad_quantity.json").as_str(),
        ])
        .output()
        .expect("run typevert map");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no partial output expected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lines -> items"), "stderr: {stderr}");
    assert!(stderr.contains("Cannot parse 'two' as integer"), "stderr: {stderr}");
}

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

fn shell_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("excalidraw-shell").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("EXCALIDRAW_DEBUG");
    cmd
}

fn input(lines: &[Value]) -> String {
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

fn run(cmd: &mut Command, lines: &[Value]) -> Vec<Value> {
    let assert = cmd.write_stdin(input(lines)).assert().success();
    String::from_utf8_lossy(&assert.get_output().stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn scripts(output: &[Value]) -> Vec<String> {
    output
        .iter()
        .filter(|line| line["type"] == "run_script")
        .map(|line| line["script"].as_str().unwrap().to_string())
        .collect()
}

fn initialized() -> Value {
    json!({ "type": "message", "channel": "initializedExcalidraw" })
}

fn save_data(nonce: u64, data: Value) -> Value {
    json!({
        "type": "message",
        "channel": "getSaveData",
        "body": { "data": data, "nonce": nonce },
    })
}

#[test]
fn file_argument_is_loaded_once_the_editor_initializes() {
    let temp = TempDir::new().unwrap();
    let drawing = temp.path().join("plan.excalidraw");
    std::fs::write(&drawing, r#"{"type":"excalidraw","elements":[]}"#).unwrap();

    let output = run(shell_cmd(&temp).arg(&drawing), &[initialized()]);

    assert_eq!(
        scripts(&output),
        vec![r#"loadSaveData({"format":"json","data":{"type":"excalidraw","elements":[]}});"#]
    );
}

#[test]
fn missing_file_argument_is_reported_but_not_fatal() {
    let temp = TempDir::new().unwrap();
    let drawing = temp.path().join("missing.excalidraw.svg");

    let mut cmd = shell_cmd(&temp);
    cmd.arg(&drawing);
    let assert = cmd.write_stdin(input(&[initialized()])).assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("Failed to open"));
    assert!(!String::from_utf8_lossy(&assert.get_output().stdout).contains("loadSaveData"));
}

#[test]
fn save_with_close_on_save_writes_and_closes() {
    let temp = TempDir::new().unwrap();
    let drawing = temp.path().join("notes.excalidraw.svg");
    std::fs::write(&drawing, "<svg>old</svg>").unwrap();

    let output = run(
        shell_cmd(&temp).arg("--close-on-save").arg(&drawing),
        &[
            initialized(),
            json!({ "type": "action", "name": "save" }),
            save_data(0, json!({ "blob": "<svg>new</svg>" })),
        ],
    );

    let scripts = scripts(&output);
    assert_eq!(scripts[0], r#"loadSaveData({"format":"svg","blob":"<svg>old</svg>"});"#);
    assert_eq!(scripts[1], r#"getSaveData({"format":"svg","export":false}, 0);"#);
    assert_eq!(std::fs::read_to_string(&drawing).unwrap(), "<svg>new</svg>");
    assert_eq!(output.last().unwrap()["type"], "close");
}

#[test]
fn save_without_a_file_goes_through_the_chooser() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("fresh.excalidraw");

    let output = run(
        &mut shell_cmd(&temp),
        &[
            initialized(),
            json!({ "type": "key", "key": "s", "ctrl": true }),
            json!({ "type": "dialog", "path": target }),
            save_data(0, json!({ "elements": [{ "id": "a" }] })),
        ],
    );

    let chooser = output
        .iter()
        .find(|line| line["type"] == "present_chooser")
        .unwrap();
    assert_eq!(chooser["accept_label"], "Save As");
    assert_eq!(chooser["current_name"], "Untitled.excalidraw.svg");
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        r#"{"elements":[{"id":"a"}]}"#
    );
}

#[test]
fn export_writes_decoded_png() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("picture.png");

    let output = run(
        &mut shell_cmd(&temp),
        &[
            initialized(),
            json!({ "type": "action", "name": "export" }),
            json!({ "type": "dialog", "uri": url_for(&target) }),
            save_data(0, json!({ "base64": "aGVsbG8=" })),
        ],
    );

    assert_eq!(
        scripts(&output),
        vec![r#"getSaveData({"format":"png","export":true}, 0);"#]
    );
    assert_eq!(std::fs::read(&target).unwrap(), b"hello");
}

#[test]
fn cancelled_dialog_leaves_disk_untouched() {
    let temp = TempDir::new().unwrap();

    let output = run(
        &mut shell_cmd(&temp),
        &[
            initialized(),
            json!({ "type": "action", "name": "save_as" }),
            json!({ "type": "dialog" }),
        ],
    );

    assert!(scripts(&output).is_empty());
    let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
    assert!(entries.is_empty());
}

fn url_for(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn cardshade(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cardshade"))
        .env("CARDSHADE_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run cardshade")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "cardshade failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn select_prints_variant_for_identity() {
    let root = TempDir::new().unwrap();
    let text = stdout(&cardshade(root.path(), &["select", "3", "1"]));
    assert!(text.starts_with("psychedelicWaves (index 3 of 17)"), "{text}");
    assert!(text.contains("speed_multiplier"));
}

#[test]
fn select_json_is_machine_readable() {
    let root = TempDir::new().unwrap();
    let text = stdout(&cardshade(root.path(), &["select", "0", "0", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["variant"], "cosmicNebula");
    assert_eq!(value["index"], 2);
    assert_eq!(value["identity"]["overall"], 0);

    let speed = value["params"]["speed_multiplier"].as_f64().unwrap();
    assert!((0.5..=2.5).contains(&speed));
}

#[test]
fn select_accepts_negative_identities() {
    let root = TempDir::new().unwrap();
    let text = stdout(&cardshade(root.path(), &["select", "-4", "1", "--json"]));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["index"], 9);
}

#[test]
fn variants_lists_builtins_then_packs() {
    let root = TempDir::new().unwrap();
    let text = stdout(&cardshade(root.path(), &["variants"]));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 17);
    assert!(lines[3].ends_with("psychedelicWaves"));

    let pack = root.path().join("variants/ember");
    fs::create_dir_all(&pack).unwrap();
    fs::write(
        pack.join("variant.toml"),
        "name = \"ember\"\nfragment = \"ember.frag\"\n",
    )
    .unwrap();
    fs::write(
        pack.join("ember.frag"),
        "void mainCard(out vec4 fragColor, in vec2 uv) { fragColor = vec4(uv, 0.0, 1.0); }\n",
    )
    .unwrap();

    let text = stdout(&cardshade(root.path(), &["variants"]));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 18);
    assert!(lines[17].ends_with("ember"));
}

#[test]
fn config_where_reports_override_dir() {
    let root = TempDir::new().unwrap();
    let text = stdout(&cardshade(root.path(), &["config", "where"]));
    let expected = root.path().join("cardshade.toml");
    assert!(text.contains(&expected.display().to_string()), "{text}");
    assert!(text.contains("(missing)"));
}

#[test]
fn invalid_max_active_fails_before_touching_the_gpu() {
    let root = TempDir::new().unwrap();
    let output = cardshade(root.path(), &["run", "--max-active", "0", "--frames", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_active"), "{stderr}");
}

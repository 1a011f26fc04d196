use std::path::PathBuf;

use blockalign_doctor::DoctorError;
use blockalign_doctor::cli::{Commands, execute};
use blockalign_doctor::commands::{ApplyArgs, CheckArgs, CommonArgs, ListBlocksArgs};

const MANIFEST: &str = r#"
[editor]
wide_alignment = true

[[blocks]]
name = "demo/banner"
title = "Banner"
align = ["center", "wide", "full"]
default_align = "wide"
tag = "section"
"#;

fn run(command: Commands) -> (Result<(), DoctorError>, String) {
    let mut out = Vec::new();
    let result = execute(command, &mut out);
    (result, String::from_utf8(out).expect("utf-8 output"))
}

fn common(manifest: Option<PathBuf>, json: bool) -> CommonArgs {
    CommonArgs { manifest, json }
}

#[test]
fn manifest_file_drives_list_and_apply() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("plugin.toml");
    std::fs::write(&manifest, MANIFEST).unwrap();

    let (result, text) = run(Commands::ListBlocks(ListBlocksArgs {
        common: common(Some(manifest.clone()), true),
    }));
    result.unwrap();
    let listing: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(listing["wide_alignment"], true);
    assert_eq!(
        listing["blocks"][0]["options"],
        serde_json::json!(["center", "wide", "full"])
    );
    assert_eq!(listing["blocks"][0]["default"], "wide");

    let (result, text) = run(Commands::Apply(ApplyArgs {
        block: "Banner".to_string(),
        clicks: vec!["full".to_string()],
        common: common(Some(manifest), false),
    }));
    result.unwrap();
    assert_eq!(
        text,
        "<!-- wp:demo/banner {\"align\":\"full\"} -->\n\
         <section class=\"wp-block-demo-banner alignfull\">Banner</section>\n\
         <!-- /wp:demo/banner -->\n"
    );
}

#[test]
fn check_reports_valid_documents() {
    let dir = tempfile::tempdir().unwrap();
    let markup = dir.path().join("post.html");
    std::fs::write(
        &markup,
        "<!-- wp:test/test-default-align {\"align\":null} -->\n\
         <div class=\"wp-block-test-test-default-align\">Test Default Align</div>\n\
         <!-- /wp:test/test-default-align -->\n\n\
         <!-- wp:test/test-align-true {\"align\":\"left\"} -->\n\
         <div class=\"wp-block-test-test-align-true alignleft\">Test Align True</div>\n\
         <!-- /wp:test/test-align-true -->\n",
    )
    .unwrap();

    let (result, text) = run(Commands::Check(CheckArgs {
        path: markup,
        single: false,
        common: common(None, false),
    }));
    result.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ok\t"));
    assert!(lines[0].ends_with("test/test-default-align\tcleared"));
    assert!(lines[1].ends_with("test/test-align-true\texplicit(left)"));
}

#[test]
fn check_fails_with_exit_code_two() {
    let dir = tempfile::tempdir().unwrap();
    let markup = dir.path().join("post.html");
    std::fs::write(
        &markup,
        "<!-- wp:test/test-align-true {\"align\":\"left\"} -->\n\
         <div class=\"wp-block-test-test-align-true\">Test Align True</div>\n\
         <!-- /wp:test/test-align-true -->",
    )
    .unwrap();

    let (result, text) = run(Commands::Check(CheckArgs {
        path: markup.clone(),
        single: false,
        common: common(None, true),
    }));
    let error = result.unwrap_err();
    assert_eq!(error.exit_code(), 2);
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(report["invalid"], 1);
    assert_eq!(report["blocks"][0]["valid"], false);

    let (result, _) = run(Commands::Check(CheckArgs {
        path: markup,
        single: true,
        common: common(None, false),
    }));
    assert!(matches!(result, Err(DoctorError::Inconsistent(_))));
}

#[test]
fn missing_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (result, _) = run(Commands::ListBlocks(ListBlocksArgs {
        common: common(Some(dir.path().join("absent.toml")), false),
    }));
    let error = result.unwrap_err();
    assert!(matches!(error, DoctorError::Manifest(_)));
    assert_eq!(error.exit_code(), 1);
}

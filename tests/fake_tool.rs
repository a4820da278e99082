//! End-to-end run against a stand-in planning tool.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;

use plancheck::assertion::presets;
use plancheck::config::ToolConfig;
use plancheck::engine::PlanAssertionEngine;

const PLAN_JSON: &str = r#"{
    "format_version": "1.2",
    "terraform_version": "1.9.5",
    "resource_changes": [
        { "address": "aws_s3_bucket.this", "type": "aws_s3_bucket",
          "change": { "actions": ["create"], "after": { "bucket": "b" }, "after_unknown": { "arn": true } } },
        { "address": "aws_iam_role.ci", "type": "aws_iam_role",
          "change": { "actions": ["create"], "after": { "name": "ci" }, "after_unknown": { "assume_role_policy": true } } },
        { "address": "aws_s3_bucket_versioning.this", "type": "aws_s3_bucket_versioning",
          "change": { "actions": ["create"], "after": { "versioning_configuration": [{ "status": "Enabled" }] } } },
        { "address": "aws_s3_bucket_server_side_encryption_configuration.this",
          "type": "aws_s3_bucket_server_side_encryption_configuration",
          "change": { "actions": ["create"], "after": { "rule": [{}] },
                      "after_unknown": { "rule": [{ "apply_server_side_encryption_by_default": true }] } } },
        { "address": "aws_s3_bucket_public_access_block.this", "type": "aws_s3_bucket_public_access_block",
          "change": { "actions": ["create"], "after": {
              "block_public_acls": true, "block_public_policy": true,
              "ignore_public_acls": true, "restrict_public_buckets": true } } }
    ]
}"#;

const SCRIPT: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TOOL_LOG"
case "$1" in
  init) exit 0 ;;
  plan) for arg in "$@"; do
          case "$arg" in -out=*) touch "${arg#-out=}" ;; esac
        done ;;
  show) cat "$FAKE_TOOL_PLAN" ;;
  *) echo "unexpected command $1" >&2; exit 2 ;;
esac
"#;

#[tokio::test]
async fn test_secure_bucket_against_stand_in_tool() {
    let tools = tempfile::tempdir().unwrap();
    let module = tempfile::tempdir().unwrap();
    std::fs::write(module.path().join("main.tf"), "# module\n").unwrap();

    let plan_json = tools.path().join("plan.json");
    std::fs::write(&plan_json, PLAN_JSON).unwrap();

    let script = tools.path().join("fake-terraform");
    std::fs::write(&script, SCRIPT).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let log = tools.path().join("calls.log");
    let mut env = BTreeMap::new();
    env.insert(String::from("FAKE_TOOL_PLAN"), plan_json.display().to_string());
    env.insert(String::from("FAKE_TOOL_LOG"), log.display().to_string());

    let tool = ToolConfig {
        binary: script.display().to_string(),
        env,
        ..ToolConfig::default()
    };
    let engine = PlanAssertionEngine::new(tool);

    let report = engine
        .check(module.path(), &presets::secure_bucket())
        .await
        .unwrap();

    assert!(report.is_success(), "failures: {:?}", report.failures());
    assert_eq!(report.resource_count, 5);

    let calls = std::fs::read_to_string(&log).unwrap();
    let steps: Vec<&str> = calls.lines().collect();
    assert_eq!(
        steps,
        [
            "init -backend=false",
            "plan -out=plan.tfplan -input=false -lock=false -refresh=false",
            "show -json plan.tfplan",
        ]
    );
    assert!(!module.path().join("plan.tfplan").exists());
}

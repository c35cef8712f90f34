use super::run_all;
use crate::model::{DocState, RepoModel, SourceDoc};
use crate::test_support::{compliant_model, config_with_check, config_with_check_allow};
use policyguard_test_util::scaffold;
use policyguard_types::{Finding, Severity, ids};

fn run_one(model: &RepoModel, check_id: &str) -> Vec<Finding> {
    let mut out = Vec::new();
    run_all(model, &config_with_check(check_id, Severity::Error), &mut out);
    out
}

fn codes(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.code.as_str()).collect()
}

fn subjects(findings: &[Finding]) -> Vec<&str> {
    findings
        .iter()
        .filter_map(|f| f.data["subject"].as_str())
        .collect()
}

fn settings(text: &str) -> SourceDoc {
    SourceDoc::loaded(scaffold::SETTINGS_PATH, text)
}

#[test]
fn only_enabled_check_runs() {
    let mut model = compliant_model();
    model.settings = SourceDoc::missing(scaffold::SETTINGS_PATH);

    let out = run_one(&model, ids::CHECK_SETTINGS_SANDBOX);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].check_id, ids::CHECK_SETTINGS_SANDBOX);
    assert_eq!(out[0].code, ids::CODE_DOCUMENT_MISSING);
}

#[test]
fn required_files_reports_each_missing_document() {
    let mut model = compliant_model();
    model.guidance = SourceDoc::missing("CLAUDE.md");
    model.tutorial = SourceDoc {
        path: "ops/tutorial.md".into(),
        state: DocState::Unreadable("invalid UTF-8".to_string()),
    };

    let out = run_one(&model, ids::CHECK_REPO_REQUIRED_FILES);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_FILE]);
    assert_eq!(subjects(&out), vec!["CLAUDE.md"]);
}

#[test]
fn layout_reports_missing_directories() {
    let mut model = compliant_model();
    model.layout[4].exists = false;

    let out = run_one(&model, ids::CHECK_REPO_LAYOUT);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_DIRECTORY]);
    assert_eq!(subjects(&out), vec!["data/inbox"]);
}

#[test]
fn unreadable_and_malformed_settings_are_reported_per_check() {
    let mut model = compliant_model();
    model.settings = SourceDoc {
        path: scaffold::SETTINGS_PATH.into(),
        state: DocState::Unreadable("permission denied".to_string()),
    };
    let out = run_one(&model, ids::CHECK_SETTINGS_SCHEMA);
    assert_eq!(codes(&out), vec![ids::CODE_DOCUMENT_UNREADABLE]);
    assert_eq!(out[0].data["reason"], "permission denied");

    model.settings = settings("{ \"sandbox\": ");
    let out = run_one(&model, ids::CHECK_SETTINGS_DENY_SENSITIVE_PATHS);
    assert_eq!(codes(&out), vec![ids::CODE_DOCUMENT_MALFORMED]);

    model.settings = settings("[1, 2]");
    let out = run_one(&model, ids::CHECK_SETTINGS_SHAPE);
    assert_eq!(codes(&out), vec![ids::CODE_DOCUMENT_MALFORMED]);
    assert!(out[0].message.contains("found array"));
}

#[test]
fn schema_key_is_required() {
    let mut model = compliant_model();
    model.settings = settings(&scaffold::SETTINGS.replace(
        "  \"$schema\": \"https://json.schemastore.org/claude-code-settings.json\",\n",
        "",
    ));

    let out = run_one(&model, ids::CHECK_SETTINGS_SCHEMA);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_SCHEMA]);

    let out = run_one(&model, ids::CHECK_SETTINGS_SHAPE);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_KEY]);
    assert_eq!(subjects(&out), vec!["$schema"]);
}

#[test]
fn shape_reports_types_and_enum_values() {
    let mut model = compliant_model();
    model.settings = settings(
        r#"{
          "$schema": "x",
          "sandbox": { "enabled": "yes", "allowUnsandboxedCommands": false, "network": { "allowedDomains": [] } },
          "permissions": { "deny": [], "defaultMode": "bypassPermissions" }
        }"#,
    );

    let out = run_one(&model, ids::CHECK_SETTINGS_SHAPE);
    assert_eq!(codes(&out), vec![ids::CODE_WRONG_TYPE, ids::CODE_INVALID_VALUE]);
    assert_eq!(
        subjects(&out),
        vec!["sandbox.enabled", "permissions.defaultMode"]
    );
    assert_eq!(out[0].data["expected"], "boolean");
    assert_eq!(out[0].data["found"], "string");
}

#[test]
fn sandbox_requires_literal_booleans() {
    let mut model = compliant_model();
    model.settings = settings(
        r#"{ "sandbox": { "enabled": "true", "allowUnsandboxedCommands": 0 } }"#,
    );

    let out = run_one(&model, ids::CHECK_SETTINGS_SANDBOX);
    assert_eq!(
        codes(&out),
        vec![
            ids::CODE_SANDBOX_DISABLED,
            ids::CODE_UNSANDBOXED_COMMANDS_ALLOWED
        ]
    );
    assert_eq!(out[0].data["found"], "true");
}

#[test]
fn allowlist_missing_github_names_the_domain() {
    let mut model = compliant_model();
    model.settings = settings(&scaffold::settings_without_github());

    let out = run_one(&model, ids::CHECK_SETTINGS_NETWORK_ALLOWLIST);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_REQUIRED_DOMAIN]);
    assert!(out[0].message.contains("github.com"));
    assert_eq!(out[0].severity, Severity::Error);
}

#[test]
fn empty_allowlist_reports_both_invariants() {
    let mut model = compliant_model();
    model.settings = settings(r#"{ "sandbox": { "network": { "allowedDomains": [] } } }"#);

    let out = run_one(&model, ids::CHECK_SETTINGS_NETWORK_ALLOWLIST);
    assert_eq!(
        codes(&out),
        vec![ids::CODE_EMPTY_ALLOWLIST, ids::CODE_MISSING_REQUIRED_DOMAIN]
    );
}

#[test]
fn deny_checks_name_each_missing_rule() {
    let mut model = compliant_model();
    model.settings = settings(
        &scaffold::SETTINGS
            .replace("      \"Read(~/.aws)\",\n", "")
            .replace("      \"Bash(git push -f *)\",\n", ""),
    );

    let out = run_one(&model, ids::CHECK_SETTINGS_DENY_SENSITIVE_PATHS);
    assert_eq!(subjects(&out), vec!["Read(~/.aws)"]);

    let out = run_one(&model, ids::CHECK_SETTINGS_DENY_DANGEROUS_COMMANDS);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_DENY_RULE]);
    assert_eq!(subjects(&out), vec!["Bash(git push -f *)"]);
}

#[test]
fn deny_rule_allowlist_exempts_matching_subjects() {
    let mut model = compliant_model();
    model.settings = settings(r#"{ "permissions": { "deny": [] } }"#);

    let mut out = Vec::new();
    let cfg = config_with_check_allow(
        ids::CHECK_SETTINGS_DENY_DANGEROUS_COMMANDS,
        Severity::Error,
        vec!["Bash(git push origin *)"],
    );
    run_all(&model, &cfg, &mut out);
    assert_eq!(out.len(), 3);
    assert!(subjects(&out).iter().all(|s| !s.starts_with("Bash(git push origin")));
}

#[test]
fn package_denials_count_pip_mentions_case_insensitively() {
    let mut model = compliant_model();
    model.settings = settings(
        r#"{ "permissions": { "deny": ["Bash(PIP install *)", "Bash(pip3 install *)", "Bash(npm install *)"] } }"#,
    );

    let out = run_one(&model, ids::CHECK_SETTINGS_DENY_PACKAGE_INSTALLS);
    assert_eq!(codes(&out), vec![ids::CODE_INSUFFICIENT_PACKAGE_DENIALS]);
    assert_eq!(out[0].data["found"].as_array().map(Vec::len), Some(2));

    model.settings = settings(
        r#"{ "permissions": { "deny": ["Bash(PIP install *)", "Bash(pip3 install *)", "Bash(uv pip install *)", "Bash(python -m pip *)"] } }"#,
    );
    assert!(run_one(&model, ids::CHECK_SETTINGS_DENY_PACKAGE_INSTALLS).is_empty());
}

#[test]
fn permission_overlap_is_reported_per_rule() {
    let mut model = compliant_model();
    model.settings = settings(
        r#"{ "permissions": { "allow": ["Bash(curl *)", "Read(./**)"], "deny": ["Bash(curl *)"] } }"#,
    );

    let out = run_one(&model, ids::CHECK_SETTINGS_PERMISSION_OVERLAP);
    assert_eq!(codes(&out), vec![ids::CODE_ALLOW_DENY_OVERLAP]);
    assert_eq!(subjects(&out), vec!["Bash(curl *)"]);
}

#[test]
fn ownership_without_self_entry_fails_self_protection() {
    let mut model = compliant_model();
    model.ownership = SourceDoc::loaded(
        scaffold::OWNERSHIP_PATH,
        scaffold::ownership_without_self_entry(),
    );

    let out = run_one(&model, ids::CHECK_OWNERSHIP_SELF_PROTECTION);
    assert_eq!(codes(&out), vec![ids::CODE_UNPROTECTED_OWNERSHIP_FILE]);
    assert_eq!(
        out[0].location.as_ref().map(|l| l.path.as_str()),
        Some("CODEOWNERS")
    );
}

#[test]
fn ownership_patterns_and_guidance_phrases() {
    let mut model = compliant_model();
    model.ownership = SourceDoc::loaded("CODEOWNERS", "* @team\nCODEOWNERS @security\n");
    model.guidance = SourceDoc::loaded("CLAUDE.md", "Keep SECRETS out of the repo.\n");

    let out = run_one(&model, ids::CHECK_OWNERSHIP_REQUIRED_PATTERNS);
    assert_eq!(
        subjects(&out),
        vec!["CLAUDE.md", ".claude/**", ".github/workflows/", "requirements.txt"]
    );

    let out = run_one(&model, ids::CHECK_GUIDANCE_REQUIRED_PHRASES);
    assert_eq!(subjects(&out), vec!["untrusted", "PR", "Pull Request"]);
}

#[test]
fn workflow_must_be_a_yaml_mapping_with_jobs() {
    let mut model = compliant_model();
    model.pr_workflow = SourceDoc::loaded(scaffold::PR_WORKFLOW_PATH, "name: x\non: push\n");
    model.scheduled_workflow =
        SourceDoc::loaded(scaffold::SCHEDULED_WORKFLOW_PATH, "jobs: [unclosed\n");

    let out = run_one(&model, ids::CHECK_WORKFLOWS_WELL_FORMED);
    assert_eq!(
        codes(&out),
        vec![ids::CODE_DOCUMENT_MALFORMED, ids::CODE_DOCUMENT_MALFORMED]
    );
    assert!(out[0].message.contains("no 'jobs' key"));
}

#[test]
fn required_workflow_steps() {
    let mut model = compliant_model();
    model.pr_workflow = SourceDoc::loaded(
        scaffold::PR_WORKFLOW_PATH,
        scaffold::PR_WORKFLOW
            .replace("gitleaks/gitleaks-action", "trufflesecurity/trufflehog")
            .replace("CODEOWNERS", "OWNERS"),
    );
    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        scaffold::SCHEDULED_WORKFLOW
            .replace("environment: production", "concurrency: production")
            .replace(".protection_rules", ".rules"),
    );

    let cases = [
        (ids::CHECK_WORKFLOWS_SECRET_SCANNING, ids::CODE_MISSING_SECRET_SCAN),
        (
            ids::CHECK_WORKFLOWS_OWNERSHIP_VALIDATION,
            ids::CODE_MISSING_OWNERSHIP_VALIDATION,
        ),
        (
            ids::CHECK_WORKFLOWS_PROTECTED_ENVIRONMENT,
            ids::CODE_MISSING_PROTECTED_ENVIRONMENT,
        ),
        (
            ids::CHECK_WORKFLOWS_ENVIRONMENT_PROTECTION_CHECK,
            ids::CODE_MISSING_PROTECTION_RULE_CHECK,
        ),
    ];
    for (check_id, code) in cases {
        let out = run_one(&model, check_id);
        assert_eq!(codes(&out), vec![code], "{check_id}");
    }
}

#[test]
fn unpinned_actions_carry_line_numbers() {
    let mut model = compliant_model();
    model.pr_workflow = SourceDoc::loaded(
        scaffold::PR_WORKFLOW_PATH,
        "jobs:\n  a:\n    steps:\n      - uses: actions/checkout@v4\n      - uses: ./local\n",
    );
    model.extra_workflows.push(SourceDoc::loaded(
        ".github/workflows/release.yml",
        "jobs:\n  r:\n    steps:\n      - uses: softprops/action-gh-release@v2\n",
    ));

    let out = run_one(&model, ids::CHECK_WORKFLOWS_PINNED_ACTIONS);
    assert_eq!(codes(&out), vec![ids::CODE_UNPINNED_ACTION; 2]);
    assert_eq!(subjects(&out), vec!["actions/checkout", "softprops/action-gh-release"]);
    assert_eq!(out[0].location.as_ref().and_then(|l| l.line), Some(4));
    assert_eq!(out[0].data["pin"], "v4");
    assert!(out[1].message.contains("pinned to 'v2'"));
}

#[test]
fn refs_without_at_sign_are_not_judged() {
    let mut model = compliant_model();
    model.pr_workflow = SourceDoc::loaded(
        scaffold::PR_WORKFLOW_PATH,
        "jobs:\n  a:\n    steps:\n      - uses: someone/action\n      - uses: docker://alpine:3.20\n",
    );

    assert!(run_one(&model, ids::CHECK_WORKFLOWS_PINNED_ACTIONS).is_empty());
}

#[test]
fn fail_open_unknown_branch_is_reported() {
    let mut model = compliant_model();
    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        scaffold::scheduled_workflow_fail_open(),
    );

    let out = run_one(&model, ids::CHECK_WORKFLOWS_FAIL_CLOSED);
    assert_eq!(codes(&out), vec![ids::CODE_FAIL_OPEN_BRANCH]);
    assert!(out[0].location.as_ref().and_then(|l| l.line).is_some());
}

#[test]
fn workflow_without_unknown_branch_is_missing_fail_closed() {
    let mut model = compliant_model();
    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        "jobs:\n  run:\n    steps:\n      - run: python pipelines/run_all.py\n",
    );

    let out = run_one(&model, ids::CHECK_WORKFLOWS_FAIL_CLOSED);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_FAIL_CLOSED_BRANCH]);
}

#[test]
fn negated_unknown_test_with_exiting_else_fails_closed() {
    let mut model = compliant_model();
    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        "jobs:\n  run:\n    steps:\n      - run: |\n          if [ \"$CLASS\" != \"unknown\" ]; then echo ok; else exit 1; fi\n",
    );
    assert!(run_one(&model, ids::CHECK_WORKFLOWS_FAIL_CLOSED).is_empty());

    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        "jobs:\n  run:\n    steps:\n      - run: |\n          if [ \"$CLASS\" != \"unknown\" ]; then python run_all.py; fi\n",
    );
    let out = run_one(&model, ids::CHECK_WORKFLOWS_FAIL_CLOSED);
    assert_eq!(codes(&out), vec![ids::CODE_FAIL_OPEN_BRANCH]);
    assert_eq!(out[0].location.as_ref().and_then(|l| l.line), Some(5));
}

#[test]
fn negated_step_condition_does_not_count_as_unknown_branch() {
    let mut model = compliant_model();
    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        "jobs:\n  run:\n    steps:\n      - if: steps.classify.outputs.class != 'unknown'\n        run: exit 1\n",
    );

    let out = run_one(&model, ids::CHECK_WORKFLOWS_FAIL_CLOSED);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_FAIL_CLOSED_BRANCH]);
}

#[test]
fn commented_require_hashes_env_does_not_verify_installs() {
    let mut model = compliant_model();
    model.pr_workflow = SourceDoc::loaded(
        scaffold::PR_WORKFLOW_PATH,
        "jobs:\n  a:\n    steps:\n      # PIP_REQUIRE_HASHES is not set yet\n      - run: pip install requests\n",
    );

    let out = run_one(&model, ids::CHECK_WORKFLOWS_HASH_VERIFIED_INSTALLS);
    assert_eq!(
        codes(&out),
        vec![
            ids::CODE_MISSING_HASH_VERIFIED_INSTALL,
            ids::CODE_UNVERIFIED_INSTALL
        ]
    );

    model.pr_workflow = SourceDoc::loaded(
        scaffold::PR_WORKFLOW_PATH,
        "env:\n  PIP_REQUIRE_HASHES: \"1\"\njobs:\n  a:\n    steps:\n      - run: pip install requests\n",
    );
    assert!(run_one(&model, ids::CHECK_WORKFLOWS_HASH_VERIFIED_INSTALLS).is_empty());
}

#[test]
fn hash_verified_installs() {
    let mut model = compliant_model();
    model.pr_workflow = SourceDoc::loaded(
        scaffold::PR_WORKFLOW_PATH,
        scaffold::PR_WORKFLOW.replace(" --require-hashes", ""),
    );
    model.scheduled_workflow = SourceDoc::loaded(
        scaffold::SCHEDULED_WORKFLOW_PATH,
        format!(
            "{}      - run: pip install ruff\n",
            scaffold::SCHEDULED_WORKFLOW
        ),
    );

    let out = run_one(&model, ids::CHECK_WORKFLOWS_HASH_VERIFIED_INSTALLS);
    assert_eq!(
        codes(&out),
        vec![
            ids::CODE_MISSING_HASH_VERIFIED_INSTALL,
            ids::CODE_UNVERIFIED_INSTALL,
            ids::CODE_UNVERIFIED_INSTALL
        ]
    );
    assert_eq!(subjects(&out)[2], "- run: pip install ruff");
}

#[test]
fn paired_block_missing_hooks_key_names_document_and_key() {
    let mut model = compliant_model();
    model.it_checklist = SourceDoc::loaded(
        scaffold::IT_CHECKLIST_PATH,
        scaffold::it_checklist_without_hooks_key(),
    );

    let out = run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_KEYS);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_KEY]);
    assert!(out[0].message.contains("ops/it-checklist.md"));
    assert!(out[0].message.contains("allowManagedHooksOnly"));

    let out = run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_MATCH);
    assert_eq!(codes(&out), vec![ids::CODE_MANAGED_SETTINGS_MISMATCH]);
    assert_eq!(out[0].data["paths"][0], "allowManagedHooksOnly");
}

#[test]
fn missing_block_is_reported_once_by_presence_check() {
    let mut model = compliant_model();
    model.tutorial = SourceDoc::loaded(scaffold::TUTORIAL_PATH, "# Tutorial\n\nNo block here.\n");

    let out = run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_PRESENT);
    assert_eq!(codes(&out), vec![ids::CODE_MISSING_MANAGED_BLOCK]);
    assert!(run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_MATCH).is_empty());
    assert!(run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_KEYS).is_empty());
}

#[test]
fn managed_block_types_and_overlap() {
    let block = r#"
```json
{
  "allowManagedPermissionRulesOnly": "yes",
  "allowManagedHooksOnly": true,
  "permissions": {
    "disableBypassPermissionsMode": "disable",
    "allow": ["Bash(ls)"],
    "deny": ["Bash(ls)"]
  },
  "sandbox": { "enabled": true }
}
```
"#;
    let mut model = compliant_model();
    model.tutorial = SourceDoc::loaded(scaffold::TUTORIAL_PATH, block);
    model.it_checklist = SourceDoc::loaded(scaffold::IT_CHECKLIST_PATH, block);

    let out = run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_TYPES);
    assert_eq!(codes(&out), vec![ids::CODE_WRONG_TYPE; 2]);
    assert_eq!(out[0].location.as_ref().and_then(|l| l.line), Some(2));

    let out = run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_OVERLAP);
    assert_eq!(subjects(&out), vec!["Bash(ls)", "Bash(ls)"]);

    assert!(run_one(&model, ids::CHECK_DOCS_MANAGED_SETTINGS_MATCH).is_empty());
}

#[test]
fn findings_carry_fingerprint_and_help() {
    let mut model = compliant_model();
    model.guidance = SourceDoc::missing("CLAUDE.md");

    let out = run_one(&model, ids::CHECK_GUIDANCE_REQUIRED_PHRASES);
    assert_eq!(out.len(), 1);
    let f = &out[0];
    assert_eq!(f.fingerprint.as_deref().map(str::len), Some(64));
    assert!(f.help.is_some());
    assert_eq!(f.data["document"], "CLAUDE.md");
}

#[test]
fn scaffold_uses_default_document_paths() {
    let paths = crate::model::DocumentPaths::default();
    assert_eq!(crate::model::DEFAULT_LAYOUT, scaffold::LAYOUT_DIRS);
    assert_eq!(paths.settings.as_str(), scaffold::SETTINGS_PATH);
    assert_eq!(paths.it_checklist.as_str(), scaffold::IT_CHECKLIST_PATH);
    assert_eq!(paths.scheduled_workflow.as_str(), scaffold::SCHEDULED_WORKFLOW_PATH);
    assert!(paths.is_named_workflow(&scaffold::PR_WORKFLOW_PATH.into()));
}

//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks: repository
pub const CHECK_REPO_REQUIRED_FILES: &str = "repo.required_files";
pub const CHECK_REPO_LAYOUT: &str = "repo.layout";

// Checks: settings document
pub const CHECK_SETTINGS_SCHEMA: &str = "settings.schema";
pub const CHECK_SETTINGS_SHAPE: &str = "settings.shape";
pub const CHECK_SETTINGS_SANDBOX: &str = "settings.sandbox";
pub const CHECK_SETTINGS_NETWORK_ALLOWLIST: &str = "settings.network_allowlist";
pub const CHECK_SETTINGS_DENY_SENSITIVE_PATHS: &str = "settings.deny_sensitive_paths";
pub const CHECK_SETTINGS_DENY_DANGEROUS_COMMANDS: &str = "settings.deny_dangerous_commands";
pub const CHECK_SETTINGS_DENY_PACKAGE_INSTALLS: &str = "settings.deny_package_installs";
pub const CHECK_SETTINGS_PERMISSION_OVERLAP: &str = "settings.permission_overlap";

// Checks: ownership and guidance
pub const CHECK_OWNERSHIP_REQUIRED_PATTERNS: &str = "ownership.required_patterns";
pub const CHECK_OWNERSHIP_SELF_PROTECTION: &str = "ownership.self_protection";
pub const CHECK_GUIDANCE_REQUIRED_PHRASES: &str = "guidance.required_phrases";

// Checks: workflows
pub const CHECK_WORKFLOWS_WELL_FORMED: &str = "workflows.well_formed";
pub const CHECK_WORKFLOWS_SECRET_SCANNING: &str = "workflows.secret_scanning";
pub const CHECK_WORKFLOWS_OWNERSHIP_VALIDATION: &str = "workflows.ownership_validation";
pub const CHECK_WORKFLOWS_PROTECTED_ENVIRONMENT: &str = "workflows.protected_environment";
pub const CHECK_WORKFLOWS_ENVIRONMENT_PROTECTION_CHECK: &str =
    "workflows.environment_protection_check";
pub const CHECK_WORKFLOWS_PINNED_ACTIONS: &str = "workflows.pinned_actions";
pub const CHECK_WORKFLOWS_FAIL_CLOSED: &str = "workflows.fail_closed";
pub const CHECK_WORKFLOWS_HASH_VERIFIED_INSTALLS: &str = "workflows.hash_verified_installs";

// Checks: paired documentation
pub const CHECK_DOCS_MANAGED_SETTINGS_PRESENT: &str = "docs.managed_settings_present";
pub const CHECK_DOCS_MANAGED_SETTINGS_MATCH: &str = "docs.managed_settings_match";
pub const CHECK_DOCS_MANAGED_SETTINGS_KEYS: &str = "docs.managed_settings_keys";
pub const CHECK_DOCS_MANAGED_SETTINGS_TYPES: &str = "docs.managed_settings_types";
pub const CHECK_DOCS_MANAGED_SETTINGS_OVERLAP: &str = "docs.managed_settings_overlap";

// Codes: shared by every document-reading check
pub const CODE_DOCUMENT_MISSING: &str = "document_missing";
pub const CODE_DOCUMENT_UNREADABLE: &str = "document_unreadable";
pub const CODE_DOCUMENT_MALFORMED: &str = "document_malformed";

// Codes: repo.*
pub const CODE_MISSING_FILE: &str = "missing_file";
pub const CODE_MISSING_DIRECTORY: &str = "missing_directory";

// Codes: settings.* and docs.managed_settings_*
pub const CODE_MISSING_SCHEMA: &str = "missing_schema";
pub const CODE_MISSING_KEY: &str = "missing_key";
pub const CODE_WRONG_TYPE: &str = "wrong_type";
pub const CODE_INVALID_VALUE: &str = "invalid_value";
pub const CODE_SANDBOX_DISABLED: &str = "sandbox_disabled";
pub const CODE_UNSANDBOXED_COMMANDS_ALLOWED: &str = "unsandboxed_commands_allowed";
pub const CODE_EMPTY_ALLOWLIST: &str = "empty_allowlist";
pub const CODE_MISSING_REQUIRED_DOMAIN: &str = "missing_required_domain";
pub const CODE_MISSING_DENY_RULE: &str = "missing_deny_rule";
pub const CODE_INSUFFICIENT_PACKAGE_DENIALS: &str = "insufficient_package_denials";
pub const CODE_ALLOW_DENY_OVERLAP: &str = "allow_deny_overlap";

// Codes: ownership.* and guidance.*
pub const CODE_MISSING_PATTERN: &str = "missing_pattern";
pub const CODE_UNPROTECTED_OWNERSHIP_FILE: &str = "unprotected_ownership_file";
pub const CODE_MISSING_PHRASE: &str = "missing_phrase";

// Codes: workflows.*
pub const CODE_MISSING_SECRET_SCAN: &str = "missing_secret_scan";
pub const CODE_MISSING_OWNERSHIP_VALIDATION: &str = "missing_ownership_validation";
pub const CODE_MISSING_PROTECTED_ENVIRONMENT: &str = "missing_protected_environment";
pub const CODE_MISSING_PROTECTION_RULE_CHECK: &str = "missing_protection_rule_check";
pub const CODE_UNPINNED_ACTION: &str = "unpinned_action";
pub const CODE_MISSING_FAIL_CLOSED_BRANCH: &str = "missing_fail_closed_branch";
pub const CODE_FAIL_OPEN_BRANCH: &str = "fail_open_branch";
pub const CODE_MISSING_HASH_VERIFIED_INSTALL: &str = "missing_hash_verified_install";
pub const CODE_UNVERIFIED_INSTALL: &str = "unverified_install";

// Codes: docs.*
pub const CODE_MISSING_MANAGED_BLOCK: &str = "missing_managed_block";
pub const CODE_MANAGED_SETTINGS_MISMATCH: &str = "managed_settings_mismatch";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

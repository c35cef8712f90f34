//! Key/type tables for the settings document and the managed-settings block.

use crate::extract::{ValueKind, lookup};
use serde_json::Value;

const PERMISSION_MODES: &[&str] = &["default", "acceptEdits", "plan"];
const BYPASS_MODES: &[&str] = &["disable"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expect {
    Boolean,
    String,
    Array,
    Object,
    /// A string drawn from a fixed set.
    OneOf(&'static [&'static str]),
}

impl Expect {
    pub fn describe(self) -> &'static str {
        match self {
            Expect::Boolean => "boolean",
            Expect::String | Expect::OneOf(_) => "string",
            Expect::Array => "array",
            Expect::Object => "object",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Expect::Boolean => ValueKind::Boolean,
            Expect::String | Expect::OneOf(_) => ValueKind::String,
            Expect::Array => ValueKind::Array,
            Expect::Object => ValueKind::Object,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct KeySpec {
    pub path: &'static str,
    pub expect: Expect,
    pub required: bool,
}

const fn req(path: &'static str, expect: Expect) -> KeySpec {
    KeySpec {
        path,
        expect,
        required: true,
    }
}

const fn opt(path: &'static str, expect: Expect) -> KeySpec {
    KeySpec {
        path,
        expect,
        required: false,
    }
}

/// Parents come before children so a failed parent suppresses its subtree.
pub const SETTINGS_KEYS: &[KeySpec] = &[
    req("$schema", Expect::String),
    req("sandbox", Expect::Object),
    req("sandbox.enabled", Expect::Boolean),
    req("sandbox.allowUnsandboxedCommands", Expect::Boolean),
    req("sandbox.network", Expect::Object),
    req("sandbox.network.allowedDomains", Expect::Array),
    req("permissions", Expect::Object),
    opt("permissions.allow", Expect::Array),
    req("permissions.deny", Expect::Array),
    opt("permissions.defaultMode", Expect::OneOf(PERMISSION_MODES)),
    opt(
        "permissions.disableBypassPermissionsMode",
        Expect::OneOf(BYPASS_MODES),
    ),
];

pub const MANAGED_KEYS: &[KeySpec] = &[
    req("allowManagedPermissionRulesOnly", Expect::Boolean),
    req("allowManagedHooksOnly", Expect::Boolean),
    req("permissions", Expect::Object),
    req("permissions.deny", Expect::Array),
    opt("permissions.allow", Expect::Array),
    opt("permissions.defaultMode", Expect::OneOf(PERMISSION_MODES)),
    req(
        "permissions.disableBypassPermissionsMode",
        Expect::OneOf(BYPASS_MODES),
    ),
    req("sandbox", Expect::Object),
    req("sandbox.enabled", Expect::Boolean),
    opt("sandbox.allowUnsandboxedCommands", Expect::Boolean),
    opt("sandbox.network.allowedDomains", Expect::Array),
];

#[derive(Clone, Debug, PartialEq)]
pub enum KeyViolation {
    Missing {
        path: &'static str,
    },
    WrongType {
        path: &'static str,
        expected: &'static str,
        found: ValueKind,
    },
    InvalidValue {
        path: &'static str,
        allowed: &'static [&'static str],
        found: Value,
    },
}

impl KeyViolation {
    pub fn path(&self) -> &'static str {
        match self {
            KeyViolation::Missing { path }
            | KeyViolation::WrongType { path, .. }
            | KeyViolation::InvalidValue { path, .. } => path,
        }
    }
}

/// Validate `root` against a key table.
///
/// A key whose parent is absent or has the wrong type is not reported again.
pub fn validate_keys(root: &Value, specs: &[KeySpec]) -> Vec<KeyViolation> {
    let mut out = Vec::new();
    let mut dead: Vec<&str> = Vec::new();

    for spec in specs {
        if dead.iter().any(|p| is_descendant(spec.path, p)) {
            continue;
        }
        let Some(value) = lookup(root, spec.path) else {
            if spec.required {
                out.push(KeyViolation::Missing { path: spec.path });
            }
            dead.push(spec.path);
            continue;
        };

        let found = ValueKind::of(value);
        if found != spec.expect.kind() {
            out.push(KeyViolation::WrongType {
                path: spec.path,
                expected: spec.expect.describe(),
                found,
            });
            dead.push(spec.path);
            continue;
        }

        if let Expect::OneOf(allowed) = spec.expect
            && !value.as_str().is_some_and(|s| allowed.contains(&s))
        {
            out.push(KeyViolation::InvalidValue {
                path: spec.path,
                allowed,
                found: value.clone(),
            });
        }
    }
    out
}

fn is_descendant(path: &str, parent: &str) -> bool {
    path.strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.'))
}

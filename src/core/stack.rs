//! Filepath: src/core/stack.rs
//! Rule-based technology detection from file existence and content.
//!
//! Detection applies an ordered rule list (explicit data, substitutable in
//! tests) and then enriches the result from the root package manifests.
//! Nothing here raises on a missing or malformed manifest: detection
//! degrades silently and the output is simply shorter.

use std::path::Path;

use crate::core::model::{StackTechnology, TechCategory};
use crate::infra::io::ContentProvider;

/// Cap for reading a rule's candidate file when checking content keywords.
const RULE_CONTENT_CAP: u64 = 256 * 1024;

/// One detection rule: matches when any listed file exists. When content
/// keywords are given, their absence in the matched file downgrades
/// confidence from 1.0 to 0.6 (0.7 if the file could not be read).
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pub name: &'static str,
    pub category: TechCategory,
    pub files: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

/// The default rule table, in declaration order. Output order follows
/// this order, so appending rules never perturbs existing results.
pub fn default_rules() -> Vec<DetectionRule> {
    use TechCategory::*;
    fn rule(
        name: &'static str,
        category: TechCategory,
        files: &'static [&'static str],
        keywords: &'static [&'static str],
    ) -> DetectionRule {
        DetectionRule { name, category, files, keywords }
    }
    vec![
        rule("Rust", Language, &["Cargo.toml"], &[]),
        rule("Node.js", Runtime, &["package.json"], &[]),
        rule("TypeScript", Language, &["tsconfig.json"], &[]),
        rule(
            "Python",
            Language,
            &["pyproject.toml", "setup.py", "requirements.txt"],
            &[],
        ),
        rule("Go", Language, &["go.mod"], &[]),
        rule("Deno", Runtime, &["deno.json", "deno.jsonc"], &[]),
        rule("Docker", Tool, &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"], &[]),
        rule(
            "Next.js",
            Framework,
            &["next.config.js", "next.config.mjs", "next.config.ts"],
            &[],
        ),
        rule("Vite", Tool, &["vite.config.js", "vite.config.ts"], &[]),
        rule(
            "Tailwind CSS",
            Framework,
            &["tailwind.config.js", "tailwind.config.ts", "tailwind.config.cjs"],
            &[],
        ),
        rule("Webpack", Tool, &["webpack.config.js"], &[]),
        rule("Jest", Tool, &["jest.config.js", "jest.config.ts"], &[]),
        rule("Prisma", Database, &["prisma/schema.prisma"], &[]),
        rule("Electron", Framework, &["package.json"], &["electron"]),
        rule(
            "Themed content platform",
            Platform,
            &["config/settings_schema.json", "theme.toml"],
            &[],
        ),
    ]
}

/// Run the rule table, then enrich from root manifests. Output is in
/// rule-declaration order followed by derived entries; duplicates by
/// name are allowed.
pub fn detect(
    root: &Path,
    rules: &[DetectionRule],
    provider: &dyn ContentProvider,
) -> Vec<StackTechnology> {
    let mut out = Vec::new();

    for rule in rules {
        let Some(found) = rule.files.iter().find(|f| provider.exists(&root.join(f))) else {
            continue;
        };

        let confidence = if rule.keywords.is_empty() {
            1.0
        } else {
            match provider.read_capped(&root.join(found), RULE_CONTENT_CAP) {
                Ok(content) if rule.keywords.iter().any(|k| content.contains(k)) => 1.0,
                Ok(_) => 0.6,
                Err(_) => 0.7,
            }
        };

        out.push(StackTechnology {
            name: rule.name.to_string(),
            version: None,
            category: rule.category,
            confidence,
        });
    }

    enrich_from_package_json(root, provider, &mut out);
    enrich_from_cargo_toml(root, provider, &mut out);

    out
}

/// JS framework dependencies worth surfacing as stack entries.
const JS_FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "React"),
    ("next", "Next.js"),
    ("vue", "Vue.js"),
    ("svelte", "Svelte"),
    ("@angular/core", "Angular"),
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("@nestjs/core", "NestJS"),
    ("astro", "Astro"),
    ("solid-js", "SolidJS"),
];

/// Rust framework dependencies worth surfacing as stack entries.
const RUST_FRAMEWORKS: &[(&str, &str)] = &[
    ("axum", "Axum"),
    ("actix-web", "Actix Web"),
    ("rocket", "Rocket"),
    ("warp", "Warp"),
    ("bevy", "Bevy"),
    ("tauri", "Tauri"),
    ("leptos", "Leptos"),
];

fn enrich_from_package_json(
    root: &Path,
    provider: &dyn ContentProvider,
    out: &mut Vec<StackTechnology>,
) {
    let Ok(raw) = provider.read_capped(&root.join("package.json"), RULE_CONTENT_CAP) else {
        return;
    };
    let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&raw) else {
        return;
    };

    // A declared engine constraint attaches a version to the existing
    // Node.js entry.
    if let Some(node) = manifest
        .pointer("/engines/node")
        .and_then(serde_json::Value::as_str)
    {
        if let Some(entry) = out.iter_mut().find(|t| t.name == "Node.js") {
            entry.version = Some(strip_range_prefix(node));
        }
    }

    // Declared framework dependencies append new entries, version
    // stripped of range prefixes.
    for deps_key in ["dependencies", "devDependencies"] {
        let Some(deps) = manifest.get(deps_key).and_then(serde_json::Value::as_object) else {
            continue;
        };
        for (dep, display) in JS_FRAMEWORKS {
            if let Some(version) = deps.get(*dep).and_then(serde_json::Value::as_str) {
                out.push(StackTechnology {
                    name: (*display).to_string(),
                    version: Some(strip_range_prefix(version)),
                    category: TechCategory::Framework,
                    confidence: 0.9,
                });
            }
        }
    }
}

fn enrich_from_cargo_toml(
    root: &Path,
    provider: &dyn ContentProvider,
    out: &mut Vec<StackTechnology>,
) {
    let Ok(raw) = provider.read_capped(&root.join("Cargo.toml"), RULE_CONTENT_CAP) else {
        return;
    };
    let Ok(manifest) = raw.parse::<toml::Table>() else {
        return;
    };

    if let Some(rust_version) = manifest
        .get("package")
        .and_then(|p| p.get("rust-version"))
        .and_then(toml::Value::as_str)
    {
        if let Some(entry) = out.iter_mut().find(|t| t.name == "Rust") {
            entry.version = Some(strip_range_prefix(rust_version));
        }
    }

    let Some(deps) = manifest.get("dependencies").and_then(toml::Value::as_table) else {
        return;
    };
    for (dep, display) in RUST_FRAMEWORKS {
        let Some(value) = deps.get(*dep) else { continue };
        // Either `axum = "0.7"` or `axum = { version = "0.7", ... }`.
        let version = value
            .as_str()
            .or_else(|| value.get("version").and_then(toml::Value::as_str))
            .map(strip_range_prefix);
        out.push(StackTechnology {
            name: (*display).to_string(),
            version,
            category: TechCategory::Framework,
            confidence: 0.9,
        });
    }
}

/// Strip semver range prefixes: `^1.2`, `~1.2`, `>=1.2` all become `1.2`.
fn strip_range_prefix(version: &str) -> String {
    version
        .trim_start_matches(['^', '~', '=', '>', '<', ' '])
        .trim()
        .to_string()
}

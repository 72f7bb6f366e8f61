use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FeatureEntry {
    feature_id: String,
    title: String,
    icon: String,
    category: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCatalog {
    schema_version: u32,
    feature: Vec<FeatureEntry>,
}

const KNOWN_CATEGORIES: [&str; 3] = ["code", "editor", "workspace"];

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let path = crate_root.join("features.toml");
    println!("cargo:rerun-if-changed={}", path.display());

    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let catalog: FeatureCatalog = toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
    if catalog.schema_version != 1 {
        panic!(
            "feature catalog schema mismatch in {}: expected 1 found {}",
            path.display(),
            catalog.schema_version
        );
    }

    let mut seen = BTreeSet::new();
    for entry in &catalog.feature {
        if entry.feature_id.trim().is_empty() || entry.title.trim().is_empty() {
            panic!("feature entries need a non-empty feature_id and title");
        }
        if !seen.insert(entry.feature_id.clone()) {
            panic!("duplicate feature_id `{}`", entry.feature_id);
        }
        if !KNOWN_CATEGORIES.contains(&entry.category.as_str()) {
            panic!(
                "feature `{}` has unknown category `{}`",
                entry.feature_id, entry.category
            );
        }
    }

    let json =
        serde_json::to_string_pretty(&catalog.feature).expect("serialize feature catalog");
    let generated = format!(
        "/// Build-time generated feature catalog JSON.\n\
pub const FEATURE_CATALOG_JSON: &str = r##\"{}\"##;\n",
        json
    );

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    let out_file = out_dir.join("feature_catalog_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindowDefaults {
    width: i32,
    height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindowConstraints {
    min_width: i32,
    min_height: i32,
    resizable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppManifest {
    schema_version: u32,
    app_id: String,
    display_name: String,
    icon: String,
    show_on_desktop: bool,
    show_in_menu: bool,
    window_defaults: WindowDefaults,
    window_constraints: WindowConstraints,
}

fn app_manifest_paths(manifest_dir: &Path) -> Vec<PathBuf> {
    let entries = fs::read_dir(manifest_dir)
        .unwrap_or_else(|err| panic!("failed to list {}: {err}", manifest_dir.display()));
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("toml"))
        .collect();
    paths.sort();
    paths
}

fn is_valid_app_id(app_id: &str) -> bool {
    let segments: Vec<&str> = app_id.split('.').collect();
    segments.len() >= 2
        && segments.iter().all(|segment| {
            segment
                .chars()
                .next()
                .map(|ch| ch.is_ascii_lowercase())
                .unwrap_or(false)
                && segment
                    .chars()
                    .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
        })
}

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let manifest_dir = crate_root.join("manifests");
    println!("cargo:rerun-if-changed={}", manifest_dir.display());

    let mut manifests = Vec::<AppManifest>::new();
    let mut seen_ids = BTreeSet::new();

    for path in app_manifest_paths(&manifest_dir) {
        println!("cargo:rerun-if-changed={}", path.display());
        let raw = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
        let manifest: AppManifest = toml::from_str(&raw)
            .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
        if manifest.schema_version != 1 {
            panic!(
                "manifest schema mismatch in {}: expected 1 found {}",
                path.display(),
                manifest.schema_version
            );
        }
        if !is_valid_app_id(&manifest.app_id) {
            panic!(
                "invalid app id `{}` in {}",
                manifest.app_id,
                path.display()
            );
        }
        if !seen_ids.insert(manifest.app_id.clone()) {
            panic!("duplicate app id `{}` in {}", manifest.app_id, path.display());
        }
        if manifest.window_defaults.width < manifest.window_constraints.min_width
            || manifest.window_defaults.height < manifest.window_constraints.min_height
        {
            panic!(
                "window defaults below minimum constraints in {}",
                path.display()
            );
        }
        manifests.push(manifest);
    }

    manifests.sort_by(|a, b| a.app_id.cmp(&b.app_id));
    let json = serde_json::to_string_pretty(&manifests).expect("serialize app manifest catalog");
    let generated = format!(
        "/// Build-time generated app manifest catalog JSON.\n\
pub const APP_MANIFEST_CATALOG_JSON: &str = r##\"{}\"##;\n",
        json
    );

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    let out_file = out_dir.join("app_catalog_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}

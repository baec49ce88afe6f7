// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Compiling documents found through the settings' search paths

use std::fs;

use scaffold::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn write_network(dir: &TempDir) {
    let document = json!({
        "network_architecture": { "simulation_volume_x": 100.0, "simulation_volume_z": 50.0 },
        "output": { "format": "scaffold.output.HDF5Formatter" },
        "layers": { "molecular_layer": { "thickness": 20.0 } },
        "cell_types": {
            "stellate_cell": {
                "placement": {
                    "class": "scaffold.placement.ParticlePlacement",
                    "layer": "molecular_layer",
                    "soma_radius": 4.0,
                    "density": 0.0005
                },
                "morphology": { "class": "scaffold.morphologies.NoGeometry" }
            }
        },
        "connection_types": {},
        "simulations": {}
    });
    fs::write(dir.path().join("network.json"), document.to_string()).unwrap();
}

#[test]
fn test_document_found_in_search_path() {
    let dir = TempDir::new().unwrap();
    write_network(&dir);

    let mut settings = ScaffoldSettings::default();
    settings.documents.search_paths.push(dir.path().to_path_buf());
    let config = ConfigCompiler::with_settings(settings).compile_file("network").unwrap();

    assert_eq!(config.source_name(), "network.json");
    assert!(config.raw().contains("molecular_layer"));
    assert_eq!(config.layer("molecular_layer").unwrap().dimensions, [100.0, 20.0, 50.0]);
}

#[test]
fn test_missing_document_lists_searched_paths() {
    let dir = TempDir::new().unwrap();
    let mut settings = ScaffoldSettings::default();
    settings.documents.search_paths = vec![dir.path().to_path_buf()];

    match ConfigCompiler::with_settings(settings).compile_file("absent") {
        Err(CompileError::DocumentNotFound { name, searched }) => {
            assert_eq!(name, "absent.json");
            assert_eq!(searched.len(), 2);
            assert_eq!(searched[1], dir.path().join("absent.json"));
        }
        other => panic!("unexpected result: {:?}", other.map(|config| config.source_name().to_string())),
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Layer geometry resolution.

Runs once all layers have been initialised:

1. **Volume scaling**: layers declaring `volume_scale` get dimensions derived
   from the summed volume of their reference layers. References to other
   volume-scaled layers are resolved first; cycles are rejected.
2. **Stacking**: the layers of every stack are placed bottom to top in slot
   order, each starting where the previous one ends.

[`resize`] rescales a compiled set of layers to a new footprint.
*/

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use tracing::debug;

use crate::models::{Layer, Stack, Volume};
use crate::types::{CompileError, CompileResult, NodePath};

/// Dimensions of a layer with volume `reference_volume / volume_scale`
/// shaped by `ratios`
///
/// The ratios are normalised to the Y axis, so with `Y` the thickness:
/// `Y^3 * prod(ratios) = reference_volume / volume_scale`.
pub fn volume_scaled_dimensions(
    reference_volume: f64,
    volume_scale: f64,
    ratios: [f64; 3],
    node: &NodePath,
) -> CompileResult<[f64; 3]> {
    if volume_scale <= 0.0 {
        return Err(CompileError::configuration(
            &node.child("volume_scale"),
            format!("The volume scale must be positive, got {}", volume_scale),
        ));
    }
    if ratios.iter().any(|r| *r <= 0.0) {
        return Err(CompileError::configuration(
            &node.child("volume_dimension_ratio"),
            format!("Dimension ratios must be positive, got {:?}", ratios),
        ));
    }

    let normalized = ratios.map(|r| r / ratios[1]);
    let product: f64 = normalized.iter().product();
    let y = (reference_volume / (volume_scale * product)).cbrt();
    Ok(normalized.map(|r| y * r))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Resolved,
}

/// Set the dimensions of every volume-scaled layer
pub fn resolve_volume_scales(layers: &mut IndexMap<String, Layer>, layers_path: &NodePath) -> CompileResult<()> {
    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut trail: Vec<String> = Vec::new();
    let names: Vec<String> = layers.keys().cloned().collect();

    for name in &names {
        resolve_layer(layers, name, &mut marks, &mut trail, layers_path)?;
    }
    Ok(())
}

fn resolve_layer(
    layers: &mut IndexMap<String, Layer>,
    name: &str,
    marks: &mut HashMap<String, Mark>,
    trail: &mut Vec<String>,
    layers_path: &NodePath,
) -> CompileResult<()> {
    match marks.get(name) {
        Some(Mark::Resolved) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = trail.iter().position(|n| n == name).unwrap_or(0);
            let mut cycle = trail[start..].to_vec();
            cycle.push(name.to_string());
            return Err(CompileError::configuration(
                &layers_path.child(name).child("scale_from_layers"),
                format!("Volume scaling of layers forms a cycle: {}", cycle.join(" -> ")),
            ));
        }
        None => {}
    }

    let scale = match layers.get(name).and_then(|layer| layer.volume_scale.clone()) {
        Some(scale) => scale,
        None => {
            marks.insert(name.to_string(), Mark::Resolved);
            return Ok(());
        }
    };

    let node = layers_path.child(name);
    marks.insert(name.to_string(), Mark::InProgress);
    trail.push(name.to_string());

    let mut reference_volume = 0.0;
    for (i, reference) in scale.scale_from_layers.iter().enumerate() {
        if !layers.contains_key(reference) {
            return Err(CompileError::configuration(
                &node.child("scale_from_layers").child(i),
                format!("Unknown layer '{}' in scale_from_layers of '{}'", reference, name),
            ));
        }
        resolve_layer(layers, reference, marks, trail, layers_path)?;
        reference_volume += layers.get(reference).map(Layer::volume).unwrap_or(0.0);
    }

    let dimensions = volume_scaled_dimensions(reference_volume, scale.volume_scale, scale.dimension_ratios, &node)?;
    if let Some(layer) = layers.get_mut(name) {
        layer.dimensions = dimensions;
    }
    debug!(target: "scaffold-compiler",
        "[GEOMETRY] Layer '{}' scaled from {:?}: {:?}",
        name, scale.scale_from_layers, dimensions
    );

    trail.pop();
    marks.insert(name.to_string(), Mark::Resolved);
    Ok(())
}

/// Place the layers of every stack, in ascending stack id order
///
/// A stack without a declared position starts at the origin.
pub fn place_stacks(
    layers: &mut IndexMap<String, Layer>,
    stacks: &mut BTreeMap<i64, Stack>,
    layers_path: &NodePath,
) -> CompileResult<()> {
    for stack in stacks.values_mut() {
        let base = *stack.position.get_or_insert([0.0, 0.0, 0.0]);
        let mut roof = base[1];
        for name in stack.layers.values() {
            let layer = layers.get_mut(name).ok_or_else(|| {
                CompileError::configuration(
                    layers_path,
                    format!("Stack {} refers to unknown layer '{}'", stack.id, name),
                )
            })?;
            layer.origin[1] = roof;
            roof += layer.thickness();
        }
        debug!(target: "scaffold-compiler", "[GEOMETRY] Stack {} spans {} to {}", stack.id, base[1], roof);
    }
    Ok(())
}

/// Reject an extent that is not a finite positive number
pub fn check_extent(extent: f64, node: &NodePath) -> CompileResult<()> {
    if !extent.is_finite() || extent <= 0.0 {
        return Err(CompileError::configuration(
            node,
            format!("The simulation volume must have a positive extent, got {}", extent),
        ));
    }
    Ok(())
}

/// Put every `xz_center` layer in the middle of the footprint
pub fn center_xz(volume: &Volume, layers: &mut IndexMap<String, Layer>) {
    for layer in layers.values_mut().filter(|layer| layer.xz_center) {
        layer.origin[0] = (volume.x - layer.dimensions[0]) / 2.0;
        layer.origin[2] = (volume.z - layer.dimensions[2]) / 2.0;
    }
}

/// Resize the footprint, rescaling `scaling` layers and recentering
/// `xz_center` layers
///
/// `None` keeps the current extent of that axis. Nothing changes when an
/// extent is rejected.
pub fn resize(
    volume: &mut Volume,
    layers: &mut IndexMap<String, Layer>,
    x: Option<f64>,
    z: Option<f64>,
) -> CompileResult<()> {
    let node = NodePath::of("network_architecture");
    if let Some(x) = x {
        check_extent(x, &node.child("simulation_volume_x"))?;
    }
    if let Some(z) = z {
        check_extent(z, &node.child("simulation_volume_z"))?;
    }

    let mut scaling_x = 1.0;
    let mut scaling_z = 1.0;
    if let Some(x) = x {
        scaling_x = x / volume.x;
        volume.x = x;
    }
    if let Some(z) = z {
        scaling_z = z / volume.z;
        volume.z = z;
    }

    for layer in layers.values_mut().filter(|layer| layer.scaling) {
        layer.dimensions[0] *= scaling_x;
        layer.dimensions[2] *= scaling_z;
    }
    center_xz(volume, layers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StackSlot, VolumeScale};

    fn layer(name: &str, dimensions: [f64; 3]) -> Layer {
        Layer {
            name: name.to_string(),
            origin: [0.0; 3],
            dimensions,
            scaling: true,
            xz_center: false,
            stack: None,
            volume_scale: None,
        }
    }

    fn scaled(name: &str, scale: f64, from: &[&str]) -> Layer {
        Layer {
            volume_scale: Some(VolumeScale {
                volume_scale: scale,
                scale_from_layers: from.iter().map(|s| s.to_string()).collect(),
                dimension_ratios: [1.0, 1.0, 1.0],
            }),
            ..layer(name, [0.0; 3])
        }
    }

    fn collection(layers: Vec<Layer>) -> IndexMap<String, Layer> {
        layers.into_iter().map(|l| (l.name.clone(), l)).collect()
    }

    #[test]
    fn test_non_cubic_ratios_normalised_to_y() {
        let dims = volume_scaled_dimensions(8000.0, 1.0, [2.0, 1.0, 4.0], &NodePath::root()).unwrap();
        let volume: f64 = dims.iter().product();
        assert!((volume - 8000.0).abs() < 1e-6);
        assert!((dims[0] - 2.0 * dims[1]).abs() < 1e-9);
        assert!((dims[2] - 4.0 * dims[1]).abs() < 1e-9);
    }

    #[test]
    fn test_forward_reference_resolved_first() {
        // "outer" is declared before the layer it is scaled from
        let mut layers = collection(vec![
            scaled("outer", 1.0, &["inner"]),
            scaled("inner", 2.0, &["base"]),
            layer("base", [10.0, 10.0, 10.0]),
        ]);
        resolve_volume_scales(&mut layers, &NodePath::of("layers")).unwrap();
        assert!((layers["inner"].volume() - 500.0).abs() < 1e-6);
        assert!((layers["outer"].volume() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut layers = collection(vec![scaled("a", 1.0, &["b"]), scaled("b", 1.0, &["a"])]);
        let err = resolve_volume_scales(&mut layers, &NodePath::of("layers")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("a -> b -> a"), "{}", message);
    }

    #[test]
    fn test_unknown_reference_names_position() {
        let mut layers = collection(vec![scaled("a", 1.0, &["nowhere"])]);
        let err = resolve_volume_scales(&mut layers, &NodePath::of("layers")).unwrap_err();
        assert_eq!(err.node().unwrap().to_string(), "layers.a.scale_from_layers.0");
    }

    #[test]
    fn test_stack_with_explicit_base() {
        let mut layers = collection(vec![layer("top", [1.0, 5.0, 1.0]), layer("bottom", [1.0, 20.0, 1.0])]);
        let mut stack = Stack::new(3);
        stack.position = Some([0.0, 100.0, 0.0]);
        stack.layers.insert(1, "top".to_string());
        stack.layers.insert(0, "bottom".to_string());
        layers["top"].stack = Some(StackSlot { stack_id: 3, position_in_stack: 1 });
        let mut stacks = BTreeMap::from([(3, stack)]);

        place_stacks(&mut layers, &mut stacks, &NodePath::of("layers")).unwrap();
        assert_eq!(layers["bottom"].origin[1], 100.0);
        assert_eq!(layers["top"].origin[1], 120.0);
    }

    #[test]
    fn test_resize_recenters() {
        let mut volume = Volume { x: 200.0, z: 200.0 };
        let mut centered = layer("c", [100.0, 10.0, 100.0]);
        centered.xz_center = true;
        centered.scaling = false;
        centered.origin = [50.0, 0.0, 50.0];
        let mut layers = collection(vec![centered, layer("s", [200.0, 10.0, 200.0])]);

        resize(&mut volume, &mut layers, Some(400.0), None).unwrap();
        assert_eq!(volume.x, 400.0);
        assert_eq!(layers["s"].dimensions, [400.0, 10.0, 200.0]);
        assert_eq!(layers["c"].dimensions, [100.0, 10.0, 100.0]);
        assert_eq!(layers["c"].origin, [150.0, 0.0, 50.0]);
    }

    #[test]
    fn test_resize_rejects_degenerate_extents() {
        let mut volume = Volume { x: 200.0, z: 200.0 };
        let mut layers = collection(vec![layer("s", [200.0, 10.0, 200.0])]);

        for extent in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = resize(&mut volume, &mut layers, Some(extent), None).unwrap_err();
            assert_eq!(err.node().unwrap().to_string(), "network_architecture.simulation_volume_x");
            let err = resize(&mut volume, &mut layers, None, Some(extent)).unwrap_err();
            assert_eq!(err.node().unwrap().to_string(), "network_architecture.simulation_volume_z");
        }
        assert_eq!(volume.x, 200.0);
        assert_eq!(volume.z, 200.0);

        resize(&mut volume, &mut layers, Some(400.0), None).unwrap();
        assert_eq!(layers["s"].dimensions, [400.0, 10.0, 200.0]);
    }

    #[test]
    fn test_center_after_volume_scaling() {
        let volume = Volume { x: 200.0, z: 200.0 };
        let mut centered = scaled("c", 1.0, &["base"]);
        centered.xz_center = true;
        let mut layers = collection(vec![centered, layer("base", [10.0, 10.0, 10.0])]);

        resolve_volume_scales(&mut layers, &NodePath::of("layers")).unwrap();
        center_xz(&volume, &mut layers);
        assert_eq!(layers["c"].origin, [95.0, 0.0, 95.0]);
    }
}

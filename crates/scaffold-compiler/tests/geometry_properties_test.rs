// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Properties of stacking and resizing over generated layouts

use std::collections::BTreeMap;

use indexmap::IndexMap;
use proptest::prelude::*;
use scaffold_compiler::geometry::{place_stacks, resize, volume_scaled_dimensions};
use scaffold_compiler::models::{Layer, Stack, StackSlot, Volume};
use scaffold_compiler::NodePath;

fn layer(name: &str, thickness: f64, xz_center: bool) -> Layer {
    Layer {
        name: name.to_string(),
        origin: [0.0; 3],
        dimensions: [100.0, thickness, 100.0],
        scaling: true,
        xz_center,
        stack: None,
        volume_scale: None,
    }
}

proptest! {
    #[test]
    fn stacked_layers_touch(thicknesses in prop::collection::vec(1.0f64..500.0, 1..8), base in -100.0f64..100.0) {
        let mut layers = IndexMap::new();
        let mut stack = Stack::new(3);
        stack.position = Some([0.0, base, 0.0]);
        // declared in reverse so document order differs from stack order
        for (position, thickness) in thicknesses.iter().enumerate().rev() {
            let name = format!("layer_{}", position);
            let mut l = layer(&name, *thickness, false);
            l.stack = Some(StackSlot { stack_id: 3, position_in_stack: position as i64 });
            layers.insert(name.clone(), l);
            stack.layers.insert(position as i64, name);
        }
        let mut stacks = BTreeMap::from([(3, stack)]);

        place_stacks(&mut layers, &mut stacks, &NodePath::of("layers")).unwrap();

        let ordered: Vec<&Layer> = stacks[&3].layer_names().map(|name| &layers[name]).collect();
        prop_assert_eq!(ordered[0].origin[1], base);
        for pair in ordered.windows(2) {
            prop_assert!((pair[1].origin[1] - pair[0].top()).abs() < 1e-9);
        }
    }

    #[test]
    fn resize_to_same_volume_changes_nothing(x in 10.0f64..1000.0, z in 10.0f64..1000.0, centered in any::<bool>()) {
        let mut volume = Volume { x, z };
        let mut layers = IndexMap::from([("l".to_string(), layer("l", 20.0, centered))]);
        resize(&mut volume, &mut layers, Some(2.0 * x), Some(z)).unwrap();
        let before = layers.clone();

        resize(&mut volume, &mut layers, Some(2.0 * x), Some(z)).unwrap();
        prop_assert_eq!(&layers, &before);
        prop_assert_eq!(volume, Volume { x: 2.0 * x, z });
    }

    #[test]
    fn volume_scaling_preserves_volume(
        reference in 1.0e3f64..1.0e9,
        scale in 0.1f64..10.0,
        ratios in prop::array::uniform3(0.1f64..10.0),
    ) {
        let dimensions = volume_scaled_dimensions(reference, scale, ratios, &NodePath::of("layers")).unwrap();
        let volume: f64 = dimensions.iter().product();
        prop_assert!((volume - reference / scale).abs() <= 1e-6 * reference / scale);
        prop_assert!((dimensions[0] / dimensions[1] - ratios[0] / ratios[1]).abs() < 1e-9 * ratios[0] / ratios[1] + 1e-12);
    }
}

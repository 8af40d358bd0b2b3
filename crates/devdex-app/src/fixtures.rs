// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Catalog, Device, DeviceId, DeviceImages, Product, ProductLine, ProductLineId};
use std::collections::BTreeMap;

pub(crate) fn device(id: &str, line: &str, name: &str) -> Device {
    Device {
        id: DeviceId::from(id),
        product_line: ProductLine {
            id: ProductLineId::new(line.to_ascii_lowercase()),
            name: line.to_owned(),
        },
        product: Product {
            name: name.to_owned(),
            abbrev: name.chars().filter(|ch| !ch.is_whitespace()).collect(),
        },
        images: DeviceImages {
            default: format!("{id}-default"),
            nopadding: format!("{id}-nopadding"),
            topology: format!("{id}-topology"),
        },
        short_names: Vec::new(),
        max_power: None,
        speed: None,
        port_count: None,
        radios: BTreeMap::new(),
    }
}

/// Three devices: lines `A, A, B`, names `Alpha, Abacus, Beta`.
pub(crate) fn abc_catalog() -> Catalog {
    Catalog {
        devices: vec![
            device("d1", "A", "Alpha"),
            device("d2", "A", "Abacus"),
            device("d3", "B", "Beta"),
        ],
        version: "test".to_owned(),
    }
}

/// `count` devices on line `Net` named `Switch 0..count`.
pub(crate) fn switch_catalog(count: usize) -> Catalog {
    Catalog {
        devices: (0..count)
            .map(|index| device(&format!("sw{index}"), "Net", &format!("Switch {index}")))
            .collect(),
        version: "test".to_owned(),
    }
}

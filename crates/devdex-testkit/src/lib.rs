// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use devdex_app::{
    AttributeValue, Catalog, Device, DeviceId, DeviceImages, Product, ProductLine, ProductLineId,
    RadioId, RadioSpec,
};
use std::collections::BTreeMap;

const PRODUCT_LINES: [(&str, &str); 6] = [
    ("unifi-network", "UniFi"),
    ("unifi-protect", "UniFi Protect"),
    ("unifi-access", "UniFi Access"),
    ("unifi-talk", "UniFi Talk"),
    ("amplifi", "AmpliFi"),
    ("uisp", "UISP"),
];

const FAMILIES: [&str; 10] = [
    "Access Point",
    "Switch",
    "Gateway",
    "Camera",
    "Dream Machine",
    "Cloud Key",
    "Doorbell",
    "Reader",
    "Mesh Router",
    "Bridge",
];

const MODELS: [&str; 12] = [
    "Lite", "Pro", "Max", "Ultra", "Flex", "Mini", "Enterprise", "XG", "Plus", "Bullet", "Dome",
    "Instant",
];

const SHORT_NAME_PREFIXES: [&str; 6] = ["U6", "USW", "UDM", "UVC", "UA", "AFi"];

const SPEEDS: [u32; 5] = [100, 1000, 2500, 5000, 10000];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible device records. Same seed, same catalog.
#[derive(Debug, Clone)]
pub struct DeviceFaker {
    rng: DeterministicRng,
    seed: u64,
    issued: usize,
}

impl DeviceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            issued: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn device(&mut self) -> Device {
        let (line_id, line_name) = PRODUCT_LINES[self.rng.int_n(PRODUCT_LINES.len())];
        self.device_on_line(line_id, line_name)
    }

    pub fn device_on_line(&mut self, line_id: &str, line_name: &str) -> Device {
        let family = self.pick(&FAMILIES);
        let model = self.pick(&MODELS);
        let name = format!("{family} {model}");
        let abbrev = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect::<String>();
        let id = format!("{:08x}-{:04}", self.rng.next_u64() as u32, self.issued);
        self.issued += 1;

        let short_names = (0..self.rng.int_n(3))
            .map(|index| format!("{}-{abbrev}{index}", self.pick(&SHORT_NAME_PREFIXES)))
            .collect();

        let wireless = matches!(family, "Access Point" | "Mesh Router" | "Bridge");
        let mut radios = BTreeMap::new();
        let (max_power, speed) = if wireless {
            for band in ["na", "ng", "6e"].into_iter().take(1 + self.rng.int_n(3)) {
                radios.insert(RadioId::from(band), self.radio());
            }
            (None, None)
        } else {
            let power = self.rng.bool().then(|| {
                AttributeValue::Number((5 + self.rng.int_n(60)) as f64)
            });
            let speed = Some(AttributeValue::Number(f64::from(self.pick_speed())));
            (power, speed)
        };
        let port_count = matches!(family, "Switch" | "Gateway" | "Dream Machine")
            .then(|| [5, 8, 16, 24, 48][self.rng.int_n(5)]);

        Device {
            id: DeviceId::new(id.clone()),
            product_line: ProductLine {
                id: ProductLineId::from(line_id),
                name: line_name.to_owned(),
            },
            product: Product { name, abbrev },
            images: DeviceImages {
                default: self.hash(),
                nopadding: self.hash(),
                topology: self.hash(),
            },
            short_names,
            max_power,
            speed,
            port_count,
            radios,
        }
    }

    pub fn catalog(&mut self, count: usize) -> Catalog {
        Catalog {
            devices: (0..count).map(|_| self.device()).collect(),
            version: format!("testkit-{}", self.seed),
        }
    }

    fn radio(&mut self) -> RadioSpec {
        RadioSpec {
            gain: Some((2 + self.rng.int_n(6)) as f64),
            max_power: Some((18 + self.rng.int_n(12)) as f64),
            max_speed_mbps: Some(f64::from(300 * (1 + self.rng.int_n(16)) as u32)),
        }
    }

    fn pick_speed(&mut self) -> u32 {
        SPEEDS[self.rng.int_n(SPEEDS.len())]
    }

    fn hash(&mut self) -> String {
        format!("{:016x}{:016x}", self.rng.next_u64(), self.rng.next_u64())
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn product_line_names() -> Vec<&'static str> {
    PRODUCT_LINES.iter().map(|(_, name)| *name).collect()
}

/// Catalog serialized the way the remote document is published.
pub fn catalog_json(catalog: &Catalog) -> Result<String> {
    serde_json::to_string(catalog).context("serialize catalog")
}

/// Three devices on lines `A, A, B` named `Alpha, Abacus, Beta`.
pub fn abc_catalog() -> Catalog {
    let mut faker = DeviceFaker::new(7);
    let devices = [("A", "Alpha"), ("A", "Abacus"), ("B", "Beta")]
        .into_iter()
        .enumerate()
        .map(|(index, (line, name))| {
            let mut device = faker.device_on_line(&line.to_ascii_lowercase(), line);
            device.id = DeviceId::new(format!("d{}", index + 1));
            device.product.name = name.to_owned();
            device
        })
        .collect();
    Catalog {
        devices,
        version: "abc".to_owned(),
    }
}

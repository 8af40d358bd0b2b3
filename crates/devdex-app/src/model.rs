// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CatalogError;
use crate::ids::*;

pub const DEFAULT_STATIC_IMAGE_BASE: &str = "https://static.ui.com/fingerprint/ui/images";
pub const DEFAULT_IMAGE_SERVICE_BASE: &str = "https://images.svc.ui.com/";
const IMAGE_QUALITY: u8 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub id: ProductLineId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub abbrev: String,
}

/// Opaque image hash tokens. They are not URLs; see [`ImageUrls`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceImages {
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub nopadding: String,
    #[serde(default)]
    pub topology: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed_mbps: Option<f64>,
}

/// Technical attribute as published: some schema revisions send numbers,
/// others preformatted strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{}", *value as i64)
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(rename = "line")]
    pub product_line: ProductLine,
    pub product: Product,
    #[serde(default)]
    pub images: DeviceImages,
    #[serde(rename = "shortnames", default)]
    pub short_names: Vec<String>,
    #[serde(rename = "maxPower", default, skip_serializing_if = "Option::is_none")]
    pub max_power: Option<AttributeValue>,
    #[serde(rename = "speed", default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<AttributeValue>,
    #[serde(
        rename = "numberOfPorts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub port_count: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub radios: BTreeMap<RadioId, RadioSpec>,
}

impl Device {
    /// Category key used by every filter. The product line id is never used
    /// for grouping.
    pub fn category(&self) -> &str {
        &self.product_line.name
    }

    pub fn name(&self) -> &str {
        &self.product.name
    }

    pub fn short_names_label(&self) -> String {
        self.short_names.join(", ")
    }

    pub fn max_power(&self) -> Option<AttributeValue> {
        if let Some(value) = &self.max_power {
            return Some(value.clone());
        }
        max_radio_value(&self.radios, |radio| radio.max_power).map(AttributeValue::Number)
    }

    pub fn speed_mbps(&self) -> Option<AttributeValue> {
        if let Some(value) = &self.speed {
            return Some(value.clone());
        }
        max_radio_value(&self.radios, |radio| radio.max_speed_mbps).map(AttributeValue::Number)
    }

    pub fn port_count(&self) -> Option<u32> {
        self.port_count
    }
}

fn max_radio_value(
    radios: &BTreeMap<RadioId, RadioSpec>,
    pick: impl Fn(&RadioSpec) -> Option<f64>,
) -> Option<f64> {
    radios
        .values()
        .filter_map(pick)
        .filter(|value| value.is_finite())
        .fold(None, |best, value| match best {
            Some(current) if current >= value => Some(current),
            _ => Some(value),
        })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub devices: Vec<Device>,
    #[serde(default)]
    pub version: String,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn find(&self, id: &DeviceId) -> Result<&Device, CatalogError> {
        self.devices
            .iter()
            .find(|device| &device.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    pub fn device_refs(&self) -> Vec<&Device> {
        self.devices.iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Grid,
}

impl ViewMode {
    pub const ALL: [Self; 2] = [Self::Table, Self::Grid];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Grid => "grid",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Grid => "Grid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(Self::Table),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Table => Self::Grid,
            Self::Grid => Self::Table,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Default,
    NoPadding,
    Topology,
}

impl ImageKind {
    const fn folder(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NoPadding => "nopadding",
            Self::Topology => "topology",
        }
    }

    fn hash(self, images: &DeviceImages) -> &str {
        match self {
            Self::Default => &images.default,
            Self::NoPadding => &images.nopadding,
            Self::Topology => &images.topology,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Thumbnail,
    Small,
    Medium,
    Large,
}

impl ImageSize {
    pub const fn pixels(self) -> u32 {
        match self {
            Self::Thumbnail => 32,
            Self::Small => 85,
            Self::Medium => 150,
            Self::Large => 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    static_base: String,
    service_base: String,
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::new(DEFAULT_STATIC_IMAGE_BASE, DEFAULT_IMAGE_SERVICE_BASE)
    }
}

impl ImageUrls {
    pub fn new(static_base: &str, service_base: &str) -> Self {
        Self {
            static_base: static_base.trim_end_matches('/').to_owned(),
            service_base: service_base.to_owned(),
        }
    }

    /// Resizing-service URL for one of the device's images. `None` when the
    /// device carries no hash for that image.
    pub fn url(&self, device: &Device, kind: ImageKind, size: ImageSize) -> Option<String> {
        let hash = kind.hash(&device.images);
        if hash.is_empty() {
            return None;
        }
        let source = format!(
            "{}/{}/{}/{}.png",
            self.static_base,
            device.id,
            kind.folder(),
            hash
        );
        let encoded: String = url::form_urlencoded::byte_serialize(source.as_bytes()).collect();
        let separator = if self.service_base.contains('?') {
            "&"
        } else {
            "?"
        };
        Some(format!(
            "{}{separator}u={encoded}&w={}&q={IMAGE_QUALITY}",
            self.service_base,
            size.pixels()
        ))
    }
}

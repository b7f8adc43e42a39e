use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FIRST_HOLE_KEY: &str = "FIRST_HOLE";
pub const LAST_HOLE_KEY: &str = "LAST_HOLE";
pub const AVG_HOLE_WIDTH_KEY: &str = "AVG_HOLE_WIDTH";
pub const IMAGE_WIDTH_KEY: &str = "IMAGE_WIDTH";
pub const IMAGE_LENGTH_KEY: &str = "IMAGE_LENGTH";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollMetadata {
    entries: BTreeMap<String, String>,
}

impl RollMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn first_hole_px(&self) -> Option<i64> {
        self.get(FIRST_HOLE_KEY).and_then(parse_pixels)
    }

    pub fn last_hole_px(&self) -> Option<i64> {
        self.get(LAST_HOLE_KEY).and_then(parse_pixels)
    }

    pub fn avg_hole_width_px(&self) -> Option<i64> {
        self.get(AVG_HOLE_WIDTH_KEY).and_then(parse_pixels)
    }

    pub fn image_width_px(&self) -> Option<i64> {
        self.get(IMAGE_WIDTH_KEY).and_then(parse_pixels)
    }

    pub fn image_length_px(&self) -> Option<i64> {
        self.get(IMAGE_LENGTH_KEY).and_then(parse_pixels)
    }
}

/// Parses `@KEY:\t...\tvalue`. The value is the last non-empty tab-separated field.
pub fn parse_metadata_text(text: &str) -> Option<(String, String)> {
    let body = text.trim_start().strip_prefix('@')?;
    let (key, rest) = body.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = rest
        .split('\t')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .last()?;
    Some((key.to_string(), value.to_string()))
}

pub fn parse_pixels(value: &str) -> Option<i64> {
    let digits = value.trim().trim_end_matches("px").trim();
    if let Ok(px) = digits.parse::<i64>() {
        return Some(px);
    }
    digits
        .parse::<f64>()
        .ok()
        .filter(|px| px.is_finite())
        .map(|px| px.trunc() as i64)
}

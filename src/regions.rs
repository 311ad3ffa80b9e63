//! Region catalogue.
//!
//! Bounding boxes for the 47 Japanese prefectures, keyed by the prefecture
//! name as it appears in OpenStreetMap `name` tags. Upstream queries are
//! scoped to one of these regions.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{OptionExt, Result};
use crate::Bounds;

/// Prefecture bounding boxes as (name, south/west/north/east).
pub static PREFECTURES: [(&str, Bounds); 47] = [
    ("北海道", Bounds::new(41.4, 139.4, 45.5, 145.8)),
    ("青森県", Bounds::new(40.2, 139.5, 41.6, 141.7)),
    ("岩手県", Bounds::new(38.9, 140.8, 40.4, 142.1)),
    ("宮城県", Bounds::new(37.8, 140.3, 38.9, 141.7)),
    ("秋田県", Bounds::new(39.1, 139.6, 40.7, 141.0)),
    ("山形県", Bounds::new(37.7, 139.5, 39.0, 140.7)),
    ("福島県", Bounds::new(36.8, 139.3, 38.0, 141.1)),
    ("茨城県", Bounds::new(35.7, 139.7, 36.9, 140.9)),
    ("栃木県", Bounds::new(36.2, 139.3, 37.0, 140.3)),
    ("群馬県", Bounds::new(36.0, 138.4, 36.7, 139.5)),
    ("埼玉県", Bounds::new(35.7, 138.7, 36.3, 139.9)),
    ("千葉県", Bounds::new(34.9, 139.7, 35.9, 140.9)),
    ("東京都", Bounds::new(35.5, 138.9, 35.9, 139.9)),
    ("神奈川県", Bounds::new(35.1, 138.9, 35.6, 139.8)),
    ("新潟県", Bounds::new(36.7, 137.6, 38.6, 139.9)),
    ("富山県", Bounds::new(36.3, 136.8, 36.9, 137.7)),
    ("石川県", Bounds::new(36.0, 136.2, 37.9, 137.4)),
    ("福井県", Bounds::new(35.3, 135.4, 36.4, 136.9)),
    ("山梨県", Bounds::new(35.1, 138.2, 36.0, 139.2)),
    ("長野県", Bounds::new(35.1, 137.3, 37.1, 138.9)),
    ("岐阜県", Bounds::new(35.3, 136.5, 36.3, 137.9)),
    ("静岡県", Bounds::new(34.6, 137.5, 35.4, 139.2)),
    ("愛知県", Bounds::new(34.6, 136.7, 35.4, 137.8)),
    ("三重県", Bounds::new(33.7, 135.8, 35.0, 136.9)),
    ("滋賀県", Bounds::new(34.8, 135.8, 35.7, 136.5)),
    ("京都府", Bounds::new(34.8, 134.9, 35.8, 135.9)),
    ("大阪府", Bounds::new(34.3, 135.1, 35.0, 135.7)),
    ("兵庫県", Bounds::new(34.3, 134.3, 35.7, 135.5)),
    ("奈良県", Bounds::new(33.9, 135.7, 34.8, 136.2)),
    ("和歌山県", Bounds::new(33.4, 135.1, 34.4, 136.0)),
    ("鳥取県", Bounds::new(35.1, 133.2, 35.7, 134.5)),
    ("島根県", Bounds::new(34.3, 131.8, 36.0, 133.5)),
    ("岡山県", Bounds::new(34.3, 133.2, 35.4, 134.5)),
    ("広島県", Bounds::new(34.0, 132.0, 35.1, 133.5)),
    ("山口県", Bounds::new(33.7, 130.8, 34.7, 132.5)),
    ("徳島県", Bounds::new(33.6, 133.5, 34.3, 134.8)),
    ("香川県", Bounds::new(34.0, 133.4, 34.5, 134.5)),
    ("愛媛県", Bounds::new(32.9, 132.4, 34.3, 133.4)),
    ("高知県", Bounds::new(32.7, 132.5, 33.9, 134.3)),
    ("福岡県", Bounds::new(33.0, 130.1, 34.0, 131.3)),
    ("佐賀県", Bounds::new(33.0, 129.8, 33.6, 130.5)),
    ("長崎県", Bounds::new(32.6, 128.7, 34.7, 130.4)),
    ("熊本県", Bounds::new(32.0, 130.3, 33.3, 131.3)),
    ("大分県", Bounds::new(32.8, 130.8, 33.7, 132.0)),
    ("宮崎県", Bounds::new(31.4, 130.7, 32.9, 131.9)),
    ("鹿児島県", Bounds::new(28.0, 128.3, 32.2, 131.5)),
    ("沖縄県", Bounds::new(24.0, 122.9, 28.0, 132.0)),
];

static REGION_INDEX: Lazy<HashMap<&'static str, Bounds>> =
    Lazy::new(|| PREFECTURES.iter().copied().collect());

/// Bounding box for a region, if it is in the catalogue.
pub fn region_bounds(name: &str) -> Option<Bounds> {
    REGION_INDEX.get(name.trim()).copied()
}

/// Like [`region_bounds`], failing with `UnknownRegion`.
pub fn require_region(name: &str) -> Result<Bounds> {
    region_bounds(name).ok_or_unknown_region(name)
}

/// All region names in catalogue order.
pub fn region_names() -> impl Iterator<Item = &'static str> {
    PREFECTURES.iter().map(|(name, _)| *name)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One gallery entry supplied by the host.
///
/// `image` is an opaque reference (URL on the web, file path natively)
/// resolved by the host's [`crate::ImageLoader`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub image: String,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "en-US".to_string()
}

const DEFAULT_TITLES: [&str; 8] = [
    "Northern Lights",
    "Harbour at Dawn",
    "Desert Bloom",
    "Glass Forest",
    "City in Rain",
    "Tidal Pools",
    "High Pass",
    "Lantern Market",
];

/// Built-in gallery used when a host is given no items.
pub fn default_items() -> Vec<MenuItem> {
    DEFAULT_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| MenuItem {
            image: format!("https://picsum.photos/seed/menu{i}/512/512"),
            title: (*title).to_string(),
            date: DateTime::<Utc>::from_timestamp(1_704_067_200 + i as i64 * 86_400 * 37, 0)
                .unwrap_or_default(),
            link: None,
            locale: default_locale(),
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

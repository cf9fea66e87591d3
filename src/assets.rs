use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Asset;

pub fn get_asset_bytes(name: &str) -> Option<Cow<'static, [u8]>> {
    Asset::get(name).map(|f| f.data)
}

/// Returns the embedded grid file for a level, if one exists.
pub fn level_text(level: u32) -> Option<String> {
    let name = format!("levels/{}.txt", level);
    get_asset_bytes(&name).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Counts the embedded level files so screens can clamp the selectable range.
pub fn level_count() -> u32 {
    let mut count = 0;
    while level_text(count + 1).is_some() {
        count += 1;
    }
    count
}

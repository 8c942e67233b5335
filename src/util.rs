use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn ellipsize(label: &str, max_chars: usize) -> std::borrow::Cow<'_, str> {
    if label.chars().count() <= max_chars {
        return label.into();
    }

    let mut shortened = label
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened.into()
}

/// Deterministic pair in `[-1, 1]` derived from `key`.
pub fn stable_pair(key: impl Hash) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

//! Class index to display label mapping for the fruit quality models.

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label for a class index reported by the classification service.
///
/// Indices outside the trained set map to `None`; use [`label_or_unknown`]
/// for display.
pub fn label_for(index: i64) -> Option<&'static str> {
    let label = match index {
        0 => "Apple (Bad)",
        1 => "Apple (Good)",
        2 => "Apple (Mixed)",
        3 => "Banana (Bad)",
        4 => "Banana (Good)",
        5 => "Banana (Mixed)",
        6 => "Guava (Bad)",
        7 => "Guava (Good)",
        8 => "Guava (Mixed)",
        9 => "Lemon (Mixed)",
        10 => "Lime (Bad)",
        11 => "Lime (Good)",
        12 => "Orange (Bad)",
        13 => "Orange (Good)",
        14 => "Orange (Mixed)",
        15 => "Pomegranate (Bad)",
        16 => "Pomegranate (Good)",
        17 => "Pomegranate (Mixed)",
        _ => return None,
    };
    Some(label)
}

pub fn label_or_unknown(index: i64) -> &'static str {
    label_for(index).unwrap_or(UNKNOWN_LABEL)
}

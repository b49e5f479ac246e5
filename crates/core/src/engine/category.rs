//! Category normalization. Catalog rows carry raw category strings in a mix
//! of spellings (accented Vietnamese, abbreviations, English); scope rows may
//! use any of them. Both sides are folded to one canonical token before
//! comparison.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalCategory {
    Drink,
    Cake,
    Food,
    Other,
    /// Sentinel for null or unrecognized input. Never satisfies a scope
    /// include, so null-category products cannot silently qualify for broad
    /// category promotions.
    Unknown,
}

pub fn normalize(raw: Option<&str>) -> CanonicalCategory {
    let Some(raw) = raw else {
        return CanonicalCategory::Unknown;
    };

    match fold(raw).as_str() {
        "DRINK" | "DRINKS" | "BEVERAGE" | "NUOC" | "DO UONG" | "THUC UONG" => {
            CanonicalCategory::Drink
        }
        "CAKE" | "CAKES" | "BANH" | "BANH NGOT" => CanonicalCategory::Cake,
        "FOOD" | "DO AN" | "MON AN" => CanonicalCategory::Food,
        "OTHER" | "KHAC" => CanonicalCategory::Other,
        _ => CanonicalCategory::Unknown,
    }
}

/// Uppercase, strip diacritics, collapse internal whitespace.
fn fold(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.trim().chars().flat_map(char::to_uppercase) {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !folded.is_empty() {
            folded.push(' ');
        }
        pending_space = false;
        folded.push(strip_diacritic(c));
    }
    folded
}

fn strip_diacritic(c: char) -> char {
    const GROUPS: &[(&str, char)] = &[
        ("ÀÁẢÃẠĂẰẮẲẴẶÂẦẤẨẪẬ", 'A'),
        ("ÈÉẺẼẸÊỀẾỂỄỆ", 'E'),
        ("ÌÍỈĨỊ", 'I'),
        ("ÒÓỎÕỌÔỒỐỔỖỘƠỜỚỞỠỢ", 'O'),
        ("ÙÚỦŨỤƯỪỨỬỮỰ", 'U'),
        ("ỲÝỶỸỴ", 'Y'),
        ("Đ", 'D'),
    ];
    for (group, base) in GROUPS {
        if group.contains(c) {
            return *base;
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::{normalize, CanonicalCategory};

    #[test]
    fn accented_and_plain_spellings_collapse_to_one_token() {
        assert_eq!(normalize(Some("Nước")), CanonicalCategory::Drink);
        assert_eq!(normalize(Some("nuoc")), CanonicalCategory::Drink);
        assert_eq!(normalize(Some("ĐỒ  UỐNG")), CanonicalCategory::Drink);
        assert_eq!(normalize(Some("drink")), CanonicalCategory::Drink);
        assert_eq!(normalize(Some("Bánh")), CanonicalCategory::Cake);
        assert_eq!(normalize(Some("CAKE")), CanonicalCategory::Cake);
    }

    #[test]
    fn null_and_unrecognized_input_map_to_unknown() {
        assert_eq!(normalize(None), CanonicalCategory::Unknown);
        assert_eq!(normalize(Some("")), CanonicalCategory::Unknown);
        assert_eq!(normalize(Some("giftcard")), CanonicalCategory::Unknown);
    }
}

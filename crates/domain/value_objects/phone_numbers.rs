const ARGENTINA: &str = "54";

/// Reduces a user-typed phone number to the digits-only international form
/// the messaging API expects. Returns `None` for obviously unusable input.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(stripped) = digits.strip_prefix("00") {
        digits = stripped.to_string();
    } else if !raw.trim_start().starts_with('+') && !digits.starts_with(default_country_code) {
        let local = digits.trim_start_matches('0');
        digits = format!("{default_country_code}{local}");
    }

    if let Some(national) = digits.strip_prefix(ARGENTINA) {
        digits = format!("{ARGENTINA}{}", argentine_mobile(national));
    }

    (8..=15).contains(&digits.len()).then_some(digits)
}

/// Dialled mobiles look like `<area> 15 <subscriber>` (12 digits); WhatsApp
/// wants `9 <area> <subscriber>`. Area codes are 2 to 4 digits.
fn argentine_mobile(national: &str) -> String {
    let national = national.trim_start_matches('0');
    if national.len() != 12 || national.starts_with('9') {
        return national.to_string();
    }

    (2..=4)
        .find(|&area_len| national[area_len..].starts_with("15"))
        .map(|area_len| {
            format!(
                "9{}{}",
                &national[..area_len],
                &national[area_len + 2..]
            )
        })
        .unwrap_or_else(|| national.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_international_numbers() {
        assert_eq!(
            normalize_phone("+54 9 11 5555-0000", "54").as_deref(),
            Some("5491155550000")
        );
        assert_eq!(
            normalize_phone("0034 600 123 456", "54").as_deref(),
            Some("34600123456")
        );
    }

    #[test]
    fn prefixes_local_numbers() {
        assert_eq!(
            normalize_phone("011 15 5555 0000", "54").as_deref(),
            Some("5491155550000")
        );
        assert_eq!(
            normalize_phone("91155550000", "54").as_deref(),
            Some("5491155550000")
        );
    }

    #[test]
    fn rewrites_dialled_mobile_prefix() {
        assert_eq!(
            normalize_phone("0351 15 555 0000", "54").as_deref(),
            Some("5493515550000")
        );
        assert_eq!(
            normalize_phone("+54 11 15 5555 0000", "54").as_deref(),
            Some("5491155550000")
        );
        // Landlines keep their shape.
        assert_eq!(
            normalize_phone("011 4555 0000", "54").as_deref(),
            Some("541145550000")
        );
    }

    #[test]
    fn other_countries_are_left_alone() {
        assert_eq!(
            normalize_phone("+1 212 15 555 0000", "54").as_deref(),
            Some("1212155550000")
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize_phone("", "54"), None);
        assert_eq!(normalize_phone("abc", "54"), None);
        assert_eq!(normalize_phone("+1234567890123456789", "54"), None);
    }
}

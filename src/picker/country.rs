use crate::models::CountryCode;

/// Tag names that identify a production country, checked in this order.
const ALIASES: &[(CountryCode, &[&str])] = &[
    (
        CountryCode::SouthKorea,
        &[
            "South Korean production",
            "South Korean animation",
            "South Korean anime",
            "South Korean cartoon",
            "aeni",
        ],
    ),
    (
        CountryCode::NorthKorea,
        &[
            "North Korean production",
            "North Korean animation",
            "North Korean anime",
            "North Korean cartoon",
        ],
    ),
    (
        CountryCode::China,
        &[
            "Chinese production",
            "Chinese anime",
            "Chinese cartoon",
            "donghua",
        ],
    ),
    (CountryCode::Japan, &["Japanese production"]),
    (CountryCode::Taiwan, &["Taiwanese production"]),
];

/// Case-insensitive exact lookup of a single tag name.
#[must_use]
pub fn country_for_tag(name: &str) -> Option<CountryCode> {
    let name = name.to_lowercase();
    ALIASES.iter().find_map(|(country, aliases)| {
        aliases
            .iter()
            .any(|alias| alias.to_lowercase() == name)
            .then_some(*country)
    })
}

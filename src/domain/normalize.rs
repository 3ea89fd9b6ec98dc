// src/domain/normalize.rs

/// Canonical form used for every address/city equality test:
/// trimmed, upper-cased, internal whitespace collapsed to single spaces.
///
/// Two addresses are the same place iff their normalized forms are byte-equal.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes several address fragments as if they were one string.
/// Missing fragments count as empty.
pub fn normalize_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let joined = parts
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

use std::cmp::Ordering;

/// Case-insensitive ordering of network identifiers.
///
/// Identifiers differing only in case compare equal.
pub fn compare_network_ids(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sorts identifiers for display, ignoring case. Ties keep their input order.
pub fn sort_network_ids<S: AsRef<str>>(mut ids: Vec<S>) -> Vec<S> {
    ids.sort_by(|a, b| compare_network_ids(a.as_ref(), b.as_ref()));
    ids
}

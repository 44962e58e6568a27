//! Faculty catalog derived from object keys.
//!
//! Objects are stored as `<scope>/<faculty>/.../<file>`, so the faculty is the second path
//! segment of any key nested at least two folders deep.

use std::collections::BTreeSet;

use super::ObjectInfo;

/// Distinct faculty names found in `objects`, sorted.
pub fn faculties_from_objects<'a, I>(objects: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ObjectInfo>,
{
    objects
        .into_iter()
        .filter_map(|object| faculty_of(&object.key))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn faculty_of(key: &str) -> Option<&str> {
    let segments: Vec<&str> = key.split('/').collect();
    match segments.as_slice() {
        [_, faculty, _, ..] if !faculty.is_empty() => Some(*faculty),
        _ => None,
    }
}

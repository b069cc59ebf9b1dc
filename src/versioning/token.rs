use std::fmt;

/// A version marker recovered from a pair of filenames.
///
/// `position` counts characters rather than bytes so that markers sitting
/// after non-ASCII filename segments are re-inserted at the right spot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken {
    /// Marker text exactly as it appears in the versioned filename.
    pub text: String,
    /// Character offset at which the marker was inserted.
    pub position: usize,
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.text, self.position)
    }
}

/// Recover the version marker from a build-versioned filename.
///
/// Scans both filenames left-to-right and assumes the marker is a single
/// contiguous block inserted at the first point of divergence, with the
/// surrounding characters unchanged — not a general string diff. Filenames
/// mangled any other way yield a best-effort token. Returns `None` when the
/// versioned filename is not longer than the original, in which case no
/// marker can be recovered.
pub fn capture_version(original: &str, versioned: &str) -> Option<VersionToken> {
    let original_len = original.chars().count();
    let versioned_len = versioned.chars().count();
    if versioned_len <= original_len {
        return None;
    }

    let position = original
        .chars()
        .zip(versioned.chars())
        .take_while(|(a, b)| a == b)
        .count();

    let text: String = versioned
        .chars()
        .skip(position)
        .take(versioned_len - original_len)
        .collect();

    Some(VersionToken { text, position })
}

/// Splice a recovered version marker into a resolved filename.
///
/// Out-of-range positions leave the filename untouched rather than failing:
/// the resolved path must stay usable even when the marker cannot be
/// restored.
pub fn insert_version(filename: &str, token: &VersionToken) -> String {
    let char_count = filename.chars().count();
    if token.position > char_count {
        return filename.to_string();
    }

    let byte_offset = filename
        .char_indices()
        .nth(token.position)
        .map_or(filename.len(), |(offset, _)| offset);

    let mut versioned = String::with_capacity(filename.len() + token.text.len());
    versioned.push_str(&filename[..byte_offset]);
    versioned.push_str(&token.text);
    versioned.push_str(&filename[byte_offset..]);
    versioned
}

use sha2::{Digest, Sha256};

/// Longest file stem written to disk, leaving room for an extension
pub const MAX_STEM_LEN: usize = 200;

/// Hex digits of the disambiguating suffix on shortened stems
const STEM_HASH_LEN: usize = 16;

/// Replace characters that are unsafe in filenames with `_`
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "-._~%+,@=".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Fit a file stem into [`MAX_STEM_LEN`] bytes
///
/// Long stems are cut on a char boundary and suffixed with a hash of `key`,
/// so two keys sharing a long prefix still get distinct names.
pub fn truncate_stem(mut stem: String, key: &str) -> String {
    if stem.len() <= MAX_STEM_LEN {
        return stem;
    }

    let mut end = MAX_STEM_LEN - STEM_HASH_LEN - 1;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    stem.truncate(end);

    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    stem.push('_');
    stem.push_str(&digest[..STEM_HASH_LEN]);
    stem
}

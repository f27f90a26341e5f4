//! Centralized validation and helper functions.

/// Maximum number of contigs allowed in a single contig set (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Length of the random part of a platform object ID (`record-<24 chars>`)
pub const OBJECT_ID_SUFFIX_LENGTH: usize = 24;

/// Object classes a platform ID may be prefixed with.
pub const OBJECT_CLASSES: &[&str] = &["gtable", "record", "file"];

/// Validate that a string is a well-formed platform object ID.
///
/// IDs look like `<class>-<suffix>` where the class is one of
/// [`OBJECT_CLASSES`] and the suffix is 24 ASCII alphanumerics.
///
/// # Examples
///
/// ```
/// use gri_validator::utils::validation::is_valid_object_id;
///
/// assert!(is_valid_object_id("record-B40jg7v8KfPy38kjz1vQ001y"));
/// assert!(!is_valid_object_id("record-short"));
/// assert!(!is_valid_object_id("project-B40jg7v8KfPy38kjz1vQ001y"));
/// ```
#[must_use]
pub fn is_valid_object_id(s: &str) -> bool {
    let Some((class, suffix)) = s.split_once('-') else {
        return false;
    };

    OBJECT_CLASSES.contains(&class)
        && suffix.len() == OBJECT_ID_SUFFIX_LENGTH
        && suffix.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Derive a deterministic object ID of the given class from a set of parts.
///
/// The parts are joined with tabs and hashed with MD5; the first 24 hex digits
/// form the ID suffix. Importing the same contigs twice yields the same ID.
#[must_use]
pub fn derive_object_id(class: &str, parts: &[String]) -> String {
    let concatenated = parts.join("\t");
    let digest = format!("{:x}", md5::compute(concatenated.as_bytes()));
    format!("{class}-{}", &digest[..OBJECT_ID_SUFFIX_LENGTH])
}

/// Check if adding another contig would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new contig.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_contig_limit(count: usize) -> Option<String> {
    if count >= MAX_CONTIGS {
        Some(format!(
            "Too many contigs: adding another would exceed maximum of {MAX_CONTIGS}"
        ))
    } else {
        None
    }
}

/// Render a 1-based row number as an English ordinal (`1st`, `2nd`, `11th`, ...).
#[must_use]
pub fn ordinal(n: u64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_object_id() {
        assert!(is_valid_object_id("gtable-000000000000000000000001"));
        assert!(is_valid_object_id("file-B40jg7v8KfPy38kjz1vQ001y"));
        assert!(!is_valid_object_id("gtable-00000000000000000000001")); // 23 chars
        assert!(!is_valid_object_id("gtable-0000000000000000000000001")); // 25 chars
        assert!(!is_valid_object_id("gtable-00000000000000000000000!"));
        assert!(!is_valid_object_id("applet-000000000000000000000001"));
        assert!(!is_valid_object_id("000000000000000000000001"));
        assert!(!is_valid_object_id(""));
    }

    #[test]
    fn test_derive_object_id() {
        let parts = vec!["chr1".to_string(), "1000".to_string()];
        let id = derive_object_id("record", &parts);

        assert!(id.starts_with("record-"));
        assert!(is_valid_object_id(&id));

        // Same input should give same output
        assert_eq!(id, derive_object_id("record", &parts));
        assert_ne!(id, derive_object_id("record", &["chr2".to_string()]));
    }

    #[test]
    fn test_check_contig_limit() {
        assert!(check_contig_limit(100).is_none());
        assert!(check_contig_limit(MAX_CONTIGS - 1).is_none());
        assert!(check_contig_limit(MAX_CONTIGS).is_some());
        assert!(check_contig_limit(MAX_CONTIGS + 1).is_some());
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(102), "102nd");
        assert_eq!(ordinal(111), "111th");
    }
}

//! Names for branches forksync creates on the operator's behalf

/// Prefix shared by every transient branch.
pub const TRANSIENT_PREFIX: &str = "forksync/tmp-";

/// Build a unique transient branch name for materializing `upstream_ref`.
///
/// `upstream/main` becomes something like `forksync/tmp-upstream-main-1a2b3c4d`.
pub fn transient_branch_name(upstream_ref: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{TRANSIENT_PREFIX}{}-{}", slugify(upstream_ref), &suffix[..8])
}

/// Whether `branch` was created by [`transient_branch_name`].
pub fn is_transient_branch(branch: &str) -> bool {
    branch.starts_with(TRANSIENT_PREFIX)
}

/// Convert a ref name to a flat slug.
///
/// Runs of separators and unsafe characters collapse to one dash; leading
/// and trailing dashes are dropped.
pub fn slugify(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_was_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        result.push_str("ref");
    }
    result
}

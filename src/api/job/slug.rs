/// Slug used when neither company nor title has a letter or digit
const FALLBACK_SLUG: &str = "job";

/// Path-segment slug: lowercased letters and digits (any script), every other
/// run of characters collapsed into a single `-`, no leading or trailing `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug for a new posting, derived from company and title. Never empty.
pub fn job_slug(company_name: &str, title: &str) -> String {
    let slug = slugify(&format!("{} {}", company_name, title));
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

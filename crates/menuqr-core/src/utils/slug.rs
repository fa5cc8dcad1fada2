// Slug generation for public cafe URLs.
//
// A slug is the lowercased name with non-alphanumeric runs collapsed to
// hyphens, plus a short random suffix so two cafes named "Chai Point"
// don't collide.

const SLUG_SUFFIX_ALPHABET: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Build a URL-safe slug from a cafe name.
pub fn slugify(name: &str) -> String {
    let mut base = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            base.push('-');
            last_was_hyphen = true;
        }
    }
    while base.ends_with('-') {
        base.pop();
    }
    if base.is_empty() {
        base.push_str("cafe");
    }

    let suffix = nanoid::nanoid!(3, &SLUG_SUFFIX_ALPHABET);
    format!("{base}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        let slug = slugify("Chai Point & Co.");
        assert!(slug.starts_with("chai-point-co-"));
    }

    #[test]
    fn collapses_runs_and_trims() {
        let slug = slugify("  --Cafe!!  Mocha--  ");
        assert!(slug.starts_with("cafe-mocha-"));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn empty_name_falls_back() {
        let slug = slugify("!!!");
        assert!(slug.starts_with("cafe-"));
    }

    #[test]
    fn suffix_is_three_digits() {
        let slug = slugify("Udupi");
        let suffix = slug.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 3);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}

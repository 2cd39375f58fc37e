use std::future::Future;

/// Lowercase ASCII slug with single dashes between words.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for character in text.chars() {
        if character.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(character.to_ascii_lowercase());
        } else if character.is_whitespace() || character == '-' || character == '_' {
            pending_dash = true;
        }
    }
    slug
}

/// Appends `-1`, `-2`, ... to the slug of `text` until `exists` reports it as free.
pub async fn unique_slug<F, Fut, E>(text: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut base = slugify(text);
    if base.is_empty() {
        base = "item".to_owned();
    }
    if !exists(base.clone()).await? {
        return Ok(base);
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use test_log::test;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Intro to Rust"), "intro-to-rust");
        assert_eq!(slugify("  C++ & Friends!  "), "c-friends");
        assert_eq!(slugify("already-a_slug"), "already-a-slug");
        assert_eq!(slugify("!!!"), "");
    }

    #[test(tokio::test)]
    async fn test_unique_slug_adds_suffix() {
        let taken = ["intro", "intro-1"];
        let slug = unique_slug("Intro", |candidate| async move {
            Ok::<_, Infallible>(taken.contains(&candidate.as_str()))
        })
        .await
        .unwrap();
        assert_eq!(slug, "intro-2");
    }

    #[test(tokio::test)]
    async fn test_unique_slug_for_symbols() {
        let slug = unique_slug("???", |_| async { Ok::<_, Infallible>(false) }).await.unwrap();
        assert_eq!(slug, "item");
    }
}

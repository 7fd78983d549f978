use crate::url::same_host;
use url::Url;

/// Normalizes a raw anchor href found on `base` into a crawlable URL
///
/// # Normalization Rules
///
/// 1. Reject empty hrefs
/// 2. Accept only if the href's host equals the base page's host, or the
///    href is root-relative (`/path`, but not the protocol-relative `//host`)
/// 3. Build the result from the *base* page's scheme and authority plus the
///    href's path; query string and fragment are dropped, so `/a?x=1` and
///    `/a?x=2` collapse to the same URL
///
/// Relative hrefs without a leading slash (`page.html`) carry no host and are
/// rejected, as are `mailto:`/`javascript:` and other host-less schemes.
///
/// # Arguments
///
/// * `base` - URL of the page the href was found on
/// * `raw_href` - The `href` attribute value, untouched
///
/// # Returns
///
/// * `Some(Url)` - Canonical same-host URL
/// * `None` - The link is rejected
///
/// # Examples
///
/// ```
/// use site_indexer::url::normalize_link;
/// use url::Url;
///
/// let base = Url::parse("http://x.com/a").unwrap();
/// assert_eq!(normalize_link(&base, "/b").unwrap().as_str(), "http://x.com/b");
/// assert_eq!(
///     normalize_link(&base, "http://x.com/d?x=1#frag").unwrap().as_str(),
///     "http://x.com/d"
/// );
/// assert!(normalize_link(&base, "//other.com/c").is_none());
/// ```
pub fn normalize_link(base: &Url, raw_href: &str) -> Option<Url> {
    if raw_href.is_empty() {
        return None;
    }

    base.host_str()?;
    let root_relative = raw_href.starts_with('/') && !raw_href.starts_with("//");

    let href = if root_relative {
        base.join(raw_href).ok()?
    } else {
        let href = absolute_href(base, raw_href)?;
        if !same_host(base, &href) {
            return None;
        }
        href
    };

    let mut canonical = base.clone();
    canonical.set_path(href.path());
    canonical.set_query(None);
    canonical.set_fragment(None);
    Some(canonical)
}

/// Parses an href that names its own host, either with a scheme or
/// protocol-relative
fn absolute_href(base: &Url, raw_href: &str) -> Option<Url> {
    match Url::parse(raw_href) {
        Ok(url) => Some(url),
        Err(_) if raw_href.starts_with("//") => base.join(raw_href).ok(),
        Err(_) => None,
    }
}

//! Mirror ordering (`start_sort`) and the Metalink locale filter, per
//! spec.md §4.7.

use super::types::Mirror;

/// Schemes the Segment Worker's [`crate::transport::HttpHost`] can dial.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "ftp"];

fn scheme_of(url: &str) -> Option<&str> {
    url.split_once("://").map(|(scheme, _)| scheme)
}

/// Drops mirrors whose scheme isn't `{http, https, ftp}` or that point at a
/// `.torrent`, then partitions the rest by `location == country`
/// (case-insensitive) and sorts each partition by `preference` descending,
/// local mirrors first.
pub fn start_sort(mirrors: Vec<Mirror>, country: &str) -> Vec<Mirror> {
    let mut usable: Vec<Mirror> = mirrors
        .into_iter()
        .filter(|m| {
            let scheme_ok = scheme_of(&m.url)
                .map(|s| SUPPORTED_SCHEMES.contains(&s))
                .unwrap_or(false);
            scheme_ok && !m.url.ends_with(".torrent")
        })
        .collect();

    let mut local: Vec<Mirror> = Vec::new();
    let mut other: Vec<Mirror> = Vec::new();
    for m in usable.drain(..) {
        let is_local = !country.is_empty()
            && m.location
                .as_deref()
                .map(|loc| loc.eq_ignore_ascii_case(country))
                .unwrap_or(false);
        if is_local {
            local.push(m);
        } else {
            other.push(m);
        }
    }

    local.sort_by(|a, b| b.preference.cmp(&a.preference));
    other.sort_by(|a, b| b.preference.cmp(&a.preference));
    local.extend(other);
    local
}

/// Metalink locale filter: the file node's `os` must be empty or match the
/// process `OS`; its `lang` must be empty, `"any"`, or match process `LANG`.
pub fn matches_locale(
    file_os: Option<&str>,
    file_lang: Option<&str>,
    process_os: &str,
    process_lang: &str,
) -> bool {
    let os_ok = match file_os {
        None => true,
        Some(os) => os.is_empty() || os.eq_ignore_ascii_case(process_os),
    };
    let lang_ok = match file_lang {
        None => true,
        Some(lang) => {
            lang.is_empty() || lang.eq_ignore_ascii_case("any") || lang.eq_ignore_ascii_case(process_lang)
        }
    };
    os_ok && lang_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(url: &str, pref: i32, loc: Option<&str>) -> Mirror {
        let mut mirror = Mirror::new(url).with_preference(pref);
        if let Some(l) = loc {
            mirror = mirror.with_location(l);
        }
        mirror
    }

    #[test]
    fn partitions_local_before_other_and_sorts_by_preference() {
        let mirrors = vec![
            m("https://a/x", 50, Some("US")),
            m("https://b/x", 90, Some("DE")),
            m("https://c/x", 10, Some("DE")),
            m("https://d/x", 100, None),
        ];
        let sorted = start_sort(mirrors, "DE");
        let urls: Vec<&str> = sorted.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b/x", "https://c/x", "https://d/x", "https://a/x"]);
    }

    #[test]
    fn drops_unsupported_scheme_and_torrent() {
        let mirrors = vec![
            m("magnet:?xt=urn:btih:abc", 10, None),
            m("https://a/x.torrent", 10, None),
            m("ftp://b/x", 5, None),
        ];
        let sorted = start_sort(mirrors, "");
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].url, "ftp://b/x");
    }

    #[test]
    fn locale_filter_rules() {
        assert!(matches_locale(None, None, "linux", "en"));
        assert!(matches_locale(Some(""), Some(""), "linux", "en"));
        assert!(matches_locale(Some("linux"), Some("any"), "linux", "en"));
        assert!(matches_locale(Some("linux"), Some("en"), "linux", "en"));
        assert!(!matches_locale(Some("windows"), None, "linux", "en"));
        assert!(!matches_locale(None, Some("fr"), "linux", "en"));
    }
}

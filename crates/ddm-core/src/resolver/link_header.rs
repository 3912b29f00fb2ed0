//! RFC 6249 `Link` header parsing for the Metalink-over-HTTP classification
//! path (spec.md §4.7 step 2, "Link response header … each
//! `<url>; rel=\"duplicate\"; pri=N; type=…` becomes a Mirror").

/// One parsed `Link` header entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub url: String,
    pub rel: Option<String>,
    pub pri: Option<i32>,
    pub media_type: Option<String>,
}

/// Splits a `Link` header value into its comma-separated entries, respecting
/// the `<...>` URL delimiters (a URL itself may contain a comma, the
/// surrounding params never do).
pub fn parse_link_header(value: &str) -> Vec<LinkEntry> {
    value
        .split(",")
        .filter_map(|raw| parse_one_link(raw.trim()))
        .collect()
}

fn parse_one_link(raw: &str) -> Option<LinkEntry> {
    let (url_part, rest) = raw.split_once('>')?;
    let url = url_part.trim_start_matches('<').trim().to_string();
    if url.is_empty() {
        return None;
    }

    let mut rel = None;
    let mut pri = None;
    let mut media_type = None;
    for param in rest.split(';') {
        let param = param.trim();
        if let Some((name, v)) = param.split_once('=') {
            let name = name.trim().to_ascii_lowercase();
            let v = v.trim().trim_matches('"').to_string();
            match name.as_str() {
                "rel" => rel = Some(v),
                "pri" => pri = v.parse::<i32>().ok(),
                "type" => media_type = Some(v),
                _ => {}
            }
        }
    }

    Some(LinkEntry {
        url,
        rel,
        pri,
        media_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duplicate_and_describedby_entries() {
        let header = r#"<https://a/x.iso>; rel="duplicate"; pri=1; type="application/octet-stream", <https://b/x.iso>; rel="duplicate"; pri=2, <https://a/x.iso.sig>; rel="describedby"; type="application/pgp-signature""#;
        let entries = parse_link_header(header);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].url, "https://a/x.iso");
        assert_eq!(entries[0].rel.as_deref(), Some("duplicate"));
        assert_eq!(entries[0].pri, Some(1));
        assert_eq!(entries[1].pri, Some(2));
        assert_eq!(entries[2].rel.as_deref(), Some("describedby"));
        assert_eq!(entries[2].media_type.as_deref(), Some("application/pgp-signature"));
    }

    #[test]
    fn ignores_malformed_entries() {
        let entries = parse_link_header("not-a-link-entry, <https://ok/x>; rel=\"duplicate\"");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://ok/x");
    }
}

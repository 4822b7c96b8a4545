/// Prefix of every derived identifier
pub const ID_PREFIX: &str = "warning";

/// Number of trailing URL characters kept in an identifier
pub const ID_SUFFIX_LEN: usize = 40;

/// Derives a stable, file-name-safe identifier from a warning's URL
///
/// Path separators are removed, the last 40 characters are kept, any
/// character outside `[A-Za-z0-9._-]` becomes `_`, and the result is
/// prefixed with `"warning"`.
///
/// Two URLs sharing the same 40-character tail map to the same identifier;
/// the later record then overwrites the earlier one in the sink.
///
/// # Examples
///
/// ```
/// use fma_warnings::output::derive_id;
///
/// let id = derive_id("https://www.fma.govt.nz/warnings/acme-ltd/");
/// assert_eq!(id, "warninghttps_www.fma.govt.nzwarningsacme-ltd");
/// assert_eq!(id, derive_id("https://www.fma.govt.nz/warnings/acme-ltd/"));
/// ```
pub fn derive_id(url: &str) -> String {
    let stripped: Vec<char> = url.chars().filter(|c| *c != '/').collect();
    let tail_start = stripped.len().saturating_sub(ID_SUFFIX_LEN);

    let mut id = String::with_capacity(ID_PREFIX.len() + ID_SUFFIX_LEN);
    id.push_str(ID_PREFIX);
    id.extend(stripped[tail_start..].iter().map(|c| sanitize(*c)));
    id
}

fn sanitize(c: char) -> char {
    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
        c
    } else {
        '_'
    }
}

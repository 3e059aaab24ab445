//! Link namespace checks. Pure functions, no state.

use crate::error::Rejection;

/// Fixed leading path segments of a catalog-item link (`api/products/:id`).
pub const ITEM_PATH_SEGMENTS: [&str; 2] = ["api", "products"];

const MIN_ITEM_ID_LEN: usize = 3;
const MAX_ITEM_ID_LEN: usize = 50;
const RESERVED_ITEM_IDS: [&str; 3] = ["null", "undefined", "test"];

/// Extracts the raw item id from a catalog-item link under `origin`.
///
/// Returns `None` for anything that is not exactly
/// `{origin}/api/products/{id}`. The id is not allow-listed here; pass it
/// through [`is_valid_item_id`].
#[must_use]
pub fn parse_item_url(origin: &str, url: &str) -> Option<String> {
    match_item_path(origin, url).ok()
}

/// Same as [`parse_item_url`] but says which check failed.
pub(crate) fn match_item_path(origin: &str, url: &str) -> Result<String, Rejection> {
    let rest = url.strip_prefix(origin).ok_or(Rejection::NotThisApp)?;

    // "https://shop.test.evil/..." shares the prefix but not the host
    if !(rest.is_empty() || rest.starts_with(['/', '?', '#'])) {
        return Err(Rejection::NotThisApp);
    }

    let path = rest.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [first, second, id]
            if *first == ITEM_PATH_SEGMENTS[0] && *second == ITEM_PATH_SEGMENTS[1] =>
        {
            urlencoding::decode(id)
                .map(|decoded| decoded.into_owned())
                .map_err(|_| Rejection::WrongShape)
        }
        _ => Err(Rejection::WrongShape),
    }
}

/// Defensive allow-list for ids arriving from outside the app.
///
/// Rejects:
/// - empty or whitespace-only ids
/// - fewer than 3 or more than 50 characters
/// - ids made only of `0`
/// - `null`, `undefined`, `test` in any case
/// - anything containing `<` or `>`
///
/// This is not a business-id format check.
#[must_use]
pub fn is_valid_item_id(id: &str) -> bool {
    if id.trim().is_empty() {
        return false;
    }

    let len = id.chars().count();
    if !(MIN_ITEM_ID_LEN..=MAX_ITEM_ID_LEN).contains(&len) {
        return false;
    }

    if id.chars().all(|c| c == '0') {
        return false;
    }

    if RESERVED_ITEM_IDS
        .iter()
        .any(|reserved| id.eq_ignore_ascii_case(reserved))
    {
        return false;
    }

    !id.contains(['<', '>'])
}

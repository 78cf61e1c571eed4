/// Collapse internal whitespace runs (including newlines) to single spaces and
/// trim the ends.
///
/// Vendor workbooks wrap header labels across lines and pad cells with
/// non-uniform spacing; every label comparison in the parsers goes through
/// this first.
pub fn collapse_ws(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

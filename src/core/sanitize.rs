// src/core/sanitize.rs

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Split a rendered line into columns on tab or 2+ space runs.
/// Single spaces stay inside a column ("Rua do Carmo" is one value).
pub fn split_columns(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut spaces = 0usize;
    for ch in s.chars() {
        match ch {
            '\t' => {
                let cell = cur.trim();
                if !cell.is_empty() { out.push(cell.to_string()); }
                cur.clear();
                spaces = 0;
            }
            ' ' => { spaces += 1; cur.push(' '); }
            _ => {
                if spaces >= 2 {
                    // spaces are single bytes; the cut is on a char boundary
                    let cell = cur[..cur.len() - spaces].trim().to_string();
                    if !cell.is_empty() { out.push(cell); }
                    cur.clear();
                }
                spaces = 0;
                cur.push(ch);
            }
        }
    }
    let cell = cur.trim();
    if !cell.is_empty() { out.push(cell.to_string()); }
    out
}

/// Node label → filesystem-safe name. Invalid characters become '_',
/// length capped at 200.
pub fn safe_filename(name: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    let out: String = name
        .chars()
        .take(200)
        .map(|c| if INVALID.contains(&c) { '_' } else { c })
        .collect();
    let out = out.trim().to_string();
    if out.is_empty() { s!("node") } else { out }
}

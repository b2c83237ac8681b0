// src/tree/resolver.rs
//
// Maps logical identity (ancestor trail + label) onto whatever ids the
// current rendering happens to use. The widget renumbers everything on each
// postback, so every query here runs against the live document; nothing from
// a previous rendering is trusted.
//
// Widget anatomy: node N's text link id ends in "t{N}" (sometimes "t{N}i"),
// its children container is "<prefix>n{N}Nodes", present even while
// collapsed, merely display:none.

use serde_json::Value;

use crate::browser::Session;
use crate::error::Result;
use crate::tree::driver::NodeHandle;

/// Find the single tree link whose text equals `label` and whose chain of
/// enclosing children-containers spells out `trail` (root first). Falls back
/// to a unique label match when the chain cannot be verified.
pub fn locate(
    session: &Session,
    marker: &str,
    trail: &[String],
    label: &str,
) -> Result<Option<NodeHandle>> {
    let body = format!(
        r#"
        const marker = {marker};
        const want = {label};
        const trail = {trail};
        const links = Array.from(document.querySelectorAll("a[id*='" + marker + "']"));
        const cands = links.filter(a => (a.innerText || '').trim() === want);
        const chainOf = (a) => {{
            const out = [];
            let el = a.parentElement;
            while (el) {{
                const m = el.id && el.id.match(/^(.*)n(\d+)Nodes$/);
                if (m) {{
                    const t = document.getElementById(m[1] + 't' + m[2])
                        || document.getElementById(m[1] + 't' + m[2] + 'i');
                    out.push(t ? (t.innerText || '').trim() : '');
                }}
                el = el.parentElement;
            }}
            return out.reverse();
        }};
        for (const a of cands) {{
            const chain = chainOf(a);
            if (chain.length === trail.length && trail.every((t, i) => t === chain[i])) {{
                return a.id;
            }}
        }}
        return cands.length === 1 ? cands[0].id : null;
        "#,
        marker = js_str(marker),
        label = js_str(label),
        trail = js_str_array(trail),
    );

    match session.eval_json(&body)? {
        Value::String(id) if !id.is_empty() => Ok(Some(NodeHandle { raw_id: id })),
        _ => Ok(None),
    }
}

/// Labels of the node's *direct* children, in display order, deduplicated by
/// link id. Placeholder entries come through as-is; the engine filters them.
pub fn children_labels(session: &Session, marker: &str, handle: &NodeHandle) -> Result<Vec<String>> {
    let body = format!(
        r#"
        const marker = {marker};
        const id = {id};
        const m = id.match(/^(.*)t(\d+)i?$/);
        if (!m) return [];
        const container = document.getElementById(m[1] + 'n' + m[2] + 'Nodes');
        if (!container) return [];
        const out = [];
        const seen = new Set();
        for (const a of container.querySelectorAll("a[id*='" + marker + "']")) {{
            let el = a.parentElement, nearest = null;
            while (el) {{
                if (el.id && /n\d+Nodes$/.test(el.id)) {{ nearest = el; break; }}
                el = el.parentElement;
            }}
            if (nearest !== container) continue; // grandchild, not ours
            if (seen.has(a.id)) continue;
            seen.add(a.id);
            const text = (a.innerText || '').trim();
            if (text) out.push(text);
        }}
        return out;
        "#,
        marker = js_str(marker),
        id = js_str(&handle.raw_id),
    );

    match session.eval_json(&body)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// JSON-escape a Rust string into a JS string literal.
pub(crate) fn js_str(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

pub(crate) fn js_str_array(items: &[String]) -> String {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect()).to_string()
}

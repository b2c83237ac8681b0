// src/tree/actions.rs
//
// The two interaction primitives, `expand` and `select`, plus the
// placeholder-materialisation click. Each one triggers a server postback and
// returns only after the document settled (or the grace fallback elapsed).
// Retry policy is not re-implemented here: everything goes through
// `core::retry::with_backoff`, and fatal errors are never retried.

use serde_json::Value;
use tracing::trace;

use crate::browser::Session;
use crate::config::options::ScrapeOptions;
use crate::core::retry::with_backoff;
use crate::error::{Result, ScrapeError};
use crate::tree::driver::NodeHandle;
use crate::tree::resolver::js_str;

/// Visibility of a node's children container in the current rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Visibility {
    Expanded,
    Collapsed,
    /// Container absent: either a leaf or the DOM was just regenerated.
    Gone,
}

/// Whether the node's row carries an expand/collapse affordance. The widget
/// gives every expandable node two links: an icon link (img with an
/// Expand/Collapse alt) and the text link used by `select`.
pub fn has_expander(session: &Session, handle: &NodeHandle) -> Result<bool> {
    let body = format!(
        r#"
        const el = document.getElementById({id});
        if (!el) return false;
        const tr = el.closest('tr');
        if (!tr) return false;
        for (const a of tr.querySelectorAll('a')) {{
            const img = a.querySelector('img');
            if (!img) continue;
            const alt = img.alt || '';
            const src = img.src || '';
            if (alt.includes('Expand') || alt.includes('Collapse')
                || src.includes('plus') || src.includes('minus')) return true;
        }}
        return false;
        "#,
        id = js_str(&handle.raw_id),
    );
    Ok(session.eval_json(&body)? == Value::Bool(true))
}

/// Reveal the node's children. No-op when the children container is already
/// visible. Visibility is the test, not DOM presence, because the container
/// sits in the DOM (hidden) even while collapsed.
pub fn expand(session: &Session, opts: &ScrapeOptions, handle: &NodeHandle) -> Result<()> {
    with_backoff(
        opts.attempts,
        opts.backoff_step,
        |attempt| {
            if visibility(session, handle)? == Visibility::Expanded {
                trace!(id = %handle.raw_id, "already expanded");
                return Ok(());
            }
            if !click_expander(session, handle)? {
                return Err(ScrapeError::ExpandFailed(s!("expand affordance not found")));
            }
            session.settle();
            session.pause(opts.action_pause);
            match visibility(session, handle)? {
                Visibility::Collapsed => Err(ScrapeError::ExpandFailed(format!(
                    "children container still hidden (attempt {attempt})"
                ))),
                // Expanded, or the postback renumbered the container.
                // The engine re-locates either way.
                _ => Ok(()),
            }
        },
        |e| !e.is_fatal(),
    )
}

/// Load the node's detail panel by clicking its text link.
pub fn select(session: &Session, opts: &ScrapeOptions, handle: &NodeHandle) -> Result<()> {
    with_backoff(
        opts.attempts,
        opts.backoff_step,
        |attempt| {
            if !click_by_id(session, &handle.raw_id)? {
                return Err(ScrapeError::SelectFailed(format!(
                    "node link not in rendering (attempt {attempt})"
                )));
            }
            session.settle();
            session.pause(opts.action_pause);
            Ok(())
        },
        |e| !e.is_fatal(),
    )
}

/// Click the lone placeholder entry in the node's children container so the
/// server materialises the real children. The placeholder itself is never
/// reported upward.
pub fn materialize_placeholder(
    session: &Session,
    opts: &ScrapeOptions,
    handle: &NodeHandle,
    placeholder: &str,
) -> Result<()> {
    let body = format!(
        r#"
        const id = {id};
        const m = id.match(/^(.*)t(\d+)i?$/);
        if (!m) return false;
        const container = document.getElementById(m[1] + 'n' + m[2] + 'Nodes');
        if (!container) return false;
        for (const a of container.querySelectorAll('a')) {{
            if ((a.innerText || '').trim() === {placeholder}) {{
                a.click();
                return true;
            }}
        }}
        return false;
        "#,
        id = js_str(&handle.raw_id),
        placeholder = js_str(placeholder),
    );
    if session.eval_json(&body)? == Value::Bool(true) {
        session.settle();
        session.pause(opts.action_pause);
    }
    Ok(())
}

/* ---------------- probes ---------------- */

fn visibility(session: &Session, handle: &NodeHandle) -> Result<Visibility> {
    let body = format!(
        r#"
        const id = {id};
        const m = id.match(/^(.*)t(\d+)i?$/);
        if (!m) return 'gone';
        const c = document.getElementById(m[1] + 'n' + m[2] + 'Nodes');
        if (!c) return 'gone';
        return window.getComputedStyle(c).display === 'none' ? 'collapsed' : 'expanded';
        "#,
        id = js_str(&handle.raw_id),
    );
    Ok(match session.eval_json(&body)? {
        Value::String(s) if s == "expanded" => Visibility::Expanded,
        Value::String(s) if s == "collapsed" => Visibility::Collapsed,
        _ => Visibility::Gone,
    })
}

fn click_expander(session: &Session, handle: &NodeHandle) -> Result<bool> {
    let body = format!(
        r#"
        const el = document.getElementById({id});
        if (!el) return false;
        const tr = el.closest('tr');
        if (!tr) return false;
        for (const a of tr.querySelectorAll('a')) {{
            const img = a.querySelector('img');
            if (!img) continue;
            const alt = img.alt || '';
            const src = img.src || '';
            if (alt.includes('Expand') || alt.includes('Collapse')
                || src.includes('plus') || src.includes('minus')) {{
                a.click();
                return true;
            }}
        }}
        return false;
        "#,
        id = js_str(&handle.raw_id),
    );
    Ok(session.eval_json(&body)? == Value::Bool(true))
}

/// Click through getElementById rather than a held element reference;
/// references go stale the moment a postback lands.
fn click_by_id(session: &Session, raw_id: &str) -> Result<bool> {
    let body = format!(
        r#"
        const el = document.getElementById({id});
        if (!el) return false;
        el.click();
        return true;
        "#,
        id = js_str(raw_id),
    );
    Ok(session.eval_json(&body)? == Value::Bool(true))
}

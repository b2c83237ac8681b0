// src/tree/live.rs
//
// Browser-backed TreeDriver. Thin glue: identity queries go to the resolver,
// interactions to the action primitives, and the detail panel is snapshotted
// in one evaluate call and handed to the pure extraction pipeline.

use serde_json::Value;
use tracing::debug;

use crate::browser::Session;
use crate::config::consts::{PLACEHOLDER_LABEL, TREE_MARKER};
use crate::config::options::ScrapeOptions;
use crate::error::{Result, ScrapeError};
use crate::extract::{self, DetailPanel};
use crate::record::Record;
use crate::tree::actions;
use crate::tree::driver::{NodeHandle, TreeDriver};
use crate::tree::resolver;

pub struct LiveTree<'a> {
    session: &'a Session,
    opts: &'a ScrapeOptions,
}

impl<'a> LiveTree<'a> {
    pub fn new(session: &'a Session, opts: &'a ScrapeOptions) -> Self {
        Self { session, opts }
    }

    /// Some panels hide the interesting fields behind a view dropdown; when
    /// one is present, flip it to the general-information view and let the
    /// resulting postback settle before harvesting.
    fn nudge_panel_view(&self) -> Result<()> {
        let body = r#"
        for (const sel of document.querySelectorAll('select')) {
            for (const opt of sel.options) {
                const text = (opt.text || '').trim();
                if (/informa..es gerais/i.test(text)) {
                    if (sel.value !== opt.value) {
                        sel.value = opt.value;
                        sel.dispatchEvent(new Event('change', { bubbles: true }));
                        return true;
                    }
                    return false;
                }
            }
        }
        return false;
        "#;
        if self.session.eval_json(body)? == Value::Bool(true) {
            debug!("panel view nudged to general information");
            self.session.settle();
            self.session.pause(self.opts.action_pause);
        }
        Ok(())
    }

    /// Snapshot the detail panel: heading, decree line, every table that is
    /// not part of the tree widget, and the panel's visible text.
    fn harvest_panel(&self) -> Result<DetailPanel> {
        let body = format!(
            r#"
            const marker = {marker};
            const area = document.querySelector("[id*='Conteudo'], .content, main")
                || document.body;

            let title = null;
            for (const h of area.querySelectorAll("h1, h2, h3, [class*='titulo'], .header")) {{
                const t = (h.innerText || '').trim();
                if (t) {{ title = t; break; }}
            }}

            const bodyText = area.innerText || '';
            const dm = bodyText.match(/Decreto[^\n]*/i);
            const decree = dm ? dm[0].trim() : null;

            const tables = [];
            for (const table of area.querySelectorAll('table')) {{
                if (table.querySelector("a[id*='" + marker + "']")) continue;
                const rows = [];
                for (const tr of table.querySelectorAll('tr')) {{
                    const cells = [];
                    for (const cell of tr.querySelectorAll('td, th')) {{
                        cells.push((cell.innerText || '').trim());
                    }}
                    if (cells.length) rows.push(cells);
                }}
                if (rows.length) tables.push(rows);
            }}

            return {{ title: title, decree: decree, tables: tables, text: bodyText }};
            "#,
            marker = resolver::js_str(TREE_MARKER),
        );
        let raw = self.session.eval_json(&body)?;
        serde_json::from_value(raw)
            .map_err(|e| ScrapeError::ExtractionFailed(format!("panel snapshot: {e}")))
    }
}

impl TreeDriver for LiveTree<'_> {
    fn locate(&mut self, trail: &[String], label: &str) -> Result<Option<NodeHandle>> {
        resolver::locate(self.session, TREE_MARKER, trail, label)
    }

    fn has_expander(&mut self, handle: &NodeHandle) -> Result<bool> {
        actions::has_expander(self.session, handle)
    }

    fn expand(&mut self, handle: &NodeHandle) -> Result<()> {
        actions::expand(self.session, self.opts, handle)
    }

    fn select(&mut self, handle: &NodeHandle) -> Result<()> {
        actions::select(self.session, self.opts, handle)
    }

    fn children(&mut self, handle: &NodeHandle) -> Result<Vec<String>> {
        resolver::children_labels(self.session, TREE_MARKER, handle)
    }

    fn materialize_placeholder(&mut self, handle: &NodeHandle) -> Result<()> {
        actions::materialize_placeholder(self.session, self.opts, handle, PLACEHOLDER_LABEL)
    }

    fn extract(&mut self) -> Result<Record> {
        self.nudge_panel_view()?;
        let panel = self.harvest_panel()?;
        Ok(extract::extract(&panel))
    }
}

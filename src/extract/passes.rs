// src/extract/passes.rs
//
// Three ordered passes over the panel, each producing raw (label, value)
// pairs. Exact duplicates keep their first occurrence, so earlier passes win.

use crate::config::consts::MAX_LABEL_LEN;
use crate::core::sanitize::{normalize_ws, split_columns};
use crate::extract::classify;
use crate::extract::DetailPanel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    TwoColumnTable,
    HeaderValueTable,
    TextLines,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawPair {
    pub label: String,
    pub value: String,
    pub pass: Pass,
}

pub fn collect_pairs(panel: &DetailPanel) -> Vec<RawPair> {
    let mut pairs = Vec::new();
    two_column_rows(&panel.tables, &mut pairs);
    header_value_rows(&panel.tables, &mut pairs);
    anchored_line_pairs(&panel.text, &mut pairs);
    dedup_exact(pairs)
}

/// Pass 1: any table row with exactly two non-empty, unequal cells is a
/// (label, value) pair. A row of two known labels sitting on top of a
/// same-width row of non-labels is a header/value pair. That layout belongs
/// to pass 2, so both rows are skipped here.
fn two_column_rows(tables: &[Vec<Vec<String>>], out: &mut Vec<RawPair>) {
    for table in tables {
        let mut i = 0;
        while i < table.len() {
            let row = &table[i];
            i += 1;
            if row.len() != 2 {
                continue;
            }
            let label = normalize_ws(&row[0]);
            let value = normalize_ws(&row[1]);
            if classify::is_known_label(&label) && classify::is_known_label(&value) {
                let header_like = table.get(i).is_some_and(|next| {
                    next.len() == 2
                        && !next.iter().any(|c| classify::is_known_label(&normalize_ws(c)))
                });
                if header_like {
                    i += 1; // value row consumed by pass 2
                    continue;
                }
            }
            if plausible(&label, &value) {
                out.push(RawPair { label, value, pass: Pass::TwoColumnTable });
            }
        }
    }
}

/// Pass 2: "Label1 Label2 / Value1 Value2" table layouts. A row whose cells
/// all look like labels, followed by a same-width row that carries no known
/// label itself, pairs positionally. The value row is consumed.
fn header_value_rows(tables: &[Vec<Vec<String>>], out: &mut Vec<RawPair>) {
    for table in tables {
        let mut i = 0;
        while i + 1 < table.len() {
            let head: Vec<String> = table[i].iter().map(|c| normalize_ws(c)).collect();
            let vals: Vec<String> = table[i + 1].iter().map(|c| normalize_ws(c)).collect();

            let paired = head.len() == vals.len()
                && head.len() >= 2
                && head.iter().all(|h| looks_like_label(h))
                && head.iter().any(|h| classify::is_known_label(h))
                && !vals.iter().any(|v| classify::is_known_label(v));

            if paired {
                for (label, value) in head.into_iter().zip(vals) {
                    if plausible(&label, &value) {
                        out.push(RawPair { label, value, pass: Pass::HeaderValueTable });
                    }
                }
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

/// Pass 3: free-text line pairs. When a line carries a known anchor keyword
/// and splits (on tab / multi-space runs) into as many columns as the line
/// under it, the two lines are a labels/values pair.
fn anchored_line_pairs(text: &str, out: &mut Vec<RawPair>) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut i = 0;
    while i + 1 < lines.len() {
        if !is_anchor_line(lines[i]) {
            i += 1;
            continue;
        }
        let labels = split_columns(lines[i]);
        let values = split_columns(lines[i + 1]);
        if !labels.is_empty() && labels.len() == values.len() {
            for (label, value) in labels.into_iter().zip(values) {
                let label = normalize_ws(&label);
                let value = normalize_ws(&value);
                if plausible(&label, &value) {
                    out.push(RawPair { label, value, pass: Pass::TextLines });
                }
            }
            i += 2; // value line consumed
        } else {
            i += 1;
        }
    }
}

/// Anchor keywords observed on the labels line of the free-text layout:
/// titleholder/role, address, district+postal-code.
fn is_anchor_line(line: &str) -> bool {
    let lc = line.to_lowercase();
    (lc.contains("titular") && lc.contains("cargo"))
        || lc.contains("endereço")
        || lc.contains("endereco")
        || (lc.contains("bairro") && lc.contains("cep"))
}

fn looks_like_label(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().count() <= MAX_LABEL_LEN / 2 && !cell.chars().any(|c| c.is_ascii_digit())
}

fn plausible(label: &str, value: &str) -> bool {
    !label.is_empty()
        && !value.is_empty()
        && label != value
        && label.chars().count() < MAX_LABEL_LEN
}

/// First occurrence of each exact (label, value) wins; pass order is the
/// insertion order, so table passes shadow the text heuristic.
fn dedup_exact(pairs: Vec<RawPair>) -> Vec<RawPair> {
    let mut seen: Vec<(String, String)> = Vec::new();
    let mut out = Vec::with_capacity(pairs.len());
    for p in pairs {
        let key = (p.label.to_lowercase(), p.value.to_lowercase());
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_with_tables(tables: Vec<Vec<Vec<String>>>) -> DetailPanel {
        DetailPanel { tables, ..DetailPanel::default() }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn two_column_rows_become_pairs() {
        let panel = panel_with_tables(vec![vec![
            row(&["Telefone corporativo", "2293-2299"]),
            row(&["", "vazio"]),         // empty label dropped
            row(&["igual", "igual"]),    // label == value dropped
        ]]);
        let pairs = collect_pairs(&panel);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].label, "Telefone corporativo");
        assert_eq!(pairs[0].pass, Pass::TwoColumnTable);
    }

    #[test]
    fn header_row_pairs_positionally() {
        let panel = panel_with_tables(vec![vec![
            row(&["Titular", "Cargo"]),
            row(&["Maria Souza", "Secretária"]),
        ]]);
        let pairs = collect_pairs(&panel);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].label, "Titular");
        assert_eq!(pairs[0].value, "Maria Souza");
        assert_eq!(pairs[1].label, "Cargo");
        assert_eq!(pairs[1].value, "Secretária");
    }

    #[test]
    fn street_value_row_is_not_mistaken_for_header() {
        // row under the candidate header carries a known label itself,
        // so pass 2 must not consume it as a value row
        let panel = panel_with_tables(vec![vec![
            row(&["Endereço", "Rua Afonso Cavalcanti"]),
            row(&["Número", "455"]),
        ]]);
        let pairs = collect_pairs(&panel);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].label, "Endereço");
        assert_eq!(pairs[0].value, "Rua Afonso Cavalcanti");
        assert_eq!(pairs[1].label, "Número");
    }

    #[test]
    fn text_lines_pair_on_anchor_and_equal_split() {
        let panel = DetailPanel {
            text: s!("Endereço  Número\nRua Afonso Cavalcanti  455\nsolta\n"),
            ..DetailPanel::default()
        };
        let pairs = collect_pairs(&panel);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].label, "Endereço");
        assert_eq!(pairs[0].value, "Rua Afonso Cavalcanti");
        assert_eq!(pairs[1].label, "Número");
        assert_eq!(pairs[1].value, "455");
    }

    #[test]
    fn unanchored_lines_are_ignored() {
        let panel = DetailPanel {
            text: s!("Observações  Extra\nvalor um  valor dois\n"),
            ..DetailPanel::default()
        };
        assert!(collect_pairs(&panel).is_empty());
    }

    #[test]
    fn first_pass_wins_on_exact_duplicates() {
        let panel = DetailPanel {
            tables: vec![vec![row(&["Bairro", "Cidade Nova"])]],
            text: s!("Bairro  CEP\nCidade Nova  20211-110\n"),
            ..DetailPanel::default()
        };
        let pairs = collect_pairs(&panel);
        let bairro: Vec<_> = pairs.iter().filter(|p| p.label == "Bairro").collect();
        assert_eq!(bairro.len(), 1);
        assert_eq!(bairro[0].pass, Pass::TwoColumnTable);
        // CEP still arrives from the text pass
        assert!(pairs.iter().any(|p| p.label == "CEP" && p.value == "20211-110"));
    }
}

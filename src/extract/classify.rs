// src/extract/classify.rs
//
// Ordered, data-driven classification of raw (label, value) pairs into the
// record's categories. Keyword sets follow the site's Portuguese labels.
// First matching rule wins; rule order is therefore part of the contract.

use crate::config::consts::VALUE_BLACKLIST;
use crate::core::sanitize::normalize_ws;
use crate::record::{Contact, Record};

#[derive(Clone, Copy, Debug)]
enum Target {
    General(&'static str),
    Street,
    Number,
    Complement,
    District,
    PostalCode,
    City,
    State,
    Contact,
}

#[derive(Clone, Copy, Debug)]
enum Matcher {
    /// Case-insensitive substring match against any keyword.
    Any(&'static [&'static str]),
    /// Whole-label match against any keyword.
    Exact(&'static [&'static str]),
}

struct Rule {
    matcher: Matcher,
    /// Substrings that veto the rule ("telefone corporativo" vs "e-mail").
    exclude: &'static [&'static str],
    target: Target,
}

const RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Any(&[
            "titular", "responsavel", "responsável", "gerente", "coordenador",
            "diretor", "superintendente", "chefe", "nome",
        ]),
        exclude: &[],
        target: Target::General("titleholder"),
    },
    Rule {
        matcher: Matcher::Any(&["cargo", "funcao", "função", "posicao", "posição", "posto"]),
        exclude: &[],
        target: Target::General("role"),
    },
    Rule {
        matcher: Matcher::Exact(&["endereco", "endereço", "logradouro"]),
        exclude: &[],
        target: Target::Street,
    },
    Rule {
        matcher: Matcher::Exact(&["numero", "número", "n.", "no", "nº"]),
        exclude: &[],
        target: Target::Number,
    },
    Rule {
        matcher: Matcher::Exact(&["complemento", "compl.", "compl"]),
        exclude: &[],
        target: Target::Complement,
    },
    Rule {
        matcher: Matcher::Exact(&["bairro", "distrito"]),
        exclude: &[],
        target: Target::District,
    },
    Rule {
        matcher: Matcher::Exact(&["cep", "codigo postal", "código postal", "postal"]),
        exclude: &[],
        target: Target::PostalCode,
    },
    Rule {
        matcher: Matcher::Exact(&["cidade", "municipio", "município", "localidade"]),
        exclude: &[],
        target: Target::City,
    },
    Rule {
        matcher: Matcher::Exact(&["uf", "estado", "unidade federativa"]),
        exclude: &[],
        target: Target::State,
    },
    Rule {
        matcher: Matcher::Any(&[
            "telefone", "fone", "celular", "whatsapp", "tel.", "ramal", "corporativo",
        ]),
        exclude: &["mail"],
        target: Target::Contact,
    },
    Rule {
        matcher: Matcher::Any(&["e-mail", "email", "mail", "correio"]),
        exclude: &[],
        target: Target::Contact,
    },
    Rule {
        matcher: Matcher::Any(&["fax"]),
        exclude: &[],
        target: Target::Contact,
    },
];

/// Labels that ARE street text ("Rua X", "Av. Y") rather than naming a field.
/// Kept out of RULES on purpose: these prefixes also appear in values, so
/// they must not count when the passes probe `is_known_label` to tell header
/// rows from data rows.
const STREET_PREFIXES: &[&str] = &[
    "rua", "avenida", "av.", "praca", "praça", "alameda", "travessa", "estrada",
];

impl Rule {
    fn matches(&self, label_lc: &str) -> bool {
        if self.exclude.iter().any(|x| label_lc.contains(x)) {
            return false;
        }
        match self.matcher {
            Matcher::Any(kws) => kws.iter().any(|k| label_lc.contains(k)),
            Matcher::Exact(kws) => kws.iter().any(|k| label_lc == *k),
        }
    }
}

/// Whether the text names a known field. The passes use this to tell header
/// rows from data rows, so street prefixes are deliberately not consulted.
pub fn is_known_label(label: &str) -> bool {
    let lc = normalize_ws(label).to_lowercase();
    RULES.iter().any(|r| r.matches(&lc))
}

/// Classify one pair into the record. Returns false when the pair was
/// rejected (trivial label/value, blacklisted value, or near-duplicate).
pub fn apply(record: &mut Record, label: &str, value: &str) -> bool {
    let label = normalize_ws(label);
    let value = normalize_ws(value);
    if label.is_empty() || VALUE_BLACKLIST.contains(&value.as_str()) {
        return false;
    }
    if already_captured(record, &value) {
        return false;
    }

    let lc = label.to_lowercase();
    for rule in RULES {
        if rule.matches(&lc) {
            store(record, rule.target, &label, value);
            return true;
        }
    }
    if STREET_PREFIXES.iter().any(|k| lc.contains(k)) {
        store(record, Target::Street, &label, value);
        return true;
    }

    // Unmatched pairs land in `general` under their own label, if substantial.
    if label.chars().count() > 2 && value.chars().count() > 1 {
        record.general.entry(label).or_insert(value);
        return true;
    }
    false
}

fn store(record: &mut Record, target: Target, label: &str, value: String) {
    let slot = match target {
        Target::General(key) => {
            record.general.entry(s!(key)).or_insert(value);
            return;
        }
        Target::Contact => {
            record.contacts.push(Contact { kind: s!(label), value });
            return;
        }
        Target::Street => &mut record.address.street,
        Target::Number => &mut record.address.number,
        Target::Complement => &mut record.address.complement,
        Target::District => &mut record.address.district,
        Target::PostalCode => &mut record.address.postal_code,
        Target::City => &mut record.address.city,
        Target::State => &mut record.address.state,
    };
    // first capture wins, consistent with pass ordering
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Overlapping passes re-surface the same value under slightly different
/// labels; an equal-or-contained value anywhere in the record suppresses the
/// new pair. Contacts compare by equality only.
fn already_captured(record: &Record, value: &str) -> bool {
    let needle = value.to_lowercase();
    record
        .general
        .values()
        .chain(record.address.values())
        .any(|v| v.to_lowercase().contains(&needle))
        || record
            .contacts
            .iter()
            .any(|c| c.value.to_lowercase() == needle)
}

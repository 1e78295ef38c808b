//! Parser for the plain-text reports returned by the lookup API.
//!
//! Reports are line-oriented `Label: value` text. A single table of
//! [`LabelRule`]s drives every report kind: each line is cut into segments
//! at the known labels, and each rule pulls its field out of its label's
//! segment. Parsing never fails; unknown lines are skipped and missing
//! labels leave fields unset.

use crate::models::{PersonField, PersonRecord, PhoneField, PhoneRecord};
use crate::validation::strip_non_digits;
use once_cell::sync::Lazy;
use regex::Regex;

/// How a value is pulled out of a label's segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// The whole segment.
    Rest,
    /// The number token opening the segment, separators removed. Joins
    /// `111.444.777-35` and `(11) 98765-4321`; stops before any qualifier.
    Digits,
    /// The first run of digits (`45 (02/11/1978)` -> `45`).
    Integer,
    /// Text before the first dash (`Masculino - adulto` -> `Masculino`).
    BeforeDash,
    /// Text before a parenthesised qualifier (`01/02/1990 (34 anos)` -> `01/02/1990`).
    Date,
    /// The `NN` of an `(NN anos)` qualifier.
    Age,
}

/// Maps one label to one field.
#[derive(Debug, Clone, Copy)]
pub struct LabelRule<F> {
    pub label: &'static str,
    pub field: F,
    pub extract: Extract,
    /// Restricts the rule to a numbered section such as `telefone 1`.
    pub section: Option<&'static str>,
}

impl<F: Copy> LabelRule<F> {
    pub const fn new(label: &'static str, field: F, extract: Extract) -> Self {
        Self {
            label,
            field,
            extract,
            section: None,
        }
    }

    pub const fn in_section(self, section: &'static str) -> Self {
        Self {
            section: Some(section),
            ..self
        }
    }
}

static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?\d[\d./-]*(?:\)\s?\d[\d-]*)?").expect("number token pattern")
});
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("integer pattern"));
static AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*anos").expect("age pattern"));
/// `Label:` near the start of a line; anything else is a heading or a blank.
static LABEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\p{L}\p{N}]*\p{L}[^:]{0,40}:").expect("label line pattern"));
static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\p{L}\p{N}]*(?i:(telefone|e-?mail))\s*(\d+)\b").expect("section pattern")
});

/// A compiled set of label rules.
#[derive(Debug, Clone)]
pub struct ReportSchema<F> {
    rules: Vec<LabelRule<F>>,
    labels: Regex,
}

impl<F: Copy + PartialEq> ReportSchema<F> {
    pub fn new(rules: Vec<LabelRule<F>>) -> Result<Self, regex::Error> {
        let labels = label_pattern(rules.iter().map(|r| r.label))?;
        Ok(Self { rules, labels })
    }

    /// Keeps only the rules for `fields`. Every label of the full table is
    /// still recognised, so segment boundaries stay the same.
    pub fn restricted_to(&self, fields: &[F]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|r| fields.contains(&r.field))
                .copied()
                .collect(),
            labels: self.labels.clone(),
        }
    }

    /// Calls `emit` for every field found on `line`, in rule order.
    pub fn scan_line(&self, line: &str, section: Option<&str>, mut emit: impl FnMut(F, String)) {
        let segments = self.segments(line);
        if segments.is_empty() {
            return;
        }

        for rule in &self.rules {
            if rule.section.is_some() && rule.section != section {
                continue;
            }
            // Last occurrence on the line wins, as across lines.
            let value = segments
                .iter()
                .rev()
                .find(|(label, _)| *label == rule.label)
                .and_then(|(_, segment)| extract(segment, rule.extract));
            if let Some(value) = value {
                emit(rule.field, value);
            }
        }
    }

    fn segments<'a>(&self, line: &'a str) -> Vec<(&'a str, &'a str)> {
        let found: Vec<_> = self.labels.find_iter(line).collect();
        found
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let end = found.get(i + 1).map_or(line.len(), |next| next.start());
                (m.as_str(), &line[m.end()..end])
            })
            .collect()
    }
}

fn label_pattern<'a>(labels: impl Iterator<Item = &'a str>) -> Result<Regex, regex::Error> {
    let mut labels: Vec<&str> = labels.collect();
    labels.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    labels.dedup();

    let alternatives: Vec<String> = labels
        .iter()
        .map(|label| {
            let escaped = regex::escape(label);
            if label.starts_with(|c: char| c.is_alphanumeric()) {
                format!(r"\b{}", escaped)
            } else {
                escaped
            }
        })
        .collect();

    Regex::new(&alternatives.join("|"))
}

fn extract(segment: &str, mode: Extract) -> Option<String> {
    let cleaned = segment
        .trim()
        .trim_end_matches(['-', '|', ',', ';'])
        .trim();

    let value = match mode {
        Extract::Rest => cleaned.to_string(),
        Extract::Digits => NUMBER_TOKEN
            .find(cleaned)
            .map(|m| strip_non_digits(m.as_str()))
            .unwrap_or_default(),
        Extract::Integer => INTEGER
            .find(cleaned)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        Extract::BeforeDash => cleaned.split('-').next().unwrap_or_default().trim().to_string(),
        Extract::Date => cleaned.split('(').next().unwrap_or_default().trim().to_string(),
        Extract::Age => AGE
            .captures(cleaned)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    };

    (!value.is_empty()).then_some(value)
}

/// Returns the normalised section key (`telefone 1`, `e-mail 2`) when `line`
/// opens a numbered section.
pub fn section_header(line: &str) -> Option<String> {
    let caps = SECTION_HEADER.captures(line)?;
    let kind = caps.get(1)?.as_str().to_lowercase();
    let kind = if kind.starts_with('t') { "telefone" } else { "e-mail" };
    Some(format!("{} {}", kind, caps.get(2)?.as_str()))
}

// ============ Person Reports ============

/// Label table for CPF and name reports.
pub const PERSON_RULES: &[LabelRule<PersonField>] = &[
    LabelRule::new("Nome:", PersonField::Name, Extract::Rest),
    LabelRule::new("CPF:", PersonField::TaxId, Extract::Digits),
    LabelRule::new("Data de Nascimento:", PersonField::BirthDate, Extract::Date),
    LabelRule::new("Data de Nascimento:", PersonField::Age, Extract::Age),
    LabelRule::new("Idade:", PersonField::Age, Extract::Integer),
    LabelRule::new("Sexo:", PersonField::Sex, Extract::BeforeDash),
    LabelRule::new("Gênero:", PersonField::Sex, Extract::BeforeDash),
    LabelRule::new("Nome da Mãe:", PersonField::MotherName, Extract::Rest),
    LabelRule::new("Situação Cadastral:", PersonField::RegistrationStatus, Extract::Rest),
    LabelRule::new("Renda:", PersonField::Income, Extract::Rest),
    LabelRule::new("Naturalidade:", PersonField::Birthplace, Extract::Rest),
    LabelRule::new("Número:", PersonField::Phone, Extract::Digits).in_section("telefone 1"),
    LabelRule::new("Operadora:", PersonField::Carrier, Extract::Rest).in_section("telefone 1"),
    LabelRule::new("E-mail:", PersonField::Email, Extract::Rest).in_section("e-mail 1"),
];

/// Fields a name report carries.
pub const NAME_FIELDS: &[PersonField] = &[
    PersonField::Name,
    PersonField::TaxId,
    PersonField::BirthDate,
    PersonField::Age,
    PersonField::MotherName,
];

static PERSON_SCHEMA: Lazy<ReportSchema<PersonField>> =
    Lazy::new(|| ReportSchema::new(PERSON_RULES.to_vec()).expect("person label table"));
static NAME_SCHEMA: Lazy<ReportSchema<PersonField>> =
    Lazy::new(|| PERSON_SCHEMA.restricted_to(NAME_FIELDS));

/// Parses a report into a single person record with `schema`.
pub fn parse_person_with(text: &str, schema: &ReportSchema<PersonField>) -> PersonRecord {
    let mut record = PersonRecord::default();
    let mut section: Option<String> = None;

    for line in text.lines() {
        if let Some(header) = section_header(line) {
            section = Some(header);
        } else if !LABEL_LINE.is_match(line) {
            // blank line or heading: the numbered section is over
            section = None;
        }
        schema.scan_line(line, section.as_deref(), |field, value| {
            record.set(field, value)
        });
    }

    record
}

/// Parses the report of a CPF lookup.
pub fn parse_person_report(text: &str) -> PersonRecord {
    parse_person_with(text, &PERSON_SCHEMA)
}

/// Parses the report of a full-name lookup.
pub fn parse_name_report(text: &str) -> PersonRecord {
    parse_person_with(text, &NAME_SCHEMA)
}

// ============ Phone Reports ============

/// Line marker opening an owner block.
pub const OWNER_MARKER: &str = "PESSOA";
/// Line marker opening a phone block.
pub const PHONE_MARKER: &str = "TELEFONE";

pub const PHONE_RULES: &[LabelRule<PhoneField>] = &[
    LabelRule::new("CPF/CNPJ:", PhoneField::OwnerTaxId, Extract::Digits),
    LabelRule::new("CPF:", PhoneField::OwnerTaxId, Extract::Digits),
    LabelRule::new("Nome:", PhoneField::OwnerName, Extract::Rest),
    LabelRule::new("Número:", PhoneField::Number, Extract::Digits),
    LabelRule::new("Status:", PhoneField::Status, Extract::Rest),
    LabelRule::new("Tipo:", PhoneField::LineType, Extract::Rest),
    LabelRule::new("Operadora:", PhoneField::Carrier, Extract::Rest),
];

static PHONE_SCHEMA: Lazy<ReportSchema<PhoneField>> =
    Lazy::new(|| ReportSchema::new(PHONE_RULES.to_vec()).expect("phone label table"));

struct PhoneBlock {
    record: PhoneRecord,
    owner: Option<usize>,
}

/// Parses the report of a phone lookup into one record per `TELEFONE` block.
///
/// Owner fields (`PESSOA` blocks) apply to every phone block that follows
/// them until the next owner. Phone blocks listed before any owner take the
/// first owner that appears. Blocks without a number are dropped.
pub fn parse_phone_report(text: &str) -> Vec<PhoneRecord> {
    parse_phone_with(text, &PHONE_SCHEMA)
}

pub fn parse_phone_with(text: &str, schema: &ReportSchema<PhoneField>) -> Vec<PhoneRecord> {
    let mut owners: Vec<PhoneRecord> = Vec::new();
    let mut current_owner: Option<usize> = None;
    let mut current: Option<PhoneBlock> = None;
    let mut blocks: Vec<PhoneBlock> = Vec::new();

    let mut flush = |current: &mut Option<PhoneBlock>| {
        if let Some(block) = current.take() {
            if block.record.number.is_some() {
                blocks.push(block);
            }
        }
    };

    for line in text.lines() {
        if line.contains(OWNER_MARKER) {
            flush(&mut current);
            owners.push(PhoneRecord::default());
            current_owner = Some(owners.len() - 1);
        }
        if line.contains(PHONE_MARKER) {
            flush(&mut current);
            current = Some(PhoneBlock {
                record: PhoneRecord::default(),
                owner: current_owner,
            });
        }

        schema.scan_line(line, None, |field, value| {
            if field.is_owner_field() {
                let idx = *current_owner.get_or_insert_with(|| {
                    owners.push(PhoneRecord::default());
                    owners.len() - 1
                });
                owners[idx].set(field, value);
            } else if let Some(block) = current.as_mut() {
                block.record.set(field, value);
            }
        });
    }
    flush(&mut current);

    blocks
        .into_iter()
        .map(|block| {
            let mut record = block.record;
            let owner = block.owner.or((!owners.is_empty()).then_some(0));
            if let Some(owner) = owner.and_then(|i| owners.get(i)) {
                record.tax_id = owner.tax_id.clone();
                record.name = owner.name.clone();
            }
            record
        })
        .collect()
}

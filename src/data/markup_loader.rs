//! Reads HTML-style table markup into a `DataTable`.
//!
//! Two entry points: a complete `<table>` document (header from `<thead>`,
//! rows from `<tbody>`) and a bare fragment of `<tr>` rows used when the
//! row set is replaced. Recognised conventions:
//!
//! - `<tr data-id="...">` gives the row identity, else the row checkbox's
//!   `value`, else the 1-based position
//! - a checkbox in a header cell marks the selection column; `checked` on a
//!   row checkbox seeds the selection
//! - `class="row-number"` on a body cell marks the sequence-number column
//! - `class="no-export"` on a header cell excludes the column from export
//! - text inside `<button>`, `<select>`, `<textarea>` is control text: it is
//!   searchable but never exported

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::data::datatable::{ColumnKind, DataCell, DataColumn, DataRow, DataTable, RowId};
use crate::error::{TableError, TableResult};

static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static ENTITY: OnceLock<Regex> = OnceLock::new();

const CONTROL_ELEMENTS: &[&str] = &["button", "select", "textarea"];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, Option<String>)>,
    },
    Close(String),
    Text(String),
}

fn collapse_whitespace(text: &str) -> String {
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let re = ENTITY.get_or_init(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());
    re.replace_all(text, |caps: &Captures| {
        let body = &caps[1];
        let decoded = match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ if body.starts_with("#x") || body.starts_with("#X") => {
                u32::from_str_radix(&body[2..], 16).ok().and_then(char::from_u32)
            }
            _ if body.starts_with('#') => body[1..].parse::<u32>().ok().and_then(char::from_u32),
            _ => None,
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == ':')(input)
}

fn attr_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        take_while1(|c: char| !c.is_whitespace() && c != '>'),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, (String, Option<String>)> {
    let (input, _) = multispace1(input)?;
    let (input, name) =
        take_while1(|c: char| !c.is_whitespace() && c != '=' && c != '>' && c != '/')(input)?;
    let (input, value) = opt(preceded(
        tuple((multispace0, char('='), multispace0)),
        attr_value,
    ))(input)?;
    Ok((
        input,
        (name.to_ascii_lowercase(), value.map(decode_entities)),
    ))
}

fn open_tag(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('<')(input)?;
    let (input, name) = tag_name(input)?;
    let (input, attrs) = many0(attribute)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(char('/'))(input)?;
    let (input, _) = char('>')(input)?;
    Ok((
        input,
        Token::Open {
            name: name.to_ascii_lowercase(),
            attrs,
        },
    ))
}

fn close_tag(input: &str) -> IResult<&str, Token> {
    map(
        delimited(tag("</"), tag_name, preceded(multispace0, char('>'))),
        |name: &str| Token::Close(name.to_ascii_lowercase()),
    )(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn declaration(input: &str) -> IResult<&str, &str> {
    delimited(alt((tag("<!"), tag("<?"))), is_not(">"), char('>'))(input)
}

fn token(input: &str) -> IResult<&str, Option<Token>> {
    alt((
        map(comment, |_| None),
        map(declaration, |_| None),
        map(close_tag, Some),
        map(open_tag, Some),
        map(is_not("<"), |text: &str| Some(Token::Text(decode_entities(text)))),
        // a '<' that starts no tag is literal text
        map(char('<'), |_| Some(Token::Text("<".to_string()))),
    ))(input)
}

fn tokenize(input: &str) -> Vec<Token> {
    match many0(token)(input) {
        Ok((rest, tokens)) => {
            if !rest.is_empty() {
                debug!("Markup tokenizer stopped with {} bytes left", rest.len());
            }
            tokens.into_iter().flatten().collect()
        }
        Err(e) => {
            warn!("Markup tokenizer failed: {:?}", e);
            Vec::new()
        }
    }
}

fn attr<'a>(attrs: &'a [(String, Option<String>)], name: &str) -> Option<&'a (String, Option<String>)> {
    attrs.iter().find(|(key, _)| key == name)
}

fn attr_value_of(attrs: &[(String, Option<String>)], name: &str) -> Option<String> {
    attr(attrs, name).and_then(|(_, value)| value.clone())
}

fn has_class(attrs: &[(String, Option<String>)], class: &str) -> bool {
    attr_value_of(attrs, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Head,
    Body,
    Foot,
}

#[derive(Debug, Default)]
struct CellDraft {
    text: String,
    control: String,
    control_depth: usize,
    has_control: bool,
    /// `(checked, value)` of a checkbox inside the cell
    checkbox: Option<(bool, Option<String>)>,
    row_number: bool,
    no_export: bool,
}

#[derive(Debug)]
struct RowDraft {
    section: Section,
    data_id: Option<String>,
    cells: Vec<CellDraft>,
}

#[derive(Debug, Default)]
struct ParsedMarkup {
    saw_table: bool,
    saw_thead: bool,
    saw_tbody: bool,
    rows: Vec<RowDraft>,
    stray_text: bool,
}

fn parse_markup(markup: &str) -> ParsedMarkup {
    let mut parsed = ParsedMarkup::default();
    let mut section = Section::None;
    let mut row: Option<RowDraft> = None;
    let mut cell: Option<CellDraft> = None;

    fn finish_cell(row: &mut Option<RowDraft>, cell: &mut Option<CellDraft>) {
        if let (Some(r), Some(c)) = (row.as_mut(), cell.take()) {
            r.cells.push(c);
        }
    }

    fn finish_row(
        parsed: &mut ParsedMarkup,
        row: &mut Option<RowDraft>,
        cell: &mut Option<CellDraft>,
    ) {
        finish_cell(row, cell);
        if let Some(r) = row.take() {
            parsed.rows.push(r);
        }
    }

    for token in tokenize(markup) {
        match token {
            Token::Open { name, attrs } => match name.as_str() {
                "table" => parsed.saw_table = true,
                "thead" => {
                    finish_row(&mut parsed, &mut row, &mut cell);
                    section = Section::Head;
                    parsed.saw_thead = true;
                }
                "tbody" => {
                    finish_row(&mut parsed, &mut row, &mut cell);
                    section = Section::Body;
                    parsed.saw_tbody = true;
                }
                "tfoot" => {
                    finish_row(&mut parsed, &mut row, &mut cell);
                    section = Section::Foot;
                }
                "tr" => {
                    finish_row(&mut parsed, &mut row, &mut cell);
                    row = Some(RowDraft {
                        section,
                        data_id: attr_value_of(&attrs, "data-id"),
                        cells: Vec::new(),
                    });
                }
                "td" | "th" => {
                    finish_cell(&mut row, &mut cell);
                    if row.is_some() {
                        cell = Some(CellDraft {
                            row_number: has_class(&attrs, "row-number"),
                            no_export: has_class(&attrs, "no-export"),
                            ..CellDraft::default()
                        });
                    }
                }
                "input" => {
                    if let Some(c) = cell.as_mut() {
                        let input_type = attr_value_of(&attrs, "type").unwrap_or_default();
                        if input_type.eq_ignore_ascii_case("checkbox") {
                            let checked = attr(&attrs, "checked").is_some();
                            c.checkbox = Some((checked, attr_value_of(&attrs, "value")));
                        } else {
                            c.has_control = true;
                            if let Some(value) = attr_value_of(&attrs, "value") {
                                c.control.push(' ');
                                c.control.push_str(&value);
                            }
                        }
                    }
                }
                other if CONTROL_ELEMENTS.contains(&other) => {
                    if let Some(c) = cell.as_mut() {
                        c.has_control = true;
                        c.control_depth += 1;
                    }
                }
                _ => {}
            },
            Token::Close(name) => match name.as_str() {
                "td" | "th" => finish_cell(&mut row, &mut cell),
                "tr" => finish_row(&mut parsed, &mut row, &mut cell),
                "thead" | "tbody" | "tfoot" => {
                    finish_row(&mut parsed, &mut row, &mut cell);
                    section = Section::None;
                }
                "table" => finish_row(&mut parsed, &mut row, &mut cell),
                other if CONTROL_ELEMENTS.contains(&other) => {
                    if let Some(c) = cell.as_mut() {
                        c.control_depth = c.control_depth.saturating_sub(1);
                    }
                }
                _ => {}
            },
            Token::Text(text) => {
                if let Some(c) = cell.as_mut() {
                    let target = if c.control_depth > 0 {
                        &mut c.control
                    } else {
                        &mut c.text
                    };
                    target.push(' ');
                    target.push_str(&text);
                } else if row.is_none() && !text.trim().is_empty() {
                    parsed.stray_text = true;
                }
            }
        }
    }
    finish_row(&mut parsed, &mut row, &mut cell);

    parsed
}

fn column_from_header(draft: &CellDraft) -> DataColumn {
    let kind = if draft.checkbox.is_some() {
        ColumnKind::Selection
    } else if draft.has_control {
        ColumnKind::Control
    } else {
        ColumnKind::Data
    };
    DataColumn::new(collapse_whitespace(&draft.text))
        .with_kind(kind)
        .with_no_export(draft.no_export)
}

fn row_from_draft(draft: RowDraft, position: usize) -> DataRow {
    let checkbox = draft.cells.iter().find_map(|c| c.checkbox.clone());

    let id = draft
        .data_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| {
            checkbox
                .as_ref()
                .and_then(|(_, value)| value.clone())
                .filter(|v| !v.trim().is_empty())
        })
        .map(RowId::new)
        .unwrap_or_else(|| RowId::positional(position));

    let cells = draft
        .cells
        .iter()
        .map(|c| {
            let cell = DataCell::new(collapse_whitespace(&c.text));
            let control = collapse_whitespace(&c.control);
            if c.has_control && !control.is_empty() {
                cell.with_control(control)
            } else {
                cell
            }
        })
        .collect();

    let mut row = DataRow::new(id, cells);
    row.selected = checkbox.map(|(checked, _)| checked);
    row
}

fn rows_from_drafts(drafts: Vec<RowDraft>, columns: &[DataColumn]) -> TableResult<Vec<DataRow>> {
    let mut rows = Vec::with_capacity(drafts.len());
    let mut seen: HashSet<RowId> = HashSet::new();
    for (i, draft) in drafts.into_iter().enumerate() {
        let mut row = row_from_draft(draft, i + 1);
        if seen.contains(&row.id) {
            warn!("Repeated row id '{}' at row {}, using position", row.id, i + 1);
            row.id = RowId::positional(i + 1);
        }
        seen.insert(row.id.clone());
        if row.cells.len() != columns.len() {
            return Err(TableError::DataShape(format!(
                "row {} has {} cells but the table has {} columns",
                i + 1,
                row.cells.len(),
                columns.len()
            )));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Builds tables and row sets from markup
pub struct MarkupLoader;

impl MarkupLoader {
    /// Parse a complete `<table>` with `<thead>` and `<tbody>`
    pub fn load_table(markup: &str, name: &str) -> TableResult<DataTable> {
        let parsed = parse_markup(markup);

        if !parsed.saw_table {
            return Err(TableError::Construction(
                "markup has no <table> element".to_string(),
            ));
        }
        if !parsed.saw_tbody {
            return Err(TableError::Construction(
                "table has no <tbody> element".to_string(),
            ));
        }

        let (head, body): (Vec<RowDraft>, Vec<RowDraft>) = parsed
            .rows
            .into_iter()
            .filter(|r| r.section != Section::Foot)
            .partition(|r| r.section == Section::Head);

        let header = head.last().ok_or_else(|| {
            TableError::Construction("table has no <thead> header row".to_string())
        })?;
        if header.cells.is_empty() {
            return Err(TableError::Construction(
                "table header has no cells".to_string(),
            ));
        }

        let mut columns: Vec<DataColumn> = header.cells.iter().map(column_from_header).collect();

        // sequence-number cells are marked on the body, not the header
        for draft in &body {
            for (idx, cell) in draft.cells.iter().enumerate() {
                if cell.row_number {
                    if let Some(col) = columns.get_mut(idx) {
                        if col.kind == ColumnKind::Data {
                            col.kind = ColumnKind::RowNumber;
                        }
                    }
                }
            }
        }

        let rows = rows_from_drafts(body, &columns)?;

        let mut table = DataTable::new(name);
        table.columns = columns;
        table
            .replace_rows(rows)
            .map_err(|e| TableError::Construction(e.to_string()))?;

        debug!(
            "Loaded table '{}' from markup: {} columns, {} rows",
            table.name,
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }

    /// Parse a fragment of `<tr>` rows against an existing header
    pub fn parse_rows(fragment: &str, columns: &[DataColumn]) -> TableResult<Vec<DataRow>> {
        let parsed = parse_markup(fragment);

        let drafts: Vec<RowDraft> = parsed
            .rows
            .into_iter()
            .filter(|r| matches!(r.section, Section::None | Section::Body))
            .collect();

        if drafts.is_empty() && parsed.stray_text {
            return Err(TableError::DataShape(
                "markup fragment contains no <tr> rows".to_string(),
            ));
        }

        rows_from_drafts(drafts, columns)
    }
}

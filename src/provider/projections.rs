//! Projections table parser.
//!
//! The provider publishes projections as an HTML table (`table#data`). Some
//! positions use a single header row; others use two, where the top row
//! holds stat categories (`PASSING`, `RUSHING`, ...) spanning `colspan`
//! leaf headings in the row below. Two-level tables are unflattened into
//! nested per-category objects. The first column is the player and is
//! never grouped.

use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::types::{ProjectionRow, StatValue};

/// Leaf column holding the total projected fantasy points.
const POINTS_COLUMN: &str = "fpts";

// ---------------------------------------------------------------------------
// Header layout
// ---------------------------------------------------------------------------

/// A header cell as it appears in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub text: String,
    pub colspan: usize,
}

impl HeaderCell {
    pub fn new(text: &str, colspan: usize) -> Self {
        Self {
            text: normalise(text),
            colspan: colspan.max(1),
        }
    }
}

/// One leaf column, with the stat category it belongs to (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub group: Option<String>,
    pub key: String,
}

/// Resolve header rows into one `Column` per leaf heading.
///
/// With a single row every column is ungrouped. With two or more, the
/// second-to-last row supplies the groups: walking all of its cells left to
/// right, each cell claims the next `colspan` leaves of the last row. Leaves
/// under a blank cell stay ungrouped, as does the player column and any leaf
/// left over once the cells run out.
pub fn layout_columns(header_rows: &[Vec<HeaderCell>]) -> Result<Vec<Column>> {
    let (leaves, upper) = header_rows
        .split_last()
        .ok_or_else(|| anyhow!("Projections table has no header rows"))?;

    if leaves.is_empty() {
        anyhow::bail!("Projections table header has no columns");
    }

    let spans: &[HeaderCell] = upper.last().map(Vec::as_slice).unwrap_or_default();

    let mut columns = Vec::with_capacity(leaves.len());
    let mut remaining = leaves.iter();
    let mut spanned = 0usize;
    for span in spans {
        spanned += span.colspan;
        for leaf in remaining.by_ref().take(span.colspan) {
            let grouped = !columns.is_empty() && !span.text.is_empty();
            let group = grouped.then(|| span.text.clone());
            columns.push(Column {
                group,
                key: leaf.text.clone(),
            });
        }
    }
    for leaf in remaining {
        columns.push(Column {
            group: None,
            key: leaf.text.clone(),
        });
    }

    if !spans.is_empty() && spanned != leaves.len() {
        warn!(
            spanned,
            leaves = leaves.len(),
            "Projection header groups do not cover the leaf columns exactly"
        );
    }

    Ok(columns)
}

// ---------------------------------------------------------------------------
// Table parsing
// ---------------------------------------------------------------------------

/// Parse a provider projections page into rows, in table order.
pub fn parse_projections_table(html: &str) -> Result<Vec<ProjectionRow>> {
    let document = Html::parse_document(html);

    let table_selector = selector("table#data")?;
    let table = document
        .select(&table_selector)
        .next()
        .context("Projections page has no #data table")?;

    let header_rows = read_header_rows(&table)?;
    let columns = layout_columns(&header_rows)?;

    let row_selector = selector("tbody tr")?;
    let cell_selector = selector("td")?;

    let mut rows = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        rows.push(build_row(extract_player_id(&row), &columns, cells));
    }

    debug!(
        rows = rows.len(),
        columns = columns.len(),
        "Parsed projections table"
    );

    Ok(rows)
}

fn read_header_rows(table: &ElementRef) -> Result<Vec<Vec<HeaderCell>>> {
    let row_selector = selector("thead tr")?;
    let cell_selector = selector("th, td")?;

    let rows: Vec<Vec<HeaderCell>> = table
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| {
                    let colspan = cell
                        .value()
                        .attr("colspan")
                        .and_then(|c| c.trim().parse().ok())
                        .unwrap_or(1);
                    HeaderCell::new(&cell_text(cell), colspan)
                })
                .collect()
        })
        .filter(|cells: &Vec<HeaderCell>| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        anyhow::bail!("Projections table has no header rows");
    }
    Ok(rows)
}

/// Assemble one record from its cells. Cell 0 is the player; `fpts` is
/// lifted out of whichever group holds it.
fn build_row(player_id: Option<String>, columns: &[Column], cells: Vec<String>) -> ProjectionRow {
    let mut row = ProjectionRow {
        player_id,
        ..ProjectionRow::default()
    };

    for (index, value) in cells.into_iter().enumerate() {
        if index == 0 {
            row.player = value;
            continue;
        }
        let Some(column) = columns.get(index) else {
            break;
        };
        if column.key == POINTS_COLUMN {
            row.fpts = parse_points(&value);
            continue;
        }
        match &column.group {
            None => {
                row.stats
                    .insert(column.key.clone(), StatValue::Value(value));
            }
            Some(group) => {
                let entry = row
                    .stats
                    .entry(group.clone())
                    .or_insert_with(|| StatValue::Group(BTreeMap::new()));
                if let StatValue::Group(stats) = entry {
                    stats.insert(column.key.clone(), value);
                }
            }
        }
    }

    row
}

/// Digits of the row's first class token (`mpb-player-16393` -> `16393`).
fn extract_player_id(row: &ElementRef) -> Option<String> {
    let first_class = row.value().attr("class")?.split_whitespace().next()?;
    let digits: String = first_class.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

fn parse_points(value: &str) -> Option<f64> {
    value.replace(',', "").trim().parse().ok()
}

fn cell_text(cell: ElementRef) -> String {
    collapse(&cell.text().collect::<Vec<_>>().join(" "))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalise(text: &str) -> String {
    collapse(text).to_lowercase()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Failed to create selector '{css}': {e}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const QB_TABLE: &str = r#"
        <html><body>
        <table id="data">
          <thead>
            <tr>
              <td class="center"></td>
              <td colspan="5" class="center"><b>PASSING</b></td>
              <td colspan="3" class="center"><b>RUSHING</b></td>
              <td colspan="2" class="center"><b>MISC</b></td>
            </tr>
            <tr>
              <th>Player</th>
              <th>ATT</th><th>CMP</th><th>YDS</th><th>TDS</th><th>INTS</th>
              <th>ATT</th><th>YDS</th><th>TDS</th>
              <th>FL</th><th>FPTS</th>
            </tr>
          </thead>
          <tbody>
            <tr class="mpb-player-17298 odd">
              <td class="player-label"><a href="/nfl/players/josh-allen.php">Josh Allen</a> <a>BUF</a></td>
              <td>519.7</td><td>330.3</td><td>3,887.1</td><td>27.9</td><td>12.0</td>
              <td>97.9</td><td>537.4</td><td>9.1</td>
              <td>2.3</td><td>1,379.5</td>
            </tr>
            <tr class="mpb-player-19780 even">
              <td>Lamar Jackson BAL</td>
              <td>470.2</td><td>310.1</td><td>3,700.0</td><td>26.0</td><td>8.5</td>
              <td>140.3</td><td>820.9</td><td>4.9</td>
              <td>3.1</td><td>360.2</td>
            </tr>
          </tbody>
        </table>
        </body></html>
    "#;

    const K_TABLE: &str = r#"
        <table id="data">
          <thead>
            <tr><th>Player</th><th>FG</th><th>FGA</th><th>XPT</th><th>FPTS</th></tr>
          </thead>
          <tbody>
            <tr class="mpb-player-15014"><td>Justin Tucker BAL</td>
              <td>30.1</td><td>34.2</td><td>41.0</td><td>131.3</td></tr>
            <tr class="spacer"><td>Unknown K</td>
              <td>1</td><td>2</td><td>3</td><td>-</td></tr>
          </tbody>
        </table>
    "#;

    fn cells(specs: &[(&str, usize)]) -> Vec<HeaderCell> {
        specs.iter().map(|(t, c)| HeaderCell::new(t, *c)).collect()
    }

    // -- Header layout --

    #[test]
    fn test_layout_single_row_is_flat() {
        let rows = vec![cells(&[("Player", 1), ("FG", 1), ("FPTS", 1)])];
        let columns = layout_columns(&rows).unwrap();
        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| c.group.is_none()));
        assert_eq!(columns[1].key, "fg");
    }

    #[test]
    fn test_layout_two_rows_assigns_every_leaf_once() {
        let rows = vec![
            cells(&[("", 1), ("Passing", 5), ("Rushing", 3), ("Misc", 2)]),
            cells(&[
                ("Player", 1),
                ("ATT", 1),
                ("CMP", 1),
                ("YDS", 1),
                ("TDS", 1),
                ("INTS", 1),
                ("ATT", 1),
                ("YDS", 1),
                ("TDS", 1),
                ("FL", 1),
                ("FPTS", 1),
            ]),
        ];
        let columns = layout_columns(&rows).unwrap();
        assert_eq!(columns.len(), 11);
        assert_eq!(columns[0].group, None);
        assert_eq!(columns[0].key, "player");
        assert!(columns[1..].iter().all(|c| c.group.is_some()));

        let count = |g: &str| {
            columns
                .iter()
                .filter(|c| c.group.as_deref() == Some(g))
                .count()
        };
        assert_eq!(count("passing"), 5);
        assert_eq!(count("rushing"), 3);
        assert_eq!(count("misc"), 2);
        assert_eq!(columns[6].group.as_deref(), Some("rushing"));
        assert_eq!(columns[6].key, "att");
    }

    #[test]
    fn test_layout_short_groups_leave_trailing_leaves_flat() {
        let rows = vec![
            cells(&[("", 1), ("Receiving", 2)]),
            cells(&[("Player", 1), ("REC", 1), ("YDS", 1), ("FPTS", 1)]),
        ];
        let columns = layout_columns(&rows).unwrap();
        assert_eq!(columns[1].group.as_deref(), Some("receiving"));
        assert_eq!(columns[2].group.as_deref(), Some("receiving"));
        assert_eq!(columns[3].group, None);
        assert_eq!(columns[3].key, "fpts");
    }

    #[test]
    fn test_layout_oversized_groups_stop_at_last_leaf() {
        let rows = vec![
            cells(&[("", 1), ("Passing", 4)]),
            cells(&[("Player", 1), ("ATT", 1), ("YDS", 1)]),
        ];
        let columns = layout_columns(&rows).unwrap();
        assert_eq!(columns.len(), 3);
        assert!(columns[1..]
            .iter()
            .all(|c| c.group.as_deref() == Some("passing")));
    }

    #[test]
    fn test_layout_blank_cell_mid_row_consumes_its_leaves() {
        let rows = vec![
            cells(&[("", 1), ("Passing", 2), ("", 1), ("Misc", 1)]),
            cells(&[("Player", 1), ("A", 1), ("B", 1), ("C", 1), ("FPTS", 1)]),
        ];
        let columns = layout_columns(&rows).unwrap();
        let groups: Vec<(&str, Option<&str>)> = columns
            .iter()
            .map(|c| (c.key.as_str(), c.group.as_deref()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("player", None),
                ("a", Some("passing")),
                ("b", Some("passing")),
                ("c", None),
                ("fpts", Some("misc")),
            ]
        );
    }

    #[test]
    fn test_layout_player_column_never_grouped() {
        let rows = vec![
            cells(&[("Rushing", 2), ("Misc", 1)]),
            cells(&[("Player", 1), ("YDS", 1), ("FL", 1)]),
        ];
        let columns = layout_columns(&rows).unwrap();
        assert_eq!(columns[0].group, None);
        assert_eq!(columns[1].group.as_deref(), Some("rushing"));
        assert_eq!(columns[2].group.as_deref(), Some("misc"));
    }

    #[test]
    fn test_layout_no_rows_is_error() {
        assert!(layout_columns(&[]).is_err());
        assert!(layout_columns(&[vec![]]).is_err());
    }

    #[test]
    fn test_header_cell_clamps_zero_colspan() {
        let cell = HeaderCell::new("  Passing\n ", 0);
        assert_eq!(cell.text, "passing");
        assert_eq!(cell.colspan, 1);
    }

    // -- Full table --

    #[test]
    fn test_parse_grouped_table() {
        let rows = parse_projections_table(QB_TABLE).unwrap();
        assert_eq!(rows.len(), 2);

        let allen = &rows[0];
        assert_eq!(allen.player_id.as_deref(), Some("17298"));
        assert_eq!(allen.player, "Josh Allen BUF");
        assert_eq!(allen.fpts, Some(1379.5));

        let StatValue::Group(passing) = &allen.stats["passing"] else {
            panic!("passing should be grouped");
        };
        assert_eq!(passing["yds"], "3,887.1");
        assert_eq!(passing.len(), 5);

        let StatValue::Group(rushing) = &allen.stats["rushing"] else {
            panic!("rushing should be grouped");
        };
        assert_eq!(rushing["att"], "97.9");

        let StatValue::Group(misc) = &allen.stats["misc"] else {
            panic!("misc should be grouped");
        };
        assert_eq!(misc.len(), 1);
        assert!(!misc.contains_key("fpts"));
    }

    #[test]
    fn test_parse_flat_table() {
        let rows = parse_projections_table(K_TABLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_id.as_deref(), Some("15014"));
        assert_eq!(rows[0].fpts, Some(131.3));
        assert_eq!(rows[0].stats["fg"], StatValue::Value("30.1".into()));
        assert!(!rows[0].stats.contains_key("fpts"));
    }

    #[test]
    fn test_row_without_digits_has_no_id() {
        let rows = parse_projections_table(K_TABLE).unwrap();
        assert_eq!(rows[1].player_id, None);
        assert_eq!(rows[1].fpts, None);
    }

    #[test]
    fn test_missing_table_is_error() {
        let err = parse_projections_table("<html><body><p>maintenance</p></body></html>")
            .unwrap_err();
        assert!(err.to_string().contains("#data"));
    }

    #[test]
    fn test_table_without_header_is_error() {
        let html = r#"<table id="data"><tbody><tr><td>x</td></tr></tbody></table>"#;
        assert!(parse_projections_table(html).is_err());
    }

    #[test]
    fn test_parse_points_strips_thousands() {
        assert_eq!(parse_points("1,234.5"), Some(1234.5));
        assert_eq!(parse_points("-"), None);
    }
}

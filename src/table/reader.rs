//! Participants from rows of cells.

use crate::error::{GroupingError, Result};
use crate::model::Participant;
use std::collections::HashSet;

/// Turns a header row plus data rows into participants.
///
/// The header names the attribute classes. Without `id_column`, each
/// participant's uid is its row number (the header is row 0); with it,
/// that column supplies the uid and is left out of the attributes.
/// Every data row must have exactly as many cells as the header.
///
/// # Examples
///
/// ```
/// use u_groupmix::table::read_participants;
///
/// let rows = vec![
///     vec!["name", "gender", "faculty"],
///     vec!["ann", "w", "2"],
///     vec!["bob", "m", "1"],
/// ];
/// let people = read_participants(&rows, Some("name")).unwrap();
/// assert_eq!(people[1].uid(), "bob");
/// assert_eq!(people[1].attribute("faculty"), Some("1"));
/// assert_eq!(people[1].attribute("name"), None);
/// ```
pub fn read_participants<R, S>(rows: &[R], id_column: Option<&str>) -> Result<Vec<Participant>>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let header: Vec<&str> = match rows.first() {
        Some(h) => h.as_ref().iter().map(AsRef::as_ref).collect(),
        None => {
            return Err(GroupingError::MalformedTable {
                row: 0,
                message: "missing header row".into(),
            })
        }
    };

    let mut seen = HashSet::new();
    if let Some(dup) = header.iter().find(|h| !seen.insert(**h)) {
        return Err(GroupingError::MalformedTable {
            row: 0,
            message: format!("duplicate column {dup:?}"),
        });
    }

    let id_index = match id_column {
        Some(name) => Some(header.iter().position(|h| *h == name).ok_or_else(|| {
            GroupingError::MalformedTable {
                row: 0,
                message: format!("id column {name:?} not found"),
            }
        })?),
        None => None,
    };

    let mut participants = Vec::with_capacity(rows.len().saturating_sub(1));
    let mut uids = HashSet::new();
    for (row_index, row) in rows.iter().enumerate().skip(1) {
        let cells: Vec<&str> = row.as_ref().iter().map(AsRef::as_ref).collect();
        if cells.len() != header.len() {
            return Err(GroupingError::MalformedTable {
                row: row_index,
                message: format!("expected {} cells, got {}", header.len(), cells.len()),
            });
        }

        let uid = match id_index {
            Some(i) => cells[i].to_string(),
            None => row_index.to_string(),
        };
        if !uids.insert(uid.clone()) {
            return Err(GroupingError::invalid(format!(
                "duplicate participant uid {uid:?} at row {row_index}"
            )));
        }

        let attributes = header
            .iter()
            .zip(&cells)
            .enumerate()
            .filter(|(i, _)| Some(*i) != id_index)
            .map(|(_, (class, value))| (*class, *value));
        participants.push(Participant::new(uid, attributes));
    }
    Ok(participants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_numbers_as_uids() {
        let rows = vec![
            vec!["gender", "nation"],
            vec!["m", "mordor"],
            vec!["w", "gondor"],
        ];
        let ps = read_participants(&rows, None).unwrap();
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[0].uid(), "1");
        assert_eq!(ps[1].uid(), "2");
        assert_eq!(ps[1].attribute("nation"), Some("gondor"));
    }

    #[test]
    fn test_row_length_mismatch() {
        let rows = vec![vec!["gender", "nation"], vec!["m"]];
        assert_eq!(
            read_participants(&rows, None),
            Err(GroupingError::MalformedTable {
                row: 1,
                message: "expected 2 cells, got 1".into()
            })
        );
    }

    #[test]
    fn test_blank_rows_are_kept_or_rejected() {
        let rows = vec![vec!["gender"], vec!["m"], vec![""], vec!["w"]];
        let ps = read_participants(&rows, None).unwrap();
        assert_eq!(ps.len(), 3);
        assert_eq!(ps[1].attribute("gender"), Some(""));
        assert_eq!(ps[2].uid(), "3");

        let rows = vec![vec!["gender", "nation"], vec!["m", "rohan"], vec![]];
        assert!(matches!(
            read_participants(&rows, None),
            Err(GroupingError::MalformedTable { row: 2, .. })
        ));
    }

    #[test]
    fn test_missing_header_and_id_column() {
        let none: Vec<Vec<&str>> = vec![];
        assert!(read_participants(&none, None).is_err());

        let rows = vec![vec!["gender"], vec!["m"]];
        assert!(read_participants(&rows, Some("id")).is_err());
    }

    #[test]
    fn test_duplicate_ids_and_columns() {
        let rows = vec![vec!["id", "gender"], vec!["a", "m"], vec!["a", "w"]];
        assert!(matches!(
            read_participants(&rows, Some("id")),
            Err(GroupingError::InvalidParameters(_))
        ));

        let rows = vec![vec!["gender", "gender"], vec!["m", "w"]];
        assert!(read_participants(&rows, None).is_err());
    }
}

//! Line items carried inside header records (orders, invoices).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use kosmos_core::{DomainError, RecordId, Validator};

/// A line owned by a header record.
pub trait Line {
    fn line_id(&self) -> RecordId;
    fn line_number(&self) -> u32;
}

/// Highest line number a command may request.
pub const MAX_LINE_NUMBER: u32 = 99_999;

/// One change to a header's lines, as carried by an edit command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LineChange<A, U> {
    Add(A),
    Update { line_id: RecordId, changes: U },
    Remove { line_id: RecordId },
}

/// Id for the next line added to `lines` (ids are unique per header).
pub fn next_line_id<L: Line>(lines: &[L]) -> RecordId {
    RecordId::new(lines.iter().map(|l| l.line_id().get()).max().unwrap_or(0) + 1)
}

/// The requested number, or one past the highest number in use.
pub fn assign_line_number<L: Line>(lines: &[L], requested: Option<u32>) -> u32 {
    requested.unwrap_or_else(|| {
        lines
            .iter()
            .map(Line::line_number)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    })
}

/// A requested line number must be within `1..=MAX_LINE_NUMBER`.
pub fn check_line_number(v: &mut Validator, requested: Option<u32>) -> &mut Validator {
    v.check(
        requested.is_none_or(|n| (1..=MAX_LINE_NUMBER).contains(&n)),
        format!("line_number must be between 1 and {MAX_LINE_NUMBER}"),
    )
}

/// Numbers requested together (the lines of a create command) must not repeat.
pub fn check_distinct_line_numbers(
    v: &mut Validator,
    requested: impl IntoIterator<Item = Option<u32>>,
) -> &mut Validator {
    let mut seen = BTreeSet::new();
    for number in requested.into_iter().flatten() {
        if !seen.insert(number) {
            v.check(false, format!("line_number {number} is used more than once"));
        }
    }
    v
}

/// Line numbers must be unique within a header.
pub fn check_line_numbers<L: Line>(lines: &[L]) -> Result<(), DomainError> {
    let mut seen = BTreeSet::new();
    for line in lines {
        if !seen.insert(line.line_number()) {
            return Err(DomainError::validation(format!(
                "line_number {} is used more than once",
                line.line_number()
            )));
        }
    }
    Ok(())
}

/// Apply `changes` in order. `add` builds a line from its id and number;
/// `update` mutates an existing line in place.
pub fn apply_line_changes<L, A, U>(
    lines: &mut Vec<L>,
    changes: &[LineChange<A, U>],
    add: impl Fn(&A, RecordId, &[L]) -> L,
    update: impl Fn(&mut L, &U),
) -> Result<(), DomainError>
where
    L: Line,
{
    for change in changes {
        match change {
            LineChange::Add(new_line) => {
                let id = next_line_id(lines.as_slice());
                let line = add(new_line, id, lines.as_slice());
                lines.push(line);
            }
            LineChange::Update { line_id, changes } => {
                let line = lines
                    .iter_mut()
                    .find(|l| l.line_id() == *line_id)
                    .ok_or_else(|| DomainError::not_found(format!("Line {line_id}")))?;
                update(line, changes);
            }
            LineChange::Remove { line_id } => {
                let before = lines.len();
                lines.retain(|l| l.line_id() != *line_id);
                if lines.len() == before {
                    return Err(DomainError::not_found(format!("Line {line_id}")));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: RecordId,
        number: u32,
        qty: i64,
    }

    impl Line for Row {
        fn line_id(&self) -> RecordId {
            self.id
        }

        fn line_number(&self) -> u32 {
            self.number
        }
    }

    fn apply(lines: &mut Vec<Row>, changes: &[LineChange<(Option<u32>, i64), i64>]) -> Result<(), DomainError> {
        apply_line_changes(
            lines,
            changes,
            |(number, qty), id, existing| Row {
                id,
                number: assign_line_number(existing, *number),
                qty: *qty,
            },
            |row, qty| row.qty = *qty,
        )
    }

    #[test]
    fn added_lines_are_numbered_after_the_highest() {
        let mut lines = Vec::new();
        apply(
            &mut lines,
            &[
                LineChange::Add((None, 1)),
                LineChange::Add((Some(10), 2)),
                LineChange::Add((None, 3)),
            ],
        )
        .unwrap();

        let numbers: Vec<u32> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 10, 11]);
        assert_eq!(lines[2].id, RecordId::new(3));
    }

    #[test]
    fn update_and_remove_address_lines_by_id() {
        let mut lines = Vec::new();
        apply(&mut lines, &[LineChange::Add((None, 1)), LineChange::Add((None, 2))]).unwrap();
        apply(
            &mut lines,
            &[
                LineChange::Update {
                    line_id: RecordId::new(2),
                    changes: 20,
                },
                LineChange::Remove {
                    line_id: RecordId::new(1),
                },
            ],
        )
        .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 20);

        let err = apply(&mut lines, &[LineChange::Remove { line_id: RecordId::new(9) }]).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn numbering_after_the_top_does_not_overflow() {
        let lines = vec![Row {
            id: RecordId::new(1),
            number: u32::MAX,
            qty: 1,
        }];
        assert_eq!(assign_line_number(&lines, None), u32::MAX);
    }

    #[test]
    fn requested_numbers_are_range_checked() {
        let mut v = Validator::new();
        check_line_number(&mut v, Some(1));
        check_line_number(&mut v, None);
        check_line_number(&mut v, Some(MAX_LINE_NUMBER));
        assert!(v.finish().is_ok());

        for bad in [0, MAX_LINE_NUMBER + 1, u32::MAX] {
            let mut v = Validator::new();
            check_line_number(&mut v, Some(bad));
            assert!(matches!(v.finish(), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn repeated_requested_numbers_fail() {
        let mut v = Validator::new();
        check_distinct_line_numbers(&mut v, [Some(1), None, Some(2), None]);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        check_distinct_line_numbers(&mut v, [Some(1), None, Some(1)]);
        let err = v.finish().unwrap_err();
        assert!(err.to_string().contains("line_number 1 is used more than once"));
    }

    #[test]
    fn duplicate_numbers_are_rejected() {
        let mut lines = Vec::new();
        apply(&mut lines, &[LineChange::Add((Some(2), 1)), LineChange::Add((None, 1))]).unwrap();
        assert!(check_line_numbers(&lines).is_ok());

        apply(&mut lines, &[LineChange::Add((Some(3), 1))]).unwrap();
        assert!(matches!(check_line_numbers(&lines), Err(DomainError::Validation(_))));
    }
}

//! Presentation order: phase (numeric-aware), then priority, then input order.

use std::cmp::Ordering;

use crate::task::Task;

/// Order two tasks for display.
#[must_use]
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    compare_phase(&a.phase, &b.phase).then_with(|| a.priority_rank().cmp(&b.priority_rank()))
}

/// Stable sort of borrowed tasks; the input slice keeps its order.
#[must_use]
pub fn sorted(tasks: &[Task]) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks.iter().collect();
    view.sort_by(|a, b| compare_tasks(a, b));
    view
}

/// Owned variant of [`sorted`].
#[must_use]
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    sorted(tasks).into_iter().cloned().collect()
}

/// Case-insensitive comparison where digit runs compare by value, so
/// `PHASE 2` sorts before `PHASE 10`.
#[must_use]
pub fn compare_phase(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = compare_chunks(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn compare_chunks(left: Chunk<'_>, right: Chunk<'_>) -> Ordering {
    match (left, right) {
        (Chunk::Number(l), Chunk::Number(r)) => compare_digits(l, r),
        (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        (Chunk::Text(l), Chunk::Text(r)) => l
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(r.chars().flat_map(char::to_lowercase)),
    }
}

/// Compare digit strings by numeric value without parsing (no overflow).
fn compare_digits(l: &str, r: &str) -> Ordering {
    let l = l.trim_start_matches('0');
    let r = r.trim_start_matches('0');
    l.len().cmp(&r.len()).then_with(|| l.cmp(r))
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    const fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != numeric)
            .unwrap_or(self.rest.len());
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(if numeric { Chunk::Number(head) } else { Chunk::Text(head) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::state::TaskStatus;

    fn task(number: u64, phase: &str, priority: &str) -> Task {
        Task {
            phase: phase.into(),
            priority: priority.into(),
            ..Task::new(TaskId::from_number(number), format!("t{number}"), TaskStatus::Todo)
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().filter_map(|task| task.id.number()).collect()
    }

    #[test]
    fn phase_compares_numbers_by_value() {
        assert_eq!(compare_phase("PHASE 2", "PHASE 10"), Ordering::Less);
        assert_eq!(compare_phase("PHASE 10", "PHASE 9"), Ordering::Greater);
        assert_eq!(compare_phase("phase 3", "PHASE 3"), Ordering::Equal);
        assert_eq!(compare_phase("PHASE 03", "PHASE 3"), Ordering::Equal);
        assert_eq!(compare_phase("PHASE 1", "PHASE 1b"), Ordering::Less);
        assert_eq!(compare_phase("1", "A"), Ordering::Less);
    }

    #[test]
    fn phase_then_priority() {
        let tasks = vec![task(1, "PHASE 2", "1"), task(2, "PHASE 1", "1")];
        assert_eq!(ids(&sorted(&tasks)), [2, 1]);

        let tasks = vec![task(1, "PHASE 1", "3"), task(2, "PHASE 1", "P1"), task(3, "PHASE 1", "2")];
        assert_eq!(ids(&sorted(&tasks)), [2, 3, 1]);
    }

    #[test]
    fn unparsable_priority_ranks_as_three() {
        let tasks = vec![task(1, "PHASE 1", "4"), task(2, "PHASE 1", "soon"), task(3, "PHASE 1", "2")];
        assert_eq!(ids(&sorted(&tasks)), [3, 2, 1]);
    }

    #[test]
    fn ties_keep_input_order() {
        let tasks = vec![task(9, "PHASE 1", "3"), task(4, "PHASE 1", "3"), task(7, "PHASE 1", "3")];
        assert_eq!(ids(&sorted(&tasks)), [9, 4, 7]);
    }

    #[test]
    fn sorting_leaves_input_untouched_and_is_idempotent() {
        let tasks = vec![task(1, "PHASE 10", "1"), task(2, "PHASE 2", "2"), task(3, "PHASE 2", "1")];
        let once = sort_tasks(&tasks);
        assert_eq!(sort_tasks(&once), once);
        assert_eq!(ids(&tasks.iter().collect::<Vec<_>>()), [1, 2, 3]);
        assert_eq!(ids(&once.iter().collect::<Vec<_>>()), [3, 2, 1]);
    }
}

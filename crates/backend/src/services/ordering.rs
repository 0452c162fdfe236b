//! Drag-and-drop reordering shared by todos, reminders and repeated todos.

use diesel::QueryResult;
use shared_types::TodoStatus;
use uuid::Uuid;

/// Target position (and, for todos, status) of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: Uuid,
    pub sort_order: i32,
    pub status: Option<TodoStatus>,
}

/// Each id gets its zero-based index in `order` as its sort position.
pub fn placements(order: &[Uuid]) -> Vec<Placement> {
    order
        .iter()
        .enumerate()
        .map(|(index, id)| Placement {
            id: *id,
            sort_order: index as i32,
            status: None,
        })
        .collect()
}

/// Status of a todo dropped at `index` on the board. Everything above the
/// "Pending" divider is being worked on.
pub fn todo_status_at(index: usize, pending_start: usize) -> TodoStatus {
    if index < pending_start {
        TodoStatus::UnderProcess
    } else {
        TodoStatus::Pending
    }
}

pub fn todo_placements(order: &[Uuid], pending_start: usize) -> Vec<Placement> {
    placements(order)
        .into_iter()
        .enumerate()
        .map(|(index, placement)| Placement {
            status: Some(todo_status_at(index, pending_start)),
            ..placement
        })
        .collect()
}

/// Writes a single row's position.
#[allow(async_fn_in_trait)]
pub trait PositionWriter {
    /// Update the row if `owner` owns it; returns the number of rows changed.
    async fn write_position(&mut self, owner: Uuid, placement: &Placement) -> QueryResult<usize>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub updated: usize,
    /// Ids that matched no row owned by the caller
    pub skipped: usize,
}

/// Apply placements one row at a time. Rows the caller does not own are
/// skipped without failing the batch.
pub async fn apply<W: PositionWriter>(
    writer: &mut W,
    owner: Uuid,
    placements: &[Placement],
) -> QueryResult<ReorderOutcome> {
    let mut outcome = ReorderOutcome::default();
    for placement in placements {
        match writer.write_position(owner, placement).await? {
            0 => outcome.skipped += 1,
            n => outcome.updated += n,
        }
    }
    if outcome.skipped > 0 {
        tracing::debug!(%owner, skipped = outcome.skipped, "Reorder skipped ids not owned by user");
    }
    Ok(outcome)
}

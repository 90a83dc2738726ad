//! Stack and foreground transition helpers used by the instance reducer.
//!
//! Every helper leaves the table satisfying the stack invariants:
//! `instance_order` is a duplicate-free permutation of the table's ids, and the topmost id is
//! the single foreground instance whenever the table is non-empty.

use std::collections::BTreeSet;

use crate::model::{AppInstance, InstanceId, InstanceTable, LaunchOptions};

/// Default window size used when neither the launch nor the registry provide one.
pub const DEFAULT_WINDOW_WIDTH: i32 = 420;
/// Default window height used when neither the launch nor the registry provide one.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 300;

/// Creates a new foreground instance on top of the stack and returns its id.
pub fn launch_instance(table: &mut InstanceTable, options: LaunchOptions) -> InstanceId {
    let instance_id = InstanceId(table.next_instance_id);
    table.next_instance_id = table.next_instance_id.saturating_add(1);

    for instance in &mut table.instances {
        instance.is_foreground = false;
    }
    table.instances.push(AppInstance {
        instance_id,
        app_id: options.app_id,
        is_open: true,
        is_foreground: true,
        position: options.position,
        size: options.size,
        initial_data: options.initial_data,
        title: options.title,
        launched_at: instance_id.0,
    });
    table.instance_order.push(instance_id);
    instance_id
}

/// Removes an instance and hands foreground to the new top of the stack if needed.
///
/// Returns the removed record, or `None` when the id is unknown.
pub fn close_instance(table: &mut InstanceTable, instance_id: InstanceId) -> Option<AppInstance> {
    let index = table
        .instances
        .iter()
        .position(|instance| instance.instance_id == instance_id)?;
    let removed = table.instances.remove(index);
    table.instance_order.retain(|id| *id != instance_id);
    if removed.is_foreground {
        normalize_foreground(table);
    }
    Some(removed)
}

/// Focuses and raises `instance_id`.
///
/// Returns `true` when the instance exists and is open.
pub fn focus_instance(table: &mut InstanceTable, instance_id: InstanceId) -> bool {
    let is_open = table
        .get(instance_id)
        .map(|instance| instance.is_open)
        .unwrap_or(false);
    if !is_open {
        return false;
    }
    let Some(index) = table.instance_order.iter().position(|id| *id == instance_id) else {
        return false;
    };

    let already_top = index + 1 == table.instance_order.len()
        && table
            .get(instance_id)
            .map(|instance| instance.is_foreground)
            .unwrap_or(false);
    if already_top {
        return true;
    }

    let raised = table.instance_order.remove(index);
    table.instance_order.push(raised);
    normalize_foreground(table);
    true
}

/// Returns the neighbour of `instance_id` in the z-stack, `delta` steps away with wraparound.
///
/// `None` when fewer than two instances are open or the id is not stacked.
pub fn neighbour_instance(
    table: &InstanceTable,
    instance_id: InstanceId,
    delta: isize,
) -> Option<InstanceId> {
    let len = table.instance_order.len();
    if len < 2 {
        return None;
    }
    let current = table.instance_order.iter().position(|id| *id == instance_id)?;
    let next = (current as isize + delta).rem_euclid(len as isize) as usize;
    table.instance_order.get(next).copied()
}

/// Assigns foreground to the topmost stacked instance and clears it everywhere else.
pub fn normalize_foreground(table: &mut InstanceTable) {
    let top = table.instance_order.last().copied();
    for instance in &mut table.instances {
        instance.is_foreground = Some(instance.instance_id) == top;
    }
}

/// Describes the first broken stack invariant, if any.
pub fn invariant_violation(table: &InstanceTable) -> Option<String> {
    let mut seen = BTreeSet::new();
    for id in &table.instance_order {
        if !seen.insert(*id) {
            return Some(format!("{id} appears twice in instance_order"));
        }
    }

    let open: BTreeSet<InstanceId> = table
        .instances
        .iter()
        .filter(|instance| instance.is_open)
        .map(|instance| instance.instance_id)
        .collect();
    if open.len() != table.instances.len() {
        return Some("closed instance retained in the table".to_string());
    }
    if open != seen {
        return Some("instance_order does not match the open instance set".to_string());
    }

    let foreground: Vec<InstanceId> = table
        .instances
        .iter()
        .filter(|instance| instance.is_foreground)
        .map(|instance| instance.instance_id)
        .collect();
    match (foreground.as_slice(), table.instance_order.last()) {
        ([], None) => None,
        ([single], Some(top)) if single == top => None,
        ([single], Some(top)) => Some(format!("foreground {single} is not topmost ({top})")),
        ([], Some(_)) => Some("no foreground instance while instances are open".to_string()),
        (many, _) => Some(format!("{} foreground instances", many.len())),
    }
}

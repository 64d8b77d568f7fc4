//! Order-preserving edits on the repeatable blocks of a form.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    /// Appends a blank element.
    Add,
    Move(usize, Direction),
    Duplicate(usize),
    Remove(usize),
}

/// Swaps the element at `index` with its neighbour. Returns `false` (and does
/// nothing) at the list boundaries or for an out-of-range index.
pub fn move_item<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    if index >= items.len() {
        return false;
    }
    match direction {
        Direction::Up if index > 0 => {
            items.swap(index, index - 1);
            true
        }
        Direction::Down if index + 1 < items.len() => {
            items.swap(index, index + 1);
            true
        }
        _ => false,
    }
}

/// Inserts a deep copy of `items[index]` right after it.
pub fn duplicate_item<T: Clone>(items: &mut Vec<T>, index: usize) -> bool {
    match items.get(index).cloned() {
        Some(copy) => {
            items.insert(index + 1, copy);
            true
        }
        None => false,
    }
}

pub fn remove_item<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}

/// Applies `op`; returns whether the list changed.
pub fn apply<T: Clone + Default>(items: &mut Vec<T>, op: ListOp) -> bool {
    match op {
        ListOp::Add => {
            items.push(T::default());
            true
        }
        ListOp::Move(index, direction) => move_item(items, index, direction),
        ListOp::Duplicate(index) => duplicate_item(items, index),
        ListOp::Remove(index) => remove_item(items, index).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_is_a_no_op_at_boundaries() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 0, Direction::Up));
        assert!(!move_item(&mut items, 2, Direction::Down));
        assert!(!move_item(&mut items, 9, Direction::Down));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn moving_up_then_down_restores_order() {
        let original = vec!["a", "b", "c", "d"];
        for index in 1..original.len() {
            let mut items = original.clone();
            assert!(move_item(&mut items, index, Direction::Up));
            assert_ne!(items, original);
            assert!(move_item(&mut items, index - 1, Direction::Down));
            assert_eq!(items, original);
        }
    }

    #[test]
    fn duplicate_inserts_copy_after_source() {
        let mut items = vec![vec![1], vec![2], vec![3]];
        assert!(duplicate_item(&mut items, 1));
        assert_eq!(items.len(), 4);
        assert_eq!(items[2], items[1]);
        assert_eq!(items[3], vec![3]);
        assert!(!duplicate_item(&mut items, 10));
    }

    #[test]
    fn apply_dispatches_ops() {
        let mut items: Vec<String> = vec!["x".into()];
        assert!(apply(&mut items, ListOp::Add));
        assert_eq!(items, vec!["x".to_string(), String::new()]);
        assert!(apply(&mut items, ListOp::Remove(0)));
        assert!(!apply(&mut items, ListOp::Remove(5)));
        assert_eq!(items, vec![String::new()]);
    }
}

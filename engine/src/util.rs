//! Small search helpers over monotonous slices.

/// Index of the last element for which `pred` holds, where `pred` is `true`
/// for a prefix of `items` and `false` afterwards.
pub(crate) fn find_last_idx_monotonous<T>(items: &[T], pred: impl Fn(&T) -> bool) -> Option<usize> {
    items.partition_point(|x| pred(x)).checked_sub(1)
}

/// Last element for which `pred` holds (see [`find_last_idx_monotonous`]).
pub(crate) fn find_last_monotonous<T>(items: &[T], pred: impl Fn(&T) -> bool) -> Option<&T> {
    find_last_idx_monotonous(items, pred).map(|i| &items[i])
}

/// Index of the first element for which `pred` holds, where `pred` is
/// `false` for a prefix of `items` and `true` afterwards. Returns
/// `items.len()` if it never holds.
pub(crate) fn find_first_idx_monotonous_or_len<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.partition_point(|x| !pred(x))
}

/// Checks `pred` on every pair of neighbours.
pub(crate) fn check_adjacent_items<T>(items: &[T], pred: impl Fn(&T, &T) -> bool) -> bool {
    items.windows(2).all(|w| pred(&w[0], &w[1]))
}

/// Number of leading spaces and tabs.
pub(crate) fn indentation(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ' || c == '\t').count()
}

/// Number of chars, which is the column space used throughout the engine.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

//! End-to-end scenarios for the default pipeline.
//!
//! Each test diffs two small documents and checks the hunks, the inner
//! character edits and the reconstruction of the modified document.

use anyhow::Result;
use linediff::apply::apply_line_changes;
use linediff::{
    DefaultLinesDiffComputer, DetailedLineRangeMapping, LineRange, LineRangeMapping, LinesDiff, LinesDiffComputer,
    LinesDiffOptions, Range, RangeMapping,
};
use pretty_assertions::assert_eq;

fn diff(original: &[&str], modified: &[&str], options: &LinesDiffOptions) -> Result<LinesDiff> {
    Ok(DefaultLinesDiffComputer::new().compute_diff(original, modified, options)?)
}

fn exact() -> LinesDiffOptions {
    LinesDiffOptions {
        ignore_trim_whitespace: false,
        ..LinesDiffOptions::default()
    }
}

fn line_ranges(result: &LinesDiff) -> Vec<LineRangeMapping> {
    result.changes.iter().map(DetailedLineRangeMapping::line_range_mapping).collect()
}

#[test]
fn test_identical_documents_have_no_changes() -> Result<()> {
    let lines = ["a", "b", "c"];
    let result = diff(&lines, &lines, &LinesDiffOptions::default())?;
    assert!(result.changes.is_empty());
    assert!(result.moves.is_empty());
    assert!(!result.hit_timeout);
    Ok(())
}

#[test]
fn test_replaced_line_has_character_edit() -> Result<()> {
    let original = ["a", "b", "c"];
    let modified = ["a", "x", "c"];
    let result = diff(&original, &modified, &LinesDiffOptions::default())?;

    assert_eq!(
        result.changes,
        vec![DetailedLineRangeMapping::new(
            LineRange::new(2, 3),
            LineRange::new(2, 3),
            Some(vec![RangeMapping::new(Range::new(2, 1, 2, 2), Range::new(2, 1, 2, 2))]),
        )]
    );
    assert_eq!(apply_line_changes(&original, &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_rotated_single_line_is_insertion_and_deletion() -> Result<()> {
    // A single line is too short to count as a move.
    let original = ["foo", "bar", "baz", "qux"];
    let modified = ["qux", "foo", "bar", "baz"];
    let options = LinesDiffOptions {
        compute_moves: true,
        ..exact()
    };
    let result = diff(&original, &modified, &options)?;

    assert_eq!(
        line_ranges(&result),
        vec![
            LineRangeMapping::new(LineRange::new(1, 1), LineRange::new(1, 2)),
            LineRangeMapping::new(LineRange::new(4, 5), LineRange::new(5, 5)),
        ]
    );
    assert!(result.moves.is_empty());
    assert_eq!(apply_line_changes(&original, &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_block_moved_below_longer_code_is_reported_as_move() -> Result<()> {
    let block = [
        "fn render(frame: &mut Frame) {",
        "    frame.clear_background(BLACK);",
        "}",
    ];
    let stationary = [
        "impl Game for Asteroids {",
        "    fn update(&mut self, input: &Input) -> Transition {",
        "        self.ship.steer(input.axis(Axis::Horizontal));",
        "        self.world.step(self.clock.delta_seconds());",
        "        Transition::Stay",
    ];
    let original: Vec<&str> = block.iter().chain(&stationary).copied().collect();
    let modified: Vec<&str> = stationary.iter().chain(&block).copied().collect();
    let options = LinesDiffOptions {
        compute_moves: true,
        ..exact()
    };
    let result = diff(&original, &modified, &options)?;

    assert_eq!(result.moves.len(), 1);
    assert_eq!(
        result.moves[0].line_range_mapping,
        LineRangeMapping::new(LineRange::new(1, 4), LineRange::new(6, 9))
    );
    assert!(result.moves[0].changes.is_empty());
    assert_eq!(apply_line_changes(&original, &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_leading_whitespace_removal_is_pure_deletion() -> Result<()> {
    let original = ["  a"];
    let modified = ["a"];
    let result = diff(&original, &modified, &exact())?;

    assert_eq!(
        result.changes,
        vec![DetailedLineRangeMapping::new(
            LineRange::new(1, 2),
            LineRange::new(1, 2),
            Some(vec![RangeMapping::new(Range::new(1, 1, 1, 3), Range::new(1, 1, 1, 1))]),
        )]
    );
    assert_eq!(apply_line_changes(&original, &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_leading_whitespace_is_ignored_by_default() -> Result<()> {
    let result = diff(&["  a"], &["a"], &LinesDiffOptions::default())?;
    assert!(result.changes.is_empty());
    Ok(())
}

#[test]
fn test_small_hunks_around_blank_line_stay_separate() -> Result<()> {
    let original = ["a1", "", "b1"];
    let modified = ["a2", "", "b2"];
    let result = diff(&original, &modified, &exact())?;

    assert_eq!(
        line_ranges(&result),
        vec![
            LineRangeMapping::new(LineRange::new(1, 2), LineRange::new(1, 2)),
            LineRangeMapping::new(LineRange::new(3, 4), LineRange::new(3, 4)),
        ]
    );
    assert_eq!(apply_line_changes(&original, &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_large_hunk_swallows_blank_line() -> Result<()> {
    let original = ["xxx", "xxx", "xxx", "", "xxx"];
    let modified = ["yyy", "yyy", "yyy", "", "yyy"];
    let result = diff(&original, &modified, &exact())?;

    assert_eq!(
        line_ranges(&result),
        vec![LineRangeMapping::new(LineRange::new(1, 6), LineRange::new(1, 6))]
    );
    assert_eq!(apply_line_changes(&original, &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_empty_documents() -> Result<()> {
    assert!(diff(&[], &[], &LinesDiffOptions::default())?.is_identical());

    let modified = ["a", "b"];
    let result = diff(&[], &modified, &LinesDiffOptions::default())?;
    assert_eq!(
        line_ranges(&result),
        vec![LineRangeMapping::new(LineRange::new(1, 2), LineRange::new(1, 3))]
    );
    assert_eq!(apply_line_changes(&[""], &modified, &result.changes)?, modified);
    Ok(())
}

#[test]
fn test_result_serializes_to_json() -> Result<()> {
    let result = diff(&["a", "b"], &["a", "c"], &LinesDiffOptions::default())?;
    let json = serde_json::to_value(&result)?;
    assert_eq!(json["hit_timeout"], serde_json::Value::Bool(false));
    assert_eq!(json["changes"].as_array().map(Vec::len), Some(1));
    Ok(())
}

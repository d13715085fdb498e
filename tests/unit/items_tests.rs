/*!
 * Tests for item list parsing
 */

use polytable::errors::AppError;
use polytable::items::{self, Item, parse_items};

use crate::common;

#[test]
fn test_parseItems_withBlankLinesAndPadding_shouldTrimAndSkip() {
    let items = parse_items("  tomate \n\n\tmanzana\r\n   \nkiwi").unwrap();
    let names: Vec<&str> = items.iter().map(Item::as_str).collect();
    assert_eq!(names, vec!["tomate", "manzana", "kiwi"]);
}

#[test]
fn test_parseItems_withDuplicates_shouldKeepFirstOccurrence() {
    let items = parse_items("tomate\nkiwi\ntomate\n").unwrap();
    assert_eq!(items, common::items(&["tomate", "kiwi"]));
}

#[test]
fn test_parseItems_withPathSeparator_shouldReportLine() {
    let result = parse_items("tomate\n\nfoo/bar\n");
    match result {
        Err(AppError::InvalidItem { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected InvalidItem, got {:?}", other),
    }
}

#[test]
fn test_parseItems_withEmptyContent_shouldReturnNoItems() {
    assert!(parse_items("").unwrap().is_empty());
    assert!(parse_items("\n \n").unwrap().is_empty());
}

#[test]
fn test_readItems_withMissingFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let result = items::read_items(dir.path().join("missing.txt"));
    assert!(matches!(result, Err(AppError::File(_))));
}

#[test]
fn test_readItems_withUnicode_shouldKeepItems() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "lista.txt", "piña\nplátano\n").unwrap();

    let items = items::read_items(&path).unwrap();

    assert_eq!(items, common::items(&["piña", "plátano"]));
    assert_eq!(items[0].image_file_name(), "piña.jpg");
}

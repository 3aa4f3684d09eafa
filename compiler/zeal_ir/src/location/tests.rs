use pretty_assertions::assert_eq;

use super::*;

#[test]
fn display_includes_file_line_and_column() {
    let loc = SourceLocation::new("test/flow.zep", 12, 5);
    assert_eq!(loc.to_string(), "test/flow.zep:12:5");
}

#[test]
fn clones_share_the_path() {
    let loc = SourceLocation::new("test/flow.zep", 1, 1);
    let copy = loc.clone();
    assert!(Arc::ptr_eq(&loc.file, &copy.file));
    assert_eq!(loc, copy);
}

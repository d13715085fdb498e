/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use polytable::file_utils::FileManager;
use std::fs;
use std::path::PathBuf;

use crate::common;

/// Test that ensure_dir creates nested directories
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    assert!(nested.is_dir());

    // Second call is a no-op
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

/// Test the atomic write replaces existing content and leaves no temp files
#[test]
fn test_write_to_file_withExistingFile_shouldReplaceContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "tabla.tex", "old")?;

    FileManager::write_to_file(&path, "new content")?;

    assert_eq!(fs::read_to_string(&path)?, "new content");
    assert_eq!(common::count_entries(temp_dir.path()), 1);
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("tabla.tex");

    FileManager::write_to_file(&path, "x")?;

    assert!(path.is_file());
    Ok(())
}

#[test]
fn test_write_to_file_overDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("taken");
    fs::create_dir(&target)?;

    assert!(FileManager::write_to_file(&target, "x").is_err());
    assert!(target.is_dir());
    Ok(())
}

#[test]
fn test_move_file_shouldRemoveSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let from = common::create_test_file(temp_dir.path(), "000001.jpg", "data")?;
    let to = temp_dir.path().join("dest").join("kiwi.jpg");

    FileManager::move_file(&from, &to)?;

    assert!(!from.exists());
    assert_eq!(fs::read_to_string(&to)?, "data");
    assert!(FileManager::move_file(&from, &to).is_err());
    Ok(())
}

#[test]
fn test_list_files_shouldSkipDirectoriesAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.jpg", "")?;
    common::create_test_file(temp_dir.path(), "a.png", "")?;
    fs::create_dir(temp_dir.path().join("sub"))?;

    let files = FileManager::list_files(temp_dir.path())?;

    assert_eq!(files, vec![temp_dir.path().join("a.png"), temp_dir.path().join("b.jpg")]);
    Ok(())
}

#[test]
fn test_relative_to_shouldStripBaseAndCurDir() {
    assert_eq!(FileManager::relative_to("./kiwi.jpg", "."), PathBuf::from("kiwi.jpg"));
    assert_eq!(FileManager::relative_to("out/img/kiwi.jpg", "out"), PathBuf::from("img/kiwi.jpg"));
}

#[test]
fn test_relative_to_withTargetOutsideBase_shouldClimbWithParentDirs() {
    assert_eq!(FileManager::relative_to("img/tomate.jpg", "out"), PathBuf::from("../img/tomate.jpg"));
    assert_eq!(FileManager::relative_to("./tomate.jpg", "out"), PathBuf::from("../tomate.jpg"));
    assert_eq!(FileManager::relative_to("a/img/kiwi.jpg", "a/b/c"), PathBuf::from("../../img/kiwi.jpg"));
    assert_eq!(FileManager::relative_to("/srv/kiwi.jpg", "/home/user"), PathBuf::from("../../srv/kiwi.jpg"));
}

#[test]
fn test_relative_to_withMixedAbsoluteAndRelative_shouldResolveAgainstWorkingDir() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let target = cwd.join("img").join("kiwi.jpg");

    assert_eq!(FileManager::relative_to(&target, "out"), PathBuf::from("../img/kiwi.jpg"));
    Ok(())
}

#[test]
fn test_relative_to_withParentDirInBase_shouldFallBackToAbsolute() {
    let result = FileManager::relative_to("img/kiwi.jpg", "../out");
    assert!(result.is_absolute());
    assert!(result.ends_with("img/kiwi.jpg"));
}

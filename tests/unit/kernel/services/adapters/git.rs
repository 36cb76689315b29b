use super::*;
use tempfile::tempdir;

#[test]
fn test_parse_branch_list_sorts_and_skips_detached() {
    let text = "main\n* dev\n  (HEAD detached at 1234)\n\nfeature/x\ndev\n";
    assert_eq!(
        parse_branch_list(text),
        vec!["dev".to_string(), "feature/x".to_string(), "main".to_string()]
    );
}

#[test]
fn test_find_repo_root_walks_up() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    let nested = dir.path().join("a/b");
    std::fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_repo_root(&nested), Some(dir.path().to_path_buf()));
}

#[test]
fn test_list_branches_outside_repo_fails() {
    let dir = tempdir().unwrap();
    assert!(list_branches(dir.path()).is_err());
    assert_eq!(current_branch(dir.path()), None);
}

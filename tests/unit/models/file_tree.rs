use super::*;

fn folder(tree: &mut FileTree, parent: Option<NodeId>, name: &str) -> NodeId {
    tree.insert_folder(parent, name, 1).unwrap()
}

fn file(tree: &mut FileTree, parent: Option<NodeId>, name: &str) -> NodeId {
    tree.insert_file(parent, name, String::new(), None, 1).unwrap()
}

fn names(tree: &FileTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|&id| tree.get(id).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_new_tree() {
    let tree = FileTree::new();
    assert!(tree.is_empty());
    assert!(tree.roots().is_empty());
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_insert_child() {
    let mut tree = FileTree::new();
    let dir_id = folder(&mut tree, None, "subdir");
    let file_id = file(&mut tree, Some(dir_id), "file.txt");

    assert!(tree.get(dir_id).unwrap().is_folder());
    assert!(tree.get(file_id).unwrap().is_file());
    assert_eq!(tree.get(file_id).unwrap().parent(), Some(dir_id));
    assert_eq!(tree.children(dir_id), Some(&[file_id][..]));
    assert_eq!(tree.roots(), &[dir_id]);
}

#[test]
fn insert_rejects_reserved_characters_and_blank_names() {
    let mut tree = FileTree::new();
    for name in ["", "   ", "a/b", "a\\b", "a:b", "a*b", "a?b", "a|b", "a<b", "a>b", "a\"b"] {
        assert_eq!(
            tree.insert_folder(None, name, 1),
            Err(FileTreeError::InvalidName(name.to_string())),
            "{name:?} should be rejected"
        );
    }
    assert!(tree.is_empty());
}

#[test]
fn insert_rejects_duplicate_sibling_but_allows_same_name_elsewhere() {
    let mut tree = FileTree::new();
    let src = folder(&mut tree, None, "src");
    file(&mut tree, Some(src), "main.rs");

    assert_eq!(
        tree.insert_file(Some(src), "main.rs", String::new(), None, 1),
        Err(FileTreeError::NameExists)
    );
    assert!(tree
        .insert_file(Some(src), "Main.rs", String::new(), None, 1)
        .is_ok());
    assert!(tree.insert_file(None, "main.rs", String::new(), None, 1).is_ok());
}

#[test]
fn insert_under_file_or_missing_parent_fails() {
    let mut tree = FileTree::new();
    let f = file(&mut tree, None, "a.txt");
    assert_eq!(
        tree.insert_folder(Some(f), "x", 1),
        Err(FileTreeError::ParentNotFolder)
    );

    let gone = folder(&mut tree, None, "gone");
    tree.remove_subtree(gone).unwrap();
    assert_eq!(
        tree.insert_folder(Some(gone), "x", 1),
        Err(FileTreeError::InvalidNodeId)
    );
}

#[test]
fn insert_file_detects_language_unless_given() {
    let mut tree = FileTree::new();
    let ts = file(&mut tree, None, "a.ts");
    let custom = tree
        .insert_file(None, "b.ts", String::new(), Some("tsx-custom"), 1)
        .unwrap();
    let plain = file(&mut tree, None, "Makefile");

    assert_eq!(tree.get(ts).unwrap().language(), Some("typescript"));
    assert_eq!(tree.get(custom).unwrap().language(), Some("tsx-custom"));
    assert_eq!(tree.get(plain).unwrap().language(), Some("plaintext"));
}

#[test]
fn test_rename() {
    let mut tree = FileTree::new();
    let file_id = file(&mut tree, None, "old.txt");
    tree.rename(file_id, "new.rs", 5).unwrap();

    let node = tree.get(file_id).unwrap();
    assert_eq!(node.name(), "new.rs");
    assert_eq!(node.language(), Some("rust"));
    assert_eq!(node.modified_at(), 5);
    assert_eq!(node.created_at(), 1);
}

#[test]
fn rename_to_own_name_succeeds_and_to_sibling_name_fails() {
    let mut tree = FileTree::new();
    let a = file(&mut tree, None, "a.txt");
    file(&mut tree, None, "b.txt");

    assert!(tree.rename(a, "a.txt", 2).is_ok());
    assert_eq!(tree.rename(a, "b.txt", 3), Err(FileTreeError::NameExists));
    assert_eq!(tree.get(a).unwrap().name(), "a.txt");
    assert_eq!(tree.get(a).unwrap().modified_at(), 2);
}

#[test]
fn set_content_only_applies_to_files() {
    let mut tree = FileTree::new();
    let dir = folder(&mut tree, None, "dir");
    let f = file(&mut tree, Some(dir), "a.md");

    tree.set_content(f, "# hi".to_string(), 9).unwrap();
    assert_eq!(tree.get(f).unwrap().content(), Some("# hi"));
    assert_eq!(tree.get(f).unwrap().modified_at(), 9);
    assert_eq!(
        tree.set_content(dir, "x".to_string(), 9),
        Err(FileTreeError::NotAFile)
    );
    assert_eq!(tree.get(dir).unwrap().content(), None);
}

#[test]
fn test_is_ancestor() {
    let mut tree = FileTree::new();
    let a = folder(&mut tree, None, "a");
    let b = folder(&mut tree, Some(a), "b");
    let c = file(&mut tree, Some(b), "c");

    assert!(tree.is_ancestor(a, c));
    assert!(tree.is_ancestor(b, c));
    assert!(!tree.is_ancestor(c, a));
    assert!(!tree.is_ancestor(a, a));
}

#[test]
fn move_to_reparents_and_appends() {
    let mut tree = FileTree::new();
    let src = folder(&mut tree, None, "src");
    let lib = folder(&mut tree, None, "lib");
    let existing = file(&mut tree, Some(lib), "z.rs");
    let f = file(&mut tree, Some(src), "a.rs");

    tree.move_to(f, Some(lib)).unwrap();
    assert_eq!(tree.get(f).unwrap().parent(), Some(lib));
    assert_eq!(tree.children(lib), Some(&[existing, f][..]));
    assert_eq!(tree.children(src), Some(&[][..]));
    assert_eq!(tree.path(f).as_deref(), Some("/lib/a.rs"));

    tree.move_to(f, None).unwrap();
    assert_eq!(tree.get(f).unwrap().parent(), None);
    assert_eq!(names(&tree, tree.roots()), ["src", "lib", "a.rs"]);
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn move_into_self_or_descendant_is_rejected() {
    let mut tree = FileTree::new();
    let x = folder(&mut tree, None, "x");
    let y = folder(&mut tree, Some(x), "y");
    let z = folder(&mut tree, Some(y), "z");

    assert_eq!(tree.move_to(x, Some(x)), Err(FileTreeError::MoveIntoDescendant));
    assert_eq!(tree.move_to(x, Some(y)), Err(FileTreeError::MoveIntoDescendant));
    assert_eq!(tree.move_to(x, Some(z)), Err(FileTreeError::MoveIntoDescendant));
    assert_eq!(tree.roots(), &[x]);
    assert_eq!(tree.children(x), Some(&[y][..]));
}

#[test]
fn move_validates_destination_before_detaching() {
    let mut tree = FileTree::new();
    let a = folder(&mut tree, None, "a");
    let b = folder(&mut tree, None, "b");
    let f = file(&mut tree, Some(a), "same.txt");
    file(&mut tree, Some(b), "same.txt");
    let not_folder = file(&mut tree, None, "plain.txt");

    assert_eq!(tree.move_to(f, Some(b)), Err(FileTreeError::NameExists));
    assert_eq!(
        tree.move_to(f, Some(not_folder)),
        Err(FileTreeError::ParentNotFolder)
    );
    assert_eq!(tree.get(f).unwrap().parent(), Some(a));
    assert_eq!(tree.children(a), Some(&[f][..]));
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_delete() {
    let mut tree = FileTree::new();
    let dir = folder(&mut tree, None, "dir");
    let inner = folder(&mut tree, Some(dir), "inner");
    let f = file(&mut tree, Some(inner), "file.txt");
    let keep = file(&mut tree, None, "keep.txt");

    let removed = tree.remove_subtree(dir).unwrap();
    assert_eq!(removed, vec![dir, inner, f]);
    assert!(tree.get(f).is_none());
    assert!(tree.get(dir).is_none());
    assert_eq!(tree.roots(), &[keep]);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.remove_subtree(dir), Err(FileTreeError::InvalidNodeId));
}

#[test]
fn test_toggle_open() {
    let mut tree = FileTree::new();
    let dir = folder(&mut tree, None, "dir");
    let f = file(&mut tree, Some(dir), "a.txt");

    assert_eq!(tree.toggle_open(f), Some(true));
    assert!(tree.get(f).unwrap().is_open());
    assert_eq!(tree.toggle_open(f), Some(false));
    assert_eq!(tree.toggle_open(dir), None);
}

#[test]
fn close_subtree_closes_nested_files() {
    let mut tree = FileTree::new();
    let dir = folder(&mut tree, None, "dir");
    let inner = folder(&mut tree, Some(dir), "inner");
    let a = file(&mut tree, Some(dir), "a");
    let b = file(&mut tree, Some(inner), "b");
    let outside = file(&mut tree, None, "c");
    for id in [a, b, outside] {
        tree.toggle_open(id);
    }

    tree.close_subtree(dir);
    assert!(!tree.get(a).unwrap().is_open());
    assert!(!tree.get(b).unwrap().is_open());
    assert!(tree.get(outside).unwrap().is_open());
}

#[test]
fn path_and_find_node_by_path_agree() {
    let mut tree = FileTree::new();
    let src = folder(&mut tree, None, "src");
    let kernel = folder(&mut tree, Some(src), "kernel");
    let f = file(&mut tree, Some(kernel), "store.rs");
    let top = file(&mut tree, None, "README.md");

    assert_eq!(tree.path(f).as_deref(), Some("/src/kernel/store.rs"));
    assert_eq!(tree.path(top).as_deref(), Some("/README.md"));
    assert_eq!(tree.find_node_by_path("/src/kernel/store.rs"), Some(f));
    assert_eq!(tree.find_node_by_path("src/kernel/"), Some(kernel));
    assert_eq!(tree.find_node_by_path("/README.md/x"), None);
    assert_eq!(tree.find_node_by_path("/missing"), None);
    assert_eq!(tree.find_node_by_path("/"), None);
}

#[test]
fn depth_first_is_preorder_in_insertion_order() {
    let mut tree = FileTree::new();
    let b = folder(&mut tree, None, "b");
    file(&mut tree, Some(b), "b2");
    let b1 = folder(&mut tree, Some(b), "b1");
    file(&mut tree, Some(b1), "b1x");
    file(&mut tree, None, "a");

    let order: Vec<&str> = tree.iter_depth_first().map(Node::name).collect();
    assert_eq!(order, ["b", "b2", "b1", "b1x", "a"]);

    let sub: Vec<&str> = tree.subtree(b1).map(Node::name).collect();
    assert_eq!(sub, ["b1", "b1x"]);
}

#[test]
fn test_flatten_for_view() {
    let mut tree = FileTree::new();
    file(&mut tree, None, "file1.txt");
    let dir_id = folder(&mut tree, None, "subdir");
    let nested = file(&mut tree, Some(dir_id), "file2.txt");
    tree.toggle_open(nested);

    let rows = tree.flatten_for_view();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].name, "file1.txt");
    assert_eq!(rows[1].kind, NodeKind::Folder);
    assert_eq!(rows[2].depth, 1);
    assert!(rows[2].is_open);
}

#[test]
fn check_invariants_reports_broken_links() {
    let mut tree = FileTree::new();
    let a = folder(&mut tree, None, "a");
    let f = file(&mut tree, Some(a), "f");

    tree.arena.get_mut(f).unwrap().parent = None;
    assert_eq!(
        tree.check_invariants(),
        Err(InvariantViolation::ParentMismatch(f))
    );

    tree.arena.get_mut(f).unwrap().parent = Some(a);
    tree.attach(None, "a".into(), NodeData::Folder(Vec::new()), 1, 1)
        .unwrap();
    assert!(matches!(
        tree.check_invariants(),
        Err(InvariantViolation::DuplicateName { parent: None, .. })
    ));
}

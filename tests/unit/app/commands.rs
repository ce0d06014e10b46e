use super::*;
use tempfile::tempdir;

fn args(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn run(store: &mut TreeStore, line: &str) -> Result<String, CommandError> {
    let cmd = Command::parse(&args(line))?;
    execute(store, &cmd)
}

#[test]
fn test_parse_basic_verbs() {
    assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
    assert_eq!(Command::parse(&args("tree")).unwrap(), Command::Tree);
    assert_eq!(
        Command::parse(&args("mv /a /b")).unwrap(),
        Command::Mv {
            path: "/a".to_string(),
            dest: "/b".to_string()
        }
    );
    assert_eq!(
        Command::parse(&args("select -")).unwrap(),
        Command::Select(None)
    );
    assert_eq!(
        Command::parse(&args("template page Home /src")).unwrap(),
        Command::Template {
            kind: TemplateKind::Page,
            name: "Home".to_string(),
            folder: Some("/src".to_string()),
        }
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        Command::parse(&args("frobnicate")),
        Err(CommandError::UnknownCommand(_))
    ));
    assert!(matches!(
        Command::parse(&args("rename /a")),
        Err(CommandError::Usage(_))
    ));
    assert!(matches!(
        Command::parse(&args("template widget X")),
        Err(CommandError::Template(_))
    ));
}

#[test]
fn test_is_mutating() {
    assert!(Command::Mkdir("/a".into()).is_mutating());
    assert!(Command::Select(None).is_mutating());
    assert!(!Command::Tree.is_mutating());
    assert!(!Command::Export(None).is_mutating());
}

#[test]
fn test_build_and_render_tree() {
    let mut store = TreeStore::new();
    run(&mut store, "mkdir src").unwrap();
    run(&mut store, "mkdir /src/ui").unwrap();
    run(&mut store, "touch /src/main.ts").unwrap();
    run(&mut store, "touch /src/ui/App.tsx").unwrap();
    run(&mut store, "open /src/main.ts").unwrap();

    let tree = run(&mut store, "tree").unwrap();
    assert_eq!(tree, "src/\n  ui/\n    App.tsx\n  main.ts *\n");
    assert_eq!(run(&mut store, "open-files").unwrap(), "/src/main.ts\n");
}

#[test]
fn test_write_and_cat() {
    let mut store = TreeStore::new();
    run(&mut store, "touch notes.md").unwrap();
    let cmd = Command::Write {
        path: "/notes.md".to_string(),
        text: "hello world".to_string(),
    };
    execute(&mut store, &cmd).unwrap();

    assert_eq!(run(&mut store, "cat /notes.md").unwrap(), "hello world\n");
    run(&mut store, "mkdir docs").unwrap();
    assert!(matches!(
        run(&mut store, "cat /docs"),
        Err(CommandError::Tree(FileTreeError::NotAFile))
    ));
}

#[test]
fn test_mv_rename_rm() {
    let mut store = TreeStore::new();
    run(&mut store, "mkdir a").unwrap();
    run(&mut store, "mkdir /a/b").unwrap();
    run(&mut store, "touch /a/b/x.py").unwrap();

    assert!(matches!(
        run(&mut store, "mv /a /a/b"),
        Err(CommandError::Tree(FileTreeError::MoveIntoDescendant))
    ));
    assert_eq!(run(&mut store, "mv /a/b/x.py /").unwrap(), "moved to /x.py\n");
    assert_eq!(
        run(&mut store, "rename /x.py y.rb").unwrap(),
        "renamed to /y.rb\n"
    );
    assert_eq!(store.find_by_path("/y.rb").unwrap().language(), Some("ruby"));

    run(&mut store, "rm /a").unwrap();
    assert!(matches!(
        run(&mut store, "rm /a/b"),
        Err(CommandError::NotFound(_))
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_search_ext_and_stats() {
    let mut store = TreeStore::new();
    run(&mut store, "mkdir src").unwrap();
    run(&mut store, "touch /src/app.ts").unwrap();
    run(&mut store, "touch /src/util.ts").unwrap();
    run(&mut store, "touch README.md").unwrap();

    assert_eq!(run(&mut store, "search APP").unwrap(), "/src/app.ts\n");
    assert_eq!(
        run(&mut store, "ext ts").unwrap(),
        "/src/app.ts\n/src/util.ts\n"
    );
    let stats = run(&mut store, "stats").unwrap();
    assert!(stats.contains("files:   3"));
    assert!(stats.contains("folders: 1"));
    assert!(stats.contains("typescript"));
}

#[test]
fn test_select_and_template() {
    let mut store = TreeStore::new();
    run(&mut store, "mkdir components").unwrap();
    assert_eq!(
        run(&mut store, "template component Button /components").unwrap(),
        "created /components/Button.tsx\n"
    );
    run(&mut store, "select /components/Button.tsx").unwrap();
    assert_eq!(store.get_current().unwrap().name(), "Button.tsx");
    run(&mut store, "select -").unwrap();
    assert!(store.get_current().is_none());
}

#[test]
fn test_export_then_import_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("snapshot.json");

    let mut store = TreeStore::new();
    run(&mut store, "mkdir src").unwrap();
    run(&mut store, "touch /src/lib.rs").unwrap();
    let export = Command::Export(Some(file.clone()));
    execute(&mut store, &export).unwrap();

    let mut fresh = TreeStore::new();
    let import = Command::Import(file);
    assert_eq!(execute(&mut fresh, &import).unwrap(), "imported 2 nodes\n");
    assert!(fresh.find_by_path("/src/lib.rs").is_some());
}

#[test]
fn test_export_to_stdout_is_json() {
    let mut store = TreeStore::new();
    run(&mut store, "touch a.txt").unwrap();
    let out = run(&mut store, "export").unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["root"][0]["name"], "a.txt");
}

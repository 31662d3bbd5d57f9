use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn blogz(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("blogz").unwrap();
    cmd.env("BLOGZ_HOME", home.path())
        .env_remove("RUST_LOG")
        .env("EDITOR", "false");
    cmd
}

fn create(home: &TempDir, args: &[&str]) {
    blogz(home)
        .arg("create")
        .args(args)
        .arg("--no-editor")
        .assert()
        .success();
}

#[test]
fn create_and_view_post() {
    let home = TempDir::new().unwrap();

    blogz(&home)
        .args(["create", "Hello", "World", "--content", "first post", "--tags", "Rust, cli"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created post 'Hello World' (hello-world)"));

    blogz(&home)
        .args(["view", "hello-world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello World"))
        .stdout(predicate::str::contains("first post"))
        .stdout(predicate::str::contains("#rust #cli"));

    assert!(home.path().join("posts").join("hello-world.json").exists());
    assert!(home.path().join("index.json").exists());
}

#[test]
fn duplicate_titles_get_numbered_ids() {
    let home = TempDir::new().unwrap();
    create(&home, &["Hello World"]);

    blogz(&home)
        .args(["new", "Hello World", "--no-editor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(hello-world-2)"));
}

#[test]
fn no_command_lists_posts() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts yet."));

    create(&home, &["First Post"]);
    blogz(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("first-post"));
}

#[test]
fn publish_and_filter_by_status() {
    let home = TempDir::new().unwrap();
    create(&home, &["Going Live"]);
    create(&home, &["Still Drafting"]);

    blogz(&home)
        .args(["publish", "going-live"])
        .assert()
        .success();
    blogz(&home)
        .args(["publish", "going-live"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already published"));

    blogz(&home)
        .args(["ls", "--status", "published"])
        .assert()
        .success()
        .stdout(predicate::str::contains("going-live"))
        .stdout(predicate::str::contains("still-drafting").not());

    blogz(&home)
        .args(["unpublish", "going-live"])
        .assert()
        .success();
    blogz(&home)
        .args(["list", "--status", "published"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts match."));
}

#[test]
fn missing_post_fails_with_error() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .args(["view", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Post not found: nope"));
}

#[test]
fn blank_title_is_rejected() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .args(["create", "   ", "--no-editor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn delete_requires_confirmation() {
    let home = TempDir::new().unwrap();
    create(&home, &["Doomed"]);

    blogz(&home)
        .args(["rm", "doomed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted."));
    assert!(home.path().join("posts").join("doomed.json").exists());

    blogz(&home)
        .args(["delete", "doomed"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted post 'doomed'"));
    assert!(!home.path().join("posts").join("doomed.json").exists());

    blogz(&home)
        .args(["delete", "doomed", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Post not found"));
}

#[test]
fn search_ranks_title_before_tag() {
    let home = TempDir::new().unwrap();
    create(&home, &["Python Tips"]);
    create(&home, &["Weekend Notes", "--tags", "python"]);
    create(&home, &["Cooking"]);

    let output = blogz(&home)
        .args(["search", "python"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();

    let title_pos = text.find("python-tips").unwrap();
    let tag_pos = text.find("weekend-notes").unwrap();
    assert!(title_pos < tag_pos);
    assert!(!text.contains("cooking"));
}

#[test]
fn piped_stdin_becomes_content() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .args(["create", "Piped"])
        .write_stdin("from a pipe\n")
        .assert()
        .success();

    blogz(&home)
        .args(["view", "piped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from a pipe"));
}

#[test]
fn edit_changes_only_given_fields() {
    let home = TempDir::new().unwrap();
    create(&home, &["Original", "--content", "keep me"]);

    blogz(&home)
        .args(["edit", "original", "--title", "Renamed", "--tags", "news"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated post 'Renamed' (original)"));

    blogz(&home)
        .args(["view", "original"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed"))
        .stdout(predicate::str::contains("keep me"))
        .stdout(predicate::str::contains("#news"));
}

#[test]
fn export_json_files() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    create(&home, &["Exported Post", "--content", "text"]);

    blogz(&home)
        .args(["export", "--format", "json", "--output"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 post(s) as json"));

    let files: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
    let name = files[0].as_ref().unwrap().file_name().to_string_lossy().to_string();
    assert!(name.ends_with("-exported-post.json"), "{}", name);
}

#[test]
fn config_persists_and_applies() {
    let home = TempDir::new().unwrap();

    blogz(&home)
        .args(["config", "default_author", "Grace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_author set to Grace"));

    blogz(&home)
        .args(["config", "default_author"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grace"));

    blogz(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("list_limit"))
        .stdout(predicate::str::contains("blog_title"));

    create(&home, &["Authored"]);
    blogz(&home)
        .args(["view", "authored"])
        .assert()
        .success()
        .stdout(predicate::str::contains("authored · Grace"));

    blogz(&home)
        .args(["config", "list_limit", "lots"])
        .assert()
        .failure();
}

#[test]
fn doctor_repairs_missing_files() {
    let home = TempDir::new().unwrap();
    create(&home, &["Vanishing"]);
    fs::remove_file(home.path().join("posts").join("vanishing.json")).unwrap();

    blogz(&home)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1"));

    blogz(&home)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("No inconsistencies found."));
}

#[test]
fn stats_summarize_posts() {
    let home = TempDir::new().unwrap();
    create(&home, &["One", "--tags", "rust", "--content", "two words"]);
    create(&home, &["Two", "--tags", "rust", "--status", "published", "--content", "four more words here"]);

    blogz(&home)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("total      2"))
        .stdout(predicate::str::contains("published  1"))
        .stdout(predicate::str::contains("avg words  3"))
        .stdout(predicate::str::contains("rust"));
}

#[test]
fn data_flag_overrides_environment() {
    let home = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();

    blogz(&home)
        .arg("--data")
        .arg(other.path())
        .args(["create", "Elsewhere", "--no-editor"])
        .assert()
        .success();

    assert!(other.path().join("posts").join("elsewhere.json").exists());
    assert!(!home.path().join("posts").exists());
}

#[test]
fn menu_runs_from_stdin() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .arg("menu")
        .write_stdin("1\nFrom Menu\n\nbody\n.\n2\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created post 'From Menu' (from-menu)"))
        .stdout(predicate::str::contains("Bye."));
}

#[test]
fn help_groups_commands() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Writing:"))
        .stdout(predicate::str::contains("Usage: blogz"));
}

#[test]
fn subcommand_help_shows_its_flags() {
    let home = TempDir::new().unwrap();
    blogz(&home)
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-editor"))
        .stdout(predicate::str::contains("Writing:").not());
}

use assert_cmd::Command;
use assert_cmd::cargo;
use std::path::Path;
use tempfile::TempDir;
use trail::git::{Branch, CliGit, CommitHash, Git};

/// A scratch repository with a deterministic `main` trunk, isolated from
/// the user's git configuration.
struct GitRepo {
    dir: TempDir,
}

impl GitRepo {
    fn init() -> Self {
        let repo = GitRepo {
            dir: tempfile::tempdir().unwrap(),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["checkout", "--quiet", "-B", "main"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git(&self, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .args(args)
            .current_dir(self.path())
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env("GIT_CONFIG_SYSTEM", "/dev/null")
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Commit a change to `name` with `message` as both content and
    /// subject. Returns the new commit's hash.
    fn commit_file(&self, name: &str, message: &str) -> String {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, message).unwrap();
        self.git(&["add", "."]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    fn checkout(&self, rev: &str) {
        self.git(&["checkout", "--quiet", rev]);
    }

    fn checkout_new(&self, name: &str) {
        self.git(&["checkout", "--quiet", "-b", name]);
    }

    fn rev_parse(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev])
    }

    fn current_branch(&self) -> String {
        self.git(&["symbolic-ref", "--short", "HEAD"])
    }

    fn subject(&self, rev: &str) -> String {
        self.git(&["log", "-n", "1", "--format=%s", rev])
    }

    fn trail(&self) -> Command {
        let mut cmd = Command::new(cargo::cargo_bin!("trail"));
        cmd.current_dir(self.path());
        cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
        cmd.env("GIT_CONFIG_SYSTEM", "/dev/null");
        cmd
    }
}

/// `main` at `m1`, branch `a` one commit above it, branch `b` one above
/// that. HEAD is left on `b`.
fn stacked(repo: &GitRepo) -> (String, String, String) {
    let m1 = repo.commit_file("base.txt", "m1");
    repo.checkout_new("a");
    let a1 = repo.commit_file("src/lib.rs", "a1");
    repo.checkout_new("b");
    let b1 = repo.commit_file("docs/guide.md", "b1");
    (m1, a1, b1)
}

/// A three-branch stack (`bottom`, `mid`, `top`) where `bottom` then
/// gains one more commit, leaving `mid` and `top` behind on its old tip.
/// Returns (old bottom tip, old mid tip, new bottom tip).
fn outgrown_stack(repo: &GitRepo) -> (String, String, String) {
    repo.commit_file("base.txt", "m1");
    repo.checkout_new("bottom");
    let b_old = repo.commit_file("bottom.txt", "b1");
    repo.checkout_new("mid");
    let c_old = repo.commit_file("mid.txt", "c1");
    repo.checkout_new("top");
    repo.commit_file("top.txt", "d1");
    repo.checkout("bottom");
    let b_new = repo.commit_file("bottom2.txt", "b2");
    (b_old, c_old, b_new)
}

#[test]
fn test_evolve_plan_writes_todo() {
    let repo = GitRepo::init();
    let (m1, a1, b1) = stacked(&repo);

    // The trunk moves ahead, stranding the stack on m1.
    repo.checkout("main");
    let m2 = repo.commit_file("trunk.txt", "m2");
    repo.checkout("b");

    let todo_path = repo.path().join("todo.txt");
    repo.trail()
        .args(["evolve", "plan", m2.as_str(), m1.as_str()])
        .arg(&todo_path)
        .assert()
        .success();

    let todo = std::fs::read_to_string(&todo_path).unwrap();
    let expected = format!(
        "label {m1}\n\
         pick {a1} a1\n\
         label {a1}\n\
         exec git branch -f a\n\
         pick {b1} b1\n\
         label {b1}\n\
         exec git branch -f b\n\
         reset {m1}"
    );
    assert_eq!(todo, expected);
}

#[test]
fn test_evolve_plan_rejects_unknown_revision() {
    let repo = GitRepo::init();
    repo.commit_file("a.txt", "one");

    repo.trail()
        .args(["evolve", "plan", "no-such-rev", "HEAD", "todo.txt"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to resolve revision"));
}

#[test]
fn test_evolve_execute_replays_stack() {
    let repo = GitRepo::init();
    let (b_old, c_old, b_new) = outgrown_stack(&repo);

    repo.trail()
        .args(["evolve", "execute", b_new.as_str(), b_old.as_str()])
        .assert()
        .success();

    // The stacked branches were replayed onto bottom's new tip...
    assert_eq!(repo.rev_parse("mid~1"), b_new);
    assert_eq!(repo.rev_parse("top~1"), repo.rev_parse("mid"));
    assert_eq!(repo.subject("mid"), "c1");
    assert_eq!(repo.subject("top"), "d1");
    assert_ne!(repo.rev_parse("mid"), c_old);

    // ...while the branch we were on never moved.
    assert_eq!(repo.current_branch(), "bottom");
    assert_eq!(repo.rev_parse("bottom"), b_new);
}

#[test]
fn test_restack_uses_reflog_positions() {
    let repo = GitRepo::init();
    let (_b_old, _c_old, b_new) = outgrown_stack(&repo);

    // Right after the bottom commit, HEAD@{1} is still the old tip, so
    // restack needs no arguments.
    repo.trail().arg("restack").assert().success();

    assert_eq!(repo.rev_parse("mid~1"), b_new);
    assert_eq!(repo.rev_parse("top~1"), repo.rev_parse("mid"));
    assert_eq!(repo.current_branch(), "bottom");
}

#[test]
fn test_restack_dry_run_leaves_branches_alone() {
    let repo = GitRepo::init();
    let (_b_old, c_old, _b_new) = outgrown_stack(&repo);

    repo.trail()
        .args(["restack", "-d"])
        .assert()
        .success()
        .stdout(predicates::str::contains(format!("pick {c_old}")));

    assert_eq!(repo.rev_parse("mid"), c_old);
}

#[test]
fn test_prior_lists_branches_below_head() {
    let repo = GitRepo::init();
    stacked(&repo);

    repo.trail()
        .args(["prior", "--list"])
        .assert()
        .success()
        .stdout(predicates::str::contains("a\nmain"));
}

#[test]
fn test_prior_checks_out_single_candidate() {
    let repo = GitRepo::init();
    repo.commit_file("base.txt", "m1");
    repo.checkout_new("feat");
    repo.commit_file("feat.txt", "f1");

    repo.trail()
        .args(["prior", "-d"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Would check out main"));
    assert_eq!(repo.current_branch(), "feat");

    repo.trail().arg("prior").assert().success();
    assert_eq!(repo.current_branch(), "main");
}

#[test]
fn test_prior_fails_with_nothing_below() {
    let repo = GitRepo::init();
    repo.commit_file("base.txt", "m1");

    repo.trail()
        .arg("prior")
        .assert()
        .failure()
        .stderr(predicates::str::contains("No prior branch"));
}

#[test]
fn test_stack_shows_stacked_branches() {
    let repo = GitRepo::init();
    stacked(&repo);

    let assert = repo.trail().arg("stack").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("base "));
    assert!(stdout.contains("a1"));
    assert!(stdout.contains("[a]"));
    assert!(stdout.contains("b1"));
    assert!(stdout.contains("[b]"));
}

#[test]
fn test_stack_json_output() {
    let repo = GitRepo::init();
    let (m1, a1, _b1) = stacked(&repo);

    let assert = repo
        .trail()
        .args(["stack", "--format", "json"])
        .assert()
        .success();
    let view: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    assert_eq!(view["base"]["hash"], m1);
    assert_eq!(view["entries"][0]["hash"], a1);
    assert_eq!(view["entries"][0]["branches"][0], "a");
    assert_eq!(view["entries"].as_array().unwrap().len(), 2);
}

#[test]
fn test_stack_touching_filters_by_path() {
    let repo = GitRepo::init();
    stacked(&repo);

    let assert = repo
        .trail()
        .args(["stack", "--touching", "src/*"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("a1"));
    assert!(!stdout.contains("b1"));
}

#[test]
fn test_stack_outside_repository_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo::cargo_bin!("trail"));
    cmd.current_dir(dir.path())
        .arg("stack")
        .assert()
        .failure()
        .stderr(predicates::str::contains("No trunk branch"));
}

#[test]
fn test_formula_prints_ruby_class() {
    let repo = GitRepo::init();

    repo.trail()
        .arg("formula")
        .assert()
        .success()
        .stdout(predicates::str::contains("class Trail < Formula"))
        .stdout(predicates::str::contains("depends_on \"rust\" => :build"));
}

#[test]
fn test_formula_write_then_check() {
    let repo = GitRepo::init();
    repo.commit_file("README.md", "init");

    repo.trail().args(["formula", "--write"]).assert().success();
    repo.trail()
        .args(["formula", "--check"])
        .assert()
        .success()
        .stdout(predicates::str::contains("up to date"));

    // A stale copy fails the check.
    std::fs::write(repo.path().join("trail.rb"), "class Trail < Formula\nend\n").unwrap();
    repo.trail()
        .args(["formula", "--check"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("out of date"));
}

#[test]
fn test_cli_git_detached_head() {
    let repo = GitRepo::init();
    let first = repo.commit_file("a.txt", "one");
    repo.commit_file("b.txt", "two");
    repo.checkout(&first);

    let git = CliGit::in_dir(repo.path());
    assert_eq!(git.current_branch().unwrap(), None);

    // `git branch --contains` prints a "(HEAD detached at ...)" entry
    // here, which must not leak through as a branch.
    let hash: CommitHash = first.parse().unwrap();
    let branches = git.branches_containing(&hash).unwrap();
    assert_eq!(branches, vec![Branch::new("main")]);
}

#[test]
fn test_cli_git_topology_queries() {
    let repo = GitRepo::init();
    let (m1, a1, b1) = stacked(&repo);
    let git = CliGit::in_dir(repo.path());

    let tips = git.local_branch_tips().unwrap();
    assert!(tips.contains(&(Branch::new("main"), m1.parse().unwrap())));
    assert!(tips.contains(&(Branch::new("a"), a1.parse().unwrap())));
    assert!(tips.contains(&(Branch::new("b"), b1.parse().unwrap())));

    let merge_base = git
        .merge_base(&b1.parse().unwrap(), &m1.parse().unwrap())
        .unwrap();
    assert_eq!(merge_base, m1.parse().unwrap());

    let walk = git.rev_list_first_parent(&b1.parse().unwrap(), 10).unwrap();
    let expected: Vec<CommitHash> = [&b1, &a1, &m1].iter().map(|h| h.parse().unwrap()).collect();
    assert_eq!(walk, expected);

    let changed = git.changed_files(&a1.parse().unwrap()).unwrap();
    assert_eq!(changed, vec!["src/lib.rs".to_string()]);
}

#[test]
fn test_cli_git_resolves_and_describes_commits() {
    let repo = GitRepo::init();
    let m1 = repo.commit_file("base.txt", "m1");
    let git = CliGit::in_dir(repo.path());

    let head = git.rev_parse("HEAD").unwrap();
    assert_eq!(head, m1.parse().unwrap());
    assert!(git.rev_parse("no-such-rev").is_err());

    assert_eq!(git.subject(&head).unwrap(), "m1");
    assert!(m1.starts_with(&git.short_hash(&head).unwrap()));
    assert_eq!(git.repo_root().unwrap(), repo.path().canonicalize().unwrap());
}

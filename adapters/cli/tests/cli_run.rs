use std::process::Command;

fn run(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_endless-dungeon"))
        .args(args)
        .output()
        .expect("failed to launch endless-dungeon binary");

    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn seeded_run_prints_map_and_summary() {
    let (success, stdout, stderr) = run(&["--seed", "7", "--obstacles", "0", "--steps", "40"]);

    assert!(success, "run failed: {stderr}");
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines[..38].iter().filter(|line| line.chars().count() == 50).count(), 38);
    assert!(stdout.contains('T'), "structure missing from map");
    assert!(stdout.contains('@'), "agent missing from map");
    assert!(stdout.contains("seed: 7"));
    assert!(stdout.contains("size: 50x38"));
    assert!(stdout.contains("obstacles placed: 0"));
    assert!(stdout.contains("path length: 25 cells"));
}

#[test]
fn same_seed_prints_identical_output() {
    let first = run(&["--seed", "99", "--obstacles", "200"]);
    let second = run(&["--seed", "99", "--obstacles", "200"]);

    assert!(first.0 && second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn goal_outside_map_fails() {
    let (success, _, stderr) = run(&["--seed", "1", "--goal", "500,2"]);

    assert!(!success);
    assert!(stderr.contains("outside"), "unexpected error output: {stderr}");
}

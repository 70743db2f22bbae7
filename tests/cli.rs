use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gamesave(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gamesave").unwrap();
    cmd.env("GAMESAVE_DATA_DIR", data_dir).env_remove("RUST_LOG");
    cmd
}

fn create_test_env() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let save = temp.path().join("save");
    fs::create_dir_all(save.join("slot1")).unwrap();
    fs::write(save.join("slot1/world.sav"), "day 7").unwrap();
    (temp, data, save)
}

fn local_archives(data: &Path, profile: &str) -> Vec<String> {
    let dir = data.join("backups").join(profile);
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_profile_add_and_list() {
    let (_temp, data, save) = create_test_env();

    gamesave(&data)
        .args(["profile", "add", "Terraria"])
        .arg(&save)
        .args(["--interval", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created profile: Terraria"));

    gamesave(&data)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Terraria").and(predicate::str::contains("2m")));
}

#[test]
fn test_invalid_profile_name_fails() {
    let (_temp, data, save) = create_test_env();

    gamesave(&data)
        .args(["profile", "add", "bad:name"])
        .arg(&save)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid character"));
}

#[test]
fn test_manual_backup_creates_archive() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Celeste"])
        .arg(&save)
        .assert()
        .success();

    gamesave(&data)
        .args(["backup", "create", "Celeste"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[M] Backup").and(predicate::str::contains("(Local).")));

    let archives = local_archives(&data, "Celeste");
    assert_eq!(archives.len(), 1);
    assert!(archives[0].ends_with("]-M"));
    let copied = data.join("backups/Celeste").join(&archives[0]).join("slot1/world.sav");
    assert_eq!(fs::read_to_string(copied).unwrap(), "day 7");
}

#[test]
fn test_backup_of_missing_save_fails() {
    let (temp, data, _save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Ghost"])
        .arg(temp.path().join("nowhere"))
        .assert()
        .success();

    gamesave(&data)
        .args(["backup", "create", "Ghost"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Local backup FAILED"));
    assert!(local_archives(&data, "Ghost").is_empty());
}

#[test]
fn test_limits_prune_oldest_auto() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Hades"])
        .arg(&save)
        .assert()
        .success();
    gamesave(&data)
        .args(["config", "set-limits", "--local-auto", "2"])
        .assert()
        .success();

    for _ in 0..3 {
        gamesave(&data)
            .args(["backup", "create", "Hades", "--auto"])
            .assert()
            .success();
    }

    let archives = local_archives(&data, "Hades");
    assert_eq!(archives.len(), 2);
    assert!(archives.iter().all(|a| a.ends_with("]-A")));
}

#[test]
fn test_prune_requires_force() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Hades"])
        .arg(&save)
        .assert()
        .success();
    for _ in 0..2 {
        gamesave(&data)
            .args(["backup", "create", "Hades"])
            .assert()
            .success();
    }
    gamesave(&data)
        .args(["config", "set-limits", "--local-manual", "1"])
        .assert()
        .success();

    gamesave(&data)
        .args(["backup", "prune", "Hades"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert_eq!(local_archives(&data, "Hades").len(), 2);

    gamesave(&data)
        .args(["backup", "prune", "Hades", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 archive(s)."));
    assert_eq!(local_archives(&data, "Hades").len(), 1);
}

#[test]
fn test_restore_latest_manual() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Celeste"])
        .arg(&save)
        .assert()
        .success();
    gamesave(&data)
        .args(["backup", "create", "Celeste"])
        .assert()
        .success();

    fs::write(save.join("slot1/world.sav"), "day 1").unwrap();
    fs::write(save.join("stray.tmp"), "x").unwrap();

    gamesave(&data)
        .args(["backup", "restore", "Celeste", "latest-manual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"));
    assert_eq!(fs::read_to_string(save.join("slot1/world.sav")).unwrap(), "day 1");

    gamesave(&data)
        .args(["backup", "restore", "Celeste", "latest-manual", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));
    assert_eq!(fs::read_to_string(save.join("slot1/world.sav")).unwrap(), "day 7");
    assert!(!save.join("stray.tmp").exists());
}

#[test]
fn test_restore_without_archives_fails() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Empty"])
        .arg(&save)
        .assert()
        .success();

    gamesave(&data)
        .args(["backup", "restore", "Empty", "latest", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No archives found"));
}

#[test]
fn test_restore_latest_manual_without_manual_archive_fails() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Empty"])
        .arg(&save)
        .assert()
        .success();

    gamesave(&data)
        .args(["backup", "restore", "Empty", "latest-manual", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manual (-M) archive found for Empty"));

    gamesave(&data)
        .args(["backup", "create", "Empty", "--auto"])
        .assert()
        .success();
    gamesave(&data)
        .args(["backup", "restore", "Empty", "latest-manual", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manual (-M) archive found"));
    assert_eq!(fs::read_to_string(save.join("slot1/world.sav")).unwrap(), "day 7");
}

#[test]
fn test_mirror_backup_and_list() {
    let (temp, data, save) = create_test_env();
    let drive = temp.path().join("drive");
    fs::create_dir_all(&drive).unwrap();

    gamesave(&data)
        .args(["config", "set-mirror"])
        .arg(&drive)
        .assert()
        .success();
    gamesave(&data)
        .args(["profile", "add", "Hades", "--mirror"])
        .arg(&save)
        .assert()
        .success();
    gamesave(&data)
        .args(["backup", "create", "Hades"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(Local + Mirror)."));

    assert_eq!(
        fs::read_dir(drive.join("Game Save Backups/Hades")).unwrap().count(),
        1
    );
    gamesave(&data)
        .args(["backup", "list", "Hades", "--mirror"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirror archives for Hades"));
}

#[test]
fn test_remove_profile_with_purge() {
    let (_temp, data, save) = create_test_env();
    gamesave(&data)
        .args(["profile", "add", "Gone"])
        .arg(&save)
        .assert()
        .success();
    gamesave(&data)
        .args(["backup", "create", "Gone"])
        .assert()
        .success();

    gamesave(&data)
        .args(["profile", "remove", "Gone", "--purge-local", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted local archives."));

    assert!(!data.join("backups/Gone").exists());
    gamesave(&data)
        .args(["profile", "show", "Gone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn test_config_show() {
    let (_temp, data, _save) = create_test_env();
    gamesave(&data)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Local backups")
                .and(predicate::str::contains("(not configured)")),
        );
}

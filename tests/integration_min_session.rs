// Drives the compiled binary through a pseudo terminal: start, open the pace
// table, go back, quit. No network is touched on this path.
//
// Requires a TTY; unix only and ignored by default.
// Run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("halfpace");
    let log = std::env::temp_dir().join("halfpace-pty-test.log");
    let cmd = format!("{} --no-seed --log-file {}", bin.display(), log.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    p.send("\t")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("\t")?;
    std::thread::sleep(Duration::from_millis(100));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}

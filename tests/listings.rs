use datatest_stable as datatest;
use std::{
    fs,
    io::{self, Write},
    path::Path,
    process::{Command, Output, Stdio},
};

use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunLog {
    stdout: String,
    stderr: String,
    status: i32,
}

fn run_dasm(image: &Path, args: &[String]) -> io::Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dasm68k"));
    cmd.arg(image).args(args).env_remove("RUST_LOG");
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).output()
}

fn to_runlog(out: Output) -> RunLog {
    RunLog {
        stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
        status: out.status.code().unwrap_or(-1),
    }
}

/// Fixtures hold big-endian words in hex, one instruction per line.
/// Anything after `#` is a comment.
fn load_image(path: &Path) -> datatest::Result<NamedTempFile> {
    let text = fs::read_to_string(path)?;
    let mut bytes = Vec::new();
    for line in text.lines() {
        let code = line.split('#').next().unwrap_or("");
        for word in code.split_whitespace() {
            bytes.extend_from_slice(&u16::from_str_radix(word, 16)?.to_be_bytes());
        }
    }
    let mut file = NamedTempFile::new()?;
    file.write_all(&bytes)?;
    Ok(file)
}

fn run_case(path: &Path) -> datatest::Result<()> {
    let image = load_image(path)?;
    let args = load_args(path);
    let expected = fs::read_to_string(path.with_extension("expected"))?;

    let log = to_runlog(run_dasm(image.path(), &args)?);

    if log.status != 0 || log.stdout != expected.trim() {
        panic!(
            "Listing {} differs (exit code {})\nexpected:\n{}\nactual:\n{}\nstderr: {}",
            path.display(),
            log.status,
            expected.trim(),
            log.stdout,
            log.stderr
        );
    }

    Ok(())
}

datatest::harness! {
    { test = run_case, root = "./tests/listings", pattern = r#"^.*\.hex$"# },
}

fn load_args(path: &Path) -> Vec<String> {
    let args_path = path.with_extension("args");
    if let Ok(text) = fs::read_to_string(args_path) {
        text.split_whitespace().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    }
}

use std::{
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

use sift_testkit::corpus;

fn sift_cmd(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sift-cmd"))
        .args(args)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // The child may exit before reading its input.
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout_lines(output: &Output) -> Vec<String> {
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_invert_merge_encode_search() {
    let dir = tempfile::tempdir().unwrap();
    let docs = corpus::documents(31, 240, 120, 30);
    let first = dir.path().join("first.trec");
    let second = dir.path().join("second.trec");
    std::fs::write(&first, corpus::to_trec(&docs[..100])).unwrap();
    std::fs::write(&second, corpus::to_trec(&docs[100..])).unwrap();

    let shard0 = dir.path().join("shard0.postings");
    let shard1 = dir.path().join("shard1.postings");
    let merged = dir.path().join("merged.postings");
    let single = dir.path().join("single.postings");
    for (output, inputs) in [
        (&shard0, vec![&first]),
        (&shard1, vec![&second]),
        (&single, vec![&first, &second]),
    ] {
        let mut args = vec!["invert", "-o", path_arg(output)];
        args.extend(inputs.iter().map(|p| path_arg(p)));
        stdout_lines(&sift_cmd(&args, ""));
    }
    stdout_lines(&sift_cmd(
        &["merge", "-o", path_arg(&merged), path_arg(&shard0), path_arg(&shard1)],
        "",
    ));
    assert_eq!(
        std::fs::read(&merged).unwrap(),
        std::fs::read(&single).unwrap()
    );

    stdout_lines(&sift_cmd(&["encode", path_arg(&merged)], ""));
    assert!(dir.path().join("merged.postings.meta").is_file());

    let dict = stdout_lines(&sift_cmd(&["dump-dict", path_arg(&merged)], ""));
    assert!(!dict.is_empty());
    for line in &dict {
        let (df, token) = line.split_once('\t').unwrap();
        assert!(df.parse::<u32>().unwrap() >= 1);
        assert!(!token.is_empty());
    }

    let query = docs
        .iter()
        .find(|doc| doc.tokens.len() >= 3)
        .unwrap()
        .tokens[..3]
        .join(" ");
    let input = format!("q1;{query}\n{query}\n\nignored\n");
    let results = stdout_lines(&sift_cmd(&["search", "-k", "5", path_arg(&merged)], &input));
    assert_eq!(results.len(), 10);
    for (i, line) in results[..5].iter().enumerate() {
        let fields: Vec<_> = line.split('\t').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "q1");
        assert_eq!(fields[2], (i + 1).to_string());
        assert!(fields[3].parse::<f32>().unwrap() > 0.0);
    }
    for line in &results[5..] {
        assert_eq!(line.split('\t').count(), 3);
    }

    let exhaustive = stdout_lines(&sift_cmd(
        &["search", "-k", "5", "--strategy", "exhaustive", path_arg(&merged)],
        &input,
    ));
    assert_eq!(exhaustive, results);
}

#[test]
fn test_errors_exit_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.postings");
    assert!(!sift_cmd(&["encode", path_arg(&missing)], "").status.success());

    let bad = dir.path().join("bad.trec");
    std::fs::write(&bad, "not a corpus").unwrap();
    let out = dir.path().join("out.postings");
    assert!(
        !sift_cmd(&["invert", "-o", path_arg(&out), path_arg(&bad)], "")
            .status
            .success()
    );

    let good = dir.path().join("good.trec");
    std::fs::write(&good, "<DOC><DOCNO>a</DOCNO>x y</DOC>").unwrap();
    stdout_lines(&sift_cmd(&["invert", "--math", "-o", path_arg(&out), path_arg(&good)], ""));
    stdout_lines(&sift_cmd(&["encode", path_arg(&out)], ""));
    // A math index requires math mode.
    assert!(!sift_cmd(&["search", path_arg(&out)], "x\n").status.success());
    let results = stdout_lines(&sift_cmd(&["search", "--math", path_arg(&out)], "x\n"));
    assert_eq!(results.len(), 1);
    assert!(!sift_cmd(&["search", "-k", "0", "--math", path_arg(&out)], "x\n")
        .status
        .success());
}

#[test]
fn test_invert_with_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("corpus.trec");
    std::fs::write(
        &corpus,
        "<DOC><DOCNO>a</DOCNO>red #x blue</DOC><DOC><DOCNO>b</DOCNO>blue green</DOC>",
    )
    .unwrap();
    let keywords = dir.path().join("keywords.txt");
    std::fs::write(&keywords, "blue\n").unwrap();
    let out = dir.path().join("out.postings");

    stdout_lines(&sift_cmd(
        &[
            "invert",
            "--keywords",
            path_arg(&keywords),
            "-o",
            path_arg(&out),
            path_arg(&corpus),
        ],
        "",
    ));
    stdout_lines(&sift_cmd(&["encode", path_arg(&out)], ""));
    let dict = stdout_lines(&sift_cmd(&["dump-dict", path_arg(&out)], ""));
    assert_eq!(dict, ["1\t#x", "2\tblue"]);
}

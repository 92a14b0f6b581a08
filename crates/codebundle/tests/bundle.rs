use std::fs;
use std::path::{self, Path, PathBuf};

use anyhow::Result;
use codebundle::app::bundle::{BundleConfig, Bundler};
use codebundle::domain::model::SortMode;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) -> Result<PathBuf> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

fn project() -> Result<(TempDir, PathBuf)> {
    let temp = tempfile::tempdir()?;
    let root = path::absolute(temp.path())?;
    write(&root, "a.py", "print(1)\n\nprint(2)\n")?;
    write(&root, "b.cpp", "int main(){}\n")?;
    Ok((temp, root))
}

#[test]
fn removes_blank_lines_in_alphabetical_order() -> Result<()> {
    let (_temp, root) = project()?;
    let out = tempfile::tempdir()?;
    let output = out.path().join("bundle.txt");

    let config = BundleConfig::new(&root)
        .with_output(&output)
        .with_languages(["py", "cpp"])
        .with_sort_mode(SortMode::Alphabetical)
        .with_remove_empty_lines(true);
    Bundler::new(config)?.run()?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "print(1)\nprint(2)\nint main(){}\n"
    );
    Ok(())
}

#[test]
fn annotates_files_under_an_author_header() -> Result<()> {
    let (_temp, root) = project()?;
    let out = tempfile::tempdir()?;
    let output = out.path().join("bundle.txt");

    let config = BundleConfig::new(&root)
        .with_output(&output)
        .with_languages(["py", "cpp"])
        .with_author("Jane")
        .with_note(true);
    Bundler::new(config)?.run()?;

    let written = fs::read_to_string(&output)?;
    let a_path = root.join("a.py").display().to_string();
    let b_path = root.join("b.cpp").display().to_string();

    assert!(written.starts_with("By Jane\n\n"));
    let positions: Vec<usize> = [
        "print(1)\n\nprint(2)\n",
        a_path.as_str(),
        "int main(){}\n",
        b_path.as_str(),
    ]
    .iter()
    .map(|needle| written.find(needle).expect("block present"))
    .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
}

#[test]
fn by_language_groups_extensions_stably() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path();
    write(root, "x/z.py", "z\n")?;
    write(root, "x/a.ts", "a\n")?;
    write(root, "y/m.py", "m\n")?;
    write(root, "y/b.cs", "b\n")?;
    let out = tempfile::tempdir()?;
    let output = out.path().join("bundle.txt");

    let config = BundleConfig::new(root)
        .with_output(&output)
        .with_languages(["all"])
        .with_sort_mode(SortMode::ByLanguage);
    let report = Bundler::new(config)?.run()?;

    let extensions: Vec<_> = report.files.iter().map(|f| f.extension.as_str()).collect();
    assert_eq!(extensions, vec!["cs", "py", "py", "ts"]);
    // x/ is walked before y/, so z.py stays ahead of m.py.
    assert_eq!(fs::read_to_string(&output)?, "b\nz\nm\na\n");
    Ok(())
}

#[test]
fn rerunning_overwrites_with_identical_output() -> Result<()> {
    let (_temp, root) = project()?;
    let output = root.join("bundle.txt");
    fs::write(&output, "previous run leftovers that are longer than the bundle\n")?;

    let config = BundleConfig::new(&root)
        .with_output(&output)
        .with_languages(["all"])
        .with_note(true);
    let bundler = Bundler::new(config)?;

    bundler.run()?;
    let first = fs::read(&output)?;
    bundler.run()?;
    let second = fs::read(&output)?;

    assert_eq!(first, second);
    assert!(!String::from_utf8(first)?.contains("leftovers"));
    Ok(())
}

//! Which datasets the last commit of a PMLB working copy touched.
//!
//! Only used when maintaining the dataset repository itself.
use crate::fetch::SUFFIX;
use crate::Error;
use log::info;
use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::process::{Command, Stdio};

/// Top-level directory holding one sub-directory per dataset.
const DATASETS_DIR: &str = "datasets";
const METADATA_FILE: &str = "metadata.yaml";

/// Dataset names whose data or metadata changed, each list sorted and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedDatasets {
    /// Datasets with a changed `.tsv.gz` file.
    pub changed_datasets: Vec<String>,
    /// Datasets with a changed `metadata.yaml`.
    pub changed_metadata: Vec<String>,
}

/// Group the output of `git diff --name-only` by dataset.
///
/// The dataset name is the directory directly holding the file; paths outside
/// `datasets/` are ignored.
pub fn parse_changed_paths(output: &str) -> ChangedDatasets {
    let mut datasets = BTreeSet::new();
    let mut metadata = BTreeSet::new();

    for line in output.lines() {
        let path = Path::new(line.trim());
        let parts: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();
        if parts.first() != Some(&DATASETS_DIR) || parts.len() < 2 {
            continue;
        }
        let file = parts[parts.len() - 1];
        let dataset = parts[parts.len() - 2];
        if file.ends_with(SUFFIX) {
            datasets.insert(dataset.to_string());
        }
        if file == METADATA_FILE {
            metadata.insert(dataset.to_string());
        }
    }

    ChangedDatasets {
        changed_datasets: datasets.into_iter().collect(),
        changed_metadata: metadata.into_iter().collect(),
    }
}

/// Compare `HEAD` with `HEAD~1` in the git working copy at `repo`.
pub fn changed_datasets_in(repo: impl AsRef<Path>) -> Result<ChangedDatasets, Error> {
    let output = Command::new("git")
        .arg("diff")
        .arg("--name-only")
        .arg("HEAD")
        .arg("HEAD~1")
        .current_dir(repo)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(stderr.trim().to_string()));
    }

    let changes = parse_changed_paths(&String::from_utf8_lossy(&output.stdout));
    info!("changed datasets: {:?}", changes.changed_datasets);
    info!("changed metadata: {:?}", changes.changed_metadata);
    Ok(changes)
}

/// [`changed_datasets_in`] for the current directory.
pub fn changed_datasets() -> Result<ChangedDatasets, Error> {
    changed_datasets_in(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_parent_directory() {
        let output = "\
datasets/iris/iris.tsv.gz
datasets/iris/metadata.yaml
datasets/adult/adult.tsv.gz
datasets/adult/README.md
datasets/1027_ESL/metadata.yaml
";
        let changes = parse_changed_paths(output);
        assert_eq!(changes.changed_datasets, vec!["adult", "iris"]);
        assert_eq!(changes.changed_metadata, vec!["1027_ESL", "iris"]);
    }

    #[test]
    fn ignores_paths_outside_datasets() {
        let output = "\
pmlb/pmlb.py
docs/iris/iris.tsv.gz
metadata.yaml
";
        assert_eq!(parse_changed_paths(output), ChangedDatasets::default());
    }

    #[test]
    fn file_directly_under_datasets_is_named_after_the_directory() {
        let changes = parse_changed_paths("datasets/all_summary_stats.tsv.gz\n");
        assert_eq!(changes.changed_datasets, vec!["datasets"]);
        assert!(changes.changed_metadata.is_empty());
    }

    #[test]
    fn deduplicates_and_sorts() {
        let output = "datasets/b/b.tsv.gz\ndatasets/a/a.tsv.gz\ndatasets/b/b.tsv.gz\n";
        let changes = parse_changed_paths(output);
        assert_eq!(changes.changed_datasets, vec!["a", "b"]);
    }

    #[test]
    fn empty_diff() {
        assert_eq!(parse_changed_paths(""), ChangedDatasets::default());
    }

    #[test]
    fn not_a_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(changed_datasets_in(dir.path()).is_err());
    }

    fn git(repo: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=pmlb", "-c", "user.email=pmlb@example.com", "-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(repo)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn commit_file(repo: &Path, path: &str, contents: &str, message: &str) {
        let full = repo.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, contents).unwrap();
        git(repo, &["add", "."]);
        git(repo, &["commit", "-q", "-m", message]);
    }

    #[test]
    fn single_commit_is_a_git_error() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit_file(dir.path(), "README.md", "pmlb", "initial");

        assert!(matches!(changed_datasets_in(dir.path()), Err(Error::Git(_))));
    }

    #[test]
    fn reports_changes_of_the_last_commit() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        commit_file(dir.path(), "README.md", "pmlb", "initial");
        std::fs::create_dir_all(dir.path().join("datasets/x")).unwrap();
        std::fs::write(dir.path().join("datasets/x/x.tsv.gz"), "x").unwrap();
        commit_file(dir.path(), "datasets/y/metadata.yaml", "y", "add x and y");

        let changes = changed_datasets_in(dir.path()).unwrap();
        assert_eq!(changes.changed_datasets, vec!["x"]);
        assert_eq!(changes.changed_metadata, vec!["y"]);
    }
}

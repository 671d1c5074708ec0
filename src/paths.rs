//! Input discovery and output path derivation for directory runs.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::ConvertError;

/// Recognised input suffixes, longest first so stripping `.vcf.gz` wins.
pub const VCF_EXTENSIONS: [&str; 2] = [".vcf.gz", ".vcf"];

pub const CSV_EXTENSION: &str = "csv";

pub fn is_vcf_name(name: &str) -> bool {
    VCF_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// File name of `path` without its VCF suffix.
pub fn vcf_basename(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    VCF_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .map(str::to_string)
        .unwrap_or(name)
}

/// Collects VCF files directly inside `dir`, or anywhere below it when
/// `recursive` is set.
///
/// Only regular files are returned; symbolic links are not followed. The
/// result is sorted by file name within each directory and is guaranteed not
/// to map two inputs onto the same output name.
pub fn discover_vcfs(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConvertError> {
    ensure_directory(dir, "input directory")?;

    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ConvertError::Discovery {
            dir: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_vcf_name(&entry.file_name().to_string_lossy()) {
            paths.push(entry.into_path());
        }
    }

    if paths.is_empty() {
        return Err(ConvertError::NoInputs {
            dir: dir.to_path_buf(),
        });
    }

    check_duplicate_basenames(&paths)?;
    tracing::debug!(dir = %dir.display(), recursive, found = paths.len(), "discovered VCF files");

    Ok(paths)
}

/// Fails on the first pair of inputs that would write the same CSV file.
///
/// Basenames are compared case-sensitively.
pub fn check_duplicate_basenames(paths: &[PathBuf]) -> Result<(), ConvertError> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(paths.len());
    for path in paths {
        let basename = vcf_basename(path);
        if let Some(first) = seen.get(&basename) {
            return Err(ConvertError::DuplicateOutput {
                first: first.to_path_buf(),
                second: path.clone(),
                basename,
            });
        }
        seen.insert(basename, path);
    }
    Ok(())
}

/// Derives `out_dir/<basename>.csv` for every input, in input order.
pub fn make_output_paths(inputs: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    ensure_directory(out_dir, "output directory")?;

    let outputs: Vec<PathBuf> = inputs
        .iter()
        .map(|input| out_dir.join(format!("{}.{CSV_EXTENSION}", vcf_basename(input))))
        .collect();

    for output in outputs.iter().filter(|output| output.exists()) {
        tracing::warn!(output = %output.display(), "overwriting existing file");
    }

    Ok(outputs)
}

fn ensure_directory(path: &Path, role: &'static str) -> Result<(), ConvertError> {
    let metadata = fs::metadata(path).map_err(|source| ConvertError::DestinationUnavailable {
        path: path.to_path_buf(),
        role,
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ConvertError::NotADirectory {
            path: path.to_path_buf(),
            role,
        });
    }
    Ok(())
}

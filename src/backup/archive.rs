// zabbixbackup/src/backup/archive.rs
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::compress::{CommandDescriptor, Sink};
use crate::utils::command;

/// `path` with `extension` appended to its file name.
pub fn with_extension_suffix(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(extension);
    PathBuf::from(name)
}

fn split_dir(source_dir: &Path) -> Result<(PathBuf, String)> {
    let name = source_dir
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid backup directory name: {}", source_dir.display()))?
        .to_string();
    let parent = source_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((parent, name))
}

/// Files an archive attempt may leave next to `source_dir`.
fn output_paths(source_dir: &Path, descriptor: &CommandDescriptor) -> Vec<PathBuf> {
    match descriptor {
        CommandDescriptor::Compressor { extension, .. } => vec![
            with_extension_suffix(source_dir, ".tar"),
            with_extension_suffix(source_dir, &format!(".tar{extension}")),
        ],
        other => vec![with_extension_suffix(source_dir, other.extension())],
    }
}

/// Archives `source_dir` next to itself as described by `descriptor` and
/// returns the archive path. The directory is left in place. On failure no
/// partial archive is left behind.
pub fn archive_directory(source_dir: &Path, descriptor: &CommandDescriptor) -> Result<PathBuf> {
    if !source_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Source for archival is not a directory: {}",
            source_dir.display()
        ));
    }

    let archived = write_archive(source_dir, descriptor);
    if archived.is_err() {
        for path in output_paths(source_dir, descriptor) {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed partial archive"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove partial archive")
                }
            }
        }
    }
    archived
}

fn write_archive(source_dir: &Path, descriptor: &CommandDescriptor) -> Result<PathBuf> {
    let (parent, name) = split_dir(source_dir)?;

    match descriptor {
        CommandDescriptor::Tar {
            env,
            extension,
            tar_argv,
        } => {
            let dest = with_extension_suffix(source_dir, extension);
            let mut argv = tar_argv.clone();
            argv.push(dest.to_string_lossy().into_owned());
            argv.extend(["-C".to_string(), parent.to_string_lossy().into_owned(), name]);
            info!(archive = %dest.display(), "Creating archive with tar");
            command::run(&argv, env)?;
            Ok(dest)
        }
        CommandDescriptor::Compressor { .. } => {
            let tarball = with_extension_suffix(source_dir, ".tar");
            let argv = vec![
                "tar".to_string(),
                "-cf".to_string(),
                tarball.to_string_lossy().into_owned(),
                "-C".to_string(),
                parent.to_string_lossy().into_owned(),
                name,
            ];
            info!(archive = %tarball.display(), "Creating tarball before compression");
            command::run(&argv, &BTreeMap::new())?;
            compress_file(&tarball, descriptor)
        }
        CommandDescriptor::Builtin {
            extension,
            level,
            container: true,
        } => {
            let dest = with_extension_suffix(source_dir, extension);
            create_builtin_tarball(source_dir, &name, &dest, *level)
        }
        CommandDescriptor::Builtin { container: false, .. } => Err(anyhow::anyhow!(
            "A standalone compressor cannot archive the directory {}",
            source_dir.display()
        )),
    }
}

/// Compresses a single file with a compressor descriptor, removing the
/// uncompressed original. Returns the compressed file path.
fn compress_file(path: &Path, descriptor: &CommandDescriptor) -> Result<PathBuf> {
    let CommandDescriptor::Compressor {
        env,
        extension,
        standalone_argv,
        sink,
        ..
    } = descriptor
    else {
        return Err(anyhow::anyhow!("Not a compressor command: {descriptor:?}"));
    };

    if standalone_argv.is_empty() {
        return Ok(path.to_path_buf());
    }

    let dest = with_extension_suffix(path, extension);
    let mut argv = standalone_argv.clone();
    match sink {
        // Native compressors replace the file in place.
        Sink::Stdout => argv.push(path.to_string_lossy().into_owned()),
        Sink::PathArgument => {
            argv.push(dest.to_string_lossy().into_owned());
            argv.push(path.to_string_lossy().into_owned());
        }
    }

    info!(file = %path.display(), "Compressing {}", dest.display());
    command::run(&argv, env)?;

    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(dest)
}

/// Writes a tar archive of `source_dir`, gzip compressed when `level` is
/// set. Entries are stored under `root_name/`.
pub fn create_builtin_tarball(
    source_dir: &Path,
    root_name: &str,
    archive_dest_path: &Path,
    level: Option<u32>,
) -> Result<PathBuf> {
    info!(
        source = %source_dir.display(),
        archive = %archive_dest_path.display(),
        "Creating archive in-process"
    );

    let archive_file = File::create(archive_dest_path).with_context(|| {
        format!("Failed to create archive file: {}", archive_dest_path.display())
    })?;

    match level {
        Some(level) => {
            let encoder = GzEncoder::new(archive_file, Compression::new(level));
            let encoder =
                append_tree(Builder::new(encoder), source_dir, root_name, archive_dest_path)?;
            encoder.finish().with_context(|| {
                format!(
                    "Failed to finish Gzip encoding for archive: {}",
                    archive_dest_path.display()
                )
            })?;
        }
        None => {
            let mut file =
                append_tree(Builder::new(archive_file), source_dir, root_name, archive_dest_path)?;
            file.flush()?;
        }
    }

    debug!(archive = %archive_dest_path.display(), "✓ Archive created");
    Ok(archive_dest_path.to_path_buf())
}

fn append_tree<W: Write>(
    mut tar_builder: Builder<W>,
    source_dir: &Path,
    root_name: &str,
    archive_dest_path: &Path,
) -> Result<W> {
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to walk directory: {}", source_dir.display()))?;
        let path = entry.path();
        let relative = path.strip_prefix(source_dir).with_context(|| {
            format!("Failed to strip prefix {} from {}", source_dir.display(), path.display())
        })?;
        let name = Path::new(root_name).join(relative);

        if entry.file_type().is_dir() {
            tar_builder
                .append_dir(&name, path)
                .with_context(|| {
                    format!("Failed to append directory {} to archive", path.display())
                })?;
        } else if entry.file_type().is_file() {
            tar_builder.append_path_with_name(path, &name).with_context(|| {
                format!("Failed to append file {} as {} to archive", path.display(), name.display())
            })?;
        }
    }

    tar_builder.into_inner().with_context(|| {
        format!(
            "Failed to get inner writer from tar builder for archive: {}",
            archive_dest_path.display()
        )
    })
}

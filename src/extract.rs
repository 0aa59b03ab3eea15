//! Archive extraction and decompression.
//!
//! [`extract`] identifies the input from its name and leading bytes, then:
//!
//! - for archives, replaces the destination directory and unpacks every entry
//!   into it through an [`ExtractionSession`];
//! - for compressed streams, decompresses into a single output file.
//!
//! # Security
//!
//! Every entry name is checked by
//! [`sanitize_entry_path`](crate::safety::sanitize_entry_path) before anything
//! is written for it. The first entry that would escape the destination stops
//! the extraction with [`Error::PathTraversal`]; entries written before it stay
//! on disk.
//!
//! Symbolic links, hard links and device entries are never materialised; they
//! are skipped with a warning.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::codec::{self, Codec};
use crate::copy::copy_stream;
use crate::dispatch::{Archival, Direction, Role, select_role};
use crate::format::{ArchiveKind, Format, identify};
use crate::progress::{NoProgress, ProgressReporter, check_cancel};
use crate::safety::sanitize_entry_path;
use crate::{Error, Result};

const DEFAULT_DIR_MODE: u32 = 0o755;
/// Mode directories are created with until [`ExtractionSession::finish`].
const PENDING_DIR_MODE: u32 = 0o700;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// What an archive entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else (symbolic link, hard link, device, fifo, ...).
    Other(&'static str),
}

/// One entry of an archive being extracted.
///
/// Only valid for a single step of the extraction loop.
pub struct ArchiveEntry<'a> {
    /// Position of the entry in the archive, starting at 0.
    pub index: usize,
    /// Raw, untrusted entry name.
    pub name: String,
    /// Permission bits, when recorded.
    pub mode: Option<u32>,
    /// Entry type.
    pub kind: EntryKind,
    /// Modification time in seconds since the Unix epoch, when recorded.
    pub mtime: Option<u64>,
    /// Entry content; empty for non-file entries.
    pub content: &'a mut dyn Read,
}

impl std::fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("kind", &self.kind)
            .field("mtime", &self.mtime)
            .finish_non_exhaustive()
    }
}

/// What [`ExtractionSession::unpack_entry`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A directory was created (or already existed).
    Directory,
    /// A file was written with this many bytes.
    File(u64),
    /// Nothing was written.
    Skipped,
}

/// Unpacks entries into a destination root.
///
/// Directories stay owner-writable while entries are unpacked; their recorded
/// modes are applied by [`finish`](Self::finish).
#[derive(Debug)]
pub struct ExtractionSession {
    root: PathBuf,
    create_parents: bool,
    directory_modes: Vec<(PathBuf, u32)>,
}

impl ExtractionSession {
    /// Creates a session writing below `root`, which must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_parents: false,
            directory_modes: Vec::new(),
        }
    }

    /// Creates missing parent directories of entries.
    pub fn create_parents(mut self, create: bool) -> Self {
        self.create_parents = create;
        self
    }

    /// Returns the destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes one entry to disk.
    ///
    /// The entry name is sanitized before the filesystem is touched.
    /// Directories are created non-recursively unless parents are enabled;
    /// an existing directory is accepted. Their modes are deferred to
    /// [`finish`](Self::finish). Files are created or truncated with the
    /// entry's mode and filled from its content. Other entry kinds are skipped.
    pub fn unpack_entry(&mut self, entry: ArchiveEntry<'_>) -> Result<EntryOutcome> {
        let target = sanitize_entry_path(&self.root, &entry.name, entry.index)?;

        match entry.kind {
            EntryKind::Directory => {
                if target.is_root() {
                    log::debug!("skipping root directory entry '{}'", entry.name);
                    return Ok(EntryOutcome::Skipped);
                }
                let mode = entry.mode.unwrap_or(DEFAULT_DIR_MODE) & 0o7777;
                if self.create_parents {
                    create_parent(target.full())?;
                }
                create_directory(target.full(), PENDING_DIR_MODE)?;
                self.directory_modes.push((target.full().to_path_buf(), mode));
                log::debug!("created directory '{}'", target.relative().display());
                Ok(EntryOutcome::Directory)
            }
            EntryKind::File => {
                let path = target.full();
                if self.create_parents {
                    create_parent(path)?;
                }

                let mode = entry.mode.unwrap_or(DEFAULT_FILE_MODE) & 0o7777;
                let mut file = open_output_file(path, mode)?;
                let bytes = copy_stream(entry.content, &mut file)?;
                drop(file);

                if let Some(mtime) = entry.mtime {
                    let mtime = FileTime::from_unix_time(mtime as i64, 0);
                    if let Err(e) = filetime::set_file_mtime(path, mtime) {
                        log::warn!("Failed to set mtime for '{}': {}", path.display(), e);
                    }
                }

                log::debug!("extracted '{}' ({} bytes)", target.relative().display(), bytes);
                Ok(EntryOutcome::File(bytes))
            }
            EntryKind::Other(kind) => {
                log::warn!("skipping {} entry '{}'", kind, entry.name);
                Ok(EntryOutcome::Skipped)
            }
        }
    }

    /// Applies the recorded directory modes, deepest directories first.
    pub fn finish(mut self) -> Result<()> {
        // Children before parents, so a read-only parent is locked last.
        self.directory_modes
            .sort_by(|(a, _), (b, _)| b.components().count().cmp(&a.components().count()));
        for (path, mode) in &self.directory_modes {
            set_directory_mode(path, *mode)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn set_directory_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| Error::io_at("set permissions of", path, e))
}

#[cfg(not(unix))]
fn set_directory_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent)
            .map_err(|e| Error::io_at("create parent directory", parent, e)),
        None => Ok(()),
    }
}

fn create_directory(path: &Path, mode: u32) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    match builder.create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(Error::io_at("create output directory", path, e)),
    }
}

fn open_output_file(path: &Path, mode: u32) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options
        .open(path)
        .map_err(|e| Error::io_at("create output file", path, e))
}

/// Options for [`extract`].
#[derive(Default)]
pub struct ExtractOptions {
    /// Create missing parent directories of entries (default: false).
    pub create_parents: bool,
    /// Progress reporter (optional).
    pub progress: Option<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("create_parents", &self.create_parents)
            .finish_non_exhaustive()
    }
}

impl ExtractOptions {
    /// Creates extraction options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether missing parent directories are created.
    pub fn create_parents(mut self, create: bool) -> Self {
        self.create_parents = create;
        self
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }
}

/// Summary of a successful [`extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractResult {
    /// Identified format of the input.
    pub format: Format,
    /// Destination directory or output file.
    pub output: PathBuf,
    /// Number of file entries written (1 for a decompressed stream).
    pub entries_extracted: usize,
    /// Number of directory entries created.
    pub directories_created: usize,
    /// Number of entries skipped.
    pub entries_skipped: usize,
    /// Total bytes written.
    pub bytes_written: u64,
}

impl ExtractResult {
    fn new(format: Format, output: PathBuf) -> Self {
        Self {
            format,
            output,
            entries_extracted: 0,
            directories_created: 0,
            entries_skipped: 0,
            bytes_written: 0,
        }
    }

    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Directory => self.directories_created += 1,
            EntryOutcome::File(bytes) => {
                self.entries_extracted += 1;
                self.bytes_written += bytes;
            }
            EntryOutcome::Skipped => self.entries_skipped += 1,
        }
    }
}

/// Derives an output path from the input path and its format.
///
/// Strips the format's canonical extension if the input ends with it
/// (case-insensitively), otherwise strips whatever extension the input has.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use xarc::codec::Codec;
/// use xarc::extract::derive_output_path;
/// use xarc::format::Format;
///
/// let tar_gz = Format::CompressedArchive(Codec::Gzip);
/// assert_eq!(derive_output_path("dist/app.tar.gz", tar_gz).unwrap(), Path::new("dist/app"));
/// assert_eq!(derive_output_path("app.tgz", tar_gz).unwrap(), Path::new("app"));
/// assert!(derive_output_path("app", tar_gz).is_err());
/// ```
pub fn derive_output_path(input: impl AsRef<Path>, format: Format) -> Result<PathBuf> {
    let input = input.as_ref();
    let fail = || Error::OutputPath {
        input: input.to_path_buf(),
        format,
    };

    let name = input.file_name().ok_or_else(fail)?.as_encoded_bytes();
    let extension = format.extension();
    if name.len() > extension.len()
        && name[name.len() - extension.len()..].eq_ignore_ascii_case(extension.as_bytes())
    {
        // One `set_extension("")` per dot keeps the stem's bytes untouched.
        let mut stem = input.to_path_buf();
        for _ in extension.matches('.') {
            stem.set_extension("");
        }
        return Ok(stem);
    }

    if input.extension().is_some() {
        return Ok(input.with_extension(""));
    }

    Err(fail())
}

/// Extracts or decompresses `input`.
///
/// When `output` is `None` it is derived with [`derive_output_path`].
///
/// For archives, an existing `output` is removed recursively and recreated as
/// an empty directory before any entry is unpacked. A destination that
/// contains the input archive or the current directory is refused with
/// [`Error::UnsafeDestination`]. There is no rollback: if an entry fails, the
/// entries before it remain on disk.
///
/// For compressed streams, `output` is created (or truncated) as a file.
pub fn extract(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    mut options: ExtractOptions,
) -> Result<ExtractResult> {
    let input = input.as_ref();
    let file = File::open(input).map_err(|e| Error::io_at("open input file", input, e))?;
    let (format, reader) = identify(input, BufReader::new(file))?;

    let output = match output {
        Some(output) => output.to_path_buf(),
        None => derive_output_path(input, format)?,
    };
    log::info!(
        "extracting '{}' ({}) to '{}'",
        input.display(),
        format,
        output.display()
    );

    let mut fallback = NoProgress;
    let progress: &mut dyn ProgressReporter = match options.progress.as_deref_mut() {
        Some(progress) => progress,
        None => &mut fallback,
    };
    check_cancel(progress)?;

    let mut result = ExtractResult::new(format, output);
    match select_role(format, Direction::Read) {
        Role::Extractor(archival) => {
            prepare_destination(input, &result.output)?;
            check_cancel(progress)?;

            let mut session =
                ExtractionSession::new(&result.output).create_parents(options.create_parents);
            match archival {
                Archival {
                    kind: ArchiveKind::Tar,
                    compression: None,
                } => unpack_tar(reader, &mut session, progress, &mut result)?,
                Archival {
                    kind: ArchiveKind::Tar,
                    compression: Some(codec),
                } => {
                    let decoder = codec::build_decoder(codec, reader)?;
                    unpack_tar(decoder, &mut session, progress, &mut result)?;
                }
                Archival {
                    kind: ArchiveKind::Zip,
                    ..
                } => unpack_zip(reader, &mut session, progress, &mut result)?,
            }
            session.finish()?;
        }
        Role::Decompressor(codec) => {
            let bytes = decompress(reader, codec, &result.output, progress)?;
            result.record(EntryOutcome::File(bytes));
        }
        Role::Archiver(_) | Role::Compressor(_) | Role::Unsupported => {
            return Err(Error::UnsupportedCapability {
                format,
                direction: Direction::Read,
            });
        }
    }

    log::info!(
        "extracted {} files, {} directories ({} skipped)",
        result.entries_extracted,
        result.directories_created,
        result.entries_skipped
    );
    Ok(result)
}

/// Removes `output` and recreates it as an empty directory.
fn prepare_destination(input: &Path, output: &Path) -> Result<()> {
    match fs::symlink_metadata(output) {
        Ok(metadata) if metadata.is_dir() => {
            guard_destination(input, output)?;
            let non_empty = fs::read_dir(output)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false);
            if non_empty {
                log::warn!("replacing existing directory '{}'", output.display());
            }
            fs::remove_dir_all(output)
                .map_err(|e| Error::io_at("remove existing output", output, e))?;
        }
        Ok(_) => {
            guard_destination(input, output)?;
            fs::remove_file(output).map_err(|e| Error::io_at("remove existing output", output, e))?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io_at("inspect existing output", output, e)),
    }

    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DEFAULT_DIR_MODE);
    }
    builder
        .create(output)
        .map_err(|e| Error::io_at("create output directory", output, e))
}

/// Refuses to remove a destination holding the input or the working directory.
fn guard_destination(input: &Path, output: &Path) -> Result<()> {
    let output_canonical = fs::canonicalize(output)
        .map_err(|e| Error::io_at("inspect existing output", output, e))?;

    if let Ok(input) = fs::canonicalize(input) {
        if input.starts_with(&output_canonical) {
            return Err(Error::UnsafeDestination {
                path: output.to_path_buf(),
                reason: "the input archive",
            });
        }
    }
    if let Ok(cwd) = std::env::current_dir().and_then(fs::canonicalize) {
        if cwd.starts_with(&output_canonical) {
            return Err(Error::UnsafeDestination {
                path: output.to_path_buf(),
                reason: "the current directory",
            });
        }
    }
    Ok(())
}

fn unpack_one(
    session: &mut ExtractionSession,
    progress: &mut dyn ProgressReporter,
    result: &mut ExtractResult,
    entry: ArchiveEntry<'_>,
    size: u64,
) -> Result<()> {
    let name = entry.name.clone();
    let kind = entry.kind;
    progress.on_entry_start(&name, size);

    match session.unpack_entry(entry) {
        Ok(outcome) => {
            if let (EntryOutcome::Skipped, EntryKind::Other(kind)) = (outcome, kind) {
                progress.on_warning(&format!("skipped {} entry '{}'", kind, name));
            }
            result.record(outcome);
            progress.on_entry_complete(&name, true);
            Ok(())
        }
        Err(e) => {
            progress.on_entry_complete(&name, false);
            Err(e)
        }
    }
}

fn tar_entry_kind(entry_type: tar::EntryType) -> EntryKind {
    match entry_type {
        tar::EntryType::Regular | tar::EntryType::Continuous => EntryKind::File,
        tar::EntryType::Directory => EntryKind::Directory,
        tar::EntryType::Symlink => EntryKind::Other("symbolic link"),
        tar::EntryType::Link => EntryKind::Other("hard link"),
        tar::EntryType::Char | tar::EntryType::Block => EntryKind::Other("device"),
        tar::EntryType::Fifo => EntryKind::Other("fifo"),
        tar::EntryType::GNUSparse => EntryKind::Other("sparse file"),
        _ => EntryKind::Other("special"),
    }
}

fn unpack_tar<R: Read>(
    reader: R,
    session: &mut ExtractionSession,
    progress: &mut dyn ProgressReporter,
    result: &mut ExtractResult,
) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| Error::InvalidArchive(e.to_string()))?;

    for (index, entry) in entries.enumerate() {
        check_cancel(progress)?;
        let mut entry =
            entry.map_err(|e| Error::InvalidArchive(format!("failed to read entry {}: {}", index, e)))?;

        let header = entry.header();
        let kind = tar_entry_kind(header.entry_type());
        let mode = header.mode().ok();
        let mtime = header.mtime().ok();
        let size = header.size().unwrap_or(0);
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        unpack_one(
            session,
            progress,
            result,
            ArchiveEntry {
                index,
                name,
                mode,
                kind,
                mtime,
                content: &mut entry,
            },
            size,
        )?;
    }
    Ok(())
}

fn unpack_zip<R: Read + Seek>(
    reader: R,
    session: &mut ExtractionSession,
    progress: &mut dyn ProgressReporter,
    result: &mut ExtractResult,
) -> Result<()> {
    let mut archive = zip::ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        check_cancel(progress)?;
        let mut file = archive.by_index(index)?;

        let unix_mode = file.unix_mode();
        let kind = if file.is_dir() {
            EntryKind::Directory
        } else if unix_mode.is_some_and(|m| m & 0o170000 == 0o120000) {
            EntryKind::Other("symbolic link")
        } else {
            EntryKind::File
        };
        let name = file.name().to_string();
        let size = file.size();

        unpack_one(
            session,
            progress,
            result,
            ArchiveEntry {
                index,
                name,
                mode: unix_mode,
                kind,
                mtime: None,
                content: &mut file,
            },
            size,
        )?;
    }
    Ok(())
}

fn decompress<R: Read + 'static>(
    reader: R,
    codec: Codec,
    output: &Path,
    progress: &mut dyn ProgressReporter,
) -> Result<u64> {
    let mut decoder = codec::build_decoder(codec, reader)?;
    let file = File::create(output).map_err(|e| Error::io_at("create output file", output, e))?;
    let mut writer = BufWriter::new(file);

    let name = output.to_string_lossy();
    progress.on_entry_start(&name, 0);
    let bytes = match copy_stream(&mut decoder, &mut writer) {
        Ok(bytes) => bytes,
        Err(e) => {
            progress.on_entry_complete(&name, false);
            if let Err(flush) = writer.flush() {
                log::warn!("failed to close output file '{}': {}", output.display(), flush);
            }
            return Err(e);
        }
    };
    writer
        .flush()
        .map_err(|e| Error::io_at("close output file", output, e))?;
    progress.on_entry_complete(&name, true);

    log::debug!("decompressed {} bytes with {}", bytes, codec);
    Ok(bytes)
}

//! Archive and compressed file creation.
//!
//! [`create`] discovers the input files, identifies the output format from
//! the output file name and hands the inputs to the selected role:
//!
//! - an archiver writes every input as a tar or zip entry, through a codec
//!   for compressed tar archives;
//! - a compressor streams exactly one regular file through a codec.
//!
//! # Example
//!
//! ```rust,no_run
//! use xarc::CreateOptions;
//!
//! let result = xarc::create("backup.tar.zst", &["docs", "notes.txt"], CreateOptions::new())?;
//! println!("wrote {} entries", result.entries_written);
//! # Ok::<(), xarc::Error>(())
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

use crate::codec::{self, Codec};
use crate::copy::copy_stream;
use crate::dispatch::{Archival, Direction, Role, select_role};
use crate::error::ArityError;
use crate::format::{ArchiveKind, Format};
use crate::progress::{NoProgress, ProgressReporter, check_cancel};
use crate::{Error, Result};

/// One file or directory to be written into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Name of the entry inside the archive, `/`-separated.
    pub name_in_archive: String,
    /// Location on disk.
    pub path: PathBuf,
    /// Whether this is a directory.
    pub is_dir: bool,
    /// Permission bits.
    pub mode: u32,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time, when available.
    pub modified: Option<SystemTime>,
}

/// The ordered set of files discovered from the caller's input paths.
///
/// Directories are walked recursively; a directory always precedes its
/// children and siblings are sorted by file name. Symbolic links are followed.
#[derive(Debug, Clone, Default)]
pub struct InputFileSet {
    files: Vec<InputFile>,
    roots: usize,
    directory_roots: Vec<PathBuf>,
}

impl InputFileSet {
    /// Discovers all files under `inputs`.
    ///
    /// Each input path doubles as its in-archive name. Root and drive
    /// components, as well as leading `.` and `..` components, are removed from
    /// the names so that created archives never carry a traversal name.
    ///
    /// Returns [`Error::Discovery`] if any input cannot be inspected.
    pub fn discover<P: AsRef<Path>>(inputs: &[P]) -> Result<Self> {
        let mut set = InputFileSet::default();

        for input in inputs {
            let input = input.as_ref();
            let (root_name, stripped) = archive_name(input);
            if stripped {
                log::warn!(
                    "removing leading '/', '.' and '..' from member names of '{}'",
                    input.display()
                );
            }
            set.roots += 1;

            for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|e| discovery_error(input, e))?;
                let metadata = entry.metadata().map_err(|e| discovery_error(input, e))?;

                if entry.depth() == 0 && metadata.is_dir() {
                    set.directory_roots.push(input.to_path_buf());
                }

                let relative = entry.path().strip_prefix(input).unwrap_or(Path::new(""));
                let name = join_name(&root_name, relative);
                if name.is_empty() {
                    // The input itself is `.` or similar; only its children are named.
                    continue;
                }

                set.files.push(InputFile {
                    name_in_archive: name,
                    path: entry.path().to_path_buf(),
                    is_dir: metadata.is_dir(),
                    mode: permission_bits(&metadata),
                    size: if metadata.is_dir() { 0 } else { metadata.len() },
                    modified: metadata.modified().ok(),
                });
            }
        }

        log::debug!("discovered {} files from {} inputs", set.files.len(), set.roots);
        Ok(set)
    }

    /// Returns the discovered files in archive order.
    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    /// Returns the number of discovered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the only regular file, or why there is not exactly one.
    pub fn single_file(&self) -> std::result::Result<&InputFile, ArityError> {
        if self.roots == 1 {
            if let Some(path) = self.directory_roots.first() {
                return Err(ArityError::DirectoryInput { path: path.clone() });
            }
        }
        match self.files.as_slice() {
            [] => Err(ArityError::NoInput),
            [file] => Ok(file),
            files => Err(ArityError::MultipleInputs { count: files.len() }),
        }
    }
}

fn discovery_error(input: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(input).to_path_buf();
    Error::Discovery {
        path,
        source: e.into(),
    }
}

/// Cleans `path` into an in-archive name. Returns whether anything was stripped.
fn archive_name(path: &Path) -> (String, bool) {
    let mut parts: Vec<String> = Vec::new();
    let mut stripped = false;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => stripped = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    stripped = true;
                }
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }

    (parts.join("/"), stripped)
}

fn join_name(root: &str, relative: &Path) -> String {
    let mut name = root.to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

fn unix_seconds(time: Option<SystemTime>) -> u64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Options for [`create`].
#[derive(Default)]
pub struct CreateOptions {
    /// Codec-specific compression level; `None` selects the codec default.
    pub level: Option<u32>,
    /// Progress reporter (optional).
    pub progress: Option<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateOptions")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl CreateOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }
}

/// Summary of a successful [`create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResult {
    /// Format of the output.
    pub format: Format,
    /// Role that wrote the output.
    pub role: Role,
    /// Number of entries written (1 for a compressed stream).
    pub entries_written: usize,
    /// Number of input bytes consumed.
    pub bytes_read: u64,
}

/// Creates an archive or compressed file at `output` from `inputs`.
///
/// The output format is identified from the output file name. Single-stream
/// formats require exactly one regular input file; this is verified before
/// the output file is created. On failure a partially written output file is
/// left in place.
pub fn create<P: AsRef<Path>>(
    output: impl AsRef<Path>,
    inputs: &[P],
    mut options: CreateOptions,
) -> Result<CreateResult> {
    let output = output.as_ref();
    let files = InputFileSet::discover(inputs)?;
    let format = Format::from_path(output)?;
    let role = select_role(format, Direction::Create);
    log::info!(
        "creating '{}' ({}) from {} files",
        output.display(),
        format,
        files.len()
    );

    let mut fallback = NoProgress;
    let progress: &mut dyn ProgressReporter = match options.progress.as_deref_mut() {
        Some(progress) => progress,
        None => &mut fallback,
    };
    check_cancel(progress)?;

    let (entries_written, bytes_read) = match role {
        Role::Archiver(archival) => write_archive(output, &files, archival, options.level, progress)?,
        Role::Compressor(codec) => {
            let input = files
                .single_file()
                .map_err(|reason| Error::Arity { format, reason })?;
            let bytes = compress_file(output, input, codec, options.level, progress)?;
            (1, bytes)
        }
        Role::Extractor(_) | Role::Decompressor(_) | Role::Unsupported => {
            return Err(Error::UnsupportedCapability {
                format,
                direction: Direction::Create,
            });
        }
    };

    Ok(CreateResult {
        format,
        role,
        entries_written,
        bytes_read,
    })
}

fn create_output(output: &Path) -> Result<BufWriter<File>> {
    let file = File::create(output).map_err(|e| Error::io_at("create output file", output, e))?;
    Ok(BufWriter::new(file))
}

fn close_output(mut writer: BufWriter<File>, output: &Path) -> Result<()> {
    writer
        .flush()
        .map_err(|e| Error::io_at("close output file", output, e))
}

fn warn_on_close_failure<T>(what: &str, result: io::Result<T>) {
    if let Err(e) = result {
        log::warn!("failed to finalize {}: {}", what, e);
    }
}

fn write_archive(
    output: &Path,
    files: &InputFileSet,
    archival: Archival,
    level: Option<u32>,
    progress: &mut dyn ProgressReporter,
) -> Result<(usize, u64)> {
    let writer = create_output(output)?;

    let (writer, bytes) = match archival {
        Archival {
            kind: ArchiveKind::Tar,
            compression: None,
        } => write_tar(files, writer, progress)?,
        Archival {
            kind: ArchiveKind::Tar,
            compression: Some(codec),
        } => {
            let encoder = codec::build_encoder(codec, writer, level)?;
            let (encoder, bytes) = write_tar(files, encoder, progress)?;
            let writer = encoder
                .finish()
                .map_err(|e| Error::io_at("finish compressed stream", output, e))?;
            (writer, bytes)
        }
        Archival {
            kind: ArchiveKind::Zip,
            ..
        } => write_zip(files, writer, level, progress)?,
    };

    close_output(writer, output)?;
    Ok((files.len(), bytes))
}

fn write_tar<W: Write>(
    files: &InputFileSet,
    writer: W,
    progress: &mut dyn ProgressReporter,
) -> Result<(W, u64)> {
    let mut builder = tar::Builder::new(writer);

    match append_each(files, progress, |file| append_tar_entry(&mut builder, file)) {
        Ok(bytes) => Ok((builder.into_inner()?, bytes)),
        Err(e) => {
            warn_on_close_failure("tar stream", builder.finish());
            Err(e)
        }
    }
}

/// Appends every file in order, checking for cancellation before each one.
fn append_each(
    files: &InputFileSet,
    progress: &mut dyn ProgressReporter,
    mut append: impl FnMut(&InputFile) -> Result<u64>,
) -> Result<u64> {
    let mut bytes = 0;
    for file in files.files() {
        check_cancel(progress)?;
        progress.on_entry_start(&file.name_in_archive, file.size);
        match append(file) {
            Ok(n) => {
                bytes += n;
                progress.on_entry_complete(&file.name_in_archive, true);
            }
            Err(e) => {
                progress.on_entry_complete(&file.name_in_archive, false);
                return Err(e);
            }
        }
    }
    Ok(bytes)
}

fn append_tar_entry<W: Write>(builder: &mut tar::Builder<W>, file: &InputFile) -> Result<u64> {
    log::debug!("adding '{}'", file.name_in_archive);

    let mut header = tar::Header::new_gnu();
    header.set_mode(file.mode);
    header.set_mtime(unix_seconds(file.modified));

    if file.is_dir {
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        builder
            .append_data(&mut header, &file.name_in_archive, io::empty())
            .map_err(|e| Error::io_at("write archive entry", &file.path, e))?;
        return Ok(0);
    }

    let input = File::open(&file.path).map_err(|e| Error::io_at("open input file", &file.path, e))?;
    // Size at open time; the content written must match the header exactly.
    let size = input
        .metadata()
        .map_err(|e| Error::io_at("read metadata of", &file.path, e))?
        .len();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(size);
    builder
        .append_data(&mut header, &file.name_in_archive, SizedReader::new(input, size))
        .map_err(|e| Error::io_at("write archive entry", &file.path, e))?;
    Ok(size)
}

/// Yields exactly `size` bytes of `inner`, failing if it ends early.
struct SizedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> SizedReader<R> {
    fn new(inner: R, size: u64) -> Self {
        Self {
            inner,
            remaining: size,
        }
    }
}

impl<R: Read> Read for SizedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank while being archived, {} bytes missing", self.remaining),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

fn write_zip<W: Write + Seek>(
    files: &InputFileSet,
    writer: W,
    level: Option<u32>,
    progress: &mut dyn ProgressReporter,
) -> Result<(W, u64)> {
    let mut zip = zip::ZipWriter::new(writer);

    match append_each(files, progress, |file| append_zip_entry(&mut zip, file, level)) {
        Ok(bytes) => Ok((zip.finish()?, bytes)),
        Err(e) => {
            warn_on_close_failure("zip archive", zip.finish().map_err(io::Error::other));
            Err(e)
        }
    }
}

fn append_zip_entry<W: Write + Seek>(
    zip: &mut zip::ZipWriter<W>,
    file: &InputFile,
    level: Option<u32>,
) -> Result<u64> {
    log::debug!("adding '{}'", file.name_in_archive);

    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(level.map(|l| i64::from(l.min(9))))
        .unix_permissions(file.mode);

    if file.is_dir {
        zip.add_directory(file.name_in_archive.as_str(), options)?;
        return Ok(0);
    }

    let mut input = File::open(&file.path).map_err(|e| Error::io_at("open input file", &file.path, e))?;
    zip.start_file(file.name_in_archive.as_str(), options)?;
    copy_stream(&mut input, zip)
}

fn compress_file(
    output: &Path,
    input: &InputFile,
    codec: Codec,
    level: Option<u32>,
    progress: &mut dyn ProgressReporter,
) -> Result<u64> {
    let mut source = File::open(&input.path).map_err(|e| Error::io_at("open input file", &input.path, e))?;
    let writer = create_output(output)?;
    let mut encoder = codec::build_encoder(codec, writer, level)?;

    if let Err(e) = check_cancel(progress) {
        warn_on_close_failure("compressed stream", encoder.finish());
        return Err(e);
    }
    progress.on_entry_start(&input.name_in_archive, input.size);
    let bytes = match copy_stream(&mut source, &mut encoder) {
        Ok(bytes) => bytes,
        Err(e) => {
            progress.on_entry_complete(&input.name_in_archive, false);
            warn_on_close_failure("compressed stream", encoder.finish());
            return Err(e);
        }
    };
    progress.on_entry_complete(&input.name_in_archive, true);

    let writer = encoder
        .finish()
        .map_err(|e| Error::io_at("finish compressed stream", output, e))?;
    close_output(writer, output)?;
    log::debug!("compressed {} bytes with {}", bytes, codec);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::progress::{CancelAfter, CancelFlag, StatisticsProgress};
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    fn tree(dir: &Path) -> PathBuf {
        let root = dir.join("src");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), b"alpha").unwrap();
        fs::write(root.join("sub").join("b.txt"), b"beta").unwrap();
        root
    }

    #[test]
    fn test_archive_name_cleaning() {
        assert_eq!(archive_name(Path::new("a/b")), ("a/b".to_string(), false));
        assert_eq!(archive_name(Path::new("./a/./b")), ("a/b".to_string(), false));
        assert_eq!(archive_name(Path::new("../a")), ("a".to_string(), true));
        assert_eq!(archive_name(Path::new("a/../b")), ("b".to_string(), false));
        assert_eq!(archive_name(Path::new(".")), (String::new(), false));
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_name_strips_root() {
        assert_eq!(archive_name(Path::new("/tmp/x")), ("tmp/x".to_string(), true));
    }

    #[test]
    fn test_discover_orders_parents_first() {
        let dir = TempDir::new().unwrap();
        let root = tree(dir.path());

        let set = InputFileSet::discover(&[&root]).unwrap();
        let names: Vec<_> = set
            .files()
            .iter()
            .map(|f| f.name_in_archive.rsplit('/').next().unwrap().to_string())
            .collect();
        assert_eq!(names, ["src", "a.txt", "sub", "b.txt"]);
        assert!(set.files()[0].is_dir);
        assert_eq!(set.files()[1].size, 5);
    }

    #[test]
    fn test_discover_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = InputFileSet::discover(&[dir.path().join("missing")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
    }

    #[test]
    fn test_single_file_arity() {
        let dir = TempDir::new().unwrap();
        let root = tree(dir.path());
        let a = root.join("a.txt");
        let b = root.join("sub").join("b.txt");

        let none = InputFileSet::discover::<&Path>(&[]).unwrap();
        assert_eq!(none.single_file().unwrap_err(), ArityError::NoInput);

        let one = InputFileSet::discover(&[&a]).unwrap();
        assert_eq!(one.single_file().unwrap().path, a);

        let two = InputFileSet::discover(&[&a, &b]).unwrap();
        assert_eq!(
            two.single_file().unwrap_err(),
            ArityError::MultipleInputs { count: 2 }
        );

        let folder = InputFileSet::discover(&[&root]).unwrap();
        assert!(matches!(
            folder.single_file().unwrap_err(),
            ArityError::DirectoryInput { .. }
        ));
    }

    #[test]
    fn test_create_tar_entries() {
        let dir = TempDir::new().unwrap();
        let root = tree(dir.path());
        let output = dir.path().join("out.tar");

        let result = create(&output, &[&root], CreateOptions::new()).unwrap();
        assert_eq!(result.entries_written, 4);
        assert_eq!(result.bytes_read, 9);
        assert!(matches!(result.role, Role::Archiver(_)));

        let mut archive = tar::Archive::new(File::open(&output).unwrap());
        let mut files = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            if entry.header().entry_type().is_file() {
                let mut content = String::new();
                entry.read_to_string(&mut content).unwrap();
                files.push((name, content));
            }
        }
        assert_eq!(files.len(), 2);
        assert!(files[0].0.ends_with("src/a.txt"));
        assert_eq!(files[0].1, "alpha");
        assert!(files[1].0.ends_with("src/sub/b.txt"));
    }

    #[test]
    fn test_create_zip_entries() {
        let dir = TempDir::new().unwrap();
        let root = tree(dir.path());
        let output = dir.path().join("out.zip");

        create(&output, &[&root], CreateOptions::new()).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 4);
        let name = archive
            .file_names()
            .find(|n| n.ends_with("sub/b.txt"))
            .unwrap()
            .to_string();
        let mut content = String::new();
        archive.by_name(&name).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "beta");
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn test_compress_single_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.txt");
        fs::write(&input, b"hello hello hello").unwrap();
        let output = dir.path().join("a.txt.gz");

        let result = create(&output, &[&input], CreateOptions::new().level(9)).unwrap();
        assert_eq!(result.role, Role::Compressor(Codec::Gzip));
        assert_eq!(result.bytes_read, 17);

        let mut decoder = codec::build_decoder(Codec::Gzip, File::open(&output).unwrap()).unwrap();
        let mut content = String::new();
        decoder.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello hello hello");
    }

    #[test]
    fn test_compress_arity_checked_before_output_exists() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();
        let output = dir.path().join("out.gz");

        let err = create(&output, &[&a, &b], CreateOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arity);
        assert!(!output.exists());

        let no_inputs: [&Path; 0] = [];
        let err = create(&output, &no_inputs, CreateOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Arity {
                reason: ArityError::NoInput,
                ..
            }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_create_unsupported_and_unknown() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.txt");
        fs::write(&input, b"a").unwrap();

        let err = create(dir.path().join("out.7z"), &[&input], CreateOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
        assert!(!dir.path().join("out.7z").exists());

        let err = create(dir.path().join("out.txt"), &[&input], CreateOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Identify);
    }

    #[test]
    fn test_cancelled_before_output_is_created() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.txt");
        fs::write(&input, b"a").unwrap();

        for name in ["out.tar", "out.zip", "out.gz"] {
            let flag = CancelFlag::new();
            flag.cancel();
            let output = dir.path().join(name);
            let err = create(&output, &[&input], CreateOptions::new().progress(flag)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Cancelled);
            assert!(!output.exists(), "{} was created", name);
        }
    }

    #[test]
    fn test_cancelled_between_entries() {
        let dir = TempDir::new().unwrap();
        let root = tree(dir.path());
        let stats = StatisticsProgress::new();
        let progress = Both {
            cancel: CancelAfter {
                remaining: AtomicUsize::new(3),
            },
            stats: stats.clone(),
        };

        let err = create(dir.path().join("out.tar"), &[&root], CreateOptions::new().progress(progress))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        // One check after identification, then one per entry.
        assert_eq!(stats.snapshot().completed.len(), 2);
    }

    struct Both {
        cancel: CancelAfter,
        stats: StatisticsProgress,
    }

    impl ProgressReporter for Both {
        fn on_entry_complete(&mut self, entry_name: &str, success: bool) {
            self.stats.on_entry_complete(entry_name, success);
        }

        fn should_cancel(&self) -> bool {
            self.cancel.should_cancel()
        }
    }

    #[test]
    fn test_sized_reader_rejects_short_input() {
        let mut exact = Vec::new();
        SizedReader::new(&b"12345"[..], 5).read_to_end(&mut exact).unwrap();
        assert_eq!(exact, b"12345");

        let mut grown = Vec::new();
        SizedReader::new(&b"1234567"[..], 5).read_to_end(&mut grown).unwrap();
        assert_eq!(grown, b"12345");

        let err = SizedReader::new(&b"123"[..], 5)
            .read_to_end(&mut Vec::new())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_discovery_failure_precedes_identification() {
        let dir = TempDir::new().unwrap();
        let err = create(
            dir.path().join("out.unknown"),
            &[dir.path().join("missing")],
            CreateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Discovery);
    }
}

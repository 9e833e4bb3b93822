use std::{
    fs,
    io::{Read, Write},
    num::NonZeroUsize,
    path::Path,
};

use csv::{Reader, Writer, WriterBuilder};
use tempfile::Builder;
use tracing::{debug, info};

use crate::{
    domain::{
        account::{AccountMapping, AccountTranslation},
        partition::{partition, Chunk},
        table::Table,
        transaction::{preview, MonarchTransaction},
    },
    error::{Error, Result},
};

const CHUNK_PREVIEW_ROWS: usize = 5;

/// Load a whole CSV document into a [`Table`].
///
/// The first record is taken as the header. Rows with a different number of
/// fields than the header, or that are not valid UTF-8, are rejected.
pub fn read(reader: impl Read) -> csv::Result<Table> {
    let mut reader = Reader::from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_owned).collect::<Vec<_>>()))
        .collect::<csv::Result<Vec<_>>>()?;

    Ok(Table::new(headers, rows))
}

pub fn read_table(path: &Path) -> Result<Table> {
    info!(path = %path.display(), "reading input file");
    fs::File::open(path)
        .map_err(csv::Error::from)
        .and_then(read)
        .map_err(|source| Error::InputRead {
            path: path.to_owned(),
            source,
        })
}

/// Parse `Mint`/`Monarch` pairs from a reader. Other columns are ignored.
pub fn read_mappings(reader: impl Read) -> csv::Result<Vec<AccountMapping>> {
    Reader::from_reader(reader).into_deserialize().collect()
}

pub fn read_translation(path: &Path) -> Result<AccountTranslation> {
    let mappings = fs::File::open(path)
        .map_err(csv::Error::from)
        .and_then(read_mappings)
        .map_err(|source| Error::TranslationFile {
            path: path.to_owned(),
            source,
        })?;

    for mapping in &mappings {
        debug!("mapping {:?} to {:?}", mapping.mint, mapping.monarch);
    }
    info!(path = %path.display(), "loaded account translations");

    Ok(mappings.into_iter().collect())
}

pub fn write_transactions<'a>(
    transactions: impl IntoIterator<Item = &'a MonarchTransaction>,
    writer: impl Write,
) -> csv::Result<()> {
    let mut writer = Writer::from_writer(writer);

    for transaction in transactions {
        writer.serialize(transaction)?;
    }

    writer.flush()?;
    Ok(())
}

/// The header is written even when there is nothing to map.
pub fn write_mappings(mappings: &[AccountMapping], writer: impl Write) -> csv::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(AccountMapping::HEADERS)?;
    for mapping in mappings {
        writer.serialize(mapping)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the account mapping stub to `path`, replacing any existing file.
pub fn write_mapping_helper(path: &Path, mappings: &[AccountMapping]) -> Result<()> {
    info!(path = %path.display(), "writing account mapping helper file");
    for mapping in mappings {
        debug!(account = %mapping.mint, "helper entry");
    }

    fs::File::create(path)
        .map_err(csv::Error::from)
        .and_then(|file| write_mappings(mappings, file))
        .map_err(|source| Error::write(path, source))
}

/// Temporary files are opened like `File::create` would, so persisted
/// chunks end up with the same permissions as the helper file.
fn temp_file_builder() -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    builder.prefix(".monarch-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder
}

/// Write one chunk into `dir`.
///
/// Rows go to a temporary file next to the target, which is renamed into
/// place only once complete.
pub fn write_chunk(dir: &Path, chunk: &Chunk<'_>) -> Result<()> {
    let path = dir.join(&chunk.filename);

    let mut file = temp_file_builder()
        .tempfile_in(dir)
        .map_err(|e| Error::write(&path, e))?;
    write_transactions(chunk.transactions.iter().copied(), file.as_file_mut())
        .map_err(|e| Error::write(&path, e))?;
    file.persist(&path).map_err(|e| Error::write(&path, e.error))?;

    info!(
        "wrote {} rows of {} data to {}",
        chunk.transactions.len(),
        chunk.account,
        chunk.filename
    );
    debug!(
        "data preview for {}:\n{}",
        chunk.filename,
        preview(chunk.transactions.iter().copied(), CHUNK_PREVIEW_ROWS)
    );

    Ok(())
}

/// Split `transactions` per account and write every chunk into `dir`.
///
/// Stops at the first failed chunk; chunks already written stay on disk.
/// Returns the written filenames in write order.
pub fn write_partitions(
    dir: &Path,
    transactions: &[MonarchTransaction],
    max_rows: NonZeroUsize,
) -> Result<Vec<String>> {
    fs::create_dir_all(dir).map_err(|e| Error::write(dir, e))?;

    let chunks = partition(transactions, max_rows);
    for chunk in &chunks {
        write_chunk(dir, chunk)?;
    }

    Ok(chunks.into_iter().map(|chunk| chunk.filename).collect())
}

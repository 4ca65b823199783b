//! Corpus annotation: stream JSONL article records through the location
//! extractor and write each augmented record as soon as it is ready.
//!
//! Records are handled strictly in input order. A line that does not parse as
//! a record is logged and skipped; the run continues with the next line. The
//! output is flushed after every record so a crashed run keeps its progress.

use crate::locations::LocationExtractor;
use crate::models::ArticleRecord;
use crate::utils::{describe_json_error, ensure_parent_dir, is_stdio, truncate_for_log};
use itertools::Itertools;
use std::error::Error;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, instrument};

/// Counters for one annotation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotateStats {
    /// Non-blank input lines.
    pub lines: usize,
    /// Records written.
    pub annotated: usize,
    /// Lines dropped as malformed.
    pub skipped: usize,
    /// Written records with at least one location.
    pub with_location: usize,
}

/// Attach the locations found in the headline and body to `record`.
///
/// Headline locations come first, so the headline decides the primary
/// location whenever it names one.
pub fn annotate_record(record: &mut ArticleRecord, extractor: &LocationExtractor<'_>) {
    let from_headline = extractor.extract(&record.headline);
    let from_body = if record.article_text.trim().is_empty() {
        Vec::new()
    } else {
        extractor.extract(&record.article_text)
    };
    record.location = from_headline.into_iter().chain(from_body).unique().collect();
}

/// Annotate every record of `reader`, writing one JSON line per record.
///
/// # Arguments
///
/// * `reader` - JSONL source, read line by line
/// * `writer` - Destination, flushed after every record
/// * `extractor` - Location extractor shared by all records
///
/// # Returns
///
/// Run counters. Malformed lines only show up in `skipped`; an error is
/// returned only when reading or writing fails.
pub async fn annotate<R, W>(
    mut reader: R,
    writer: &mut W,
    extractor: &LocationExtractor<'_>,
) -> Result<AnnotateStats, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = AnnotateStats::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                stats.lines += 1;
                error!(
                    line = line_no,
                    kind = "encoding",
                    error = %e,
                    preview = %truncate_for_log(&String::from_utf8_lossy(&buf), 120),
                    "Line is not valid UTF-8; skipping"
                );
                stats.skipped += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        let mut record = match serde_json::from_str::<ArticleRecord>(line) {
            Ok(record) => record,
            Err(e) => {
                error!(
                    line = line_no,
                    kind = describe_json_error(&e),
                    error = %e,
                    preview = %truncate_for_log(line, 120),
                    "Error decoding JSON line; skipping"
                );
                stats.skipped += 1;
                continue;
            }
        };

        annotate_record(&mut record, extractor);
        debug!(line = line_no, url = %record.url, locations = ?record.location, "Annotated record");

        let mut out = serde_json::to_string(&record)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;

        stats.annotated += 1;
        if !record.location.is_empty() {
            stats.with_location += 1;
        }
    }

    Ok(stats)
}

/// Annotate `input` into `output`; `-` means stdin or stdout.
///
/// Parent directories of `output` are created as needed and a summary of
/// the run is logged at `info`.
#[instrument(level = "info", skip_all, fields(%input, %output))]
pub async fn annotate_file(
    input: &str,
    output: &str,
    extractor: &LocationExtractor<'_>,
) -> Result<AnnotateStats, Box<dyn Error>> {
    let reader: Box<dyn AsyncBufRead + Unpin> = if is_stdio(input) {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input).await?))
    };

    ensure_parent_dir(output).await?;
    let mut writer: Box<dyn AsyncWrite + Unpin> = if is_stdio(output) {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(output).await?))
    };

    let stats = annotate(reader, &mut writer, extractor).await?;
    writer.shutdown().await?;

    info!(
        lines = stats.lines,
        annotated = stats.annotated,
        skipped = stats.skipped,
        with_location = stats.with_location,
        "Annotation complete"
    );
    Ok(stats)
}

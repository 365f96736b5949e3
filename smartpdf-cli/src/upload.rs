//! Reading the files named on the command line into one upload batch.

use std::path::Path;

use smartpdf_rag::{BatchReport, Document, DocumentOutcome, RagError, Result, Session};
use tracing::warn;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read `paths` and ingest them as one batch.
///
/// A file that cannot be read becomes a failed outcome in its place; the
/// rest of the batch is still ingested. Outcomes keep the order of `paths`.
///
/// # Errors
///
/// Returns [`RagError::BatchLimitExceeded`] before reading anything if
/// there are more paths than the session accepts in one batch.
pub async fn ingest_files<P: AsRef<Path>>(
    session: &Session,
    paths: &[P],
) -> Result<BatchReport> {
    let max = session.config().max_batch_documents;
    if paths.len() > max {
        return Err(RagError::BatchLimitExceeded { count: paths.len(), max });
    }

    let mut documents = Vec::new();
    let mut unreadable: Vec<Option<DocumentOutcome>> = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        match Document::from_path(path) {
            Ok(document) => {
                documents.push(document);
                unreadable.push(None);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read file");
                let name = file_name(path);
                unreadable.push(Some(DocumentOutcome {
                    result: Err(RagError::Load { document: name.clone(), message: e.to_string() }),
                    name,
                }));
            }
        }
    }

    let mut ingested = session.ingest_batch(documents).await?.outcomes.into_iter();
    let outcomes =
        unreadable.into_iter().filter_map(|slot| slot.or_else(|| ingested.next())).collect();
    Ok(BatchReport { outcomes })
}

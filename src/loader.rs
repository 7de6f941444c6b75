//! Turns `FROM` entries into content units and metadata.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::ast::QueryKind;
use crate::engine::ExecError;
use crate::extract::{self, UnitKind};
use crate::metadata::{add_file_metadata, extract_metadata, strip_front_matter};
use crate::source::DocumentSource;
use crate::value::Metadata;

/// One extracted piece of a document.
///
/// Every unit of a document shares that document's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUnit {
    pub text: String,
    pub metadata: Rc<Metadata>,
}

/// Metadata of a loaded document, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub path: PathBuf,
    pub metadata: Rc<Metadata>,
}

/// Loads documents one at a time, in `FROM` order.
pub struct Loader<'a, S: DocumentSource + ?Sized> {
    source: &'a S,
    record_metadata: bool,
    recorded: Vec<DocumentMetadata>,
}

impl<'a, S: DocumentSource + ?Sized> Loader<'a, S> {
    pub fn new(source: &'a S, record_metadata: bool) -> Self {
        Loader {
            source,
            record_metadata,
            recorded: vec![],
        }
    }

    /// Document paths of all sources, duplicates kept.
    pub fn resolve_all(&self, sources: &[String]) -> Result<Vec<PathBuf>, ExecError> {
        let mut paths = vec![];
        for source in sources {
            paths.extend(self.source.resolve(source)?);
        }
        Ok(paths)
    }

    /// Metadata of one document, `file.*` keys included.
    pub fn load_metadata(&mut self, path: &Path) -> Result<Rc<Metadata>, ExecError> {
        let lines = self.source.read_lines(path)?;
        self.metadata_from_lines(path, &lines)
    }

    fn metadata_from_lines(
        &mut self,
        path: &Path,
        lines: &[String],
    ) -> Result<Rc<Metadata>, ExecError> {
        let stat = self.source.stat(path)?;
        let mut metadata = extract_metadata(lines);
        add_file_metadata(&mut metadata, path, &stat);
        let metadata = Rc::new(metadata);

        tracing::debug!(path = %path.display(), keys = metadata.len(), "loaded document");
        if self.record_metadata {
            self.recorded.push(DocumentMetadata {
                path: path.to_path_buf(),
                metadata: Rc::clone(&metadata),
            });
        }
        Ok(metadata)
    }

    /// Content units of every document of every source.
    ///
    /// `LIST` yields one `- name.md` unit per document; table kinds have no
    /// content units and are rejected.
    pub fn load_units(
        &mut self,
        sources: &[String],
        kind: QueryKind,
    ) -> Result<Vec<ContentUnit>, ExecError> {
        let unit_kind = match kind {
            QueryKind::List => None,
            other => Some(UnitKind::try_from(other)?),
        };

        let mut units = vec![];
        for path in self.resolve_all(sources)? {
            let lines = self.source.read_lines(&path)?;
            let metadata = self.metadata_from_lines(&path, &lines)?;

            match unit_kind {
                None => units.push(ContentUnit {
                    text: format!("- {}", file_name(&path)),
                    metadata,
                }),
                Some(unit_kind) => {
                    let body = strip_front_matter(&lines);
                    units.extend(extract::extract(unit_kind, body).into_iter().map(|text| {
                        ContentUnit {
                            text,
                            metadata: Rc::clone(&metadata),
                        }
                    }));
                }
            }
        }
        Ok(units)
    }

    /// Metadata recorded so far, in load order.
    pub fn into_recorded(self) -> Vec<DocumentMetadata> {
        self.recorded
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

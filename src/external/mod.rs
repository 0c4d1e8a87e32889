//! Collaborators at the pipeline boundary: fetch, persist, publish

mod fetch;
mod publish;
mod sink;

pub use fetch::{FileFetcher, MemoryFetcher, SourceFetcher};
pub use publish::{DirectoryMirror, GitMirror, LogNotifier, Publisher};
pub use sink::{table_to_csv, CsvWorkbookWriter, WorkbookSink, MANIFEST_FILE};

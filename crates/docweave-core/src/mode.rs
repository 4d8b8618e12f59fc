//! How a document treats its backing file

/// Open mode shared by the document backends
///
/// | mode          | existing file | missing file   | flush / close   |
/// |---------------|---------------|----------------|-----------------|
/// | `CopyOnWrite` | loaded        | `NotFound`     | nothing written |
/// | `Update`      | loaded        | `NotFound`     | written back    |
/// | `Append`      | loaded        | fresh document | written back    |
/// | `Create`      | ignored       | fresh document | nothing written |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Load the file; changes are only saved through an explicit `write_to`
    #[default]
    CopyOnWrite,
    /// Load the file and save back to it on flush and close
    Update,
    /// Like `Update`, but a missing file starts a fresh document
    Append,
    /// Start a fresh document whether or not the file exists
    Create,
}

impl OpenMode {
    /// Whether flush writes to the backing file
    pub fn writes_back(self) -> bool {
        matches!(self, OpenMode::Update | OpenMode::Append)
    }
}

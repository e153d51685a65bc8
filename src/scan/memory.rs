//! In-memory directory tree implementing [`DirHandle`].
//!
//! Used to exercise the scanner against fixed trees, including entries that
//! fail to read and directories whose listing is denied.

use async_trait::async_trait;

use super::handle::{DirEntry, DirHandle};
use super::ScanError;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    UnreadableFile,
    Dir(MemoryDir),
}

/// A directory tree held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDir {
    name: String,
    children: Vec<(String, Node)>,
    list_denied: bool,
}

impl MemoryDir {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            list_denied: false,
        }
    }

    /// Add a file with the given contents.
    pub fn file(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.children.push((name.into(), Node::File(content.into())));
        self
    }

    /// Add a file that is listed but fails on every stat or read.
    pub fn unreadable_file(mut self, name: impl Into<String>) -> Self {
        self.children.push((name.into(), Node::UnreadableFile));
        self
    }

    /// Add a subdirectory. Its name is taken from the child.
    pub fn dir(mut self, child: MemoryDir) -> Self {
        self.children.push((child.name.clone(), Node::Dir(child)));
        self
    }

    /// Make listing this directory fail as if permission had been revoked.
    pub fn denied(mut self) -> Self {
        self.list_denied = true;
        self
    }

    /// A copy of this tree with every directory's children in reverse order.
    pub fn reversed(&self) -> Self {
        let children = self
            .children
            .iter()
            .rev()
            .map(|(name, node)| {
                let node = match node {
                    Node::Dir(d) => Node::Dir(d.reversed()),
                    other => other.clone(),
                };
                (name.clone(), node)
            })
            .collect();
        Self {
            name: self.name.clone(),
            children,
            list_denied: self.list_denied,
        }
    }

    /// Build a chain of `levels` nested directories named `d1`, `d2`, ... with
    /// one file `leaf.txt` in the innermost one.
    pub fn nested(levels: usize, leaf: &[u8]) -> Self {
        let mut current = MemoryDir::new(format!("d{levels}")).file("leaf.txt", leaf.to_vec());
        for level in (1..levels).rev() {
            current = MemoryDir::new(format!("d{level}")).dir(current);
        }
        current
    }

    fn node(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }
}

#[async_trait]
impl DirHandle for MemoryDir {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<DirEntry>, ScanError> {
        if self.list_denied {
            return Err(ScanError::PermissionDenied(self.name.clone()));
        }
        Ok(self
            .children
            .iter()
            .map(|(name, node)| match node {
                Node::Dir(_) => DirEntry::directory(name.clone()),
                Node::File(_) | Node::UnreadableFile => DirEntry::file(name.clone()),
            })
            .collect())
    }

    async fn file_len(&self, name: &str) -> Result<u64, ScanError> {
        match self.node(name) {
            Some(Node::File(bytes)) => Ok(bytes.len() as u64),
            Some(Node::UnreadableFile) => Err(ScanError::PermissionDenied(name.to_string())),
            _ => Err(ScanError::NotFound(name.to_string())),
        }
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, ScanError> {
        match self.node(name) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::UnreadableFile) => Err(ScanError::PermissionDenied(name.to_string())),
            _ => Err(ScanError::NotFound(name.to_string())),
        }
    }

    async fn open_dir(&self, name: &str) -> Result<Box<dyn DirHandle>, ScanError> {
        match self.node(name) {
            Some(Node::Dir(dir)) => Ok(Box::new(dir.clone())),
            Some(_) => Err(ScanError::NotADirectory(name.to_string())),
            None => Err(ScanError::NotFound(name.to_string())),
        }
    }
}

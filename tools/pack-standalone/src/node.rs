//! In-memory tree of packed files and directories

/// A packed entry: either a file with its text contents or a directory
/// holding child entries in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File { name: String, contents: String },
    Dir { name: String, children: Vec<Node> },
}

impl Node {
    pub fn file(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Dir {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File { name, .. } | Node::Dir { name, .. } => name,
        }
    }

    /// Children of a directory; empty for files
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Dir { children, .. } => children,
            Node::File { .. } => &[],
        }
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// Resolve a slash-separated path below this node.
    ///
    /// Empty segments are skipped, so `"apis/"` and `"/apis"` resolve the
    /// same entry as `"apis"`.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        path.split('/')
            .filter(|seg| !seg.is_empty())
            .try_fold(self, |node, seg| node.child(seg))
    }

    /// Contents of a file node
    pub fn contents(&self) -> Option<&str> {
        match self {
            Node::File { contents, .. } => Some(contents),
            Node::Dir { .. } => None,
        }
    }

    /// Count of (directories, files, content bytes) below and including this node
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.accumulate(&mut stats);
        stats
    }

    fn accumulate(&self, stats: &mut TreeStats) {
        match self {
            Node::File { contents, .. } => {
                stats.files += 1;
                stats.bytes += contents.len();
            }
            Node::Dir { children, .. } => {
                stats.dirs += 1;
                for child in children {
                    child.accumulate(stats);
                }
            }
        }
    }
}

/// Aggregate counts over a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub dirs: usize,
    pub files: usize,
    pub bytes: usize,
}

impl std::ops::Add for TreeStats {
    type Output = TreeStats;

    fn add(self, rhs: TreeStats) -> TreeStats {
        TreeStats {
            dirs: self.dirs + rhs.dirs,
            files: self.files + rhs.files,
            bytes: self.bytes + rhs.bytes,
        }
    }
}

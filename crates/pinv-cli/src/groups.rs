//! Grouping of mutually consistent files
//!
//! Equivalence of invariant sets is transitive, so the files linked by
//! `Equivalent` comparisons fall into disjoint classes. Classes are tracked
//! with a disjoint-set forest over file positions.

/// Disjoint classes of files, keyed by their position on the command line
pub struct FileGroups {
    /// Parent position of each file; a class root points to itself
    parent: Vec<usize>,
    /// Number of files in the class rooted at each position
    size: Vec<usize>,
}

impl FileGroups {
    /// One singleton class per file
    pub fn new(files: usize) -> Self {
        Self {
            parent: (0..files).collect(),
            size: vec![1; files],
        }
    }

    /// Root of the class holding `file`, halving the path on the way up
    fn root(&mut self, mut file: usize) -> usize {
        while self.parent[file] != file {
            self.parent[file] = self.parent[self.parent[file]];
            file = self.parent[file];
        }
        file
    }

    /// Record that `a` and `b` compared equivalent.
    ///
    /// Returns `false` if they were already in one class.
    pub fn link(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return false;
        }
        // The larger class absorbs the smaller one
        let (keep, absorb) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[absorb] = keep;
        self.size[keep] += self.size[absorb];
        true
    }

    /// Classes as sorted position lists, ordered by their first file
    pub fn into_groups(mut self) -> Vec<Vec<usize>> {
        let files = self.parent.len();
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); files];
        for file in 0..files {
            let root = self.root(file);
            members[root].push(file);
        }
        let mut groups: Vec<Vec<usize>> = members.into_iter().filter(|g| !g.is_empty()).collect();
        groups.sort_by_key(|g| g[0]);
        groups
    }
}

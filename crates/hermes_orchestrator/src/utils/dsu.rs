// Disjoint set union over 0..n
pub struct Dsu {
    parent: Vec<usize>,
    num_components: usize,
}

impl Dsu {
    pub fn new(size: usize) -> Self {
        Dsu {
            parent: (0..size).collect(),
            num_components: size,
        }
    }

    pub fn find(&mut self, i: usize) -> usize {
        let parent = self.parent[i];
        if parent == i {
            i
        } else {
            let root = self.find(parent);
            self.parent[i] = root;
            root
        }
    }

    /// The smallest index stays the root so groups are keyed by their first member
    pub fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i != root_j {
            let (root, child) = if root_i < root_j {
                (root_i, root_j)
            } else {
                (root_j, root_i)
            };
            self.parent[child] = root;
            self.num_components -= 1;
        }
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Groups ordered by smallest member, members ascending
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::with_capacity(self.num_components);
        let mut group_of_root = vec![usize::MAX; self.parent.len()];

        for i in 0..self.parent.len() {
            let root = self.find(i);
            if group_of_root[root] == usize::MAX {
                group_of_root[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[group_of_root[root]].push(i);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_keeps_smallest_root() {
        let mut dsu = Dsu::new(5);
        dsu.union(4, 2);
        dsu.union(2, 3);

        assert_eq!(dsu.find(4), 2);
        assert_eq!(dsu.find(3), 2);
        assert_eq!(dsu.num_components(), 3);
    }

    #[test]
    fn test_groups() {
        let mut dsu = Dsu::new(5);
        dsu.union(3, 1);
        dsu.union(4, 0);

        assert_eq!(dsu.groups(), vec![vec![0, 4], vec![1, 3], vec![2]]);
    }
}

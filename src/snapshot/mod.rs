// Snapshot management for reverse execution

use crate::interpreter::machine::Machine;

/// Snapshot of execution state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub machine: Machine,
}

impl Snapshot {
    pub fn new(machine: Machine) -> Self {
        Snapshot { machine }
    }

    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        let cell = std::mem::size_of::<i64>();

        // Sparse cells carry their key as well
        let memory_size = self.machine.memory().len_written() * cell * 2;
        let queue_size = (self.machine.input().len() + self.machine.output().len()) * cell;
        let program_size = self.machine.program().len() * cell;

        memory_size + queue_size + program_size + std::mem::size_of::<Machine>()
    }
}

/// Manages execution history for reverse execution
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} + {} > {}",
                self.current_memory, snapshot_size, self.max_memory
            ));
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Overwrite the snapshot at `index`
    pub fn replace(&mut self, index: usize, snapshot: Snapshot) -> Result<(), String> {
        let old_size = match self.snapshots.get(index) {
            Some(old) => old.estimated_size(),
            None => return Err(format!("No snapshot at index {}", index)),
        };
        let new_size = snapshot.estimated_size();
        let projected = self.current_memory - old_size + new_size;

        if projected > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} > {}",
                projected, self.max_memory
            ));
        }

        self.current_memory = projected;
        self.snapshots[index] = snapshot;
        Ok(())
    }

    /// Drop every snapshot from `len` onwards
    pub fn truncate(&mut self, len: usize) {
        if len >= self.snapshots.len() {
            return;
        }
        let freed: usize = self.snapshots[len..]
            .iter()
            .map(Snapshot::estimated_size)
            .sum();
        self.snapshots.truncate(len);
        self.current_memory -= freed;
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(program: Vec<i64>) -> Snapshot {
        Snapshot::new(Machine::new(program))
    }

    #[test]
    fn test_push_respects_limit() {
        let size = snapshot(vec![99]).estimated_size();
        let mut manager = SnapshotManager::new(size * 2);

        assert!(manager.push(snapshot(vec![99])).is_ok());
        assert!(manager.push(snapshot(vec![99])).is_ok());
        assert!(manager.push(snapshot(vec![99])).is_err());
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.memory_usage(), size * 2);
    }

    #[test]
    fn test_truncate_frees_memory() {
        let mut manager = SnapshotManager::new(usize::MAX);
        for _ in 0..5 {
            manager.push(snapshot(vec![104, 1, 99])).unwrap();
        }
        let per = manager.memory_usage() / 5;

        manager.truncate(2);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.memory_usage(), per * 2);

        manager.truncate(10);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_replace_accounts_for_size() {
        let mut manager = SnapshotManager::new(usize::MAX);
        manager.push(snapshot(vec![99])).unwrap();
        let small = manager.memory_usage();

        manager.replace(0, snapshot(vec![1, 2, 3, 4, 99])).unwrap();
        assert!(manager.memory_usage() > small);
        assert_eq!(manager.len(), 1);
        assert!(manager.replace(3, snapshot(vec![99])).is_err());
    }
}

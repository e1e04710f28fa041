//! Indirection from logical time steps to physical storage slots.

use super::SolverError;

/// Translates a logical time step `k` into the storage slot holding its
/// problem data.  Several time steps may share one slot.
///
/// The table always holds `capacity` entries.  Only the first `num_horizon`
/// of them form the active window, so that the horizon can shrink and grow
/// without reallocation.
#[derive(Debug, Clone)]
pub struct StorageMapper {
    table: Vec<usize>,
    num_horizon: usize,
    num_data: usize,
}

impl StorageMapper {
    /// Creates a mapper for the window `map`, with room for horizons up to
    /// `capacity` steps.  Entries past the window default to the identity
    /// slot where one exists, or the last slot otherwise.
    pub fn try_new(map: &[usize], num_data: usize, capacity: usize) -> Result<Self, SolverError> {
        if num_data == 0 {
            return Err(SolverError::ConfigError("at least one storage slot is required"));
        }
        let capacity = usize::max(capacity, map.len());
        Self::check_window(map, num_data, capacity)?;

        let mut table = Vec::new();
        table.try_reserve_exact(capacity)?;
        table.extend_from_slice(map);
        table.extend((map.len()..capacity).map(|k| usize::min(k, num_data - 1)));

        Ok(Self {
            table,
            num_horizon: map.len(),
            num_data,
        })
    }

    /// Identity mapping over `n` steps and `n` slots
    pub fn try_identity(n: usize) -> Result<Self, SolverError> {
        let mut map = Vec::new();
        map.try_reserve_exact(n)?;
        map.extend(0..n);
        Self::try_new(&map, n, n)
    }

    fn check_window(map: &[usize], num_data: usize, capacity: usize) -> Result<(), SolverError> {
        if map.is_empty() || map.len() > capacity {
            return Err(SolverError::index("horizon length", map.len(), capacity + 1));
        }
        if let Some(&s) = map.iter().find(|&&s| s >= num_data) {
            return Err(SolverError::index("storage slot", s, num_data));
        }
        Ok(())
    }

    /// Storage slot of time step `k`
    pub fn resolve(&self, k: usize) -> Result<usize, SolverError> {
        if k >= self.num_horizon {
            return Err(SolverError::index("time step", k, self.num_horizon));
        }
        Ok(self.table[k])
    }

    // unchecked against the window: internal callers iterate the window only
    pub(crate) fn slot(&self, k: usize) -> usize {
        debug_assert!(k < self.num_horizon);
        self.table[k]
    }

    /// The active part of the table
    pub fn window(&self) -> &[usize] {
        &self.table[0..self.num_horizon]
    }

    pub fn num_horizon(&self) -> usize {
        self.num_horizon
    }

    pub fn num_data(&self) -> usize {
        self.num_data
    }

    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// true if some time step of the window uses slot `s`
    pub fn is_reachable(&self, s: usize) -> bool {
        self.window().contains(&s)
    }

    /// Every slot used by the window, each reported once
    pub fn reachable_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_data).filter(move |&s| self.is_reachable(s))
    }

    /// Checks a replacement window without applying it
    pub fn check_mapping(&self, map: &[usize], horizon: usize) -> Result<(), SolverError> {
        SolverError::check_len("time step to storage mapping", horizon, map.len())?;
        Self::check_window(map, self.num_data, self.capacity())
    }

    /// Replaces the active window by `map`
    pub fn set_mapping(&mut self, map: &[usize], horizon: usize) -> Result<(), SolverError> {
        self.check_mapping(map, horizon)?;
        self.table[0..horizon].copy_from_slice(map);
        self.num_horizon = horizon;
        Ok(())
    }

    /// Checks a new horizon length without applying it
    pub fn check_horizon_length(&self, horizon: usize) -> Result<(), SolverError> {
        if horizon == 0 || horizon > self.capacity() {
            return Err(SolverError::index("horizon length", horizon, self.capacity() + 1));
        }
        Ok(())
    }

    /// The window a horizon of `horizon` steps would have
    pub fn window_with_length(&self, horizon: usize) -> Result<&[usize], SolverError> {
        self.check_horizon_length(horizon)?;
        Ok(&self.table[0..horizon])
    }

    /// Moves the end of the active window, keeping the table entries
    pub fn change_horizon_length(&mut self, horizon: usize) -> Result<(), SolverError> {
        self.check_horizon_length(horizon)?;
        self.num_horizon = horizon;
        Ok(())
    }

    /// Moves every step of the window down by one and assigns `last` to the
    /// final step.  The slot previously at step 0 is returned.
    pub(crate) fn shift_window(&mut self, last: usize) -> usize {
        debug_assert!(last < self.num_data);
        let n = self.num_horizon;
        let first = self.table[0];
        self.table[0..n].rotate_left(1);
        self.table[n - 1] = last;
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let m = StorageMapper::try_identity(4).unwrap();
        assert_eq!(m.window(), &[0, 1, 2, 3]);
        assert_eq!(m.resolve(2), Ok(2));
        assert!(matches!(
            m.resolve(4),
            Err(SolverError::IndexError { index: 4, bound: 4, .. })
        ));
    }

    #[test]
    fn test_shared_slots() {
        // a regulator problem: every step uses one slot
        let m = StorageMapper::try_new(&[0, 0, 0, 0, 0], 1, 5).unwrap();
        assert_eq!(m.resolve(4), Ok(0));
        assert_eq!(m.reachable_slots().collect::<Vec<_>>(), vec![0]);

        // entries outside the slot range are rejected
        assert!(matches!(
            StorageMapper::try_new(&[0, 2], 2, 2),
            Err(SolverError::IndexError { index: 2, bound: 2, .. })
        ));
        assert!(StorageMapper::try_new(&[], 1, 1).is_err());
    }

    #[test]
    fn test_set_mapping() {
        let mut m = StorageMapper::try_identity(3).unwrap();
        m.set_mapping(&[2, 1], 2).unwrap();
        assert_eq!(m.num_horizon(), 2);
        assert_eq!(m.window(), &[2, 1]);
        assert_eq!(m.reachable_slots().collect::<Vec<_>>(), vec![1, 2]);

        // failures leave the mapping untouched
        assert!(m.set_mapping(&[0, 5], 2).is_err());
        assert!(m.set_mapping(&[0, 1, 2, 0], 4).is_err());
        assert!(matches!(
            m.set_mapping(&[0, 1], 3),
            Err(SolverError::DimensionError { .. })
        ));
        assert_eq!(m.window(), &[2, 1]);
    }

    #[test]
    fn test_change_horizon() {
        let mut m = StorageMapper::try_identity(5).unwrap();
        m.change_horizon_length(3).unwrap();
        assert_eq!(m.window(), &[0, 1, 2]);
        assert!(m.resolve(3).is_err());
        m.change_horizon_length(5).unwrap();
        assert_eq!(m.resolve(4), Ok(4));
        assert!(m.change_horizon_length(6).is_err());
        assert!(m.change_horizon_length(0).is_err());
        assert_eq!(m.window_with_length(2).unwrap(), &[0, 1]);
        assert_eq!(m.num_horizon(), 5);
    }

    #[test]
    fn test_shift_window() {
        let mut m = StorageMapper::try_identity(4).unwrap();
        let first = m.shift_window(0);
        assert_eq!(first, 0);
        assert_eq!(m.window(), &[1, 2, 3, 0]);
    }
}

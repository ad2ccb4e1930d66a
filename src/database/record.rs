use std::ops::Deref;

use super::models::Entity;

/// An entity with change tracking.
///
/// Reads go through `Deref`; writes go through [`Tracked::set`], which only
/// marks the record dirty when the new value differs from the current one.
/// A record that has never been stored starts dirty.
#[derive(Debug, Clone)]
pub struct Tracked<E> {
    entity: E,
    dirty: bool,
}

impl<E: Entity> Tracked<E> {
    /// Wrap a record that has not been persisted yet, or one whose state is
    /// unknown. Dirty unless it already carries a key.
    pub fn new(entity: E) -> Self {
        let dirty = entity.id().is_none();
        Self { entity, dirty }
    }

    /// Wrap a record exactly as it was read from the store.
    pub fn loaded(entity: E) -> Self {
        Self { entity, dirty: false }
    }

    /// Assign one attribute. Returns whether anything changed.
    ///
    /// ```ignore
    /// project.set(|p| &mut p.project_name, "Renamed".to_string());
    /// ```
    pub fn set<T, F>(&mut self, field: F, value: T) -> bool
    where
        T: PartialEq,
        F: FnOnce(&mut E) -> &mut T,
    {
        let slot = field(&mut self.entity);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self) -> &E {
        &self.entity
    }

    pub fn into_inner(self) -> E {
        self.entity
    }

    /// Replace with the stored version after a successful write.
    pub(crate) fn mark_saved(&mut self, stored: E) {
        self.entity = stored;
        self.dirty = false;
    }
}

impl<E> Deref for Tracked<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Project, ProjectFile};

    fn stored_project() -> Project {
        let mut project = Project::new(1, "Alpha");
        project.project_id = Some(3);
        project
    }

    #[test]
    fn loaded_record_starts_clean() {
        let tracked = Tracked::loaded(stored_project());
        assert!(!tracked.is_dirty());
        assert_eq!(tracked.project_name, "Alpha");
    }

    #[test]
    fn unsaved_record_starts_dirty() {
        assert!(Tracked::new(Project::new(1, "Beta")).is_dirty());
        assert!(!Tracked::new(stored_project()).is_dirty());
    }

    #[test]
    fn setting_equal_value_keeps_record_clean() {
        let mut tracked = Tracked::loaded(stored_project());
        assert!(!tracked.set(|p| &mut p.project_name, "Alpha".to_string()));
        assert!(!tracked.set(|p| &mut p.owning_user_id, 1));
        assert!(!tracked.is_dirty());
    }

    #[test]
    fn setting_new_value_marks_dirty() {
        let mut tracked = Tracked::loaded(stored_project());
        assert!(tracked.set(|p| &mut p.project_name, "Renamed".to_string()));
        assert!(tracked.is_dirty());
        assert_eq!(tracked.get().project_name, "Renamed");
    }

    #[test]
    fn nullable_attribute_changes_are_tracked() {
        let mut file = ProjectFile::new(1, Some(2), "a", false);
        file.file_id = Some(9);
        let mut tracked = Tracked::loaded(file);
        assert!(tracked.set(|f| &mut f.parent_directory, None));
        assert!(tracked.is_root());
        assert!(!tracked.set(|f| &mut f.parent_directory, None));
    }

    #[test]
    fn mark_saved_clears_dirty() {
        let mut tracked = Tracked::new(Project::new(1, "Gamma"));
        tracked.mark_saved(stored_project());
        assert!(!tracked.is_dirty());
        assert_eq!(tracked.id(), Some(3));
    }
}

//! Handle indexed entity database
//!
//! [`EntityDb`] owns every bound entity of a document. Entities refer to
//! each other only by [`Handle`]; references are resolved on demand through
//! [`EntityDb::get`]. The only exclusive ownership between entities is the
//! host to extension dictionary relation (and a hard owning dictionary to
//! its entries), which `duplicate` deep copies and `delete` cascades.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::entities::{DxfEntity, EntityState, ExtensionDict};
use crate::error::{DxfError, Result};
use crate::types::Handle;

/// Structure types which never become entities
pub const EXCLUDED_TYPES: [&str; 8] = [
    "SECTION",
    "ENDSEC",
    "EOF",
    "TABLE",
    "ENDTAB",
    "CLASS",
    "ACDSRECORD",
    "ACDSSCHEMA",
];

/// Monotonic handle source, seeded from `$HANDSEED`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleGenerator {
    next: u64,
}

impl HandleGenerator {
    /// Generator starting at `seed`, the null handle starts at 1.
    pub fn new(seed: Handle) -> Self {
        Self {
            next: seed.value().max(1),
        }
    }

    /// Return the current handle and advance.
    ///
    /// The last 64-bit handle is never handed out, it only ends the range.
    pub fn next_handle(&mut self) -> Result<Handle> {
        let handle = Handle::new(self.next);
        self.next = successor(handle)?;
        Ok(handle)
    }

    /// The handle the next call returns, written as `$HANDSEED`
    pub fn peek(&self) -> Handle {
        Handle::new(self.next)
    }

    /// Move the generator behind `handle`, it never moves back.
    pub fn skip_past(&mut self, handle: Handle) -> Result<()> {
        self.next = self.next.max(successor(handle)?);
        Ok(())
    }
}

fn successor(handle: Handle) -> Result<u64> {
    handle
        .value()
        .checked_add(1)
        .ok_or_else(|| DxfError::InvalidHandle(format!("no handle left after #{}", handle)))
}

impl Default for HandleGenerator {
    fn default() -> Self {
        Self::new(Handle::new(1))
    }
}

/// Handles collected during an iteration, deleted afterwards by
/// [`EntityDb::empty_trashcan`].
#[derive(Debug, Clone, Default)]
pub struct Trashcan {
    handles: Vec<Handle>,
}

impl Trashcan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, handle: Handle) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityDb {
    entities: IndexMap<Handle, DxfEntity>,
    generator: HandleGenerator,
}

impl EntityDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty database allocating handles from `seed` on
    pub fn with_seed(seed: Handle) -> Self {
        Self {
            entities: IndexMap::new(),
            generator: HandleGenerator::new(seed),
        }
    }

    pub fn generator(&self) -> &HandleGenerator {
        &self.generator
    }

    /// Next unused handle. Handles are never handed out twice, not even
    /// after the entity holding one was deleted.
    pub fn next_handle(&mut self) -> Result<Handle> {
        loop {
            let handle = self.generator.next_handle()?;
            if !self.entities.contains_key(&handle) {
                return Ok(handle);
            }
        }
    }

    /// Alias of [`EntityDb::next_handle`]
    pub fn allocate_handle(&mut self) -> Result<Handle> {
        self.next_handle()
    }

    /// Keep `handle` out of future allocations, for handles of structure
    /// records which are not stored here.
    pub fn reserve_handle(&mut self, handle: Handle) -> Result<()> {
        self.generator.skip_past(handle)
    }

    /// Bind `entity` to this database.
    ///
    /// A virtual entity without handle gets a new one, a loaded entity keeps
    /// its handle. Returns the handle of the stored entity.
    pub fn add(&mut self, mut entity: DxfEntity) -> Result<Handle> {
        if EXCLUDED_TYPES.contains(&entity.dxftype()) {
            return Err(DxfError::InvalidState(format!(
                "{} is a structure tag, not an entity",
                entity.dxftype()
            )));
        }
        match entity.state() {
            EntityState::Deleted => {
                return Err(DxfError::InvalidState(format!(
                    "can not add deleted entity {}",
                    entity.entity_name()
                )))
            }
            EntityState::Bound => {
                return Err(DxfError::InvalidState(format!(
                    "entity {} is already bound",
                    entity.entity_name()
                )))
            }
            EntityState::Virtual => {}
        }

        let handle = match entity.handle() {
            Some(handle) if handle.is_null() => return Err(DxfError::InvalidHandle(handle.to_string())),
            Some(handle) if self.entities.contains_key(&handle) => {
                return Err(DxfError::DuplicateHandle(handle))
            }
            Some(handle) => {
                self.generator.skip_past(handle)?;
                handle
            }
            None => {
                let handle = self.next_handle()?;
                entity.dxf.set_handle(handle);
                handle
            }
        };
        entity.set_state(EntityState::Bound);
        self.entities.insert(handle, entity);
        Ok(handle)
    }

    pub fn get(&self, handle: Handle) -> Result<&DxfEntity> {
        self.entities.get(&handle).ok_or(DxfError::HandleNotFound(handle))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut DxfEntity> {
        self.entities.get_mut(&handle).ok_or(DxfError::HandleNotFound(handle))
    }

    pub fn try_get(&self, handle: Handle) -> Option<&DxfEntity> {
        self.entities.get(&handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entities.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Handles in insertion order
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entities.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &DxfEntity)> + '_ {
        self.entities.iter().map(|(handle, entity)| (*handle, entity))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut DxfEntity)> + '_ {
        self.entities.iter_mut().map(|(handle, entity)| (*handle, entity))
    }

    /// Copy the entity `handle` into a new bound entity.
    ///
    /// The copy has no owner and no reactors. An extension dictionary is
    /// copied along and linked to the copy. On error every entity added by
    /// the copy is removed again.
    pub fn duplicate(&mut self, handle: Handle) -> Result<Handle> {
        let count = self.entities.len();
        let result = self.duplicate_entity(handle);
        if result.is_err() && self.entities.len() > count {
            debug!("removed {} partial copies of #{}", self.entities.len() - count, handle);
            self.entities.truncate(count);
        }
        result
    }

    fn duplicate_entity(&mut self, handle: Handle) -> Result<Handle> {
        let source = self.get(handle)?;
        let xdict = source.xdict;
        let copy = source.copy_virtual();
        let copy_handle = self.add(copy)?;
        if let Some(xdict) = xdict {
            match self.copy_dictionary(xdict.handle(), copy_handle) {
                Ok(xdict_copy) => {
                    self.get_mut(copy_handle)?.xdict = Some(ExtensionDict::new(xdict_copy));
                }
                Err(DxfError::HandleNotFound(missing)) => {
                    warn!("extension dictionary #{} of {} not found", missing, handle);
                }
                Err(err) => return Err(err),
            }
        }
        debug!("duplicated #{} as #{}", handle, copy_handle);
        Ok(copy_handle)
    }

    /// Copy a DICTIONARY owned by `owner`, hard owned entries are copied too.
    fn copy_dictionary(&mut self, handle: Handle, owner: Handle) -> Result<Handle> {
        let source = self.get(handle)?;
        let data = source.dictionary().ok_or_else(|| {
            DxfError::InvalidState(format!("{} is not a DICTIONARY", source.entity_name()))
        })?;
        let entries: Vec<_> = data.iter().map(|(key, entry)| (key.to_string(), *entry)).collect();
        let hard_owner = source.is_hard_owner();

        let mut copy = source.copy_virtual();
        copy.set_owner(owner);
        copy.append_reactor_handle(owner);
        let copy_handle = self.add(copy)?;
        if !hard_owner {
            return Ok(copy_handle);
        }
        for (key, mut entry) in entries {
            if !self.contains(entry.handle) {
                warn!("entry {} #{} of DICTIONARY #{} not found", key, entry.handle, handle);
                continue;
            }
            let entry_copy = self.duplicate_entity(entry.handle)?;
            self.get_mut(entry_copy)?.set_owner(copy_handle);
            entry.handle = entry_copy;
            if let Some(data) = self.get_mut(copy_handle)?.dictionary_mut() {
                data.insert_entry(key, entry);
            }
        }
        Ok(copy_handle)
    }

    /// Destroy the entity `handle`.
    ///
    /// The entry is removed from an owning DICTIONARY, the extension
    /// dictionary and hard owned dictionary entries are deleted too. Reactor
    /// targets survive but forget the deleted handle.
    pub fn delete(&mut self, handle: Handle) -> Result<DxfEntity> {
        let mut entity = self
            .entities
            .shift_remove(&handle)
            .ok_or(DxfError::HandleNotFound(handle))?;

        if let Some(owner) = self.entities.get_mut(&entity.owner()) {
            if let Some(data) = owner.dictionary_mut() {
                data.remove_handle(handle);
            }
        }
        for reactor in entity.get_reactors() {
            if let Some(target) = self.entities.get_mut(&reactor) {
                target.discard_reactor_handle(handle);
            }
        }
        if let Some(xdict) = entity.xdict {
            if self.contains(xdict.handle()) {
                self.delete(xdict.handle())?;
            }
        }
        if entity.is_hard_owner() {
            let owned: Vec<Handle> = entity
                .dictionary()
                .map(|data| data.handles().collect())
                .unwrap_or_default();
            for owned in owned {
                if self.contains(owned) {
                    self.delete(owned)?;
                }
            }
        }
        entity.set_state(EntityState::Deleted);
        debug!("deleted {}", entity.entity_name());
        Ok(entity)
    }

    /// Remove the entity `handle` without destroying it, it becomes virtual.
    pub fn discard(&mut self, handle: Handle) -> Result<DxfEntity> {
        let mut entity = self
            .entities
            .shift_remove(&handle)
            .ok_or(DxfError::HandleNotFound(handle))?;
        entity.set_state(EntityState::Virtual);
        Ok(entity)
    }

    /// Rebind the entity `old` to handle `new`.
    ///
    /// Returns `false` if `new` is already in use. References to `old` held
    /// by other entities are not updated.
    pub fn reset_handle(&mut self, old: Handle, new: Handle) -> Result<bool> {
        if new.is_null() {
            return Err(DxfError::InvalidHandle(new.to_string()));
        }
        if self.entities.contains_key(&new) {
            return Ok(false);
        }
        if !self.entities.contains_key(&old) {
            return Err(DxfError::HandleNotFound(old));
        }
        self.generator.skip_past(new)?;
        let mut entity = self
            .entities
            .shift_remove(&old)
            .ok_or(DxfError::HandleNotFound(old))?;
        entity.dxf.set_handle(new);
        self.entities.insert(new, entity);
        Ok(true)
    }

    pub fn trashcan(&self) -> Trashcan {
        Trashcan::new()
    }

    /// Delete all entities of `trashcan` which still exist.
    ///
    /// Returns the number of deleted entities, entities removed by an
    /// earlier cascade are skipped.
    pub fn empty_trashcan(&mut self, trashcan: Trashcan) -> Result<usize> {
        let mut count = 0;
        for handle in trashcan.handles {
            if self.contains(handle) {
                self.delete(handle)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Remove entries which are not bound, returns the number removed.
    pub fn purge(&mut self) -> usize {
        let count = self.entities.len();
        self.entities.retain(|_, entity| entity.is_bound());
        count - self.entities.len()
    }

    /// Keep the generator ahead of all stored handles.
    pub(crate) fn update_generator(&mut self) -> Result<()> {
        match self.entities.keys().max().copied() {
            Some(max) => self.generator.skip_past(max),
            None => Ok(()),
        }
    }

    /// Create an empty hard owning DICTIONARY as extension dictionary of
    /// `host`. An existing extension dictionary is returned unchanged.
    pub fn new_extension_dict(&mut self, host: Handle) -> Result<Handle> {
        if let Some(existing) = self.get(host)?.get_extension_dict() {
            return Ok(existing);
        }
        let mut dictionary = DxfEntity::new_dictionary(true);
        dictionary.set_owner(host);
        dictionary.append_reactor_handle(host);
        let xdict = self.add(dictionary)?;
        self.get_mut(host)?.xdict = Some(ExtensionDict::new(xdict));
        Ok(xdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::factory::new_entity;
    use crate::io::dxf::DxfValue;
    use crate::types::Vector3;

    fn new_line() -> DxfEntity {
        DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0))
    }

    #[test]
    fn test_add_allocates_increasing_handles() {
        let mut db = EntityDb::new();
        let first = db.add(new_line()).unwrap();
        let second = db.add(new_line()).unwrap();
        assert!(second > first);
        assert!(db.get(first).unwrap().is_bound());
        assert_eq!(db.get(second).unwrap().handle(), Some(second));
        assert_eq!(db.handles().collect::<Vec<_>>(), vec![first, second]);
    }

    #[test]
    fn test_add_rejects_duplicates_and_structure_types() {
        let mut db = EntityDb::new();
        let mut line = new_line();
        line.dxf.set_handle(Handle::new(0x1A));
        db.add(line.clone()).unwrap();
        assert!(matches!(db.add(line), Err(DxfError::DuplicateHandle(_))));

        let mut null_handle = new_line();
        null_handle.dxf.set_handle(Handle::NULL);
        assert!(matches!(db.add(null_handle), Err(DxfError::InvalidHandle(_))));

        assert!(matches!(db.add(new_entity("ENDTAB")), Err(DxfError::InvalidState(_))));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_next_handle_skips_used_handles() {
        let mut db = EntityDb::with_seed(Handle::new(0x10));
        let mut line = new_line();
        line.dxf.set_handle(Handle::new(0x10));
        db.add(line).unwrap();
        assert_eq!(db.next_handle().unwrap(), Handle::new(0x11));
    }

    #[test]
    fn test_deleted_handles_are_not_reused() {
        let mut db = EntityDb::new();
        let mut line = new_line();
        line.dxf.set_handle(Handle::new(2));
        db.add(line).unwrap();
        db.delete(Handle::new(2)).unwrap();

        let first = db.allocate_handle().unwrap();
        let second = db.allocate_handle().unwrap();
        assert!(first > Handle::new(2));
        assert!(second > first);
    }

    #[test]
    fn test_reset_handle_moves_generator() {
        let mut db = EntityDb::new();
        let line = db.add(new_line()).unwrap();
        assert!(db.reset_handle(line, Handle::new(0x40)).unwrap());
        assert_eq!(db.generator().peek(), Handle::new(0x41));
        assert!(db.reset_handle(Handle::new(0x99), Handle::new(0x50)).is_err());
        assert_eq!(db.generator().peek(), Handle::new(0x41));
    }

    #[test]
    fn test_handle_range_end() {
        let mut generator = HandleGenerator::new(Handle::new(u64::MAX - 1));
        assert_eq!(generator.next_handle().unwrap(), Handle::new(u64::MAX - 1));
        assert!(matches!(generator.next_handle(), Err(DxfError::InvalidHandle(_))));

        let mut db = EntityDb::new();
        let mut line = new_line();
        line.dxf.set_handle(Handle::new(u64::MAX));
        assert!(matches!(db.add(line), Err(DxfError::InvalidHandle(_))));
        assert!(db.is_empty());
    }

    #[test]
    fn test_failed_duplicate_leaves_no_copy() {
        let mut db = EntityDb::new();
        let host = db.add(new_line()).unwrap();
        let not_a_dictionary = db.add(new_line()).unwrap();
        db.get_mut(host).unwrap().xdict = Some(ExtensionDict::new(not_a_dictionary));

        let err = db.duplicate(host).unwrap_err();
        assert!(matches!(err, DxfError::InvalidState(_)));
        assert_eq!(db.handles().collect::<Vec<_>>(), vec![host, not_a_dictionary]);
    }

    #[test]
    fn test_get_missing_handle() {
        let db = EntityDb::new();
        assert!(matches!(db.get(Handle::new(0xFF)), Err(DxfError::HandleNotFound(_))));
        assert!(db.try_get(Handle::new(0xFF)).is_none());
    }

    #[test]
    fn test_delete_cascades_to_extension_dict() {
        let mut db = EntityDb::new();
        let host = db.add(new_line()).unwrap();
        let xdict = db.new_extension_dict(host).unwrap();
        let mut record = DxfEntity::new_xrecord();
        record.set_owner(xdict);
        let record = db.add(record).unwrap();
        db.get_mut(xdict).unwrap().dictionary_mut().unwrap().add_hard("DATA", record);

        let deleted = db.delete(host).unwrap();
        assert!(deleted.is_deleted());
        assert!(!db.contains(xdict));
        assert!(!db.contains(record));
        assert!(db.is_empty());
    }

    #[test]
    fn test_delete_keeps_reactor_targets() {
        let mut db = EntityDb::new();
        let target = db.add(new_line()).unwrap();
        let mut watcher = new_line();
        watcher.append_reactor_handle(target);
        let watcher = db.add(watcher).unwrap();
        db.get_mut(target).unwrap().append_reactor_handle(watcher);

        db.delete(watcher).unwrap();
        let target = db.get(target).unwrap();
        assert!(!target.has_reactors());
    }

    #[test]
    fn test_delete_removes_dictionary_entry() {
        let mut db = EntityDb::new();
        let dictionary = db.add(DxfEntity::new_dictionary(false)).unwrap();
        let mut record = DxfEntity::new_xrecord();
        record.set_owner(dictionary);
        let record = db.add(record).unwrap();
        db.get_mut(dictionary).unwrap().dictionary_mut().unwrap().add("KEY", record);

        db.delete(record).unwrap();
        assert!(db.get(dictionary).unwrap().dictionary().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate() {
        let mut db = EntityDb::new();
        let mut line = new_line();
        line.set("layer", "WALLS").unwrap();
        line.append_reactor_handle(Handle::new(0x99));
        let source = db.add(line).unwrap();
        let xdict = db.new_extension_dict(source).unwrap();

        let copy = db.duplicate(source).unwrap();
        assert_ne!(copy, source);
        let copied = db.get(copy).unwrap();
        assert_eq!(copied.get("layer").unwrap(), Some(DxfValue::from("WALLS")));
        assert_eq!(copied.owner(), Handle::NULL);
        assert!(!copied.has_reactors());

        let xdict_copy = copied.get_extension_dict().unwrap();
        assert_ne!(xdict_copy, xdict);
        let dictionary = db.get(xdict_copy).unwrap();
        assert_eq!(dictionary.owner(), copy);
        assert!(dictionary.is_hard_owner());
        assert_eq!(dictionary.get_reactors(), vec![copy]);
    }

    #[test]
    fn test_discard_and_reset_handle() {
        let mut db = EntityDb::new();
        let first = db.add(new_line()).unwrap();
        let second = db.add(new_line()).unwrap();
        assert!(!db.reset_handle(first, second).unwrap());
        assert!(db.reset_handle(first, Handle::new(0x100)).unwrap());
        assert_eq!(db.get(Handle::new(0x100)).unwrap().handle(), Some(Handle::new(0x100)));

        let discarded = db.discard(second).unwrap();
        assert!(discarded.is_virtual());
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_trashcan() {
        let mut db = EntityDb::new();
        let handles: Vec<_> = (0..3).map(|_| db.add(new_line()).unwrap()).collect();
        let mut trashcan = db.trashcan();
        for (handle, _) in db.iter() {
            if handle != handles[1] {
                trashcan.add(handle);
            }
        }
        assert_eq!(db.empty_trashcan(trashcan).unwrap(), 2);
        assert_eq!(db.handles().collect::<Vec<_>>(), vec![handles[1]]);
        assert_eq!(db.purge(), 0);
    }
}

//! Per-type pool lookup, passed around explicitly instead of living in a global.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::pool::Pool;

/// Default `max` for pools created on demand by [`Pools::obtain`].
pub const DEFAULT_MAX: usize = 100;

/// One [`Pool`] per type. Not thread-safe; keep one per thread if needed.
#[derive(Default)]
pub struct Pools {
    pools: HashMap<TypeId, Box<dyn Any>>,
}

impl Pools {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pool for `T`, if one was created or registered.
    pub fn get<T: 'static>(&mut self) -> Option<&mut Pool<T>> {
        self.pools
            .get_mut(&TypeId::of::<T>())
            .and_then(|pool| pool.downcast_mut::<Pool<T>>())
    }

    /// The pool for `T`, creating one with `factory` and room for `max` free objects if missing.
    ///
    /// Returns `None` only if a pool of another type sits under `T`'s id, which nothing in
    /// this registry can produce.
    pub fn get_or_insert<T: 'static>(
        &mut self,
        max: usize,
        factory: impl FnMut() -> T + 'static,
    ) -> Option<&mut Pool<T>> {
        let id = TypeId::of::<T>();
        if !self.pools.contains_key(&id) {
            let name = std::any::type_name::<T>();
            log::debug!("Creating pool for {name} (max={max})");
            self.pools.insert(id, Box::new(Pool::with_capacity(factory, 4, max)));
        }
        self.get::<T>()
    }

    /// Register `pool` for `T`, returning the previous one.
    pub fn set<T: 'static>(&mut self, pool: Pool<T>) -> Option<Pool<T>> {
        self.pools
            .insert(TypeId::of::<T>(), Box::new(pool))
            .and_then(|old| old.downcast::<Pool<T>>().ok())
            .map(|old| *old)
    }

    /// An object from `T`'s pool, creating the pool (max [`DEFAULT_MAX`]) on first use.
    pub fn obtain<T: 'static>(&mut self, factory: impl FnMut() -> T + 'static) -> T {
        if let Some(pool) = self.get::<T>() {
            return pool.obtain();
        }
        let name = std::any::type_name::<T>();
        log::debug!("Creating pool for {name} (max={DEFAULT_MAX})");
        let mut pool = Pool::with_capacity(factory, 4, DEFAULT_MAX);
        let object = pool.obtain();
        self.pools.insert(TypeId::of::<T>(), Box::new(pool));
        object
    }

    /// Return `object` to its type's pool. Returns `false` and drops the object if no pool
    /// exists for `T`.
    pub fn free<T: 'static>(&mut self, object: T) -> bool {
        match self.get::<T>() {
            Some(pool) => {
                pool.free(object);
                true
            }
            None => false,
        }
    }

    /// Returns how many objects the pool kept. Objects beyond its `max` are discarded and
    /// not counted; with no pool for `T` everything is dropped and 0 is returned.
    pub fn free_all<T: 'static>(&mut self, objects: impl IntoIterator<Item = T>) -> usize {
        match self.get::<T>() {
            Some(pool) => {
                let before = pool.free_count();
                pool.free_all(objects);
                let kept = pool.free_count() - before;
                log::trace!("Kept {kept} freed objects ({before} were free before)");
                kept
            }
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl std::fmt::Debug for Pools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pools")
            .field("types", &self.pools.len())
            .finish()
    }
}

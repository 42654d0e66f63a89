//! Bounded free-list of reusable objects.

/// Objects that know how to clear themselves before reuse.
pub trait Poolable {
    fn reset(&mut self);
}

type Factory<T> = Box<dyn FnMut() -> T>;
type ResetHook<T> = Box<dyn FnMut(&mut T)>;
type DiscardHook<T> = Box<dyn FnMut(T)>;

fn keep<T>(_: &mut T) {}

/// Pool of `T` with at most `max` free objects retained.
///
/// Objects are created lazily by the factory when the free list is empty. Freed
/// objects are reset; objects freed while the pool is full are discarded. The pool
/// has no view of objects it handed out, and is not thread-safe.
pub struct Pool<T> {
    free_objects: Vec<T>,
    max: usize,
    peak: usize,
    factory: Factory<T>,
    reset: ResetHook<T>,
    discard: Option<DiscardHook<T>>,
}

impl<T: 'static> Pool<T> {
    /// Pool with room for 16 free objects up front and no upper bound.
    pub fn new(factory: impl FnMut() -> T + 'static) -> Self {
        Self::with_capacity(factory, 16, usize::MAX)
    }

    pub fn with_capacity(factory: impl FnMut() -> T + 'static, initial: usize, max: usize) -> Self {
        Self {
            free_objects: Vec::with_capacity(initial.min(max)),
            max,
            peak: 0,
            factory: Box::new(factory),
            reset: Box::new(keep::<T>),
            discard: None,
        }
    }

    /// Hook run on every object returned to the pool, and on discard unless a discard hook is set.
    pub fn with_reset(mut self, reset: impl FnMut(&mut T) + 'static) -> Self {
        self.reset = Box::new(reset);
        self
    }

    /// Hook run instead of the reset hook for objects the pool will not keep.
    pub fn with_discard(mut self, discard: impl FnMut(T) + 'static) -> Self {
        self.discard = Some(Box::new(discard));
        self
    }

    /// A free object, or a new one from the factory.
    pub fn obtain(&mut self) -> T {
        match self.free_objects.pop() {
            Some(object) => object,
            None => (self.factory)(),
        }
    }

    /// Return `object` to the pool, or discard it when the pool is full.
    pub fn free(&mut self, mut object: T) {
        if self.free_objects.len() < self.max {
            (self.reset)(&mut object);
            self.free_objects.push(object);
            self.peak = self.peak.max(self.free_objects.len());
        } else {
            log::trace!("Pool full ({} free), discarding object", self.max);
            self.discard(object);
        }
    }

    pub fn free_all(&mut self, objects: impl IntoIterator<Item = T>) {
        for object in objects {
            if self.free_objects.len() < self.max {
                let mut object = object;
                (self.reset)(&mut object);
                self.free_objects.push(object);
            } else {
                self.discard(object);
            }
        }
        self.peak = self.peak.max(self.free_objects.len());
    }

    /// Create up to `count` objects ahead of time, never exceeding `max` free objects.
    pub fn fill(&mut self, count: usize) {
        let room = self.max - self.free_objects.len();
        for _ in 0..count.min(room) {
            let object = (self.factory)();
            self.free_objects.push(object);
        }
        self.peak = self.peak.max(self.free_objects.len());
    }

    /// Discard every free object. Objects currently obtained are unaffected.
    pub fn clear(&mut self) {
        let objects = std::mem::take(&mut self.free_objects);
        for object in objects {
            self.discard(object);
        }
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_objects.len()
    }

    /// Highest number of free objects seen so far.
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak
    }

    #[inline]
    pub fn max(&self) -> usize {
        self.max
    }

    fn discard(&mut self, mut object: T) {
        match &mut self.discard {
            Some(discard) => discard(object),
            None => (self.reset)(&mut object),
        }
    }
}

impl<T: Poolable + 'static> Pool<T> {
    /// Pool whose reset hook calls [`Poolable::reset`].
    pub fn poolable(factory: impl FnMut() -> T + 'static) -> Self {
        Self::new(factory).with_reset(T::reset)
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("free", &self.free_objects.len())
            .field("max", &self.max)
            .field("peak", &self.peak)
            .finish()
    }
}

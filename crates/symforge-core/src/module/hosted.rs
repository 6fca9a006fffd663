//! # Host-Allocated Builders
//!
//! When a module builder is created from the scripting side, the host
//! allocates the object's memory itself: it hands over zero-filled storage
//! but never runs a constructor or destructor on it. [`HostSlot`] brings a
//! value to life inside such storage and tears it down again:
//!
//! ```text
//! acquire ──► construct ──► get / get_mut ──► destruct ──► release (drop)
//! ```
//!
//! This is the only place in the crate that touches uninitialized memory.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use tracing::{error, trace};

use super::{BuilderState, Module, ModuleBuilder};
use crate::error::{Result, SymforgeError};
use crate::session::Session;
use crate::typedesc::Type;
use crate::types::Address;

/// Source of raw, zero-filled storage.
pub trait HostAllocator
{
    /// Allocate zero-filled storage for `layout`, or `None` if out of memory.
    ///
    /// The returned pointer need not honor `layout.align()`; callers check.
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Give storage back.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`allocate_zeroed`](Self::allocate_zeroed) on this
    /// allocator with the same `layout`, and must not have been released.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<A: HostAllocator + ?Sized> HostAllocator for &A
{
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>>
    {
        (**self).allocate_zeroed(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout)
    {
        // SAFETY: forwarded contract.
        unsafe { (**self).release(ptr, layout) }
    }
}

/// The C heap (`calloc` / `free`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl HostAllocator for SystemAllocator
{
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>>
    {
        // calloc(1, 0) may legally return NULL
        let size = layout.size().max(1);
        // SAFETY: calloc has no preconditions; a null result is handled below.
        let raw = unsafe { libc::calloc(1, size) };
        NonNull::new(raw.cast::<u8>())
    }

    unsafe fn release(&self, ptr: NonNull<u8>, _layout: Layout)
    {
        // SAFETY: the caller guarantees `ptr` came from calloc above.
        unsafe { libc::free(ptr.as_ptr().cast()) }
    }
}

/// A `T` living in host-provided storage.
///
/// The storage is released exactly once, when the slot is dropped; if the
/// value is still alive at that point it is destructed first.
pub struct HostSlot<T, A: HostAllocator = SystemAllocator>
{
    storage: NonNull<T>,
    layout: Layout,
    allocator: A,
    constructed: bool,
    _owns: PhantomData<T>,
}

impl<T, A: HostAllocator> HostSlot<T, A>
{
    /// Get zero-filled storage for one `T` from `allocator`.
    ///
    /// ## Errors
    ///
    /// - [`SymforgeError::ResourceExhausted`] if the allocator has no memory
    /// - [`SymforgeError::Internal`] if the storage is not aligned for `T`
    ///   (the storage is released before returning)
    pub fn acquire(allocator: A) -> Result<Self>
    {
        let layout = Layout::new::<T>();
        let raw = allocator.allocate_zeroed(layout).ok_or_else(|| {
            SymforgeError::ResourceExhausted(format!("host allocator refused {} bytes", layout.size()))
        })?;

        if (raw.as_ptr() as usize) % layout.align() != 0 {
            error!(address = raw.as_ptr() as usize, align = layout.align(), "host storage misaligned");
            // SAFETY: `raw` was just returned by this allocator for `layout`.
            unsafe { allocator.release(raw, layout) };
            return Err(SymforgeError::Internal(format!(
                "host storage at {:#x} is not {}-byte aligned",
                raw.as_ptr() as usize,
                layout.align()
            )));
        }

        trace!(size = layout.size(), align = layout.align(), "acquired host storage");
        Ok(Self {
            storage: raw.cast::<T>(),
            layout,
            allocator,
            constructed: false,
            _owns: PhantomData,
        })
    }

    /// Move `value` into the storage.
    ///
    /// ## Errors
    ///
    /// [`SymforgeError::Internal`] if a value is already alive in the slot;
    /// `value` is dropped and the existing one is untouched.
    pub fn construct(&mut self, value: T) -> Result<&mut T>
    {
        if self.constructed {
            return Err(SymforgeError::Internal("host slot constructed twice".to_string()));
        }
        // SAFETY: the storage is aligned and sized for `T` and holds no live value.
        unsafe { ptr::write(self.storage.as_ptr(), value) };
        self.constructed = true;
        // SAFETY: just initialized.
        Ok(unsafe { self.storage.as_mut() })
    }

    pub fn is_constructed(&self) -> bool
    {
        self.constructed
    }

    pub fn get(&self) -> Option<&T>
    {
        // SAFETY: only read while a value is alive.
        self.constructed.then(|| unsafe { self.storage.as_ref() })
    }

    pub fn get_mut(&mut self) -> Option<&mut T>
    {
        if !self.constructed {
            return None;
        }
        // SAFETY: a value is alive and `&mut self` is exclusive.
        Some(unsafe { self.storage.as_mut() })
    }

    /// Run the value's destructor in place, keeping the storage.
    ///
    /// Returns `false` if there was nothing to destruct.
    pub fn destruct(&mut self) -> bool
    {
        if !self.constructed {
            return false;
        }
        self.constructed = false;
        // SAFETY: the value is alive; the flag is cleared first so a
        // panicking destructor is never run twice.
        unsafe { ptr::drop_in_place(self.storage.as_ptr()) };
        true
    }

    pub fn allocator(&self) -> &A
    {
        &self.allocator
    }
}

impl<T, A: HostAllocator> Drop for HostSlot<T, A>
{
    fn drop(&mut self)
    {
        self.destruct();
        // SAFETY: the storage came from this allocator with this layout and
        // `drop` runs once.
        unsafe { self.allocator.release(self.storage.cast::<u8>(), self.layout) };
    }
}

impl<T: fmt::Debug, A: HostAllocator> fmt::Debug for HostSlot<T, A>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("HostSlot")
            .field("layout", &self.layout)
            .field("value", &self.get())
            .finish_non_exhaustive()
    }
}

/// A [`ModuleBuilder`] whose memory belongs to the host.
#[derive(Debug)]
pub struct HostedModuleBuilder<A: HostAllocator = SystemAllocator>
{
    slot: HostSlot<ModuleBuilder, A>,
}

impl HostedModuleBuilder<SystemAllocator>
{
    pub fn new(name: impl Into<String>) -> Result<Self>
    {
        Self::with_allocator(name, SystemAllocator)
    }
}

impl<A: HostAllocator> HostedModuleBuilder<A>
{
    /// Construct a builder named `name` in storage from `allocator`.
    pub fn with_allocator(name: impl Into<String>, allocator: A) -> Result<Self>
    {
        let mut slot = HostSlot::acquire(allocator)?;
        slot.construct(ModuleBuilder::new(name))?;
        Ok(Self { slot })
    }

    /// The builder, while it is alive.
    pub fn builder(&self) -> Result<&ModuleBuilder>
    {
        self.slot.get().ok_or_else(Self::destroyed)
    }

    pub fn builder_mut(&mut self) -> Result<&mut ModuleBuilder>
    {
        self.slot.get_mut().ok_or_else(Self::destroyed)
    }

    pub fn state(&self) -> Result<BuilderState>
    {
        self.builder().map(ModuleBuilder::state)
    }

    pub fn add_type_symbol(&mut self, name: impl Into<String>, ty: &Type, language: Option<&str>) -> Result<bool>
    {
        self.builder_mut()?.add_type_symbol(name, ty, language)
    }

    pub fn add_label_symbol(&mut self, name: impl Into<String>, address: impl Into<Address>, language: Option<&str>)
    -> Result<bool>
    {
        self.builder_mut()?.add_label_symbol(name, address, language)
    }

    pub fn add_static_symbol(&mut self, name: impl Into<String>, address: impl Into<Address>, language: Option<&str>)
    -> Result<bool>
    {
        self.builder_mut()?.add_static_symbol(name, address, language)
    }

    pub fn build(&mut self, session: &Session) -> Result<Rc<Module>>
    {
        self.builder_mut()?.build(session)
    }

    /// Tear the builder down ahead of the host freeing its memory.
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self) -> bool
    {
        self.slot.destruct()
    }

    fn destroyed() -> SymforgeError
    {
        SymforgeError::Internal("module builder used after destruction".to_string())
    }
}

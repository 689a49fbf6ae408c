//! In-memory parameter store
//!
//! Holds named parameters the ground station can read and write at runtime
//! via the MAVLink parameter protocol. Names follow the MAVLink convention
//! (max 16 characters). The store is plain data; flash persistence, if any,
//! is layered on by the host.

use bitflags::bitflags;
use heapless::{FnvIndexMap, String};

/// Maximum parameter name length (MAVLink standard)
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
const MAX_PARAMS: usize = 64;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is hidden from MAVLink PARAM_REQUEST_READ/LIST
        const HIDDEN = 0b00000001;
        /// Parameter is read-only (cannot be modified via MAVLink)
        const READ_ONLY = 0b00000010;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit floating point
    Float(f32),
}

impl ParamValue {
    /// Value as f32 regardless of storage type
    pub fn as_f32(&self) -> f32 {
        match self {
            ParamValue::Int(v) => *v as f32,
            ParamValue::Float(v) => *v,
        }
    }

    /// Value as i32 regardless of storage type
    pub fn as_i32(&self) -> i32 {
        match self {
            ParamValue::Int(v) => *v,
            ParamValue::Float(v) => *v as i32,
        }
    }

    fn same_type(&self, other: &ParamValue) -> bool {
        matches!(
            (self, other),
            (ParamValue::Int(_), ParamValue::Int(_))
                | (ParamValue::Float(_), ParamValue::Float(_))
        )
    }
}

/// Parameter store error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Parameter not found
    NotFound,
    /// Invalid parameter value (wrong type)
    InvalidValue,
    /// Parameter is read-only
    ReadOnly,
    /// Parameter name too long
    NameTooLong,
    /// Parameter list full
    Full,
}

struct Entry {
    value: ParamValue,
    flags: ParamFlags,
}

/// In-memory parameter store
#[derive(Default)]
pub struct ParameterStore {
    params: FnvIndexMap<String<PARAM_NAME_LEN>, Entry, MAX_PARAMS>,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            params: FnvIndexMap::new(),
        }
    }

    /// Register a parameter with its default value
    ///
    /// Re-registering an existing name keeps the stored value (a reboot
    /// must not clobber values loaded before registration).
    pub fn register(
        &mut self,
        name: &str,
        default: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), StoreError> {
        let key = Self::key(name)?;
        if self.params.contains_key(&key) {
            return Ok(());
        }
        self.params
            .insert(
                key,
                Entry {
                    value: default,
                    flags,
                },
            )
            .map_err(|_| StoreError::Full)?;
        Ok(())
    }

    /// Get a parameter value by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let key = Self::key(name).ok()?;
        self.params.get(&key).map(|e| &e.value)
    }

    /// Set a parameter value by name
    ///
    /// The new value must match the registered type.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), StoreError> {
        let key = Self::key(name)?;
        let entry = self.params.get_mut(&key).ok_or(StoreError::NotFound)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(StoreError::ReadOnly);
        }
        if !entry.value.same_type(&value) {
            return Err(StoreError::InvalidValue);
        }
        entry.value = value;
        Ok(())
    }

    /// Whether a parameter is visible to the MAVLink parameter protocol
    pub fn is_visible(&self, name: &str) -> bool {
        Self::key(name)
            .ok()
            .and_then(|key| self.params.get(&key))
            .map(|e| !e.flags.contains(ParamFlags::HIDDEN))
            .unwrap_or(false)
    }

    /// Number of registered parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, StoreError> {
        String::try_from(name).map_err(|_| StoreError::NameTooLong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut store = ParameterStore::new();
        store
            .register("ICE_ENABLE", ParamValue::Int(0), ParamFlags::empty())
            .unwrap();

        assert_eq!(store.get("ICE_ENABLE"), Some(&ParamValue::Int(0)));
        assert_eq!(store.get("ICE_MISSING"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_value() {
        let mut store = ParameterStore::new();
        store
            .register("ICE_IDLE_PCT", ParamValue::Int(0), ParamFlags::empty())
            .unwrap();

        store.set("ICE_IDLE_PCT", ParamValue::Int(15)).unwrap();
        assert_eq!(store.get("ICE_IDLE_PCT"), Some(&ParamValue::Int(15)));
    }

    #[test]
    fn test_set_wrong_type_rejected() {
        let mut store = ParameterStore::new();
        store
            .register("ICE_TEMP_MAX", ParamValue::Float(105.0), ParamFlags::empty())
            .unwrap();

        assert_eq!(
            store.set("ICE_TEMP_MAX", ParamValue::Int(100)),
            Err(StoreError::InvalidValue)
        );
    }

    #[test]
    fn test_set_unknown_rejected() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("ICE_NOPE", ParamValue::Int(1)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_read_only_rejected() {
        let mut store = ParameterStore::new();
        store
            .register("ICE_FMT_VER", ParamValue::Int(1), ParamFlags::READ_ONLY)
            .unwrap();

        assert_eq!(
            store.set("ICE_FMT_VER", ParamValue::Int(2)),
            Err(StoreError::ReadOnly)
        );
    }

    #[test]
    fn test_reregister_keeps_value() {
        let mut store = ParameterStore::new();
        store
            .register("ICE_ENABLE", ParamValue::Int(0), ParamFlags::empty())
            .unwrap();
        store.set("ICE_ENABLE", ParamValue::Int(1)).unwrap();

        store
            .register("ICE_ENABLE", ParamValue::Int(0), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("ICE_ENABLE"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn test_hidden_flag() {
        let mut store = ParameterStore::new();
        store
            .register("ICE_SECRET", ParamValue::Int(0), ParamFlags::HIDDEN)
            .unwrap();
        store
            .register("ICE_ENABLE", ParamValue::Int(0), ParamFlags::empty())
            .unwrap();

        assert!(!store.is_visible("ICE_SECRET"));
        assert!(store.is_visible("ICE_ENABLE"));
        assert!(!store.is_visible("ICE_MISSING"));
    }

    #[test]
    fn test_name_too_long() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.register(
                "ICE_PARAM_NAME_TOO_LONG",
                ParamValue::Int(0),
                ParamFlags::empty()
            ),
            Err(StoreError::NameTooLong)
        );
    }
}

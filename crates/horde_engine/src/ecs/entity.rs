//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Generational key: a destroyed entity's identifier is never confused
    /// with a later entity occupying the same slot.
    pub struct Entity;
}

impl Entity {
    /// Raw 64-bit form, useful for logging
    pub fn to_bits(self) -> u64 {
        slotmap::Key::data(&self).as_ffi()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{:x}", self.to_bits())
    }
}

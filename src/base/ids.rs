//! Arena indices for per-file semantic tables.

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of a variable in its file's variable arena.
    VarId
);
arena_id!(
    /// Index of a scope in its file's scope arena.
    ScopeId
);
arena_id!(
    /// Index of a function in its file's function arena.
    FuncId
);

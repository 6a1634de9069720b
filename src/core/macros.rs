/******************************************\
|==========================================|
|      Macro: impl_from_to_primitive       |
|==========================================|
\******************************************/

/// Generates `from_unchecked` and `index` methods for a `repr(u8)` enum.
///
/// - `unsafe fn from_unchecked(index: u8) -> Self`: transmutes a `u8` into the
///   enum. The index must correspond to a variant.
/// - `const fn index(&self) -> usize`: the discriminant as a `usize`.
///
/// The second form takes the primitive type explicitly (e.g. `i8` for signed
/// direction deltas) and only generates the conversion.
#[macro_export]
macro_rules! impl_from_to_primitive {
    ($enum_name:ident) => {
        impl $enum_name {
            #[doc=concat!("Converts a u8 to ", stringify!($enum_name), " without a range check")]
            /// ## Safety
            /// - The index must have a corresponding enum variant with the same discriminant
            #[inline]
            pub const unsafe fn from_unchecked(index: u8) -> Self {
                debug_assert!(index < Self::NUM as u8, "Index out of bounds");
                unsafe { std::mem::transmute(index) }
            }

            #[doc=concat!("Converts ", stringify!($enum_name), " to a usize index")]
            #[inline]
            pub const fn index(&self) -> usize {
                *self as usize
            }
        }
    };

    ($enum_name:ident, $type_name:ty) => {
        impl $enum_name {
            #[doc=concat!("Converts ", stringify!($type_name), " to ", stringify!($enum_name))]
            pub const fn from_unchecked(index: $type_name) -> Self {
                unsafe { std::mem::transmute(index) }
            }
        }
    };
}

/******************************************\
|==========================================|
|          Macro: impl_enum_iter           |
|==========================================|
\******************************************/

/// Generates an `iter()` over all variants of an enum that has a `NUM`
/// constant and `from_unchecked`.
#[macro_export]
macro_rules! impl_enum_iter {
    ($enum_name:ident) => {
        impl $enum_name {
            #[doc=concat!("Returns an iterator over all variants of ", stringify!($enum_name))]
            pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
                (0..Self::NUM as u8).map(|i| unsafe { Self::from_unchecked(i) })
            }
        }
    };
}

/******************************************\
|==========================================|
|             Macro: impl_op               |
|==========================================|
\******************************************/

/// Implements a binary operator for a single-field tuple struct, either
/// against itself or against another operand type.
#[macro_export]
macro_rules! impl_op {
    ($struct_name:ident, $op_name:ident, $method_name:ident, $op:tt) => {
        impl std::ops::$op_name for $struct_name {
            type Output = Self;

            fn $method_name(self, rhs: Self) -> Self::Output {
                Self(self.0 $op rhs.0)
            }
        }
    };
    ($struct_name:ident, $op_name:ident, $method_name:ident, $op:tt, $other_type:ident) => {
        impl std::ops::$op_name<$other_type> for $struct_name {
            type Output = Self;

            fn $method_name(self, rhs: $other_type) -> Self::Output {
                Self(self.0 $op rhs)
            }
        }
    }
}

/******************************************\
|==========================================|
|          Macro: impl_assign_op           |
|==========================================|
\******************************************/

/// Implements an assignment operator in terms of the matching binary operator.
#[macro_export]
macro_rules! impl_assign_op {
    ($struct_name:ident, $op_name:ident, $method_name:ident, $op:tt, $other_type:ident) => {
        impl std::ops::$op_name<$other_type> for $struct_name {

            fn $method_name(&mut self, rhs: $other_type) {
                *self = *self $op rhs;
            }
        }
    };
}

/******************************************\
|==========================================|
|           Macro: impl_bit_ops            |
|==========================================|
\******************************************/

/// Implements `&`, `|`, `^` and their assignment forms for a wrapper struct.
#[macro_export]
macro_rules! impl_bit_ops {
    ($struct_name:ident) => {
        $crate::impl_op!($struct_name, BitAnd, bitand, &);
        $crate::impl_op!($struct_name, BitOr, bitor, |);
        $crate::impl_op!($struct_name, BitXor, bitxor, ^);

        $crate::impl_assign_op!($struct_name, BitAndAssign, bitand_assign, &, $struct_name);
        $crate::impl_assign_op!($struct_name, BitOrAssign, bitor_assign, |, $struct_name);
        $crate::impl_assign_op!($struct_name, BitXorAssign, bitxor_assign, ^, $struct_name);
    };
}

/******************************************\
|==========================================|
|         Macro: impl_bit_mani_ops         |
|==========================================|
\******************************************/

/// Implements `<<`, `>>`, their assignment forms, and unary `!` for a wrapper
/// struct, shifting against the given operand type.
#[macro_export]
macro_rules! impl_bit_mani_ops {
    ($struct_name:ident, $other_type:ident) => {
        $crate::impl_op!($struct_name, Shl, shl, <<, $other_type);
        $crate::impl_op!($struct_name, Shr, shr, >>, $other_type);

        impl std::ops::Not for $struct_name {
            type Output = Self;

            fn not(self) -> Self::Output {
                Self(!self.0)
            }
        }

        $crate::impl_assign_op!($struct_name, ShlAssign, shl_assign, <<, $other_type);
        $crate::impl_assign_op!($struct_name, ShrAssign, shr_assign, >>, $other_type);
    };
}

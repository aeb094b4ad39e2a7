//! C type → VHDL type mapping (spec.md §4.6).

/// Default signal width in bits for a 32-bit C type.
pub const DEFAULT_WIDTH: u32 = 32;
/// Width pinned for `long` (spec.md §9 Open Question resolution).
pub const LONG_WIDTH: u32 = 64;
/// Width pinned for `short` (spec.md §9 Open Question resolution).
pub const SHORT_WIDTH: u32 = 16;
/// Width of a `char` port/signal.
pub const CHAR_WIDTH: u32 = 8;

/// The VHDL type a C type spelling maps onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VhdlType {
    Signed(u32),
    Unsigned(u32),
    StdLogicVector(u32),
    /// `void`: no port is emitted for this type.
    Void,
    /// `T[N]`: a vector of `n` elements, each mapped from `elem`.
    Array { elem: Box<VhdlType>, n: i64 },
    /// `struct S`: a previously declared record type.
    Record(String),
}

impl VhdlType {
    /// Render the VHDL type spelling used in port/signal declarations.
    pub fn render(&self) -> String {
        match self {
            VhdlType::Signed(w) => format!("signed({} downto 0)", w.saturating_sub(1)),
            VhdlType::Unsigned(w) => format!("unsigned({} downto 0)", w.saturating_sub(1)),
            VhdlType::StdLogicVector(w) => format!("std_logic_vector({} downto 0)", w.saturating_sub(1)),
            VhdlType::Void => String::new(),
            VhdlType::Array { elem, n } => {
                format!("array(0 to {}) of {}", n - 1, elem.render())
            }
            VhdlType::Record(name) => name.clone(),
        }
    }

    /// The bit width used for literal sizing (`to_signed(n, W)`), defaulting
    /// to [`DEFAULT_WIDTH`] for non-scalar types.
    pub fn width(&self) -> u32 {
        match self {
            VhdlType::Signed(w) | VhdlType::Unsigned(w) | VhdlType::StdLogicVector(w) => *w,
            _ => DEFAULT_WIDTH,
        }
    }
}

/// Map a spelled-out C type (e.g. `"int"`, `"unsigned"`, `"struct Point"`)
/// to its [`VhdlType`] per the table in spec.md §4.6.
pub fn map_scalar(c_type: &str) -> VhdlType {
    let c_type = c_type.trim();
    if let Some(name) = c_type.strip_prefix("struct ") {
        return VhdlType::Record(name.trim().to_string());
    }
    match c_type {
        "void" => VhdlType::Void,
        "long" | "unsigned long" | "signed long" => VhdlType::Signed(LONG_WIDTH),
        "short" | "signed short" => VhdlType::Signed(SHORT_WIDTH),
        "unsigned short" => VhdlType::Unsigned(SHORT_WIDTH),
        "char" | "signed char" => VhdlType::Signed(CHAR_WIDTH),
        "unsigned char" => VhdlType::Unsigned(CHAR_WIDTH),
        "float" => VhdlType::StdLogicVector(DEFAULT_WIDTH),
        "double" => VhdlType::StdLogicVector(64),
        "unsigned" | "unsigned int" => VhdlType::Unsigned(DEFAULT_WIDTH),
        // "int", "signed", "signed int", and anything else unrecognized
        // defaults to the 32-bit signed port spec.md's table uses for `int`.
        _ => VhdlType::Signed(DEFAULT_WIDTH),
    }
}

/// Map an array declaration's element type and size to a [`VhdlType::Array`].
pub fn map_array(c_type: &str, size: i64) -> VhdlType {
    VhdlType::Array {
        elem: Box::new(map_scalar(c_type)),
        n: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_maps_to_signed_32() {
        assert_eq!(map_scalar("int").render(), "signed(31 downto 0)");
    }

    #[test]
    fn long_maps_to_signed_64() {
        assert_eq!(map_scalar("long").render(), "signed(63 downto 0)");
    }

    #[test]
    fn short_maps_to_signed_16() {
        assert_eq!(map_scalar("short").render(), "signed(15 downto 0)");
    }

    #[test]
    fn unsigned_maps_to_unsigned_32() {
        assert_eq!(map_scalar("unsigned").render(), "unsigned(31 downto 0)");
    }

    #[test]
    fn char_maps_to_signed_8() {
        assert_eq!(map_scalar("char").render(), "signed(7 downto 0)");
    }

    #[test]
    fn float_and_double_map_to_std_logic_vector() {
        assert_eq!(map_scalar("float").render(), "std_logic_vector(31 downto 0)");
        assert_eq!(map_scalar("double").render(), "std_logic_vector(63 downto 0)");
    }

    #[test]
    fn void_has_no_port() {
        assert_eq!(map_scalar("void"), VhdlType::Void);
        assert_eq!(map_scalar("void").render(), "");
    }

    #[test]
    fn struct_maps_to_record_by_name() {
        assert_eq!(map_scalar("struct Point"), VhdlType::Record("Point".to_string()));
    }

    #[test]
    fn array_wraps_element_type() {
        let t = map_array("int", 8);
        assert_eq!(t.render(), "array(0 to 7) of signed(31 downto 0)");
    }
}

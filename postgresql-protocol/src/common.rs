use std::fmt;

/// Server-assigned type identifier (`pg_type.oid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeId(pub u32);

impl TypeId {
    /// Lets the server infer the type of a parameter.
    pub const UNSPECIFIED: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(16);
    pub const NAME: TypeId = TypeId(19);
    pub const INT8: TypeId = TypeId(20);
    pub const INT2: TypeId = TypeId(21);
    pub const INT4: TypeId = TypeId(23);
    pub const TEXT: TypeId = TypeId(25);
    pub const BPCHAR: TypeId = TypeId(1042);
    pub const VARCHAR: TypeId = TypeId(1043);

    /// Name of the built-in type, if known.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            TypeId::UNSPECIFIED => "unspecified",
            TypeId::BOOL => "bool",
            TypeId::NAME => "name",
            TypeId::INT8 => "int8",
            TypeId::INT2 => "int2",
            TypeId::INT4 => "int4",
            TypeId::TEXT => "text",
            TypeId::BPCHAR => "bpchar",
            TypeId::VARCHAR => "varchar",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "oid {}", self.0),
        }
    }
}

impl From<u32> for TypeId {
    fn from(oid: u32) -> TypeId {
        TypeId(oid)
    }
}

/// Wire format of a parameter or a result column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Text = 0,
    Binary = 1,
}

impl Format {
    pub fn from_code(code: i16) -> Option<Format> {
        match code {
            0 => Some(Format::Text),
            1 => Some(Format::Binary),
            _ => None,
        }
    }
    pub fn code(self) -> i16 {
        self as i16
    }
}

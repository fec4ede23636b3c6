//! Primitive Types
//!
//! The eight JVM primitive types, both as kinds (for array element types
//! and primitive class handles) and as raw values (what a bridge surfaces
//! when it reads an element out of a primitive array).

use std::fmt;

/// One of the eight JVM primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`, stored as one byte
    Boolean,
    /// `byte`
    Byte,
    /// `char`, a UTF-16 code unit
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveKind {
    /// All primitive kinds, in descriptor order
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Size of one element in bytes
    pub fn size(&self) -> usize {
        match self {
            PrimitiveKind::Boolean | PrimitiveKind::Byte => 1,
            PrimitiveKind::Char | PrimitiveKind::Short => 2,
            PrimitiveKind::Int | PrimitiveKind::Float => 4,
            PrimitiveKind::Long | PrimitiveKind::Double => 8,
        }
    }

    /// Java keyword for this type (`int`, `double`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// JVM type descriptor character (`Z`, `B`, `C`, `S`, `I`, `J`, `F`, `D`)
    pub fn descriptor(&self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Parse a kind from a Java keyword or a single-letter code.
    ///
    /// Codes are case-insensitive: `z b c s i j f d`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boolean" => return Some(PrimitiveKind::Boolean),
            "byte" => return Some(PrimitiveKind::Byte),
            "char" => return Some(PrimitiveKind::Char),
            "short" => return Some(PrimitiveKind::Short),
            "int" => return Some(PrimitiveKind::Int),
            "long" => return Some(PrimitiveKind::Long),
            "float" => return Some(PrimitiveKind::Float),
            "double" => return Some(PrimitiveKind::Double),
            _ => {}
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_descriptor(c.to_ascii_uppercase()),
            _ => None,
        }
    }

    /// Look up a kind by its descriptor character
    pub fn from_descriptor(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.descriptor() == c)
    }

    /// Name of the boxed class for this kind
    pub fn boxed_class_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    /// The zero value of this kind
    pub fn zero(&self) -> Primitive {
        match self {
            PrimitiveKind::Boolean => Primitive::Boolean(false),
            PrimitiveKind::Byte => Primitive::Byte(0),
            PrimitiveKind::Char => Primitive::Char(0),
            PrimitiveKind::Short => Primitive::Short(0),
            PrimitiveKind::Int => Primitive::Int(0),
            PrimitiveKind::Long => Primitive::Long(0),
            PrimitiveKind::Float => Primitive::Float(0.0),
            PrimitiveKind::Double => Primitive::Double(0.0),
        }
    }

    /// Decode one element from native-endian bytes.
    ///
    /// `bytes` must hold at least [`PrimitiveKind::size`] bytes.
    pub fn read(&self, bytes: &[u8]) -> Option<Primitive> {
        let bytes = bytes.get(..self.size())?;
        Some(match self {
            PrimitiveKind::Boolean => Primitive::Boolean(bytes[0] != 0),
            PrimitiveKind::Byte => Primitive::Byte(i8::from_ne_bytes([bytes[0]])),
            PrimitiveKind::Char => Primitive::Char(u16::from_ne_bytes(bytes.try_into().ok()?)),
            PrimitiveKind::Short => Primitive::Short(i16::from_ne_bytes(bytes.try_into().ok()?)),
            PrimitiveKind::Int => Primitive::Int(i32::from_ne_bytes(bytes.try_into().ok()?)),
            PrimitiveKind::Long => Primitive::Long(i64::from_ne_bytes(bytes.try_into().ok()?)),
            PrimitiveKind::Float => Primitive::Float(f32::from_ne_bytes(bytes.try_into().ok()?)),
            PrimitiveKind::Double => Primitive::Double(f64::from_ne_bytes(bytes.try_into().ok()?)),
        })
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A raw primitive value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char` (UTF-16 code unit)
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
}

impl Primitive {
    /// The kind of this value
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Byte(_) => PrimitiveKind::Byte,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Short(_) => PrimitiveKind::Short,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::Long(_) => PrimitiveKind::Long,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Double(_) => PrimitiveKind::Double,
        }
    }

    /// Encode as native-endian bytes
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        match self {
            Primitive::Boolean(b) => vec![u8::from(*b)],
            Primitive::Byte(v) => v.to_ne_bytes().to_vec(),
            Primitive::Char(v) => v.to_ne_bytes().to_vec(),
            Primitive::Short(v) => v.to_ne_bytes().to_vec(),
            Primitive::Int(v) => v.to_ne_bytes().to_vec(),
            Primitive::Long(v) => v.to_ne_bytes().to_vec(),
            Primitive::Float(v) => v.to_ne_bytes().to_vec(),
            Primitive::Double(v) => v.to_ne_bytes().to_vec(),
        }
    }

    /// Integral value, for the integral kinds (and `char`)
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Primitive::Byte(v) => Some(v.into()),
            Primitive::Char(v) => Some(v.into()),
            Primitive::Short(v) => Some(v.into()),
            Primitive::Int(v) => Some(v.into()),
            Primitive::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Floating value, for `float` and `double`
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Primitive::Float(v) => Some(v.into()),
            Primitive::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Widen or narrow this value to `kind` the way a Java cast would.
    ///
    /// Returns `None` for casts Java forbids (anything to or from boolean).
    pub fn cast(&self, kind: PrimitiveKind) -> Option<Primitive> {
        if let Primitive::Boolean(b) = self {
            return (kind == PrimitiveKind::Boolean).then_some(Primitive::Boolean(*b));
        }
        if kind == PrimitiveKind::Boolean {
            return None;
        }
        let wide = match self.as_i64() {
            Some(i) => Wide::Int(i),
            None => Wide::Float(self.as_f64()?),
        };
        Some(match (kind, wide) {
            (PrimitiveKind::Byte, Wide::Int(i)) => Primitive::Byte(i as i8),
            (PrimitiveKind::Byte, Wide::Float(f)) => Primitive::Byte(f as i32 as i8),
            (PrimitiveKind::Char, Wide::Int(i)) => Primitive::Char(i as u16),
            (PrimitiveKind::Char, Wide::Float(f)) => Primitive::Char(f as i32 as u16),
            (PrimitiveKind::Short, Wide::Int(i)) => Primitive::Short(i as i16),
            (PrimitiveKind::Short, Wide::Float(f)) => Primitive::Short(f as i32 as i16),
            (PrimitiveKind::Int, Wide::Int(i)) => Primitive::Int(i as i32),
            (PrimitiveKind::Int, Wide::Float(f)) => Primitive::Int(f as i32),
            (PrimitiveKind::Long, Wide::Int(i)) => Primitive::Long(i),
            (PrimitiveKind::Long, Wide::Float(f)) => Primitive::Long(f as i64),
            (PrimitiveKind::Float, Wide::Int(i)) => Primitive::Float(i as f32),
            (PrimitiveKind::Float, Wide::Float(f)) => Primitive::Float(f as f32),
            (PrimitiveKind::Double, Wide::Int(i)) => Primitive::Double(i as f64),
            (PrimitiveKind::Double, Wide::Float(f)) => Primitive::Double(f),
            (PrimitiveKind::Boolean, _) => return None,
        })
    }
}

enum Wide {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Boolean(b) => write!(f, "{}", b),
            Primitive::Byte(v) => write!(f, "{}", v),
            Primitive::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            Primitive::Short(v) => write!(f, "{}", v),
            Primitive::Int(v) => write!(f, "{}", v),
            Primitive::Long(v) => write!(f, "{}", v),
            Primitive::Float(v) => f.write_str(&java_f32_string(*v)),
            Primitive::Double(v) => f.write_str(&java_float_string(*v)),
        }
    }
}

/// Render a floating value the way `Double.toString` does.
pub fn java_float_string(v: f64) -> String {
    render_java_float(v, format!("{:?}", v), format!("{:e}", v))
}

/// Render a floating value the way `Float.toString` does.
pub fn java_f32_string(v: f32) -> String {
    render_java_float(f64::from(v), format!("{:?}", v), format!("{:e}", v))
}

fn render_java_float(v: f64, plain: String, scientific: String) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        let s = if v > 0.0 { "Infinity" } else { "-Infinity" };
        return s.to_string();
    }
    let magnitude = v.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return plain;
    }
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_properties() {
        assert_eq!(PrimitiveKind::Int.size(), 4);
        assert_eq!(PrimitiveKind::Long.descriptor(), 'J');
        assert_eq!(PrimitiveKind::parse("j"), Some(PrimitiveKind::Long));
        assert_eq!(PrimitiveKind::parse("Z"), Some(PrimitiveKind::Boolean));
        assert_eq!(PrimitiveKind::parse("double"), Some(PrimitiveKind::Double));
        assert_eq!(PrimitiveKind::parse("x"), None);
        assert_eq!(PrimitiveKind::Short.boxed_class_name(), "java.lang.Short");
    }

    #[test]
    fn test_byte_round_trip() {
        let value = Primitive::Double(-2.5);
        let bytes = value.to_ne_bytes();
        assert_eq!(PrimitiveKind::Double.read(&bytes), Some(value));
        assert_eq!(PrimitiveKind::Double.read(&bytes[..3]), None);
    }

    #[test]
    fn test_cast() {
        assert_eq!(Primitive::Int(300).cast(PrimitiveKind::Byte), Some(Primitive::Byte(44)));
        assert_eq!(Primitive::Double(2.9).cast(PrimitiveKind::Int), Some(Primitive::Int(2)));
        assert_eq!(Primitive::Boolean(true).cast(PrimitiveKind::Int), None);
        assert_eq!(Primitive::Int(1).cast(PrimitiveKind::Boolean), None);
    }

    #[test]
    fn test_java_float_string() {
        assert_eq!(java_float_string(5.0), "5.0");
        assert_eq!(java_float_string(0.25), "0.25");
        assert_eq!(java_float_string(4.56e123), "4.56E123");
        assert_eq!(java_float_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(java_float_string(f64::NAN), "NaN");
        assert_eq!(java_float_string(1e-5), "1.0E-5");
        assert_eq!(java_float_string(1e7), "1.0E7");
        assert_eq!(java_f32_string(0.1), "0.1");
    }
}

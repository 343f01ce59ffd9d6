//! Attribute type grammar.
//!
//! Every attribute in a node definition carries one or more type tokens such
//! as `float`, `int[3]`, `colorf[4][]` or `numeric_arrays`. The grammar is a
//! closed vocabulary, so it is modelled as a tagged enum plus a table of the
//! legal base types for each production:
//! - Exhaustive matching catches missing cases at compile time
//! - [`fmt::Display`] and [`FromStr`] are exact inverses of each other
//! - serde handles the enum through its canonical string form
//!
//! Productions are tried from most to least specific (atomic keywords,
//! array-of-tuple, tuple, array, role, union group) so that `float[3][]` can
//! only ever resolve to [`TypeToken::ArrayOfTuple`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a member of the type grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type token '{token}'")]
pub struct UnknownTypeToken {
    /// The offending token, verbatim.
    pub token: String,
}

impl UnknownTypeToken {
    fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

// ============================================================================
// Primitive types
// ============================================================================

/// Scalar base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Bool,
    Double,
    Int,
    Int64,
    Path,
    Uchar,
    Uint,
    Uint64,
    Token,
    Half,
    Float,
    Integer,
    String,
}

impl PrimitiveType {
    /// All primitive types in grammar order.
    pub const ALL: [PrimitiveType; 13] = [
        PrimitiveType::Bool,
        PrimitiveType::Double,
        PrimitiveType::Int,
        PrimitiveType::Int64,
        PrimitiveType::Path,
        PrimitiveType::Uchar,
        PrimitiveType::Uint,
        PrimitiveType::Uint64,
        PrimitiveType::Token,
        PrimitiveType::Half,
        PrimitiveType::Float,
        PrimitiveType::Integer,
        PrimitiveType::String,
    ];

    /// Keyword used in descriptor files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Double => "double",
            PrimitiveType::Int => "int",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Path => "path",
            PrimitiveType::Uchar => "uchar",
            PrimitiveType::Uint => "uint",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Token => "token",
            PrimitiveType::Half => "half",
            PrimitiveType::Float => "float",
            PrimitiveType::Integer => "integer",
            PrimitiveType::String => "string",
        }
    }

    /// Look up a primitive by keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == keyword)
    }

    /// Whether `<base>[]` is a legal array type.
    pub fn is_arrayable(&self) -> bool {
        !matches!(
            self,
            PrimitiveType::Path | PrimitiveType::Integer | PrimitiveType::String
        )
    }

    /// Whether `<base>[N]` is a legal tuple type.
    pub fn is_tupleable(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Double | PrimitiveType::Float | PrimitiveType::Half | PrimitiveType::Int
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal tuple sizes.
pub const TUPLE_SIZES: [u8; 3] = [2, 3, 4];

// ============================================================================
// Role attributes
// ============================================================================

/// Floating point precision suffix of a role attribute (`d`, `f`, `h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatPrecision {
    Double,
    Float,
    Half,
}

impl FloatPrecision {
    /// All precisions in suffix order.
    pub const ALL: [FloatPrecision; 3] = [
        FloatPrecision::Double,
        FloatPrecision::Float,
        FloatPrecision::Half,
    ];

    /// Single-letter suffix.
    pub fn suffix(&self) -> char {
        match self {
            FloatPrecision::Double => 'd',
            FloatPrecision::Float => 'f',
            FloatPrecision::Half => 'h',
        }
    }

    fn from_suffix(c: char) -> Option<Self> {
        match c {
            'd' => Some(FloatPrecision::Double),
            'f' => Some(FloatPrecision::Float),
            'h' => Some(FloatPrecision::Half),
            _ => None,
        }
    }
}

/// Semantic kind of a numeric role attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKind {
    Color,
    Normal,
    Vector,
    TexCoord,
    Quaternion,
    Point,
    Matrix,
    Frame,
}

impl RoleKind {
    /// All role kinds.
    pub const ALL: [RoleKind; 8] = [
        RoleKind::Color,
        RoleKind::Normal,
        RoleKind::Vector,
        RoleKind::TexCoord,
        RoleKind::Quaternion,
        RoleKind::Point,
        RoleKind::Matrix,
        RoleKind::Frame,
    ];

    /// Keyword prefix, without the precision suffix.
    pub fn prefix(&self) -> &'static str {
        match self {
            RoleKind::Color => "color",
            RoleKind::Normal => "normal",
            RoleKind::Vector => "vector",
            RoleKind::TexCoord => "texcoord",
            RoleKind::Quaternion => "quat",
            RoleKind::Point => "point",
            RoleKind::Matrix => "matrixd",
            RoleKind::Frame => "frame",
        }
    }

    /// Whether the keyword takes a `d`/`f`/`h` suffix.
    pub fn has_precision(&self) -> bool {
        !matches!(self, RoleKind::Matrix | RoleKind::Frame)
    }

    /// Arities this kind may be declared with.
    pub fn arities(&self) -> &'static [u8] {
        match self {
            RoleKind::Color => &[3, 4],
            RoleKind::Normal | RoleKind::Vector | RoleKind::Point => &[3],
            RoleKind::TexCoord => &[2, 3],
            RoleKind::Quaternion | RoleKind::Frame => &[4],
            RoleKind::Matrix => &[2, 3, 4],
        }
    }

    /// Whether values of this kind are square matrices rather than tuples.
    pub fn is_matrix(&self) -> bool {
        matches!(self, RoleKind::Matrix | RoleKind::Frame)
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.prefix() == prefix)
    }
}

/// A numeric role attribute such as `colorf[3]` or `matrixd[4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumericRole {
    pub kind: RoleKind,
    /// `None` exactly when the kind has no precision suffix.
    pub precision: Option<FloatPrecision>,
    pub arity: u8,
}

impl NumericRole {
    /// Build a role, checking precision and arity against the kind.
    pub fn new(kind: RoleKind, precision: Option<FloatPrecision>, arity: u8) -> Option<Self> {
        if kind.has_precision() != precision.is_some() || !kind.arities().contains(&arity) {
            return None;
        }
        Some(Self {
            kind,
            precision,
            arity,
        })
    }
}

impl fmt::Display for NumericRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.prefix())?;
        if let Some(precision) = self.precision {
            write!(f, "{}", precision.suffix())?;
        }
        write!(f, "[{}]", self.arity)
    }
}

/// Role attribute: a numeric role or one of the non-numeric role values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Numeric(NumericRole),
    Execute,
    ObjectId,
    Timecode,
}

impl Role {
    /// Whether `<role>[]` is legal.
    pub fn is_arrayable(&self) -> bool {
        !matches!(self, Role::Execute)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "execute" => return Some(Role::Execute),
            "objectId" => return Some(Role::ObjectId),
            "timecode" => return Some(Role::Timecode),
            _ => {}
        }

        let (head, arity) = split_bracket_size(s)?;
        if let Some(kind) = RoleKind::from_prefix(head) {
            return NumericRole::new(kind, None, arity).map(Role::Numeric);
        }

        let mut chars = head.chars();
        let precision = FloatPrecision::from_suffix(chars.next_back()?)?;
        let kind = RoleKind::from_prefix(chars.as_str())?;
        NumericRole::new(kind, Some(precision), arity).map(Role::Numeric)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Numeric(role) => write!(f, "{}", role),
            Role::Execute => f.write_str("execute"),
            Role::ObjectId => f.write_str("objectId"),
            Role::Timecode => f.write_str("timecode"),
        }
    }
}

// ============================================================================
// Union groups
// ============================================================================

/// Numeric family of a union group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericFamily {
    Integral,
    Decimal,
    Numeric,
}

impl NumericFamily {
    pub const ALL: [NumericFamily; 3] = [
        NumericFamily::Integral,
        NumericFamily::Decimal,
        NumericFamily::Numeric,
    ];

    fn stem(&self) -> &'static str {
        match self {
            NumericFamily::Integral => "integral",
            NumericFamily::Decimal => "decimal",
            NumericFamily::Numeric => "numeric",
        }
    }
}

/// Shape category of a family union group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnionCategory {
    Scalars,
    /// Historical spelling of [`UnionCategory::Scalars`], still found in
    /// older descriptor files.
    Scalers,
    Tuples,
    ArrayElements,
    Arrays,
}

impl UnionCategory {
    pub const ALL: [UnionCategory; 5] = [
        UnionCategory::Scalars,
        UnionCategory::Scalers,
        UnionCategory::Tuples,
        UnionCategory::ArrayElements,
        UnionCategory::Arrays,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            UnionCategory::Scalars => "scalars",
            UnionCategory::Scalers => "scalers",
            UnionCategory::Tuples => "tuples",
            UnionCategory::ArrayElements => "array_elements",
            UnionCategory::Arrays => "arrays",
        }
    }
}

/// Placeholder denoting "any concrete type in this category".
///
/// Union groups are resolved by downstream consumers, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnionGroup {
    /// `integral_tuples`, `numeric_arrays`, ...
    Family(NumericFamily, UnionCategory),
    /// `integrals`, `decimals`, `numerics`
    Aggregate(NumericFamily),
    Matrices,
    ArrayElements,
    Arrays,
    Strings,
}

impl UnionGroup {
    /// Every union group name the grammar accepts.
    pub fn all() -> Vec<UnionGroup> {
        let mut groups = Vec::new();
        for family in NumericFamily::ALL {
            for category in UnionCategory::ALL {
                groups.push(UnionGroup::Family(family, category));
            }
            groups.push(UnionGroup::Aggregate(family));
        }
        groups.extend([
            UnionGroup::Matrices,
            UnionGroup::ArrayElements,
            UnionGroup::Arrays,
            UnionGroup::Strings,
        ]);
        groups
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "integrals" => return Some(UnionGroup::Aggregate(NumericFamily::Integral)),
            "decimals" => return Some(UnionGroup::Aggregate(NumericFamily::Decimal)),
            "numerics" => return Some(UnionGroup::Aggregate(NumericFamily::Numeric)),
            "matrices" => return Some(UnionGroup::Matrices),
            "array_elements" => return Some(UnionGroup::ArrayElements),
            "arrays" => return Some(UnionGroup::Arrays),
            "strings" => return Some(UnionGroup::Strings),
            _ => {}
        }

        let (stem, rest) = s.split_once('_')?;
        let family = NumericFamily::ALL.into_iter().find(|f| f.stem() == stem)?;
        let category = UnionCategory::ALL.into_iter().find(|c| c.as_str() == rest)?;
        Some(UnionGroup::Family(family, category))
    }
}

impl fmt::Display for UnionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnionGroup::Family(family, category) => {
                write!(f, "{}_{}", family.stem(), category.as_str())
            }
            UnionGroup::Aggregate(family) => write!(f, "{}s", family.stem()),
            UnionGroup::Matrices => f.write_str("matrices"),
            UnionGroup::ArrayElements => f.write_str("array_elements"),
            UnionGroup::Arrays => f.write_str("arrays"),
            UnionGroup::Strings => f.write_str("strings"),
        }
    }
}

// ============================================================================
// TypeToken
// ============================================================================

/// A parsed attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeToken {
    /// `float`, `path`, `string`, ...
    Primitive(PrimitiveType),
    /// `float[]`; base is always arrayable.
    PrimitiveArray(PrimitiveType),
    /// `float[3]`; base is always tupleable.
    PrimitiveTuple { base: PrimitiveType, size: u8 },
    /// `float[3][]`
    ArrayOfTuple { base: PrimitiveType, size: u8 },
    /// `colorf[3]`, `execute`, `timecode`, ...
    Role(Role),
    /// `colorf[3][]`, `timecode[]`, ...; never `execute[]`.
    ArrayRole(Role),
    Bundle,
    Target,
    Any,
    Token,
    UnionGroup(UnionGroup),
}

impl TypeToken {
    /// Parse a type string.
    pub fn parse(s: &str) -> Result<Self, UnknownTypeToken> {
        match s {
            "bundle" => return Ok(TypeToken::Bundle),
            "target" => return Ok(TypeToken::Target),
            "any" => return Ok(TypeToken::Any),
            "token" => return Ok(TypeToken::Token),
            _ => {}
        }

        if let Some(element) = s.strip_suffix("[]") {
            if let Some((base, size)) = parse_tuple(element) {
                return Ok(TypeToken::ArrayOfTuple { base, size });
            }
            if let Some(base) = PrimitiveType::from_keyword(element) {
                return if base.is_arrayable() {
                    Ok(TypeToken::PrimitiveArray(base))
                } else {
                    Err(UnknownTypeToken::new(s))
                };
            }
            return match Role::parse(element) {
                Some(role) if role.is_arrayable() => Ok(TypeToken::ArrayRole(role)),
                _ => Err(UnknownTypeToken::new(s)),
            };
        }

        if let Some((base, size)) = parse_tuple(s) {
            return Ok(TypeToken::PrimitiveTuple { base, size });
        }
        if let Some(base) = PrimitiveType::from_keyword(s) {
            return Ok(TypeToken::Primitive(base));
        }
        if let Some(role) = Role::parse(s) {
            return Ok(TypeToken::Role(role));
        }
        if let Some(group) = UnionGroup::parse(s) {
            return Ok(TypeToken::UnionGroup(group));
        }

        Err(UnknownTypeToken::new(s))
    }

    /// Whether this token names a concrete type (not a union placeholder).
    pub fn is_concrete(&self) -> bool {
        !matches!(self, TypeToken::UnionGroup(_))
    }

    /// JSON shape a value of this type takes.
    pub fn value_shape(&self) -> ValueShape {
        match self {
            TypeToken::Primitive(_) | TypeToken::Token => ValueShape::Scalar,
            TypeToken::PrimitiveTuple { size, .. } => ValueShape::Tuple(*size),
            TypeToken::Role(role) => role_shape(role),
            TypeToken::PrimitiveArray(_) => ValueShape::Array(Box::new(ValueShape::Scalar)),
            TypeToken::ArrayOfTuple { size, .. } => {
                ValueShape::Array(Box::new(ValueShape::Tuple(*size)))
            }
            TypeToken::ArrayRole(role) => ValueShape::Array(Box::new(role_shape(role))),
            TypeToken::Bundle | TypeToken::Target | TypeToken::Any | TypeToken::UnionGroup(_) => {
                ValueShape::Unconstrained
            }
        }
    }

    /// Every concrete type token the grammar accepts.
    pub fn all_concrete() -> Vec<TypeToken> {
        let mut tokens = vec![
            TypeToken::Bundle,
            TypeToken::Target,
            TypeToken::Any,
            TypeToken::Token,
        ];

        for base in PrimitiveType::ALL {
            // "token" alone is the atomic marker above
            if base != PrimitiveType::Token {
                tokens.push(TypeToken::Primitive(base));
            }
            if base.is_arrayable() {
                tokens.push(TypeToken::PrimitiveArray(base));
            }
            if base.is_tupleable() {
                for size in TUPLE_SIZES {
                    tokens.push(TypeToken::PrimitiveTuple { base, size });
                    tokens.push(TypeToken::ArrayOfTuple { base, size });
                }
            }
        }

        let mut roles = vec![Role::Execute, Role::ObjectId, Role::Timecode];
        for kind in RoleKind::ALL {
            let precisions: Vec<Option<FloatPrecision>> = if kind.has_precision() {
                FloatPrecision::ALL.into_iter().map(Some).collect()
            } else {
                vec![None]
            };
            for precision in precisions {
                for &arity in kind.arities() {
                    if let Some(role) = NumericRole::new(kind, precision, arity) {
                        roles.push(Role::Numeric(role));
                    }
                }
            }
        }
        for role in roles {
            tokens.push(TypeToken::Role(role));
            if role.is_arrayable() {
                tokens.push(TypeToken::ArrayRole(role));
            }
        }

        tokens
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeToken::Primitive(base) => write!(f, "{}", base),
            TypeToken::PrimitiveArray(base) => write!(f, "{}[]", base),
            TypeToken::PrimitiveTuple { base, size } => write!(f, "{}[{}]", base, size),
            TypeToken::ArrayOfTuple { base, size } => write!(f, "{}[{}][]", base, size),
            TypeToken::Role(role) => write!(f, "{}", role),
            TypeToken::ArrayRole(role) => write!(f, "{}[]", role),
            TypeToken::Bundle => f.write_str("bundle"),
            TypeToken::Target => f.write_str("target"),
            TypeToken::Any => f.write_str("any"),
            TypeToken::Token => f.write_str("token"),
            TypeToken::UnionGroup(group) => write!(f, "{}", group),
        }
    }
}

impl FromStr for TypeToken {
    type Err = UnknownTypeToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeToken::parse(s)
    }
}

impl Serialize for TypeToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TypeToken::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse a type string into a [`TypeToken`].
pub fn parse_type(s: &str) -> Result<TypeToken, UnknownTypeToken> {
    TypeToken::parse(s)
}

/// Render a [`TypeToken`] back to its canonical string.
pub fn stringify_type(token: &TypeToken) -> String {
    token.to_string()
}

/// `"<head>[N]"` with a single decimal digit size.
fn split_bracket_size(s: &str) -> Option<(&str, u8)> {
    let inner = s.strip_suffix(']')?;
    let (head, digits) = inner.rsplit_once('[')?;
    if head.is_empty() || digits.len() != 1 {
        return None;
    }
    let size = digits.parse::<u8>().ok()?;
    Some((head, size))
}

fn parse_tuple(s: &str) -> Option<(PrimitiveType, u8)> {
    let (head, size) = split_bracket_size(s)?;
    let base = PrimitiveType::from_keyword(head)?;
    (base.is_tupleable() && TUPLE_SIZES.contains(&size)).then_some((base, size))
}

fn role_shape(role: &Role) -> ValueShape {
    match role {
        Role::Numeric(numeric) if numeric.kind.is_matrix() => ValueShape::Matrix(numeric.arity),
        Role::Numeric(numeric) => ValueShape::Tuple(numeric.arity),
        Role::Execute | Role::ObjectId | Role::Timecode => ValueShape::Scalar,
    }
}

// ============================================================================
// Value shapes
// ============================================================================

/// JSON shape of a literal value (default, minimum, maximum, test value).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// A single JSON scalar: number, string or boolean.
    Scalar,
    /// A list of exactly N scalars.
    Tuple(u8),
    /// An N×N matrix, as N rows of N scalars or a flat list of N² scalars.
    Matrix(u8),
    /// A list whose elements all have the inner shape.
    Array(Box<ValueShape>),
    /// Anything goes (bundles, targets, `any`, union groups).
    Unconstrained,
}

impl ValueShape {
    /// Check a JSON value against this shape.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value as Json;

        match self {
            ValueShape::Unconstrained => true,
            ValueShape::Scalar => is_scalar(value),
            ValueShape::Tuple(n) => match value {
                Json::Array(items) => items.len() == *n as usize && items.iter().all(is_scalar),
                _ => false,
            },
            ValueShape::Matrix(n) => match value {
                Json::Array(items) => {
                    let n = *n as usize;
                    let nested = items.len() == n
                        && items.iter().all(|row| ValueShape::Tuple(n as u8).matches(row));
                    let flat = items.len() == n * n && items.iter().all(is_scalar);
                    nested || flat
                }
                _ => false,
            },
            ValueShape::Array(inner) => match value {
                Json::Array(items) => items.iter().all(|item| inner.matches(item)),
                _ => false,
            },
        }
    }

    /// Shape of a range bound: array ranges apply to each element.
    pub fn range_shape(&self) -> &ValueShape {
        match self {
            ValueShape::Array(inner) => &**inner,
            other => other,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Scalar => f.write_str("a scalar value"),
            ValueShape::Tuple(n) => write!(f, "a list of exactly {} values", n),
            ValueShape::Matrix(n) => write!(f, "a {n}x{n} matrix"),
            ValueShape::Array(inner) => write!(f, "a list of {}", inner.element_name()),
            ValueShape::Unconstrained => f.write_str("any value"),
        }
    }
}

impl ValueShape {
    fn element_name(&self) -> String {
        match self {
            ValueShape::Scalar => "scalars".to_string(),
            ValueShape::Tuple(n) => format!("{}-element lists", n),
            ValueShape::Matrix(n) => format!("{n}x{n} matrices"),
            ValueShape::Array(_) => "lists".to_string(),
            ValueShape::Unconstrained => "values".to_string(),
        }
    }
}

fn is_scalar(value: &serde_json::Value) -> bool {
    matches!(
        value,
        serde_json::Value::Number(_) | serde_json::Value::String(_) | serde_json::Value::Bool(_)
    )
}

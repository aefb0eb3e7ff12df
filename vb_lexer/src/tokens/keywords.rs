//! VB keyword table
//!
//! Keywords are matched case-insensitively. The lookup map is built once per
//! process and shared by every scanner.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

macro_rules! keywords {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        /// Every keyword the scanner recognises, reserved and contextual.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Keyword {
            $($variant),+
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),+];

            /// Canonical spelling as written in VB source
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),+
                }
            }
        }
    };
}

keywords! {
    AddHandler => "AddHandler",
    AddressOf => "AddressOf",
    Aggregate => "Aggregate",
    Alias => "Alias",
    And => "And",
    AndAlso => "AndAlso",
    Ansi => "Ansi",
    As => "As",
    Ascending => "Ascending",
    Assembly => "Assembly",
    Async => "Async",
    Auto => "Auto",
    Await => "Await",
    Binary => "Binary",
    Boolean => "Boolean",
    By => "By",
    ByRef => "ByRef",
    Byte => "Byte",
    ByVal => "ByVal",
    Call => "Call",
    Case => "Case",
    Catch => "Catch",
    CBool => "CBool",
    CByte => "CByte",
    CChar => "CChar",
    CDate => "CDate",
    CDbl => "CDbl",
    CDec => "CDec",
    Char => "Char",
    CInt => "CInt",
    Class => "Class",
    CLng => "CLng",
    CObj => "CObj",
    Compare => "Compare",
    Const => "Const",
    Continue => "Continue",
    CSByte => "CSByte",
    CShort => "CShort",
    CSng => "CSng",
    CStr => "CStr",
    CType => "CType",
    CUInt => "CUInt",
    CULng => "CULng",
    CUShort => "CUShort",
    Custom => "Custom",
    Date => "Date",
    Decimal => "Decimal",
    Declare => "Declare",
    Default => "Default",
    Delegate => "Delegate",
    Descending => "Descending",
    Dim => "Dim",
    DirectCast => "DirectCast",
    Distinct => "Distinct",
    Do => "Do",
    Double => "Double",
    Each => "Each",
    Else => "Else",
    ElseIf => "ElseIf",
    End => "End",
    EndIf => "EndIf",
    Enum => "Enum",
    Equals => "Equals",
    Erase => "Erase",
    Error => "Error",
    Event => "Event",
    Exit => "Exit",
    Explicit => "Explicit",
    False => "False",
    Finally => "Finally",
    For => "For",
    Friend => "Friend",
    From => "From",
    Function => "Function",
    Get => "Get",
    GetType => "GetType",
    GetXmlNamespace => "GetXmlNamespace",
    Global => "Global",
    GoSub => "GoSub",
    GoTo => "GoTo",
    Group => "Group",
    Handles => "Handles",
    If => "If",
    Implements => "Implements",
    Imports => "Imports",
    In => "In",
    Infer => "Infer",
    Inherits => "Inherits",
    Integer => "Integer",
    Interface => "Interface",
    Into => "Into",
    Is => "Is",
    IsNot => "IsNot",
    Iterator => "Iterator",
    Join => "Join",
    Key => "Key",
    Let => "Let",
    Lib => "Lib",
    Like => "Like",
    Long => "Long",
    Loop => "Loop",
    Me => "Me",
    Mod => "Mod",
    Module => "Module",
    MustInherit => "MustInherit",
    MustOverride => "MustOverride",
    MyBase => "MyBase",
    MyClass => "MyClass",
    Namespace => "Namespace",
    Narrowing => "Narrowing",
    New => "New",
    Next => "Next",
    Not => "Not",
    Nothing => "Nothing",
    NotInheritable => "NotInheritable",
    NotOverridable => "NotOverridable",
    Object => "Object",
    Of => "Of",
    Off => "Off",
    On => "On",
    Operator => "Operator",
    Option => "Option",
    Optional => "Optional",
    Or => "Or",
    Order => "Order",
    OrElse => "OrElse",
    Out => "Out",
    Overloads => "Overloads",
    Overridable => "Overridable",
    Overrides => "Overrides",
    ParamArray => "ParamArray",
    Partial => "Partial",
    Preserve => "Preserve",
    Private => "Private",
    Property => "Property",
    Protected => "Protected",
    Public => "Public",
    RaiseEvent => "RaiseEvent",
    ReadOnly => "ReadOnly",
    ReDim => "ReDim",
    Rem => "REM",
    RemoveHandler => "RemoveHandler",
    Resume => "Resume",
    Return => "Return",
    SByte => "SByte",
    Select => "Select",
    Set => "Set",
    Shadows => "Shadows",
    Shared => "Shared",
    Short => "Short",
    Single => "Single",
    Skip => "Skip",
    Static => "Static",
    Step => "Step",
    Stop => "Stop",
    Strict => "Strict",
    String => "String",
    Structure => "Structure",
    Sub => "Sub",
    SyncLock => "SyncLock",
    Take => "Take",
    Text => "Text",
    Then => "Then",
    Throw => "Throw",
    To => "To",
    True => "True",
    Try => "Try",
    TryCast => "TryCast",
    TypeOf => "TypeOf",
    UInteger => "UInteger",
    ULong => "ULong",
    Unicode => "Unicode",
    Until => "Until",
    UShort => "UShort",
    Using => "Using",
    Variant => "Variant",
    Wend => "Wend",
    When => "When",
    Where => "Where",
    While => "While",
    Widening => "Widening",
    With => "With",
    WithEvents => "WithEvents",
    WriteOnly => "WriteOnly",
    Xor => "Xor",
    Yield => "Yield",
}

static KEYWORD_MAP: OnceLock<HashMap<String, Keyword>> = OnceLock::new();

fn keyword_map() -> &'static HashMap<String, Keyword> {
    KEYWORD_MAP.get_or_init(|| {
        Keyword::ALL
            .iter()
            .map(|kw| (kw.as_str().to_lowercase(), *kw))
            .collect()
    })
}

impl Keyword {
    /// Case-insensitive lookup of a word
    pub fn from_str(word: &str) -> Option<Self> {
        keyword_map().get(&word.to_lowercase()).copied()
    }

    /// Contextual keywords are only special in certain positions and are
    /// otherwise ordinary names.
    pub const fn is_contextual(self) -> bool {
        matches!(
            self,
            Self::Aggregate
                | Self::Ansi
                | Self::Ascending
                | Self::Assembly
                | Self::Async
                | Self::Auto
                | Self::Await
                | Self::Binary
                | Self::By
                | Self::Compare
                | Self::Custom
                | Self::Descending
                | Self::Distinct
                | Self::Equals
                | Self::Explicit
                | Self::From
                | Self::Group
                | Self::Infer
                | Self::Into
                | Self::Iterator
                | Self::Join
                | Self::Key
                | Self::Off
                | Self::Order
                | Self::Out
                | Self::Preserve
                | Self::Skip
                | Self::Strict
                | Self::Take
                | Self::Text
                | Self::Unicode
                | Self::Until
                | Self::Where
                | Self::Yield
        )
    }

    /// Declaration modifiers that may precede a type or member declaration
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::Public
                | Self::Private
                | Self::Protected
                | Self::Friend
                | Self::Shared
                | Self::Shadows
                | Self::Static
                | Self::Overloads
                | Self::Overrides
                | Self::Overridable
                | Self::NotOverridable
                | Self::MustOverride
                | Self::MustInherit
                | Self::NotInheritable
                | Self::Partial
                | Self::ReadOnly
                | Self::WriteOnly
                | Self::WithEvents
                | Self::Default
                | Self::Widening
                | Self::Narrowing
                | Self::Dim
                | Self::Const
                | Self::Async
                | Self::Iterator
        )
    }

    /// Built-in type names usable wherever a type is expected
    pub const fn is_primitive_type(self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Byte
                | Self::Char
                | Self::Date
                | Self::Decimal
                | Self::Double
                | Self::Integer
                | Self::Long
                | Self::Object
                | Self::SByte
                | Self::Short
                | Self::Single
                | Self::String
                | Self::UInteger
                | Self::ULong
                | Self::UShort
        )
    }

    /// The `CBool`..`CUShort` conversion operators, which take one
    /// parenthesised argument
    pub const fn is_conversion(self) -> bool {
        matches!(
            self,
            Self::CBool
                | Self::CByte
                | Self::CChar
                | Self::CDate
                | Self::CDbl
                | Self::CDec
                | Self::CInt
                | Self::CLng
                | Self::CObj
                | Self::CSByte
                | Self::CShort
                | Self::CSng
                | Self::CStr
                | Self::CUInt
                | Self::CULng
                | Self::CUShort
        )
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(Keyword::from_str("dim"), Some(Keyword::Dim));
        assert_eq!(Keyword::from_str("DIM"), Some(Keyword::Dim));
        assert_eq!(Keyword::from_str("GetXmlNamespace"), Some(Keyword::GetXmlNamespace));
        assert_eq!(Keyword::from_str("rem"), Some(Keyword::Rem));
        assert_eq!(Keyword::from_str("set"), Some(Keyword::Set));
        assert_eq!(Keyword::from_str("Dimension"), None);
    }

    #[test]
    fn test_spellings_round_trip() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(*kw), "{:?}", kw);
        }
    }

    #[test]
    fn test_keyword_classes() {
        assert!(Keyword::From.is_contextual());
        assert!(!Keyword::Dim.is_contextual());
        assert!(Keyword::Public.is_modifier());
        assert!(Keyword::Integer.is_primitive_type());
        assert!(Keyword::CStr.is_conversion());
        assert!(!Keyword::CType.is_conversion());
    }
}

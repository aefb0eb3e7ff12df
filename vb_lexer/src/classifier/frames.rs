//! Production frames of the classifier's pushdown automaton
//!
//! Each frame is one production in progress; its step enum says where in
//! the production it stands. Frames never hold tokens, only positions.

use super::{ClassifierFlags, Context};
use crate::tokens::{Keyword, TokenKind};

/// Outcome of stepping the top frame
#[derive(Debug)]
pub(super) enum Flow {
    /// The frame needs the next token
    Wait,
    /// The token was consumed
    Consumed(Action),
    /// The token (if any) still has to be offered to the resulting top frame
    Continue(Action),
}

impl Flow {
    pub fn consume() -> Self {
        Flow::Consumed(Action::Stay)
    }

    pub fn consume_push(child: Frame) -> Self {
        Flow::Consumed(Action::Push(child))
    }

    pub fn push(child: Frame) -> Self {
        Flow::Continue(Action::Push(child))
    }

    pub fn pop() -> Self {
        Flow::Continue(Action::Pop)
    }

    pub fn replace(frame: Frame) -> Self {
        Flow::Continue(Action::Replace(frame))
    }

    pub fn retry() -> Self {
        Flow::Continue(Action::Stay)
    }
}

/// What happens to the stepped frame
#[derive(Debug)]
pub(super) enum Action {
    Stay,
    Push(Frame),
    /// Pushes the first frame, then the second on top of it
    PushBoth(Frame, Frame),
    Pop,
    Replace(Frame),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Frame {
    /// Bottom of the stack; restarts the compilation unit
    Sentinel,
    Declarations(Declarations),
    Attribute(AttributeStep),
    Imports(ImportsStep),
    /// Consumes tokens up to the end of the statement
    RestOfLine,
    /// Consumes tokens up to the `)` closing an already consumed `(`
    SkipParens { depth: u32 },
    TypeName(TypeNameStep),
    Member(Member),
    Parameters(ParameterStep),
    Accessors(Accessors),
    EnumBody(EnumStep),
    Declarators(DeclaratorStep),
    Statements(Statements),
    Statement(StatementStep),
    If(IfStep),
    Select(SelectStep),
    Loop(LoopBlock),
    Do(DoStep),
    For(ForStep),
    Try(TryStep),
    OptionalExpression,
    ExpressionList(ListStep),
    Expression(Expression),
    Group(Group),
    New(NewStep),
    Lambda(Lambda),
    Query(Query),
    GetXmlNamespace(XmlNamespaceStep),
    Xml(XmlLiteral),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    CompilationUnit,
    Namespace,
    /// Class, Module, Structure or Interface
    Type(Keyword),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Declarations {
    pub scope: Scope,
    pub step: LineStep,
    /// `MustOverride`, `Declare` or `Delegate` seen on this line
    pub no_body: bool,
    /// `Custom` seen on this line
    pub custom: bool,
}

impl Declarations {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            step: LineStep::Start,
            no_body: false,
            custom: false,
        }
    }

    pub fn closing(&self) -> Option<Keyword> {
        match self.scope {
            Scope::CompilationUnit => None,
            Scope::Namespace => Some(Keyword::Namespace),
            Scope::Type(kind) => Some(kind),
        }
    }

    pub fn in_interface(&self) -> bool {
        self.scope == Scope::Type(Keyword::Interface)
    }
}

/// Position in a line-oriented block body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LineStep {
    Start,
    AfterName,
    AfterEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AttributeStep {
    Start,
    AfterName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ImportsStep {
    Start,
    AfterName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TypeNameStep {
    Start,
    AfterName,
}

/// What follows a member header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Body {
    None,
    Statements,
    Accessors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MemberStep {
    Name,
    AfterName,
    OpenParen,
    /// `Handles` / `Implements` name lists
    Clause,
}

/// Header of a Sub, Function, Operator, Property, Event, Delegate, Declare
/// or accessor
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Member {
    pub kind: Keyword,
    pub body: Body,
    pub step: MemberStep,
}

impl Member {
    pub fn new(kind: Keyword, body: Body) -> Self {
        Self {
            kind,
            body,
            step: MemberStep::Name,
        }
    }

    /// Accessor such as `Get` or `AddHandler`, whose keyword is its name
    pub fn accessor(kind: Keyword) -> Self {
        Self {
            kind,
            body: Body::Statements,
            step: MemberStep::AfterName,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParameterStep {
    Start,
    AfterName,
}

/// Accessor list of a property or custom event
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Accessors {
    pub owner: Keyword,
    pub step: LineStep,
    pub seen_accessor: bool,
}

impl Accessors {
    pub fn new(owner: Keyword) -> Self {
        Self {
            owner,
            step: LineStep::Start,
            seen_accessor: false,
        }
    }

    pub fn accepts(&self, keyword: Keyword) -> bool {
        match self.owner {
            Keyword::Property => matches!(keyword, Keyword::Get | Keyword::Set),
            _ => matches!(
                keyword,
                Keyword::AddHandler | Keyword::RemoveHandler | Keyword::RaiseEvent
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EnumStep {
    Start,
    AfterName,
    AfterEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DeclaratorStep {
    Name,
    AfterName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementsStep {
    Start,
    AfterStatement,
    AfterEnd,
    /// Skipping the rest of a malformed statement
    Skip,
}

/// A statement list ended by `End <closing>` or by one of `stops`, which
/// the enclosing block handles
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Statements {
    pub closing: Option<Keyword>,
    pub stops: &'static [Keyword],
    /// Statements of a single-line `If`, ended by the line end
    pub single_line: bool,
    pub step: StatementsStep,
}

impl Statements {
    pub fn block(closing: Keyword, stops: &'static [Keyword]) -> Self {
        Self {
            closing: Some(closing),
            stops,
            single_line: false,
            step: StatementsStep::Start,
        }
    }

    pub fn until(stops: &'static [Keyword]) -> Self {
        Self {
            closing: None,
            stops,
            single_line: false,
            step: StatementsStep::Start,
        }
    }

    pub fn single_line(stops: &'static [Keyword]) -> Self {
        Self {
            closing: None,
            stops,
            single_line: true,
            step: StatementsStep::Start,
        }
    }

    pub fn stops_at(&self, kind: TokenKind) -> bool {
        kind.keyword().is_some_and(|k| self.stops.contains(&k))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementStep {
    Start,
    /// Body of a single-line `Sub` lambda
    LambdaBody,
    AfterReDim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum IfStep {
    Condition,
    Then,
    AfterThen,
    Body,
    AfterElse,
    SingleLineBody,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SelectStep {
    AfterSelect,
    Subject,
    Clauses,
    AfterEnd,
    CaseItems,
    CaseRelation,
    AfterCaseItem,
    CaseBody,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoopStep {
    Head,
    /// `As`, `=` and `,` after a `Using` resource
    UsingTail,
    BodyStart,
    Body,
}

/// While, With, SyncLock and Using blocks: a head expression and a body
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LoopBlock {
    pub kind: Keyword,
    pub step: LoopStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DoStep {
    Head,
    BodyStart,
    Body,
    Tail,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ForStep {
    Head,
    Control,
    Body,
    NextVariables,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TryStep {
    BodyStart,
    Body,
    CatchHead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ListStep {
    Item,
    AfterItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ExpressionStep {
    Operand,
    Postfix,
    MemberName,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Expression {
    pub step: ExpressionStep,
    /// At least one token has been consumed
    pub started: bool,
    /// A line end before the first operand is an implicit continuation
    pub continued: bool,
}

impl Expression {
    pub fn new() -> Self {
        Self {
            step: ExpressionStep::Operand,
            started: false,
            continued: false,
        }
    }

    /// Expression following `=`, `(`, `,` or another token after which a
    /// line break is allowed
    pub fn continued() -> Self {
        Self {
            continued: true,
            ..Self::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum GroupStep {
    Start,
    AfterItem,
}

/// Comma-separated expressions up to `close`; the opener is consumed
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Group {
    pub close: TokenKind,
    pub step: GroupStep,
}

impl Group {
    pub fn parens() -> Self {
        Self {
            close: TokenKind::CloseParenthesis,
            step: GroupStep::Start,
        }
    }

    pub fn braces() -> Self {
        Self {
            close: TokenKind::CloseCurlyBrace,
            step: GroupStep::Start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NewStep {
    Type,
    AfterType,
    AfterArguments,
    /// After `With` or `From`, expecting `{`
    Initializer,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LambdaStep {
    Parameters,
    AfterParameters,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Lambda {
    pub kind: Keyword,
    pub step: LambdaStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum QueryStep {
    RangeVariable,
    AfterRangeVariable,
    Clauses,
    OrderBy,
    GroupHead,
    SkipOrTake,
    /// Line end seen; a query clause keyword continues the query
    MaybeContinued,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Query {
    pub step: QueryStep,
    /// Clause whose items a `,` continues
    pub clause: Keyword,
}

impl Query {
    pub fn new(clause: Keyword) -> Self {
        Self {
            step: QueryStep::RangeVariable,
            clause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum XmlNamespaceStep {
    Open,
    Prefix,
    Close,
}

/// Mirrors the scanner's XML mode state over the XML tokens it produced
#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct XmlLiteral {
    pub level: i32,
    pub in_tag: bool,
    pub in_close_tag: bool,
    pub was_comment: bool,
    pub was_processing_instruction: bool,
    pub in_embedded_expression: bool,
    pub started: bool,
}

impl XmlLiteral {
    pub fn new(single_tag: bool) -> Self {
        Self {
            level: if single_tag { -1 } else { 0 },
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.started
            && self.level <= 0
            && !self.in_tag
            && !self.in_close_tag
            && !self.was_comment
            && !self.was_processing_instruction
            && !self.in_embedded_expression
    }
}

impl Frame {
    /// Context opened by this frame, if any
    pub fn context(&self) -> Option<Context> {
        match self {
            Frame::Declarations(d) => Some(match d.scope {
                Scope::Type(_) => Context::Type,
                _ => Context::Global,
            }),
            Frame::EnumBody(_) => Some(Context::Type),
            Frame::Member(_) | Frame::Accessors(_) => Some(Context::Member),
            Frame::Statements(_) => Some(Context::Body),
            Frame::Attribute(_) => Some(Context::Attribute),
            Frame::Xml(_) => Some(Context::Xml),
            _ => None,
        }
    }

    /// Keyword that closes this frame after `End`
    pub fn closing(&self) -> Option<Keyword> {
        match self {
            Frame::Declarations(d) => d.closing(),
            Frame::Statements(s) => s.closing,
            Frame::EnumBody(_) => Some(Keyword::Enum),
            Frame::Accessors(a) => Some(a.owner),
            _ => None,
        }
    }

    /// Frames that read statements or declarations line by line
    pub fn is_statement_list(&self) -> bool {
        matches!(
            self,
            Frame::Sentinel
                | Frame::Declarations(_)
                | Frame::Statements(_)
                | Frame::EnumBody(_)
                | Frame::Accessors(_)
        )
    }

    /// Puts a statement list back at the start of a line
    pub fn restart_line(&mut self) {
        match self {
            Frame::Declarations(d) => {
                d.step = LineStep::Start;
                d.no_body = false;
                d.custom = false;
            }
            Frame::Statements(s) => s.step = StatementsStep::Start,
            Frame::EnumBody(step) => *step = EnumStep::Start,
            Frame::Accessors(a) => a.step = LineStep::Start,
            _ => {}
        }
    }

    /// Whether the frame waits for the name being declared
    pub fn expects_declared_name(&self) -> bool {
        matches!(
            self,
            Frame::Declarators(DeclaratorStep::Name)
                | Frame::Parameters(ParameterStep::Start)
                | Frame::Member(Member {
                    step: MemberStep::Name,
                    ..
                })
                | Frame::Query(Query {
                    step: QueryStep::RangeVariable,
                    ..
                })
        )
    }

    /// Flags describing how the next token should be lexed while this frame
    /// waits on top of the stack
    pub fn waiting_flags(&self) -> ClassifierFlags {
        let mut flags = ClassifierFlags::default();
        match self {
            Frame::Expression(e) => match e.step {
                ExpressionStep::Operand => flags.potential_xml_start = true,
                ExpressionStep::MemberName => flags.imports_or_access_start = true,
                ExpressionStep::Postfix => {}
            },
            Frame::Group(Group {
                step: GroupStep::Start,
                ..
            })
            | Frame::OptionalExpression
            | Frame::Statement(StatementStep::LambdaBody)
            | Frame::Lambda(Lambda {
                step: LambdaStep::AfterParameters,
                ..
            })
            | Frame::Select(SelectStep::CaseItems) => flags.potential_xml_start = true,
            Frame::Imports(ImportsStep::Start) => flags.imports_or_access_start = true,
            Frame::GetXmlNamespace(XmlNamespaceStep::Prefix) => flags.read_xml_identifier = true,
            _ => {}
        }
        flags
    }
}

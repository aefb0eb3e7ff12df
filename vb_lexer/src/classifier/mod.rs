//! Lookahead expression classifier
//!
//! The scanner cannot tell from characters alone whether `<` starts an XML
//! literal or is a comparison. The classifier follows the token stream
//! through a pushdown automaton over a coarse VB grammar and tells the
//! scanner, before every token, how the next one should be lexed:
//!
//! - `potential_xml_start`: an operand may start here, so `<` opens XML
//! - `read_xml_identifier`: the next name is an XML name (`GetXmlNamespace(`)
//! - `imports_or_access_start`: an XML literal here is a single tag
//!   (`Imports <xmlns:...>`, `x.<child>`)
//!
//! The automaton never fails. Unexpected tokens are recorded as
//! [`ClassifierError`]s and the stack recovers at the next statement.
//! It also tracks the innermost [`Block`] and its [`Context`], which is what
//! completion-style consumers ask for.

mod automaton;
mod declarations;
mod expressions;
mod frames;
mod statements;

use std::fmt;

use serde::Serialize;

use crate::logging::codes::{self, Code};
use crate::tokens::{Token, TokenKind};
use crate::utils::Location;

use frames::Frame;

/// Lexing hints for the next token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifierFlags {
    pub potential_xml_start: bool,
    pub read_xml_identifier: bool,
    pub imports_or_access_start: bool,
}

/// A token observer that steers the scanner.
///
/// `inform(Some(token))` feeds the token just produced; `inform(None)`
/// asks for the flags that apply to the next token without consuming one.
pub trait LookaheadClassifier {
    fn inform(&mut self, token: Option<&Token>) -> ClassifierFlags;

    fn errors(&self) -> &[ClassifierError];
}

/// Kind of syntactic region the classifier is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Context {
    Global,
    Type,
    Member,
    Body,
    Attribute,
    Xml,
    IdentifierExpected,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Context::Global => "global",
            Context::Type => "type",
            Context::Member => "member",
            Context::Body => "body",
            Context::Attribute => "attribute",
            Context::Xml => "XML",
            Context::IdentifierExpected => "identifier",
        };
        f.write_str(name)
    }
}

/// A region opened by a declaration, body, attribute or XML literal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub context: Context,
    /// Where the most recent expression in this block started
    pub last_expression_start: Option<Location>,
}

impl Block {
    fn new(context: Context) -> Self {
        Self {
            context,
            last_expression_start: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassifierErrorKind {
    /// The token does not fit the production on top of the stack
    UnexpectedToken,
    /// Frame depth or epsilon step limit reached; the token was dropped
    LimitExceeded,
}

/// A token the classifier could not place. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierError {
    pub location: Location,
    pub found: TokenKind,
    pub context: Context,
    pub kind: ClassifierErrorKind,
}

impl ClassifierError {
    pub fn code(&self) -> Code {
        match self.kind {
            ClassifierErrorKind::UnexpectedToken => codes::classifier::UNEXPECTED_TOKEN,
            ClassifierErrorKind::LimitExceeded => codes::classifier::LIMIT_EXCEEDED,
        }
    }
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ClassifierErrorKind::UnexpectedToken => write!(
                f,
                "{}: unexpected {} in {} context",
                self.location, self.found, self.context
            ),
            ClassifierErrorKind::LimitExceeded => write!(
                f,
                "{}: classifier limit exceeded at {}",
                self.location, self.found
            ),
        }
    }
}

/// Pushdown automaton over the statement and expression grammar
#[derive(Debug)]
pub struct ExpressionClassifier {
    stack: Vec<Frame>,
    blocks: Vec<Block>,
    errors: Vec<ClassifierError>,
    /// `End <keyword>` that did not close the top frame; frames pop until
    /// one it closes
    pending_end: Option<crate::tokens::Keyword>,
    /// `Next a, b`: the `For` loop below the current one is closed too
    pending_next: bool,
    /// The current statement is over; frames pop to the nearest statement list
    end_statement: bool,
    last_location: Location,
}

impl Default for ExpressionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionClassifier {
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::Sentinel],
            blocks: Vec::new(),
            errors: Vec::new(),
            pending_end: None,
            pending_next: false,
            end_statement: false,
            last_location: Location::start(),
        }
    }

    /// Context of the next token
    pub fn context(&self) -> Context {
        if self.stack.last().is_some_and(Frame::expects_declared_name) {
            return Context::IdentifierExpected;
        }
        self.blocks
            .last()
            .map_or(Context::Global, |block| block.context)
    }

    /// Innermost open block
    pub fn current_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Number of frames on the stack, sentinel included
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl LookaheadClassifier for ExpressionClassifier {
    fn inform(&mut self, token: Option<&Token>) -> ClassifierFlags {
        self.advance(token)
    }

    fn errors(&self) -> &[ClassifierError] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::classifier::MAX_FRAME_DEPTH;
    use crate::config::LexerPreferences;
    use crate::lexical::Scanner;
    use crate::tokens::Keyword;
    use assert_matches::assert_matches;

    /// Never asks for XML, so sources lex as plain VB
    struct Plain;

    impl LookaheadClassifier for Plain {
        fn inform(&mut self, _token: Option<&Token>) -> ClassifierFlags {
            ClassifierFlags::default()
        }

        fn errors(&self) -> &[ClassifierError] {
            &[]
        }
    }

    fn preferences() -> LexerPreferences {
        LexerPreferences {
            comment_tags: Vec::new(),
            report_classifier_errors: false,
            collect_detailed_metrics: false,
        }
    }

    /// Tokens of `source` without the trailing Eol and Eof
    fn tokens(source: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> =
            Scanner::with_classifier(source, Plain, &preferences()).collect();
        assert_matches!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eof));
        assert_matches!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eol));
        tokens
    }

    fn feed(source: &str) -> (ExpressionClassifier, ClassifierFlags) {
        let mut classifier = ExpressionClassifier::new();
        let mut flags = classifier.inform(None);
        for token in tokens(source) {
            classifier.inform(Some(&token));
            flags = classifier.inform(None);
        }
        (classifier, flags)
    }

    fn flags_after(source: &str) -> ClassifierFlags {
        feed(source).1
    }

    fn classify(source: &str) -> Vec<ClassifierError> {
        let mut scanner = Scanner::with_preferences(source, &preferences());
        scanner.by_ref().for_each(drop);
        scanner.classifier_errors().to_vec()
    }

    #[test]
    fn test_operand_positions_allow_xml() {
        assert!(flags_after("Dim x =").potential_xml_start);
        assert!(flags_after("Dim x = a +").potential_xml_start);
        assert!(flags_after("Call Foo(").potential_xml_start);
        assert!(flags_after("Call Foo(a,").potential_xml_start);
        assert!(flags_after("x +=").potential_xml_start);
        assert!(flags_after("Dim ys = {").potential_xml_start);
    }

    #[test]
    fn test_after_operand_is_comparison() {
        assert!(!flags_after("Dim x = a").potential_xml_start);
        assert!(!flags_after("Sub M()\nIf a").potential_xml_start);
        assert!(!flags_after("Dim x = Foo(1)").potential_xml_start);
        assert!(!flags_after("Class C").potential_xml_start);
    }

    #[test]
    fn test_statement_keywords_allow_xml() {
        assert!(flags_after("Function F()\nReturn").potential_xml_start);
        assert!(flags_after("Sub M()\nThrow").potential_xml_start);
        assert!(flags_after("Sub M()\nSelect Case x\nCase").potential_xml_start);
        assert!(flags_after("Sub M()\nIf").potential_xml_start);
        assert!(!flags_after("Sub M()\nExit").potential_xml_start);
    }

    #[test]
    fn test_member_access_and_imports() {
        let flags = flags_after("Dim x = doc.");
        assert!(flags.imports_or_access_start);
        assert!(!flags.potential_xml_start);

        assert!(flags_after("Dim x = doc...").imports_or_access_start);
        assert!(flags_after("Imports").imports_or_access_start);
        assert!(flags_after("Imports System,").imports_or_access_start);
        assert!(!flags_after("Imports System").imports_or_access_start);
    }

    #[test]
    fn test_xml_namespace_prefix() {
        assert!(flags_after("Dim ns = GetXmlNamespace(").read_xml_identifier);
        assert!(!flags_after("Dim ns = GetXmlNamespace(p").read_xml_identifier);
        assert!(!flags_after("Dim ns = GetXmlNamespace(p)").potential_xml_start);
    }

    #[test]
    fn test_query_clauses_allow_xml() {
        assert!(flags_after("Dim q = From c In").potential_xml_start);
        assert!(flags_after("Dim q = From c In cs Where").potential_xml_start);
        assert!(flags_after("Dim q = From c In cs Select").potential_xml_start);
        assert!(flags_after("Dim q = From c In cs Order By").potential_xml_start);
        assert!(!flags_after("Dim q = From").potential_xml_start);
    }

    #[test]
    fn test_lambda_bodies_allow_xml() {
        assert!(flags_after("Dim f = Function(x)").potential_xml_start);
        assert!(flags_after("Dim f = Sub()").potential_xml_start);
        assert!(!flags_after("Dim f = Function(x) As").potential_xml_start);
    }

    #[test]
    fn test_contexts() {
        assert_eq!(feed("").0.context(), Context::Global);
        assert_eq!(feed("Class C").0.context(), Context::Type);
        assert_eq!(feed("Class C\nSub M()").0.context(), Context::Member);
        assert_eq!(feed("Class C\nSub M()\nx").0.context(), Context::Body);
        assert_eq!(feed("Class C\nSub M()\nDim").0.context(), Context::IdentifierExpected);
        assert_eq!(feed("<Obsolete").0.context(), Context::Attribute);
        assert_eq!(feed("<Obsolete>").0.context(), Context::Global);
        assert_eq!(feed("Class C\nSub M()\nEnd Sub\nEnd Class").0.context(), Context::Global);
    }

    #[test]
    fn test_last_expression_start() {
        let (classifier, _) = feed("Function F()\nReturn a + b");
        let block = classifier.current_block().unwrap();
        assert_eq!(block.context, Context::Body);
        assert_eq!(block.last_expression_start, Some(Location::new(2, 8)));
    }

    #[test]
    fn test_unexpected_token_recovers() {
        let (classifier, flags) = feed("Class C\n)\nFunction F()\nReturn");
        let errors = classifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].found, TokenKind::CloseParenthesis);
        assert_eq!(errors[0].context, Context::Type);
        assert_eq!(errors[0].kind, ClassifierErrorKind::UnexpectedToken);
        assert_eq!(errors[0].code(), codes::classifier::UNEXPECTED_TOKEN);
        assert!(flags.potential_xml_start);
    }

    #[test]
    fn test_mismatched_end_unwinds() {
        let (classifier, flags) = feed("Class C\nSub M()\nIf a Then\nEnd Sub\nEnd Class\nDim x =");
        assert_eq!(classifier.errors().len(), 1);
        assert_eq!(classifier.errors()[0].found, TokenKind::Keyword(Keyword::Sub));
        assert_eq!(classifier.context(), Context::Global);
        assert!(flags.potential_xml_start);
    }

    #[test]
    fn test_next_with_more_variables_than_loops() {
        let (classifier, flags) = feed("Sub M()\nFor i = 0 To 1\nNext i, j\nDim x =");
        assert_eq!(classifier.context(), Context::Body);
        assert!(flags.potential_xml_start);
    }

    #[test]
    fn test_eof_resets_stack() {
        let mut classifier = ExpressionClassifier::new();
        for token in tokens("Class C\nSub M()\nDim x = (a") {
            classifier.inform(Some(&token));
        }
        assert!(classifier.depth() > 4);

        let eof = Token::symbol(TokenKind::Eof, Location::new(3, 11), Location::new(3, 11));
        classifier.inform(Some(&eof));
        classifier.inform(None);
        assert_eq!(classifier.depth(), 2);
        assert_eq!(classifier.context(), Context::Global);
        assert!(classifier.errors().is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let source = format!("Dim x = {}", "(".repeat(MAX_FRAME_DEPTH + 8));
        let (classifier, _) = feed(&source);
        assert!(classifier.depth() <= MAX_FRAME_DEPTH);
        assert!(classifier
            .errors()
            .iter()
            .any(|e| e.kind == ClassifierErrorKind::LimitExceeded && e.code() == codes::classifier::LIMIT_EXCEEDED));
    }

    #[test]
    fn test_xml_literal_classifies_cleanly() {
        assert!(classify("Dim a = <x><%= y %></x>\n").is_empty());
        assert!(classify("Dim a = <x a=\"1\"><!-- c --><y/></x>\n").is_empty());
        assert!(classify("Dim d = <?xml version=\"1.0\"?>\n<root/>\n").is_empty());
        assert!(classify("Dim b = doc.<child>.Value\n").is_empty());
    }

    #[test]
    fn test_property_accessors_classify_cleanly() {
        let source = "Class C\nProperty P As XElement\nGet\nReturn <g/>\nEnd Get\nSet(value As XElement)\nx = value\nEnd Set\nEnd Property\nEnd Class\n";
        assert!(classify(source).is_empty());
        assert_eq!(feed("Class C\nProperty P As Integer\nSet(value As Integer)\nx =").0.context(), Context::Body);
    }

    #[test]
    fn test_program_classifies_cleanly() {
        let source = r#"Imports System
Imports <xmlns:ns="http://example.com">

Namespace Demo
    <Serializable>
    Public Class Customer
        Inherits Base
        Private _name As String = "x"
        Public Property Id As Integer
        Public Property Name As String
            Get
                Return _name
            End Get
            Set(value As String)
                _name = value
            End Set
        End Property

        Public Event Changed As EventHandler

        Public Function Render(ByVal items As List(Of String), Optional n As Integer = 0) As XElement
            Dim doc = <root>
                          <%= From i In items Where i <> "" Select <item><%= i %></item> %>
                      </root>
            If n < 3 Then
                n += 1
            ElseIf n > 10 Then
                n = 0
            Else
                n = -n
            End If
            For i As Integer = 0 To n Step 2
                Console.WriteLine(i)
            Next
            For Each item In items
                If item Is Nothing Then Continue For
            Next item
            Select Case n
                Case 1, 2 To 4
                    n = 5
                Case Is > 8
                    n = 6
                Case Else
                    Exit Select
            End Select
            Do While n < 5
                n = n + 1
            Loop
            Try
                Throw New InvalidOperationException("bad")
            Catch ex As Exception When n > 0
                Console.WriteLine(ex.Message)
            Finally
                n = 0
            End Try
            Using reader As New StringReader("a"), other = Open()
                reader.Read()
            End Using
            Dim f = Function(x As Integer) x * 2
            Dim g = Sub(x)
                        Console.WriteLine(x)
                    End Sub
            Dim h = New List(Of Integer) From {1, 2, 3}
            Dim q = From c In items
                    Where c.Length > 1
                    Order By c Descending
                    Select c
            Return doc
        End Function
    End Class

    Public Enum Color As Byte
        Red = 1
        Green
    End Enum
End Namespace
"#;
        assert_eq!(classify(source), Vec::new());
    }
}

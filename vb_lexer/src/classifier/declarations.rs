//! Declaration-level productions: namespaces, types, members, parameters,
//! attributes, `Imports` and field declarators

use super::automaton::{is_block_keyword, is_member_name, is_name};
use super::frames::{
    Accessors, Action, AttributeStep, Body, DeclaratorStep, Declarations, EnumStep, Expression, Flow, Frame,
    Group, ImportsStep, LineStep, Member, MemberStep, NewStep, ParameterStep, Scope, StatementStep, Statements,
    TypeNameStep, XmlLiteral,
};
use super::ExpressionClassifier;
use crate::tokens::{Keyword, Token, TokenKind};

impl ExpressionClassifier {
    pub(super) fn declarations(&mut self, d: &mut Declarations, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        if d.step == LineStep::AfterEnd {
            d.step = LineStep::Start;
            return match t.kind.keyword() {
                Some(keyword) if d.closing() == Some(keyword) => Flow::Consumed(Action::Pop),
                Some(keyword) if is_block_keyword(keyword) => {
                    self.unexpected(t);
                    self.close_mismatched(keyword);
                    Flow::pop()
                }
                // `End` statement
                _ => Flow::push(Frame::RestOfLine),
            };
        }

        let keyword = match t.kind {
            TokenKind::Eol | TokenKind::Colon => {
                d.no_body = false;
                d.custom = false;
                return Flow::consume();
            }
            TokenKind::LessThan => return Flow::consume_push(Frame::Attribute(AttributeStep::Start)),
            TokenKind::Keyword(keyword) => keyword,
            _ => return self.stray_declaration(d, t),
        };

        let interface = d.in_interface();
        match keyword {
            Keyword::Option | Keyword::Inherits | Keyword::Implements => Flow::consume_push(Frame::RestOfLine),
            Keyword::Imports => Flow::consume_push(Frame::Imports(ImportsStep::Start)),
            Keyword::Namespace => Flow::Consumed(Action::PushBoth(
                Frame::Declarations(Declarations::new(Scope::Namespace)),
                Frame::RestOfLine,
            )),
            Keyword::Class | Keyword::Module | Keyword::Structure | Keyword::Interface => {
                Flow::Consumed(Action::PushBoth(
                    Frame::Declarations(Declarations::new(Scope::Type(keyword))),
                    Frame::RestOfLine,
                ))
            }
            Keyword::Enum => Flow::Consumed(Action::PushBoth(Frame::EnumBody(EnumStep::Start), Frame::RestOfLine)),
            Keyword::Delegate | Keyword::Declare | Keyword::MustOverride => {
                d.no_body = true;
                Flow::consume()
            }
            Keyword::Custom => {
                d.custom = true;
                Flow::consume()
            }
            Keyword::Ansi | Keyword::Unicode | Keyword::Auto => Flow::consume(),
            Keyword::Sub | Keyword::Function | Keyword::Operator => {
                let body = if d.no_body || interface { Body::None } else { Body::Statements };
                Flow::consume_push(Frame::Member(Member::new(keyword, body)))
            }
            Keyword::Property => {
                let body = if d.no_body || interface { Body::None } else { Body::Accessors };
                Flow::consume_push(Frame::Member(Member::new(keyword, body)))
            }
            Keyword::Event => {
                let body = if d.custom { Body::Accessors } else { Body::None };
                Flow::consume_push(Frame::Member(Member::new(keyword, body)))
            }
            Keyword::Dim | Keyword::Const => Flow::consume_push(Frame::Declarators(DeclaratorStep::Name)),
            Keyword::End => {
                d.step = LineStep::AfterEnd;
                Flow::consume()
            }
            modifier if modifier.is_modifier() => Flow::consume(),
            _ => self.stray_declaration(d, t),
        }
    }

    /// A token that starts no declaration. Top-level code is read as
    /// statements; inside types names start fields.
    fn stray_declaration(&mut self, d: &Declarations, t: &Token) -> Flow {
        match d.scope {
            Scope::CompilationUnit => Flow::push(Frame::Statement(StatementStep::Start)),
            _ if is_name(t.kind) => Flow::push(Frame::Declarators(DeclaratorStep::Name)),
            _ => {
                self.unexpected(t);
                Flow::consume_push(Frame::RestOfLine)
            }
        }
    }

    pub(super) fn attribute(&mut self, step: &mut AttributeStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match (*step, t.kind) {
            (_, TokenKind::GreaterThan) => Flow::Consumed(Action::Pop),
            (_, TokenKind::Eol) => Flow::consume(),
            (AttributeStep::Start, TokenKind::Comma) => Flow::consume(),
            (AttributeStep::Start, kind) if is_member_name(kind) => {
                *step = AttributeStep::AfterName;
                Flow::consume()
            }
            (AttributeStep::AfterName, TokenKind::Colon | TokenKind::Dot | TokenKind::Comma) => {
                *step = AttributeStep::Start;
                Flow::consume()
            }
            (AttributeStep::AfterName, TokenKind::OpenParenthesis) => Flow::consume_push(Frame::Group(Group::parens())),
            _ => {
                self.unexpected(t);
                Flow::consume()
            }
        }
    }

    pub(super) fn imports(&mut self, step: &mut ImportsStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        if t.kind.is_terminator() {
            return Flow::pop();
        }
        match (*step, t.kind) {
            (ImportsStep::Start, TokenKind::XmlOpenTag) => {
                *step = ImportsStep::AfterName;
                Flow::push(Frame::Xml(XmlLiteral::new(true)))
            }
            (ImportsStep::Start, kind) if is_member_name(kind) => {
                *step = ImportsStep::AfterName;
                Flow::consume()
            }
            (ImportsStep::AfterName, TokenKind::Dot | TokenKind::Assign | TokenKind::Comma) => {
                *step = ImportsStep::Start;
                Flow::consume()
            }
            (ImportsStep::AfterName, TokenKind::OpenParenthesis) => {
                Flow::consume_push(Frame::SkipParens { depth: 1 })
            }
            _ => {
                self.unexpected(t);
                Flow::consume()
            }
        }
    }

    pub(super) fn type_name(&mut self, step: &mut TypeNameStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match (*step, t.kind) {
            (TypeNameStep::Start, TokenKind::Keyword(Keyword::New)) => {
                Flow::Consumed(Action::Replace(Frame::New(NewStep::Type)))
            }
            (TypeNameStep::Start, TokenKind::LessThan) => {
                Flow::consume_push(Frame::Attribute(AttributeStep::Start))
            }
            (TypeNameStep::Start, kind) if is_member_name(kind) => {
                *step = TypeNameStep::AfterName;
                Flow::consume()
            }
            (TypeNameStep::Start, _) => {
                self.unexpected(t);
                Flow::pop()
            }
            (TypeNameStep::AfterName, TokenKind::Dot) => {
                *step = TypeNameStep::Start;
                Flow::consume()
            }
            (TypeNameStep::AfterName, TokenKind::OpenParenthesis) => {
                Flow::consume_push(Frame::SkipParens { depth: 1 })
            }
            (TypeNameStep::AfterName, TokenKind::QuestionMark) => Flow::consume(),
            (TypeNameStep::AfterName, _) => Flow::pop(),
        }
    }

    pub(super) fn member(&mut self, member: &mut Member, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match member.step {
            MemberStep::Name => {
                member.step = MemberStep::AfterName;
                if t.kind.is_terminator() {
                    self.unexpected(t);
                    Flow::retry()
                } else {
                    Flow::consume()
                }
            }
            MemberStep::OpenParen => {
                member.step = MemberStep::AfterName;
                match t.kind {
                    TokenKind::Keyword(Keyword::Of) => Flow::consume_push(Frame::SkipParens { depth: 1 }),
                    TokenKind::CloseParenthesis => Flow::consume(),
                    _ => Flow::push(Frame::Parameters(ParameterStep::Start)),
                }
            }
            MemberStep::Clause => match t.kind {
                TokenKind::Dot | TokenKind::Comma => Flow::consume(),
                kind if is_member_name(kind) => Flow::consume(),
                _ => {
                    member.step = MemberStep::AfterName;
                    Flow::retry()
                }
            },
            MemberStep::AfterName => match t.kind {
                TokenKind::OpenParenthesis => {
                    member.step = MemberStep::OpenParen;
                    Flow::consume()
                }
                TokenKind::Keyword(Keyword::As) => {
                    Flow::consume_push(Frame::TypeName(TypeNameStep::Start))
                }
                TokenKind::Keyword(Keyword::Lib | Keyword::Alias) | TokenKind::LiteralString => Flow::consume(),
                TokenKind::Keyword(Keyword::Handles | Keyword::Implements) => {
                    member.step = MemberStep::Clause;
                    Flow::consume()
                }
                // Property initializer
                TokenKind::Assign => Flow::consume_push(Frame::Expression(Expression::continued())),
                TokenKind::Eol | TokenKind::Colon => match member.body {
                    Body::None => Flow::pop(),
                    Body::Statements => Flow::replace(Frame::Statements(Statements::block(member.kind, &[]))),
                    Body::Accessors => Flow::replace(Frame::Accessors(Accessors::new(member.kind))),
                },
                _ => {
                    self.unexpected(t);
                    Flow::consume()
                }
            },
        }
    }

    pub(super) fn parameters(&mut self, step: &mut ParameterStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match (*step, t.kind) {
            (_, TokenKind::CloseParenthesis) => Flow::Consumed(Action::Pop),
            (_, TokenKind::Eol) => Flow::consume(),
            (ParameterStep::Start, TokenKind::Comma) => Flow::consume(),
            (ParameterStep::Start, TokenKind::LessThan) => {
                Flow::consume_push(Frame::Attribute(AttributeStep::Start))
            }
            (
                ParameterStep::Start,
                TokenKind::Keyword(Keyword::Optional | Keyword::ByVal | Keyword::ByRef | Keyword::ParamArray),
            ) => Flow::consume(),
            (ParameterStep::Start, kind) if is_member_name(kind) => {
                *step = ParameterStep::AfterName;
                Flow::consume()
            }
            (ParameterStep::AfterName, TokenKind::OpenParenthesis) => {
                Flow::consume_push(Frame::SkipParens { depth: 1 })
            }
            (ParameterStep::AfterName, TokenKind::QuestionMark) => Flow::consume(),
            (ParameterStep::AfterName, TokenKind::Keyword(Keyword::As)) => {
                Flow::consume_push(Frame::TypeName(TypeNameStep::Start))
            }
            (ParameterStep::AfterName, TokenKind::Assign) => {
                Flow::consume_push(Frame::Expression(Expression::continued()))
            }
            (ParameterStep::AfterName, TokenKind::Comma) => {
                *step = ParameterStep::Start;
                Flow::consume()
            }
            (_, TokenKind::Colon) => {
                self.unexpected(t);
                Flow::pop()
            }
            _ => {
                self.unexpected(t);
                Flow::consume()
            }
        }
    }

    pub(super) fn accessors(&mut self, accessors: &mut Accessors, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        if accessors.step == LineStep::AfterEnd {
            accessors.step = LineStep::Start;
            return match t.kind.keyword() {
                Some(keyword) if keyword == accessors.owner => Flow::Consumed(Action::Pop),
                Some(keyword) if is_block_keyword(keyword) => {
                    // `End Class` right after an auto-property is fine
                    if accessors.seen_accessor {
                        self.unexpected(t);
                    }
                    self.close_mismatched(keyword);
                    Flow::pop()
                }
                _ => {
                    self.unexpected(t);
                    Flow::retry()
                }
            };
        }

        match t.kind {
            TokenKind::Eol | TokenKind::Colon => Flow::consume(),
            TokenKind::LessThan => Flow::consume_push(Frame::Attribute(AttributeStep::Start)),
            TokenKind::Keyword(Keyword::End) => {
                accessors.step = LineStep::AfterEnd;
                Flow::consume()
            }
            TokenKind::Keyword(keyword) if accessors.accepts(keyword) => {
                accessors.seen_accessor = true;
                Flow::consume_push(Frame::Member(Member::accessor(keyword)))
            }
            TokenKind::Keyword(
                Keyword::Public | Keyword::Private | Keyword::Protected | Keyword::Friend,
            ) => Flow::consume(),
            // Auto-property or field event: the next declaration has begun
            _ if !accessors.seen_accessor => Flow::pop(),
            _ => {
                self.unexpected(t);
                Flow::consume_push(Frame::RestOfLine)
            }
        }
    }

    pub(super) fn enum_body(&mut self, step: &mut EnumStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match (*step, t.kind) {
            (EnumStep::AfterEnd, kind) => {
                *step = EnumStep::Start;
                match kind.keyword() {
                    Some(Keyword::Enum) => Flow::Consumed(Action::Pop),
                    Some(keyword) if is_block_keyword(keyword) => {
                        self.unexpected(t);
                        self.close_mismatched(keyword);
                        Flow::pop()
                    }
                    _ => {
                        self.unexpected(t);
                        Flow::retry()
                    }
                }
            }
            (_, TokenKind::Eol | TokenKind::Colon) => {
                *step = EnumStep::Start;
                Flow::consume()
            }
            (EnumStep::Start, TokenKind::LessThan) => Flow::consume_push(Frame::Attribute(AttributeStep::Start)),
            (EnumStep::Start, TokenKind::Keyword(Keyword::End)) => {
                *step = EnumStep::AfterEnd;
                Flow::consume()
            }
            (EnumStep::Start, kind) if is_member_name(kind) => {
                *step = EnumStep::AfterName;
                Flow::consume()
            }
            (EnumStep::AfterName, TokenKind::Assign) => {
                Flow::consume_push(Frame::Expression(Expression::continued()))
            }
            _ => {
                self.unexpected(t);
                Flow::consume_push(Frame::RestOfLine)
            }
        }
    }

    pub(super) fn declarators(&mut self, step: &mut DeclaratorStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match (*step, t.kind) {
            (DeclaratorStep::Name, TokenKind::Eol) => Flow::consume(),
            (DeclaratorStep::Name, TokenKind::Keyword(keyword)) if keyword.is_modifier() => Flow::consume(),
            (DeclaratorStep::Name, kind) if is_name(kind) => {
                *step = DeclaratorStep::AfterName;
                Flow::consume()
            }
            (DeclaratorStep::Name, _) => {
                self.unexpected(t);
                Flow::pop()
            }
            (DeclaratorStep::AfterName, TokenKind::QuestionMark) => Flow::consume(),
            (DeclaratorStep::AfterName, TokenKind::OpenParenthesis) => {
                Flow::consume_push(Frame::Group(Group::parens()))
            }
            (DeclaratorStep::AfterName, TokenKind::Keyword(Keyword::As)) => {
                Flow::consume_push(Frame::TypeName(TypeNameStep::Start))
            }
            (DeclaratorStep::AfterName, TokenKind::Assign) => {
                Flow::consume_push(Frame::Expression(Expression::continued()))
            }
            (DeclaratorStep::AfterName, TokenKind::Comma) => {
                *step = DeclaratorStep::Name;
                Flow::consume()
            }
            (DeclaratorStep::AfterName, _) => Flow::pop(),
        }
    }
}

//! Expression productions, including lambdas, queries and XML literals

use super::automaton::{is_member_name, is_name};
use super::frames::{
    Action, Expression, ExpressionStep, Flow, Frame, Group, GroupStep, Lambda, LambdaStep, NewStep,
    ParameterStep, Query, QueryStep, StatementStep, Statements, TypeNameStep, XmlLiteral, XmlNamespaceStep,
};
use super::ExpressionClassifier;
use crate::tokens::{Keyword, Token, TokenKind};

impl ExpressionClassifier {
    pub(super) fn expression(&mut self, e: &mut Expression, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        match e.step {
            ExpressionStep::Operand => self.operand(e, t),
            ExpressionStep::Postfix => match t.kind {
                TokenKind::Dot | TokenKind::ExclamationMark | TokenKind::DotAt | TokenKind::TripleDot => {
                    e.step = ExpressionStep::MemberName;
                    Flow::consume()
                }
                // Null-conditional access
                TokenKind::QuestionMark => Flow::consume(),
                TokenKind::OpenParenthesis => Flow::consume_push(Frame::Group(Group::parens())),
                kind if kind.is_binary_operator() || kind.is_compound_assignment() || kind == TokenKind::ColonAssign => {
                    e.step = ExpressionStep::Operand;
                    Flow::consume()
                }
                _ => Flow::pop(),
            },
            ExpressionStep::MemberName => match t.kind {
                TokenKind::XmlOpenTag => {
                    e.step = ExpressionStep::Postfix;
                    Flow::push(Frame::Xml(XmlLiteral::new(true)))
                }
                kind if is_member_name(kind) => {
                    e.step = ExpressionStep::Postfix;
                    Flow::consume()
                }
                _ => {
                    self.unexpected(t);
                    Flow::pop()
                }
            },
        }
    }

    fn operand(&mut self, e: &mut Expression, t: &Token) -> Flow {
        if t.kind == TokenKind::Eol {
            return if e.started || e.continued {
                Flow::consume()
            } else {
                self.unexpected(t);
                Flow::pop()
            };
        }

        if !e.started {
            self.expression_started(t);
        }
        e.started = true;

        let (step, flow) = match t.kind {
            TokenKind::Minus | TokenKind::Plus => (ExpressionStep::Operand, Flow::consume()),
            TokenKind::Identifier => (ExpressionStep::Postfix, Flow::consume()),
            kind if kind.is_literal() => (ExpressionStep::Postfix, Flow::consume()),
            TokenKind::OpenParenthesis => (ExpressionStep::Postfix, Flow::consume_push(Frame::Group(Group::parens()))),
            TokenKind::OpenCurlyBrace => (ExpressionStep::Postfix, Flow::consume_push(Frame::Group(Group::braces()))),
            // Member access on the `With` target
            TokenKind::Dot | TokenKind::ExclamationMark | TokenKind::DotAt | TokenKind::TripleDot => {
                (ExpressionStep::MemberName, Flow::consume())
            }
            TokenKind::XmlOpenTag
            | TokenKind::XmlProcessingInstructionStart
            | TokenKind::XmlComment
            | TokenKind::XmlCData => (ExpressionStep::Postfix, Flow::push(Frame::Xml(XmlLiteral::new(false)))),
            TokenKind::Keyword(keyword) => match keyword {
                Keyword::Not | Keyword::AddressOf | Keyword::Await | Keyword::TypeOf | Keyword::Async
                | Keyword::Iterator => (ExpressionStep::Operand, Flow::consume()),
                Keyword::New => (ExpressionStep::Postfix, Flow::consume_push(Frame::New(NewStep::Type))),
                Keyword::Sub | Keyword::Function => (
                    ExpressionStep::Postfix,
                    Flow::consume_push(Frame::Lambda(Lambda {
                        kind: keyword,
                        step: LambdaStep::Parameters,
                    })),
                ),
                Keyword::From | Keyword::Aggregate => {
                    (ExpressionStep::Postfix, Flow::consume_push(Frame::Query(Query::new(keyword))))
                }
                Keyword::GetXmlNamespace => (
                    ExpressionStep::Postfix,
                    Flow::consume_push(Frame::GetXmlNamespace(XmlNamespaceStep::Open)),
                ),
                Keyword::Me
                | Keyword::MyBase
                | Keyword::MyClass
                | Keyword::True
                | Keyword::False
                | Keyword::Nothing
                | Keyword::Global
                | Keyword::If
                | Keyword::CType
                | Keyword::DirectCast
                | Keyword::TryCast
                | Keyword::GetType => (ExpressionStep::Postfix, Flow::consume()),
                other if other.is_primitive_type() || other.is_conversion() || other.is_contextual() => {
                    (ExpressionStep::Postfix, Flow::consume())
                }
                _ => {
                    self.unexpected(t);
                    return Flow::pop();
                }
            },
            _ => {
                self.unexpected(t);
                return Flow::pop();
            }
        };
        e.step = step;
        flow
    }

    pub(super) fn group(&mut self, group: &mut Group, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        if t.kind == group.close {
            return Flow::Consumed(Action::Pop);
        }

        match (group.step, t.kind) {
            (_, TokenKind::Eol) => Flow::consume(),
            (GroupStep::Start, TokenKind::Comma) => Flow::consume(),
            // Type arguments
            (GroupStep::Start, TokenKind::Keyword(Keyword::Of)) if group.close == TokenKind::CloseParenthesis => {
                Flow::Consumed(Action::Replace(Frame::SkipParens { depth: 1 }))
            }
            (GroupStep::Start, _) => {
                group.step = GroupStep::AfterItem;
                Flow::push(Frame::Expression(Expression::continued()))
            }
            (GroupStep::AfterItem, TokenKind::Comma) => {
                group.step = GroupStep::Start;
                Flow::consume()
            }
            // Array bounds
            (GroupStep::AfterItem, TokenKind::Keyword(Keyword::To)) => {
                Flow::consume_push(Frame::Expression(Expression::continued()))
            }
            (GroupStep::AfterItem, _) => {
                self.unexpected(t);
                Flow::pop()
            }
        }
    }

    pub(super) fn new_expression(&mut self, step: &mut NewStep, token: Option<&Token>) -> Flow {
        if *step == NewStep::Done {
            return Flow::pop();
        }
        let Some(t) = token else {
            return Flow::Wait;
        };

        match (*step, t.kind) {
            (NewStep::Type, TokenKind::Keyword(Keyword::With)) => {
                *step = NewStep::Initializer;
                Flow::consume()
            }
            (NewStep::Type, kind) if is_member_name(kind) => {
                *step = NewStep::AfterType;
                Flow::consume()
            }
            (NewStep::Type, _) => {
                self.unexpected(t);
                Flow::pop()
            }
            (NewStep::AfterType, TokenKind::Dot) => {
                *step = NewStep::Type;
                Flow::consume()
            }
            (NewStep::AfterType, TokenKind::QuestionMark) => Flow::consume(),
            (NewStep::AfterType | NewStep::AfterArguments, TokenKind::OpenParenthesis) => {
                *step = NewStep::AfterArguments;
                Flow::consume_push(Frame::Group(Group::parens()))
            }
            (NewStep::AfterType | NewStep::AfterArguments | NewStep::Initializer, TokenKind::OpenCurlyBrace) => {
                *step = NewStep::Done;
                Flow::consume_push(Frame::Group(Group::braces()))
            }
            (NewStep::AfterType | NewStep::AfterArguments, TokenKind::Keyword(Keyword::With | Keyword::From)) => {
                *step = NewStep::Initializer;
                Flow::consume()
            }
            (NewStep::Initializer, TokenKind::Eol) => Flow::consume(),
            (NewStep::Initializer, _) => {
                self.unexpected(t);
                Flow::pop()
            }
            _ => Flow::pop(),
        }
    }

    pub(super) fn lambda(&mut self, lambda: &mut Lambda, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        match lambda.step {
            LambdaStep::Parameters => {
                lambda.step = LambdaStep::AfterParameters;
                if t.kind == TokenKind::OpenParenthesis {
                    Flow::consume_push(Frame::Parameters(ParameterStep::Start))
                } else {
                    Flow::retry()
                }
            }
            LambdaStep::AfterParameters => match t.kind {
                TokenKind::Keyword(Keyword::As) => Flow::consume_push(Frame::TypeName(TypeNameStep::Start)),
                TokenKind::Eol => Flow::replace(Frame::Statements(Statements::block(lambda.kind, &[]))),
                _ if lambda.kind == Keyword::Function => Flow::replace(Frame::Expression(Expression::new())),
                _ => Flow::replace(Frame::Statement(StatementStep::LambdaBody)),
            },
        }
    }

    pub(super) fn query(&mut self, query: &mut Query, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        let keyword = t.kind.keyword();

        match query.step {
            QueryStep::RangeVariable => {
                if is_name(t.kind) {
                    query.step = QueryStep::AfterRangeVariable;
                    Flow::consume()
                } else {
                    self.unexpected(t);
                    Flow::pop()
                }
            }
            QueryStep::AfterRangeVariable => match t.kind {
                TokenKind::Keyword(Keyword::As) => Flow::consume_push(Frame::TypeName(TypeNameStep::Start)),
                TokenKind::Keyword(Keyword::In) | TokenKind::Assign => {
                    query.step = QueryStep::Clauses;
                    Flow::consume_push(Frame::Expression(Expression::continued()))
                }
                _ => {
                    self.unexpected(t);
                    query.step = QueryStep::Clauses;
                    Flow::retry()
                }
            },
            QueryStep::OrderBy => {
                query.step = QueryStep::Clauses;
                if keyword == Some(Keyword::By) {
                    Flow::consume_push(Frame::Expression(Expression::continued()))
                } else {
                    self.unexpected(t);
                    Flow::retry()
                }
            }
            QueryStep::GroupHead => match keyword {
                Some(Keyword::By) => {
                    query.step = QueryStep::Clauses;
                    Flow::consume_push(Frame::Expression(Expression::continued()))
                }
                Some(Keyword::Join) => {
                    query.clause = Keyword::Join;
                    query.step = QueryStep::RangeVariable;
                    Flow::consume()
                }
                _ => {
                    query.step = QueryStep::Clauses;
                    Flow::push(Frame::Expression(Expression::continued()))
                }
            },
            QueryStep::SkipOrTake => {
                query.step = QueryStep::Clauses;
                if keyword == Some(Keyword::While) {
                    Flow::consume_push(Frame::Expression(Expression::continued()))
                } else {
                    Flow::push(Frame::Expression(Expression::continued()))
                }
            }
            QueryStep::MaybeContinued => match keyword {
                Some(k) if starts_query_clause(k) => {
                    query.step = QueryStep::Clauses;
                    Flow::retry()
                }
                _ => {
                    // The line end already consumed ended the statement
                    if !matches!(
                        t.kind,
                        TokenKind::CloseParenthesis
                            | TokenKind::CloseCurlyBrace
                            | TokenKind::XmlEndInlineVB
                            | TokenKind::Comma
                    ) {
                        self.end_current_statement();
                    }
                    Flow::pop()
                }
            },
            QueryStep::Clauses => self.query_clause(query, t),
        }
    }

    fn query_clause(&mut self, query: &mut Query, t: &Token) -> Flow {
        let keyword = match t.kind {
            TokenKind::Comma => {
                return match query.clause {
                    Keyword::From | Keyword::Join | Keyword::Aggregate | Keyword::Let => {
                        query.step = QueryStep::RangeVariable;
                        Flow::consume()
                    }
                    _ => Flow::consume_push(Frame::Expression(Expression::continued())),
                };
            }
            TokenKind::Eol => {
                query.step = QueryStep::MaybeContinued;
                return Flow::consume();
            }
            TokenKind::Keyword(keyword) => keyword,
            _ => return Flow::pop(),
        };

        match keyword {
            Keyword::Where | Keyword::On | Keyword::Equals | Keyword::By => {
                Flow::consume_push(Frame::Expression(Expression::continued()))
            }
            Keyword::Select | Keyword::Into => {
                query.clause = keyword;
                Flow::consume_push(Frame::Expression(Expression::continued()))
            }
            Keyword::Distinct | Keyword::Ascending | Keyword::Descending => Flow::consume(),
            Keyword::Skip | Keyword::Take => {
                query.step = QueryStep::SkipOrTake;
                Flow::consume()
            }
            Keyword::Let | Keyword::From | Keyword::Aggregate | Keyword::Join => {
                query.clause = keyword;
                query.step = QueryStep::RangeVariable;
                Flow::consume()
            }
            Keyword::Order => {
                query.clause = keyword;
                query.step = QueryStep::OrderBy;
                Flow::consume()
            }
            Keyword::Group => {
                query.clause = keyword;
                query.step = QueryStep::GroupHead;
                Flow::consume()
            }
            _ => Flow::pop(),
        }
    }

    pub(super) fn xml_namespace(&mut self, step: &mut XmlNamespaceStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        match (*step, t.kind) {
            (XmlNamespaceStep::Open, TokenKind::OpenParenthesis) => {
                *step = XmlNamespaceStep::Prefix;
                Flow::consume()
            }
            (XmlNamespaceStep::Prefix, kind) if is_member_name(kind) => {
                *step = XmlNamespaceStep::Close;
                Flow::consume()
            }
            (XmlNamespaceStep::Prefix | XmlNamespaceStep::Close, TokenKind::CloseParenthesis) => {
                Flow::Consumed(Action::Pop)
            }
            _ => {
                self.unexpected(t);
                Flow::pop()
            }
        }
    }

    /// Follows the XML tokens the scanner produced for one literal
    pub(super) fn xml_literal(&mut self, xml: &mut XmlLiteral, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };
        if xml.is_complete() {
            // Trailing comments still belong to the literal
            return if t.kind == TokenKind::XmlComment {
                Flow::consume()
            } else {
                Flow::pop()
            };
        }
        xml.started = true;

        match t.kind {
            TokenKind::XmlOpenTag => {
                xml.level += 1;
                xml.in_tag = true;
                xml.was_comment = false;
                xml.was_processing_instruction = false;
            }
            TokenKind::XmlOpenEndTag => xml.in_close_tag = true,
            TokenKind::XmlCloseTagEmptyElement => {
                xml.in_tag = false;
                xml.level -= 1;
            }
            TokenKind::XmlProcessingInstructionStart => xml.in_tag = true,
            TokenKind::XmlProcessingInstructionEnd => {
                xml.in_tag = false;
                xml.was_processing_instruction = true;
            }
            TokenKind::XmlCloseTag => {
                if xml.in_close_tag {
                    xml.level -= 1;
                }
                xml.in_tag = false;
                xml.in_close_tag = false;
                xml.was_comment = false;
                xml.was_processing_instruction = false;
            }
            TokenKind::XmlComment => xml.was_comment = true,
            TokenKind::XmlCData => xml.was_comment = false,
            TokenKind::XmlStartInlineVB => {
                xml.in_embedded_expression = true;
                return Flow::consume_push(Frame::Expression(Expression::new()));
            }
            TokenKind::XmlEndInlineVB if xml.in_embedded_expression => xml.in_embedded_expression = false,
            TokenKind::Identifier | TokenKind::Assign | TokenKind::LiteralString | TokenKind::XmlContent => {}
            _ => {
                self.unexpected(t);
                return Flow::pop();
            }
        }
        Flow::consume()
    }
}

/// Keywords that continue a query on a new line
fn starts_query_clause(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Where
            | Keyword::Select
            | Keyword::Distinct
            | Keyword::Skip
            | Keyword::Take
            | Keyword::Let
            | Keyword::Order
            | Keyword::Group
            | Keyword::Join
            | Keyword::Into
            | Keyword::From
            | Keyword::Aggregate
    )
}

//! Statement lists, statements and the executable blocks

use super::automaton::{is_block_keyword, is_name};
use super::frames::{
    Action, DeclaratorStep, DoStep, Expression, Flow, ForStep, Frame, IfStep, ListStep, LoopBlock, LoopStep,
    SelectStep, StatementStep, Statements, StatementsStep, TryStep, TypeNameStep,
};
use super::ExpressionClassifier;
use crate::tokens::{Keyword, Token, TokenKind};

const IF_STOPS: &[Keyword] = &[Keyword::ElseIf, Keyword::Else];

impl ExpressionClassifier {
    pub(super) fn statements(&mut self, s: &mut Statements, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        match s.step {
            StatementsStep::AfterEnd => {
                s.step = StatementsStep::AfterStatement;
                match t.kind.keyword() {
                    Some(keyword) if s.closing == Some(keyword) => Flow::Consumed(Action::Pop),
                    Some(keyword) if is_block_keyword(keyword) => {
                        self.unexpected(t);
                        self.close_mismatched(keyword);
                        Flow::pop()
                    }
                    // `End` statement
                    _ => Flow::retry(),
                }
            }
            StatementsStep::Skip => {
                if t.kind.is_terminator() {
                    s.step = StatementsStep::AfterStatement;
                    Flow::retry()
                } else {
                    Flow::consume()
                }
            }
            StatementsStep::Start | StatementsStep::AfterStatement => match t.kind {
                TokenKind::Eol if s.single_line => Flow::pop(),
                TokenKind::Eol | TokenKind::Colon => {
                    s.step = StatementsStep::Start;
                    Flow::consume()
                }
                kind if s.stops_at(kind) => Flow::pop(),
                TokenKind::Keyword(Keyword::EndIf) if s.closing == Some(Keyword::If) => Flow::Consumed(Action::Pop),
                _ if s.step == StatementsStep::AfterStatement => {
                    self.unexpected(t);
                    s.step = StatementsStep::Skip;
                    Flow::consume()
                }
                TokenKind::Keyword(Keyword::End) => {
                    s.step = StatementsStep::AfterEnd;
                    Flow::consume()
                }
                _ => {
                    s.step = StatementsStep::AfterStatement;
                    Flow::push(Frame::Statement(StatementStep::Start))
                }
            },
        }
    }

    pub(super) fn statement(&mut self, step: &mut StatementStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        if *step == StatementStep::AfterReDim {
            return match t.kind {
                TokenKind::Keyword(Keyword::Preserve) => Flow::consume(),
                _ => Flow::replace(Frame::ExpressionList(ListStep::Item)),
            };
        }

        let TokenKind::Keyword(keyword) = t.kind else {
            return Flow::replace(Frame::Expression(Expression::new()));
        };

        let next = match keyword {
            Keyword::Dim | Keyword::Const | Keyword::Static => Frame::Declarators(DeclaratorStep::Name),
            Keyword::If => Frame::If(IfStep::Condition),
            Keyword::Select => Frame::Select(SelectStep::AfterSelect),
            Keyword::While | Keyword::With | Keyword::SyncLock | Keyword::Using => Frame::Loop(LoopBlock {
                kind: keyword,
                step: LoopStep::Head,
            }),
            Keyword::Do => Frame::Do(DoStep::Head),
            Keyword::For => Frame::For(ForStep::Head),
            Keyword::Try => Frame::Try(TryStep::BodyStart),
            Keyword::Return | Keyword::Throw | Keyword::Yield => Frame::OptionalExpression,
            Keyword::Exit
            | Keyword::Continue
            | Keyword::GoTo
            | Keyword::GoSub
            | Keyword::Resume
            | Keyword::Stop
            | Keyword::On => Frame::RestOfLine,
            Keyword::Error => Frame::Expression(Expression::new()),
            Keyword::ReDim => {
                *step = StatementStep::AfterReDim;
                return Flow::consume();
            }
            Keyword::Erase
            | Keyword::AddHandler
            | Keyword::RemoveHandler
            | Keyword::RaiseEvent
            | Keyword::Call => Frame::ExpressionList(ListStep::Item),
            Keyword::Else
            | Keyword::ElseIf
            | Keyword::EndIf
            | Keyword::Case
            | Keyword::Catch
            | Keyword::Finally
            | Keyword::Loop
            | Keyword::Next
            | Keyword::Wend
            | Keyword::Class
            | Keyword::Module
            | Keyword::Structure
            | Keyword::Interface
            | Keyword::Namespace
            | Keyword::Enum
            | Keyword::Property
            | Keyword::Event
            | Keyword::Operator
            | Keyword::Imports
            | Keyword::Inherits
            | Keyword::Implements => {
                self.unexpected(t);
                Frame::RestOfLine
            }
            // Member headers cannot appear in bodies; lambdas start expressions
            Keyword::Sub | Keyword::Function if *step == StatementStep::Start => {
                self.unexpected(t);
                Frame::RestOfLine
            }
            _ => return Flow::replace(Frame::Expression(Expression::new())),
        };
        Flow::Consumed(Action::Replace(next))
    }

    pub(super) fn if_block(&mut self, step: &mut IfStep, token: Option<&Token>) -> Flow {
        match *step {
            IfStep::Condition => {
                *step = IfStep::Then;
                return Flow::push(Frame::Expression(Expression::new()));
            }
            IfStep::Done => return Flow::pop(),
            _ => {}
        }

        let Some(t) = token else {
            return Flow::Wait;
        };
        let keyword = t.kind.keyword();

        match *step {
            IfStep::Then => match t.kind {
                TokenKind::Keyword(Keyword::Then) => {
                    *step = IfStep::AfterThen;
                    Flow::consume()
                }
                TokenKind::Eol => {
                    *step = IfStep::AfterThen;
                    Flow::retry()
                }
                _ => {
                    self.unexpected(t);
                    Flow::consume()
                }
            },
            IfStep::AfterThen => {
                if t.kind == TokenKind::Eol {
                    *step = IfStep::Body;
                    Flow::push(Frame::Statements(Statements::block(Keyword::If, IF_STOPS)))
                } else {
                    *step = IfStep::SingleLineBody;
                    Flow::push(Frame::Statements(Statements::single_line(&[Keyword::Else])))
                }
            }
            IfStep::Body => match keyword {
                Some(Keyword::ElseIf) => {
                    *step = IfStep::Then;
                    Flow::consume_push(Frame::Expression(Expression::new()))
                }
                Some(Keyword::Else) => {
                    *step = IfStep::AfterElse;
                    Flow::consume()
                }
                _ => Flow::pop(),
            },
            IfStep::AfterElse => match keyword {
                // `Else If` on one line reads as `ElseIf`
                Some(Keyword::If) => {
                    *step = IfStep::Then;
                    Flow::consume_push(Frame::Expression(Expression::new()))
                }
                _ => {
                    *step = IfStep::Body;
                    Flow::push(Frame::Statements(Statements::block(Keyword::If, IF_STOPS)))
                }
            },
            IfStep::SingleLineBody => match keyword {
                Some(Keyword::Else) => {
                    *step = IfStep::Done;
                    Flow::consume_push(Frame::Statements(Statements::single_line(&[])))
                }
                _ => Flow::pop(),
            },
            IfStep::Condition | IfStep::Done => Flow::pop(),
        }
    }

    pub(super) fn select_block(&mut self, step: &mut SelectStep, token: Option<&Token>) -> Flow {
        match *step {
            SelectStep::Subject => {
                *step = SelectStep::Clauses;
                return Flow::push(Frame::Expression(Expression::new()));
            }
            SelectStep::CaseBody => {
                *step = SelectStep::Body;
                return Flow::push(Frame::Statements(Statements::block(Keyword::Select, &[Keyword::Case])));
            }
            _ => {}
        }

        let Some(t) = token else {
            return Flow::Wait;
        };
        let keyword = t.kind.keyword();

        match *step {
            SelectStep::AfterSelect => {
                *step = SelectStep::Subject;
                if keyword == Some(Keyword::Case) {
                    Flow::consume()
                } else {
                    Flow::retry()
                }
            }
            SelectStep::Clauses => match t.kind {
                TokenKind::Eol | TokenKind::Colon => Flow::consume(),
                TokenKind::Keyword(Keyword::Case) => {
                    *step = SelectStep::CaseItems;
                    Flow::consume()
                }
                TokenKind::Keyword(Keyword::End) => {
                    *step = SelectStep::AfterEnd;
                    Flow::consume()
                }
                _ => {
                    self.unexpected(t);
                    Flow::consume()
                }
            },
            SelectStep::AfterEnd => match keyword {
                Some(Keyword::Select) => Flow::Consumed(Action::Pop),
                Some(other) if is_block_keyword(other) => {
                    self.unexpected(t);
                    self.close_mismatched(other);
                    Flow::pop()
                }
                _ => {
                    self.unexpected(t);
                    *step = SelectStep::Clauses;
                    Flow::retry()
                }
            },
            SelectStep::CaseItems => match keyword {
                Some(Keyword::Else) => {
                    *step = SelectStep::CaseBody;
                    Flow::consume()
                }
                Some(Keyword::Is) => {
                    *step = SelectStep::CaseRelation;
                    Flow::consume()
                }
                _ => {
                    *step = SelectStep::AfterCaseItem;
                    Flow::push(Frame::Expression(Expression::new()))
                }
            },
            SelectStep::CaseRelation => {
                *step = SelectStep::AfterCaseItem;
                match t.kind {
                    TokenKind::LessThan
                    | TokenKind::GreaterThan
                    | TokenKind::LessEqual
                    | TokenKind::GreaterEqual
                    | TokenKind::NotEqual
                    | TokenKind::Assign => Flow::consume_push(Frame::Expression(Expression::new())),
                    _ => {
                        self.unexpected(t);
                        Flow::retry()
                    }
                }
            }
            SelectStep::AfterCaseItem => match t.kind {
                TokenKind::Keyword(Keyword::To) => Flow::consume_push(Frame::Expression(Expression::new())),
                TokenKind::Comma => {
                    *step = SelectStep::CaseItems;
                    Flow::consume()
                }
                _ => {
                    *step = SelectStep::CaseBody;
                    Flow::retry()
                }
            },
            SelectStep::Body => match keyword {
                Some(Keyword::Case) => {
                    *step = SelectStep::CaseItems;
                    Flow::consume()
                }
                _ => Flow::pop(),
            },
            SelectStep::Subject | SelectStep::CaseBody => Flow::retry(),
        }
    }

    /// `While`, `With`, `SyncLock` and `Using` blocks
    pub(super) fn loop_block(&mut self, block: &mut LoopBlock, token: Option<&Token>) -> Flow {
        match block.step {
            LoopStep::Head => {
                block.step = if block.kind == Keyword::Using {
                    LoopStep::UsingTail
                } else {
                    LoopStep::BodyStart
                };
                return Flow::push(Frame::Expression(Expression::new()));
            }
            LoopStep::BodyStart => {
                block.step = LoopStep::Body;
                let stops: &'static [Keyword] = if block.kind == Keyword::While { &[Keyword::Wend] } else { &[] };
                return Flow::push(Frame::Statements(Statements::block(block.kind, stops)));
            }
            _ => {}
        }

        let Some(t) = token else {
            return Flow::Wait;
        };

        match block.step {
            LoopStep::UsingTail => match t.kind {
                TokenKind::Keyword(Keyword::As) => Flow::consume_push(Frame::TypeName(TypeNameStep::Start)),
                TokenKind::Assign => Flow::consume_push(Frame::Expression(Expression::continued())),
                TokenKind::Comma => {
                    block.step = LoopStep::Head;
                    Flow::consume()
                }
                _ => {
                    block.step = LoopStep::BodyStart;
                    Flow::retry()
                }
            },
            LoopStep::Body if block.kind == Keyword::While && t.kind == TokenKind::Keyword(Keyword::Wend) => {
                Flow::Consumed(Action::Pop)
            }
            _ => Flow::pop(),
        }
    }

    pub(super) fn do_block(&mut self, step: &mut DoStep, token: Option<&Token>) -> Flow {
        match *step {
            DoStep::BodyStart => {
                *step = DoStep::Body;
                return Flow::push(Frame::Statements(Statements::until(&[Keyword::Loop])));
            }
            DoStep::Done => return Flow::pop(),
            _ => {}
        }

        let Some(t) = token else {
            return Flow::Wait;
        };
        let condition = matches!(t.kind.keyword(), Some(Keyword::While | Keyword::Until));

        match *step {
            DoStep::Head => {
                *step = DoStep::BodyStart;
                if condition {
                    Flow::consume_push(Frame::Expression(Expression::new()))
                } else {
                    Flow::retry()
                }
            }
            DoStep::Body if t.kind == TokenKind::Keyword(Keyword::Loop) => {
                *step = DoStep::Tail;
                Flow::consume()
            }
            DoStep::Tail if condition => {
                *step = DoStep::Done;
                Flow::consume_push(Frame::Expression(Expression::new()))
            }
            _ => Flow::pop(),
        }
    }

    pub(super) fn for_block(&mut self, step: &mut ForStep, token: Option<&Token>) -> Flow {
        let Some(t) = token else {
            return Flow::Wait;
        };

        match *step {
            ForStep::Head => {
                if t.kind == TokenKind::Keyword(Keyword::Each) {
                    return Flow::consume();
                }
                *step = ForStep::Control;
                Flow::push(Frame::Expression(Expression::new()))
            }
            ForStep::Control => match t.kind {
                TokenKind::Keyword(Keyword::To | Keyword::Step | Keyword::In) => {
                    Flow::consume_push(Frame::Expression(Expression::new()))
                }
                TokenKind::Keyword(Keyword::As) => Flow::consume_push(Frame::TypeName(TypeNameStep::Start)),
                TokenKind::Assign => Flow::consume_push(Frame::Expression(Expression::continued())),
                TokenKind::Eol | TokenKind::Colon => {
                    *step = ForStep::Body;
                    Flow::push(Frame::Statements(Statements::until(&[Keyword::Next])))
                }
                _ => {
                    self.unexpected(t);
                    Flow::consume()
                }
            },
            ForStep::Body => {
                if t.kind == TokenKind::Keyword(Keyword::Next) {
                    *step = ForStep::NextVariables;
                    Flow::consume()
                } else {
                    Flow::pop()
                }
            }
            ForStep::NextVariables => match t.kind {
                TokenKind::Comma => {
                    self.close_outer_for();
                    Flow::Consumed(Action::Pop)
                }
                TokenKind::Dot => Flow::consume(),
                kind if is_name(kind) => Flow::consume(),
                _ => Flow::pop(),
            },
        }
    }

    pub(super) fn try_block(&mut self, step: &mut TryStep, token: Option<&Token>) -> Flow {
        if *step == TryStep::BodyStart {
            *step = TryStep::Body;
            return Flow::push(Frame::Statements(Statements::block(
                Keyword::Try,
                &[Keyword::Catch, Keyword::Finally],
            )));
        }

        let Some(t) = token else {
            return Flow::Wait;
        };

        match (*step, t.kind) {
            (TryStep::Body, TokenKind::Keyword(Keyword::Catch)) => {
                *step = TryStep::CatchHead;
                Flow::consume()
            }
            (TryStep::Body, TokenKind::Keyword(Keyword::Finally)) => {
                *step = TryStep::BodyStart;
                Flow::consume()
            }
            (TryStep::CatchHead, TokenKind::Keyword(Keyword::As)) => {
                Flow::consume_push(Frame::TypeName(TypeNameStep::Start))
            }
            (TryStep::CatchHead, TokenKind::Keyword(Keyword::When)) => {
                Flow::consume_push(Frame::Expression(Expression::new()))
            }
            (TryStep::CatchHead, TokenKind::Eol | TokenKind::Colon) => {
                *step = TryStep::BodyStart;
                Flow::retry()
            }
            (TryStep::CatchHead, kind) if is_name(kind) => Flow::consume(),
            (TryStep::CatchHead, _) => {
                self.unexpected(t);
                Flow::consume()
            }
            _ => Flow::pop(),
        }
    }

    /// Operand of `Return`, `Throw` or `Yield`, which may be absent
    pub(super) fn optional_expression(&mut self, token: Option<&Token>) -> Flow {
        match token {
            None => Flow::Wait,
            Some(t) if t.kind.is_terminator() || t.kind == TokenKind::Keyword(Keyword::Else) => Flow::pop(),
            Some(_) => Flow::replace(Frame::Expression(Expression::new())),
        }
    }

    pub(super) fn expression_list(&mut self, step: &mut ListStep, token: Option<&Token>) -> Flow {
        if *step == ListStep::Item {
            *step = ListStep::AfterItem;
            return Flow::push(Frame::Expression(Expression::new()));
        }
        match token {
            None => Flow::Wait,
            Some(t) if t.kind == TokenKind::Comma => {
                *step = ListStep::Item;
                Flow::consume()
            }
            Some(_) => Flow::pop(),
        }
    }
}
